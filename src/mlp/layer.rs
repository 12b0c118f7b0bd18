use super::activation::Activation;
use super::error::{NetError, SizeMismatch};
use super::unit::{InnerUnit, InputUnit, LayerRef, UnitRef};

/// The network's first layer: units take externally supplied scalars and have
/// no weighted inputs.
#[derive(Debug, Clone)]
pub struct InputLayer {
    pub(crate) units: Vec<InputUnit>,
}

impl InputLayer {
    pub(crate) fn new(unit_count: usize) -> InputLayer {
        InputLayer {
            units: (0..unit_count).map(|_| InputUnit::new()).collect(),
        }
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Assigns unit inputs positionally.
    ///
    /// # Returns
    /// * `Ok(())` if `values` has exactly one value per unit;
    /// * `Err(NetError::BadInputs)` otherwise, before any assignment.
    pub fn set_inputs(&mut self, values: &[f64]) -> Result<(), NetError> {
        if values.len() != self.units.len() {
            return Err(NetError::BadInputs(SizeMismatch {
                expected: self.units.len(),
                got: values.len(),
            }));
        }
        for (unit, &value) in self.units.iter_mut().zip(values.iter()) {
            unit.input = value;
        }
        Ok(())
    }

    /// Recomputes every unit's output from its current input.
    pub(crate) fn calc_outputs(&mut self) -> Result<(), NetError> {
        for unit in self.units.iter_mut() {
            unit.calc_output()?;
        }
        Ok(())
    }

    pub(crate) fn set_activation(&mut self, function: Activation) {
        for unit in self.units.iter_mut() {
            unit.activation = Some(function);
        }
    }
}

/// A hidden or output layer: every unit holds a weighted edge to every unit
/// of its currently-bound preceding layer.
#[derive(Debug, Clone)]
pub struct InnerLayer {
    pub(crate) units: Vec<InnerUnit>,
}

impl InnerLayer {
    pub(crate) fn new(unit_count: usize) -> InnerLayer {
        InnerLayer {
            units: (0..unit_count).map(|_| InnerUnit::new()).collect(),
        }
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Rewires this layer to `source_layer`: every unit drops all edges and
    /// gains one fresh weight-1.0 edge per unit of the preceding layer.
    ///
    /// This is the single rewiring primitive behind all structural mutation;
    /// connectivity is re-derived from scratch each time rather than patched.
    pub(crate) fn bind_leading_layer(&mut self, source_layer: LayerRef, source_count: usize) {
        for unit in self.units.iter_mut() {
            unit.reset_connections();
            for index in 0..source_count {
                unit.add_input(UnitRef {
                    layer: source_layer,
                    index,
                });
            }
        }
    }

    /// Appends one unit with a full fan-in from the preceding layer, leaving
    /// the existing units' weights untouched.
    pub(crate) fn add_unit(&mut self, source_layer: LayerRef, source_count: usize) {
        let mut unit = InnerUnit::new();
        for index in 0..source_count {
            unit.add_input(UnitRef {
                layer: source_layer,
                index,
            });
        }
        self.units.push(unit);
    }

    /// Removes the most recently added unit. Shrinking below one unit is a
    /// no-op.
    pub(crate) fn remove_unit(&mut self) -> bool {
        if self.units.len() > 1 {
            self.units.pop();
            true
        } else {
            false
        }
    }

    pub(crate) fn output_values(&self) -> Vec<f64> {
        self.units.iter().map(|unit| unit.output).collect()
    }

    /// Per-unit weight vectors, in unit order then edge insertion order.
    pub fn weights(&self) -> Vec<Vec<f64>> {
        self.units
            .iter()
            .map(|unit| unit.connection_weights())
            .collect()
    }

    /// Overwrites per-unit weight vectors.
    ///
    /// The whole matrix is validated against the current connectivity before
    /// a single weight is written, so a shape error leaves the layer intact.
    pub(crate) fn set_weights(&mut self, rows: &[Vec<f64>]) -> Result<(), NetError> {
        if rows.len() != self.units.len() {
            return Err(NetError::BadWeightRows(SizeMismatch {
                expected: self.units.len(),
                got: rows.len(),
            }));
        }
        for (index, (unit, row)) in self.units.iter().zip(rows.iter()).enumerate() {
            if row.len() != unit.inputs.len() {
                return Err(NetError::BadWeightLen {
                    unit: index,
                    mismatch: SizeMismatch {
                        expected: unit.inputs.len(),
                        got: row.len(),
                    },
                });
            }
        }
        for (unit, row) in self.units.iter_mut().zip(rows.iter()) {
            for (edge, &weight) in unit.inputs.iter_mut().zip(row.iter()) {
                edge.weight = weight;
            }
        }
        Ok(())
    }

    pub(crate) fn set_activation(&mut self, function: Activation) {
        for unit in self.units.iter_mut() {
            unit.activation = Some(function);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_inputs_rejects_wrong_length_before_assigning() {
        let mut layer = InputLayer::new(2);
        layer.set_inputs(&[5.0, 6.0]).unwrap();

        let result = layer.set_inputs(&[1.0, 2.0, 3.0]);
        assert_eq!(
            result,
            Err(NetError::BadInputs(SizeMismatch {
                expected: 2,
                got: 3
            }))
        );
        // Previous inputs untouched.
        assert_eq!(layer.units[0].input, 5.0);
        assert_eq!(layer.units[1].input, 6.0);
    }

    #[test]
    fn bind_leading_layer_establishes_full_connectivity() {
        let mut layer = InnerLayer::new(3);
        layer.bind_leading_layer(LayerRef::Input, 4);
        for unit in &layer.units {
            assert_eq!(unit.inputs.len(), 4);
            assert!(unit.connection_weights().iter().all(|&w| w == 1.0));
        }

        // Rebinding re-derives connectivity from scratch.
        layer.units[0].inputs[2].weight = 0.25;
        layer.bind_leading_layer(LayerRef::Hidden(0), 2);
        for unit in &layer.units {
            assert_eq!(unit.inputs.len(), 2);
            assert!(unit.connection_weights().iter().all(|&w| w == 1.0));
        }
    }

    #[test]
    fn add_unit_leaves_sibling_weights_untouched() {
        let mut layer = InnerLayer::new(1);
        layer.bind_leading_layer(LayerRef::Input, 2);
        layer.units[0].inputs[0].weight = 0.5;

        layer.add_unit(LayerRef::Input, 2);
        assert_eq!(layer.unit_count(), 2);
        assert_eq!(layer.units[0].inputs[0].weight, 0.5);
        assert_eq!(layer.units[1].connection_weights(), vec![1.0, 1.0]);
    }

    #[test]
    fn set_weights_is_all_or_nothing() {
        let mut layer = InnerLayer::new(2);
        layer.bind_leading_layer(LayerRef::Input, 2);

        // Second row too short: nothing must change.
        let result = layer.set_weights(&[vec![0.1, 0.2], vec![0.3]]);
        assert_eq!(
            result,
            Err(NetError::BadWeightLen {
                unit: 1,
                mismatch: SizeMismatch {
                    expected: 2,
                    got: 1
                }
            })
        );
        assert_eq!(layer.weights(), vec![vec![1.0, 1.0], vec![1.0, 1.0]]);

        layer
            .set_weights(&[vec![0.1, 0.2], vec![0.3, 0.4]])
            .unwrap();
        assert_eq!(layer.weights(), vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[test]
    fn remove_unit_keeps_at_least_one() {
        let mut layer = InnerLayer::new(2);
        assert!(layer.remove_unit());
        assert!(!layer.remove_unit());
        assert_eq!(layer.unit_count(), 1);
    }
}
