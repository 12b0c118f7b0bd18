use serde::{Deserialize, Serialize};

use super::activation::{self, Activation};
use super::error::NetError;

/// Identifies a layer that can feed units downstream.
///
/// The output layer never acts as a source, so it has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerRef {
    Input,
    Hidden(usize),
}

/// Non-owning reference to a unit inside a network-owned layer.
///
/// Layers own their units; edges store plain indices instead of pointers, so
/// cross-layer references never form ownership cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRef {
    pub layer: LayerRef,
    pub index: usize,
}

/// One weighted incoming connection of an inner unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: UnitRef,
    pub weight: f64,
}

/// Unit of the input layer: its output is the activation of an externally
/// supplied scalar.
#[derive(Debug, Clone)]
pub struct InputUnit {
    pub input: f64,
    pub(crate) output: f64,
    pub(crate) activation: Option<Activation>,
}

impl InputUnit {
    pub(crate) fn new() -> InputUnit {
        InputUnit {
            input: 0.0,
            output: 0.0,
            activation: Some(Activation::default()),
        }
    }

    /// Recomputes `output` from the current `input`.
    pub(crate) fn calc_output(&mut self) -> Result<(), NetError> {
        self.output = activation::activate(self.activation, self.input)?;
        Ok(())
    }

    pub fn output(&self) -> f64 {
        self.output
    }
}

/// Unit of a hidden or output layer: its output is the activation of the
/// weighted sum of its upstream units' outputs.
#[derive(Debug, Clone)]
pub struct InnerUnit {
    pub(crate) output: f64,
    pub(crate) error: f64,
    pub(crate) activation: Option<Activation>,
    /// Incoming edges in insertion order. This is the order backpropagation
    /// iterates; a unit may appear more than once (two independent edges to
    /// the same source, doubling its effective contribution).
    pub(crate) inputs: Vec<Edge>,
}

impl InnerUnit {
    pub(crate) fn new() -> InnerUnit {
        InnerUnit {
            output: 0.0,
            error: 0.0,
            activation: Some(Activation::default()),
            inputs: Vec::new(),
        }
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    /// Appends a new edge from `source` with weight 1.0.
    ///
    /// No duplicate check is performed; calling twice with the same source
    /// creates two independent weighted edges.
    pub(crate) fn add_input(&mut self, source: UnitRef) {
        self.inputs.push(Edge {
            source,
            weight: 1.0,
        });
    }

    /// Removes the first edge referencing `source`; no-op if none exists.
    ///
    /// Structural operations on [`crate::mlp::Network`] rebind whole layers
    /// instead of removing individual edges, so full connectivity is restored
    /// after any topology change.
    pub fn remove_input(&mut self, source: UnitRef) {
        if let Some(position) = self.inputs.iter().position(|edge| edge.source == source) {
            self.inputs.remove(position);
        }
    }

    /// Clears all edges. Used when rebinding to a new preceding layer.
    pub(crate) fn reset_connections(&mut self) {
        self.inputs.clear();
    }

    /// Weighted sum of upstream outputs; `source_outputs[i]` is the resolved
    /// output of `inputs[i]`'s source.
    pub(crate) fn weighted_sum(&self, source_outputs: &[f64]) -> f64 {
        self.inputs
            .iter()
            .zip(source_outputs.iter())
            .map(|(edge, &output)| edge.weight * output)
            .sum()
    }

    /// Recomputes `output` from resolved upstream outputs.
    pub(crate) fn calc_output(&mut self, source_outputs: &[f64]) -> Result<(), NetError> {
        let sum = self.weighted_sum(source_outputs);
        self.output = activation::activate(self.activation, sum)?;
        Ok(())
    }

    /// Error-correction weight update: `weight += gain * error * source output`
    /// for every edge, in insertion order.
    pub(crate) fn backpropagation(&mut self, gain: f64, source_outputs: &[f64]) {
        for (edge, &output) in self.inputs.iter_mut().zip(source_outputs.iter()) {
            edge.weight += gain * self.error * output;
        }
    }

    /// Current weights in edge insertion order.
    pub fn connection_weights(&self) -> Vec<f64> {
        self.inputs.iter().map(|edge| edge.weight).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_ref(index: usize) -> UnitRef {
        UnitRef {
            layer: LayerRef::Input,
            index,
        }
    }

    #[test]
    fn add_input_starts_at_weight_one() {
        let mut unit = InnerUnit::new();
        unit.add_input(input_ref(0));
        unit.add_input(input_ref(1));
        assert_eq!(unit.connection_weights(), vec![1.0, 1.0]);
    }

    #[test]
    fn duplicate_add_doubles_contribution() {
        let mut unit = InnerUnit::new();
        unit.add_input(input_ref(0));
        unit.add_input(input_ref(0));
        assert_eq!(unit.inputs.len(), 2);
        assert_eq!(unit.weighted_sum(&[3.0, 3.0]), 6.0);
    }

    #[test]
    fn remove_input_drops_first_match_only() {
        let mut unit = InnerUnit::new();
        unit.add_input(input_ref(0));
        unit.add_input(input_ref(1));
        unit.add_input(input_ref(0));

        unit.remove_input(input_ref(0));
        assert_eq!(unit.inputs.len(), 2);
        assert_eq!(unit.inputs[0].source, input_ref(1));
        assert_eq!(unit.inputs[1].source, input_ref(0));

        // Removing an absent source is a no-op.
        unit.remove_input(input_ref(9));
        assert_eq!(unit.inputs.len(), 2);
    }

    #[test]
    fn backpropagation_applies_delta_rule_per_edge() {
        let mut unit = InnerUnit::new();
        unit.add_input(input_ref(0));
        unit.add_input(input_ref(1));
        unit.error = 2.0;

        unit.backpropagation(0.1, &[1.0, 2.0]);
        assert_eq!(unit.connection_weights(), vec![1.2, 1.4]);
    }
}
