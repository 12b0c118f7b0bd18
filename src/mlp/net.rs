use log::debug;
use rand::prelude::Distribution;

use super::activation::Activation;
use super::error::{NetError, SizeMismatch};
use super::layer::{InnerLayer, InputLayer};
use super::unit::{LayerRef, UnitRef};

/// Position of an inner layer inside the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InnerRef {
    Hidden(usize),
    Output,
}

/// Feed-forward multilayer perceptron.
///
/// Owns exactly one input layer, zero or more hidden layers and one output
/// layer. Every inner layer is fully connected to the layer immediately
/// preceding it; structural mutation rewires neighbors so the invariant holds
/// after every public operation.
///
/// A `Network` assumes exclusive single-caller access: no operation suspends,
/// and every operation completes before returning.
///
/// # Examples
/// ```
/// use percepnet::mlp::Network;
///
/// let mut net = Network::new(2, 1);
/// net.set_inputs(&[1.0, 2.0]).unwrap();
/// // All weights start at 1.0 and the default activation is ReLU.
/// assert_eq!(net.calc_outputs().unwrap(), vec![3.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) input_layer: InputLayer,
    pub(crate) hidden_layers: Vec<InnerLayer>,
    pub(crate) output_layer: InnerLayer,
}

impl Network {
    /// Creates a network with the given input and output unit counts, both
    /// clamped up to at least 1, and no hidden layers. The output layer is
    /// bound directly to the input layer.
    pub fn new(input_count: usize, output_count: usize) -> Network {
        let input_count = input_count.max(1);
        let output_count = output_count.max(1);

        let input_layer = InputLayer::new(input_count);
        let mut output_layer = InnerLayer::new(output_count);
        output_layer.bind_leading_layer(LayerRef::Input, input_count);

        Network {
            input_layer,
            hidden_layers: Vec::new(),
            output_layer,
        }
    }

    //   Topology accessors

    pub fn input_count(&self) -> usize {
        self.input_layer.unit_count()
    }

    pub fn output_count(&self) -> usize {
        self.output_layer.unit_count()
    }

    pub fn hidden_layer_count(&self) -> usize {
        self.hidden_layers.len()
    }

    /// Total layer count, always `hidden_layer_count() + 2`.
    pub fn layer_count(&self) -> usize {
        self.hidden_layers.len() + 2
    }

    /// Unit count per layer: element 0 is the input layer, the last element
    /// the output layer, with hidden layers in order between them.
    pub fn perceptrons_by_layer(&self) -> Vec<usize> {
        let mut counts = Vec::with_capacity(self.layer_count());
        counts.push(self.input_layer.unit_count());
        for layer in &self.hidden_layers {
            counts.push(layer.unit_count());
        }
        counts.push(self.output_layer.unit_count());
        counts
    }

    //   Structural mutation

    /// Appends a hidden layer with `perceptron_count` units immediately before
    /// the output layer, binds it to the previous last layer, and rebinds the
    /// output layer to it. A `perceptron_count` of 0 is a no-op.
    pub fn create_hidden_layer(&mut self, perceptron_count: usize) {
        if perceptron_count < 1 {
            return;
        }

        let new_index = self.hidden_layers.len();
        let (source_layer, source_count) = if new_index == 0 {
            (LayerRef::Input, self.input_layer.unit_count())
        } else {
            (
                LayerRef::Hidden(new_index - 1),
                self.hidden_layers[new_index - 1].unit_count(),
            )
        };

        let mut layer = InnerLayer::new(perceptron_count);
        layer.bind_leading_layer(source_layer, source_count);
        self.hidden_layers.push(layer);
        self.output_layer
            .bind_leading_layer(LayerRef::Hidden(new_index), perceptron_count);

        debug!(
            "created hidden layer {} with {} unit(s)",
            new_index, perceptron_count
        );
    }

    /// Removes the hidden layer at `index` and rebinds the layer that
    /// followed it (or the output layer) to the layer that preceded it (or
    /// the input layer).
    ///
    /// # Returns
    /// * `Ok(())` on success;
    /// * `Err(NetError::LayerIndexOutOfRange)` if `index` is not a valid
    ///   hidden-layer position; no mutation is visible afterwards.
    pub fn remove_hidden_layer(&mut self, index: usize) -> Result<(), NetError> {
        if index >= self.hidden_layers.len() {
            return Err(NetError::LayerIndexOutOfRange {
                index,
                count: self.hidden_layers.len(),
            });
        }

        self.hidden_layers.remove(index);
        self.shift_hidden_sources_after(index);
        self.rebind_follower_of_removed(index);

        debug!("removed hidden layer {}", index);
        Ok(())
    }

    /// Grows the output layer by one unit, immediately bound to the current
    /// last layer.
    pub fn add_output(&mut self) {
        let (source_layer, source_count) = self.leading_of(InnerRef::Output);
        self.output_layer.add_unit(source_layer, source_count);
    }

    /// Shrinks the output layer by one unit; keeps at least one.
    pub fn remove_output(&mut self) {
        self.output_layer.remove_unit();
    }

    /// Grows the hidden layer at `layer_index` by one unit and rebinds the
    /// following layer to restore full connectivity.
    pub fn add_perceptron_to_hidden_layer(&mut self, layer_index: usize) -> Result<(), NetError> {
        if layer_index >= self.hidden_layers.len() {
            return Err(NetError::LayerIndexOutOfRange {
                index: layer_index,
                count: self.hidden_layers.len(),
            });
        }

        let (source_layer, source_count) = self.leading_of(InnerRef::Hidden(layer_index));
        self.hidden_layers[layer_index].add_unit(source_layer, source_count);
        self.rebind_follower_of(layer_index);
        Ok(())
    }

    /// Shrinks the hidden layer at `layer_index` by one unit (keeping at
    /// least one) and rebinds the following layer.
    pub fn remove_perceptron_from_hidden_layer(
        &mut self,
        layer_index: usize,
    ) -> Result<(), NetError> {
        if layer_index >= self.hidden_layers.len() {
            return Err(NetError::LayerIndexOutOfRange {
                index: layer_index,
                count: self.hidden_layers.len(),
            });
        }

        if self.hidden_layers[layer_index].remove_unit() {
            self.rebind_follower_of(layer_index);
        }
        Ok(())
    }

    /// Rebinds the layer following hidden layer `index` (the next hidden
    /// layer, or the output layer) to it. Required whenever that layer's unit
    /// count changes.
    fn rebind_follower_of(&mut self, index: usize) {
        let source_count = self.hidden_layers[index].unit_count();
        let source_layer = LayerRef::Hidden(index);
        if index + 1 < self.hidden_layers.len() {
            self.hidden_layers[index + 1].bind_leading_layer(source_layer, source_count);
        } else {
            self.output_layer
                .bind_leading_layer(source_layer, source_count);
        }
    }

    /// After removing hidden layer `removed`, rebinds the layer that now
    /// occupies its position (or the output layer) to the preceding layer.
    fn rebind_follower_of_removed(&mut self, removed: usize) {
        let (source_layer, source_count) = if removed == 0 {
            (LayerRef::Input, self.input_layer.unit_count())
        } else {
            (
                LayerRef::Hidden(removed - 1),
                self.hidden_layers[removed - 1].unit_count(),
            )
        };
        if removed < self.hidden_layers.len() {
            self.hidden_layers[removed].bind_leading_layer(source_layer, source_count);
        } else {
            self.output_layer
                .bind_leading_layer(source_layer, source_count);
        }
    }

    /// Removing a hidden layer shifts the positions of every later hidden
    /// layer, so stored edge sources must be renumbered to keep pointing at
    /// the same layers.
    fn shift_hidden_sources_after(&mut self, removed: usize) {
        let shift = |edges: &mut super::unit::InnerUnit| {
            for edge in edges.inputs.iter_mut() {
                if let LayerRef::Hidden(position) = edge.source.layer {
                    if position > removed {
                        edge.source.layer = LayerRef::Hidden(position - 1);
                    }
                }
            }
        };
        for layer in self.hidden_layers.iter_mut() {
            for unit in layer.units.iter_mut() {
                shift(unit);
            }
        }
        for unit in self.output_layer.units.iter_mut() {
            shift(unit);
        }
    }

    //   Activation configuration

    /// Sets the activation function of every unit in the network, input layer
    /// included.
    pub fn set_activation(&mut self, function: Activation) {
        self.input_layer.set_activation(function);
        for layer in self.hidden_layers.iter_mut() {
            layer.set_activation(function);
        }
        self.output_layer.set_activation(function);
    }

    /// Sets the activation function of one hidden layer.
    pub fn set_hidden_layer_activation(
        &mut self,
        layer_index: usize,
        function: Activation,
    ) -> Result<(), NetError> {
        match self.hidden_layers.get_mut(layer_index) {
            Some(layer) => {
                layer.set_activation(function);
                Ok(())
            }
            None => Err(NetError::LayerIndexOutOfRange {
                index: layer_index,
                count: self.hidden_layers.len(),
            }),
        }
    }

    /// Sets the activation function of the output layer.
    pub fn set_output_layer_activation(&mut self, function: Activation) {
        self.output_layer.set_activation(function);
    }

    //   Weight introspection / injection

    /// Per-unit weight vectors of the layer at `index`.
    ///
    /// Indices `0..hidden_layer_count()` address hidden layers; an index
    /// equal to `hidden_layer_count()` addresses the output layer.
    pub fn layer_weights(&self, index: usize) -> Result<Vec<Vec<f64>>, NetError> {
        if index == self.hidden_layers.len() {
            Ok(self.output_layer.weights())
        } else if index < self.hidden_layers.len() {
            Ok(self.hidden_layers[index].weights())
        } else {
            Err(NetError::LayerIndexOutOfRange {
                index,
                count: self.hidden_layers.len() + 1,
            })
        }
    }

    /// Overwrites the weight matrix of the layer at `index` (same addressing
    /// as [`Network::layer_weights`]). A shape mismatch leaves every weight
    /// untouched.
    pub fn set_layer_weights(&mut self, index: usize, rows: &[Vec<f64>]) -> Result<(), NetError> {
        if index == self.hidden_layers.len() {
            self.output_layer.set_weights(rows)
        } else if index < self.hidden_layers.len() {
            self.hidden_layers[index].set_weights(rows)
        } else {
            Err(NetError::LayerIndexOutOfRange {
                index,
                count: self.hidden_layers.len() + 1,
            })
        }
    }

    /// Re-initializes every weight to a uniformly random value in [-1, 1].
    pub fn randomize_weights(&mut self) {
        let mut rng = rand::thread_rng();
        let weights_between = rand::distributions::Uniform::from(-1.0..=1.0);
        for layer in self
            .hidden_layers
            .iter_mut()
            .chain(std::iter::once(&mut self.output_layer))
        {
            for unit in layer.units.iter_mut() {
                for edge in unit.inputs.iter_mut() {
                    edge.weight = weights_between.sample(&mut rng);
                }
            }
        }
    }

    //   Forward / backward pass

    /// Assigns the input layer's unit inputs positionally.
    ///
    /// # Returns
    /// * `Ok(())` if `values` has exactly one value per input unit;
    /// * `Err(NetError::BadInputs)` otherwise.
    pub fn set_inputs(&mut self, values: &[f64]) -> Result<(), NetError> {
        self.input_layer.set_inputs(values)
    }

    /// Runs the forward pass: input layer, each hidden layer in order, then
    /// the output layer.
    ///
    /// # Returns
    /// * `Ok(outputs)` with the output layer's values in unit order;
    /// * `Err(NetError::UnconfiguredActivation)` if any unit has no
    ///   configured activation function.
    pub fn calc_outputs(&mut self) -> Result<Vec<f64>, NetError> {
        self.input_layer.calc_outputs()?;
        for index in 0..self.hidden_layers.len() {
            self.forward_inner(InnerRef::Hidden(index))?;
        }
        self.forward_inner(InnerRef::Output)?;
        Ok(self.output_layer.output_values())
    }

    /// Output values from the most recent forward pass.
    pub fn output_values(&self) -> Vec<f64> {
        self.output_layer.output_values()
    }

    /// Runs a forward pass from the current inputs, then propagates error
    /// backward and updates weights with the plain delta rule
    /// (`weight += gain * error * source output`, no activation-derivative
    /// term).
    ///
    /// The output layer's errors are `desired - output`; each hidden layer's
    /// errors (walked in reverse order) are the weight-scaled sums of the
    /// following layer's errors, computed against that layer's already
    /// updated weights.
    ///
    /// # Returns
    /// * `Ok(())` on success;
    /// * `Err(NetError::BadDesiredOutputs)` before any computation if
    ///   `desired_outputs` does not match the output layer's unit count;
    /// * `Err(NetError::UnconfiguredActivation)` from the forward pass.
    pub fn back_propagation(&mut self, gain: f64, desired_outputs: &[f64]) -> Result<(), NetError> {
        if desired_outputs.len() != self.output_layer.unit_count() {
            return Err(NetError::BadDesiredOutputs(SizeMismatch {
                expected: self.output_layer.unit_count(),
                got: desired_outputs.len(),
            }));
        }

        self.calc_outputs()?;

        for (unit_index, &desired) in desired_outputs.iter().enumerate() {
            let output = self.output_layer.units[unit_index].output;
            self.output_layer.units[unit_index].error = desired - output;
        }
        self.update_weights(InnerRef::Output, gain);

        for layer_index in (0..self.hidden_layers.len()).rev() {
            let following = if layer_index + 1 == self.hidden_layers.len() {
                InnerRef::Output
            } else {
                InnerRef::Hidden(layer_index + 1)
            };

            for unit_index in 0..self.hidden_layers[layer_index].unit_count() {
                let me = UnitRef {
                    layer: LayerRef::Hidden(layer_index),
                    index: unit_index,
                };
                let error: f64 = self
                    .inner_layer(following)
                    .units
                    .iter()
                    .map(|follower| {
                        follower
                            .inputs
                            .iter()
                            .filter(|edge| edge.source == me)
                            .map(|edge| follower.error * edge.weight)
                            .sum::<f64>()
                    })
                    .sum();
                self.hidden_layers[layer_index].units[unit_index].error = error;
            }
            self.update_weights(InnerRef::Hidden(layer_index), gain);
        }

        Ok(())
    }

    /// Recomputes one inner layer's outputs from the already-updated outputs
    /// of the layers its edges point at.
    fn forward_inner(&mut self, which: InnerRef) -> Result<(), NetError> {
        for unit_index in 0..self.inner_layer(which).unit_count() {
            let source_outputs = self.source_outputs(which, unit_index);
            self.inner_layer_mut(which).units[unit_index].calc_output(&source_outputs)?;
        }
        Ok(())
    }

    /// Applies the delta rule to every unit of one inner layer.
    fn update_weights(&mut self, which: InnerRef, gain: f64) {
        for unit_index in 0..self.inner_layer(which).unit_count() {
            let source_outputs = self.source_outputs(which, unit_index);
            self.inner_layer_mut(which).units[unit_index].backpropagation(gain, &source_outputs);
        }
    }

    /// Resolved upstream outputs of one unit, in its edge insertion order.
    fn source_outputs(&self, which: InnerRef, unit_index: usize) -> Vec<f64> {
        self.inner_layer(which).units[unit_index]
            .inputs
            .iter()
            .map(|edge| self.unit_output(edge.source))
            .collect()
    }

    fn unit_output(&self, source: UnitRef) -> f64 {
        match source.layer {
            LayerRef::Input => self.input_layer.units[source.index].output,
            LayerRef::Hidden(layer_index) => self.hidden_layers[layer_index].units[source.index].output,
        }
    }

    /// The layer currently feeding `which`, as (reference, unit count).
    fn leading_of(&self, which: InnerRef) -> (LayerRef, usize) {
        let hidden_index = match which {
            InnerRef::Hidden(index) => index,
            InnerRef::Output => self.hidden_layers.len(),
        };
        if hidden_index == 0 {
            (LayerRef::Input, self.input_layer.unit_count())
        } else {
            (
                LayerRef::Hidden(hidden_index - 1),
                self.hidden_layers[hidden_index - 1].unit_count(),
            )
        }
    }

    fn inner_layer(&self, which: InnerRef) -> &InnerLayer {
        match which {
            InnerRef::Hidden(index) => &self.hidden_layers[index],
            InnerRef::Output => &self.output_layer,
        }
    }

    fn inner_layer_mut(&mut self, which: InnerRef) -> &mut InnerLayer {
        match which {
            InnerRef::Hidden(index) => &mut self.hidden_layers[index],
            InnerRef::Output => &mut self.output_layer,
        }
    }
}
