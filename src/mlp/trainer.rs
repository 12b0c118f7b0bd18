use log::{debug, trace};

use super::error::NetError;
use super::net::Network;

/// Paired training samples: row `i` of `inputs` is presented with row `i` of
/// `desired_outputs`.
///
/// Rows are public so a host can fill the table directly; the training entry
/// point re-validates that the two sides pair up before touching the network.
#[derive(Debug, Clone, Default)]
pub struct TrainingTable {
    pub inputs: Vec<Vec<f64>>,
    pub desired_outputs: Vec<Vec<f64>>,
}

impl TrainingTable {
    pub fn new() -> TrainingTable {
        TrainingTable::default()
    }

    /// Appends one paired sample.
    pub fn push_sample(&mut self, inputs: Vec<f64>, desired_outputs: Vec<f64>) {
        self.inputs.push(inputs);
        self.desired_outputs.push(desired_outputs);
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Repeats for `iterations`: for every sample in the table, set the network's
/// inputs and run one backpropagation step with the given gain.
///
/// # Returns
/// * `Ok(())` once all iterations complete;
/// * `Err(NetError::UnbalancedTrainingTable)` before any training if the
///   table's input and desired-output row counts differ;
/// * any error from `set_inputs`/`back_propagation` (shape mismatches are
///   detected on the first sample, before its weights are touched).
pub fn train_by_backpropagation(
    network: &mut Network,
    table: &TrainingTable,
    iterations: usize,
    gain: f64,
) -> Result<(), NetError> {
    if table.inputs.len() != table.desired_outputs.len() {
        return Err(NetError::UnbalancedTrainingTable {
            inputs: table.inputs.len(),
            outputs: table.desired_outputs.len(),
        });
    }

    debug!(
        "training on {} sample(s) for {} iteration(s), gain {}",
        table.len(),
        iterations,
        gain
    );

    for iteration in 0..iterations {
        for (inputs, desired_outputs) in table.inputs.iter().zip(table.desired_outputs.iter()) {
            network.set_inputs(inputs)?;
            network.back_propagation(gain, desired_outputs)?;
        }
        trace!("finished iteration {}", iteration);
    }

    Ok(())
}

/// Combines two trained parents of identical topology into a child network.
///
/// The child copies parent A's shape; its even-indexed hidden layers take
/// their weights from A and odd-indexed ones from B. Output-layer weights and
/// activation settings are not transferred: the child's output layer keeps
/// its freshly bound weights.
///
/// # Returns
/// * `Ok(child)` on success;
/// * `Err(NetError::TopologyMismatch)` if the parents' per-layer unit counts
///   differ.
pub fn breed(parent_a: &Network, parent_b: &Network) -> Result<Network, NetError> {
    let shape = parent_a.perceptrons_by_layer();
    if shape != parent_b.perceptrons_by_layer() {
        return Err(NetError::TopologyMismatch);
    }

    let mut child = Network::new(parent_a.input_count(), parent_a.output_count());
    for index in 0..parent_a.hidden_layer_count() {
        child.create_hidden_layer(shape[index + 1]);

        let weights = if index % 2 == 0 {
            parent_a.layer_weights(index)?
        } else {
            parent_b.layer_weights(index)?
        };
        child.set_layer_weights(index, &weights)?;
    }

    Ok(child)
}
