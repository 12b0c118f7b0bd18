//! Whole-network snapshots.
//!
//! A snapshot captures everything a network needs to be reconstructed:
//! topology shape, per-unit activation settings and per-edge weights.
//! Persistence itself is the host's concern; the blob helpers below just fix
//! an encoding so hosts can treat it as opaque.

use serde::{Deserialize, Serialize};

use super::activation::Activation;
use super::error::NetError;
use super::layer::InnerLayer;
use super::net::Network;

/// Reconstructible image of a [`Network`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    /// Activation selector of each input unit, in layer order.
    pub input_activations: Vec<Option<Activation>>,
    pub hidden_layers: Vec<LayerSnapshot>,
    pub output_layer: LayerSnapshot,
}

/// One hidden or output layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub units: Vec<WeightedUnitSnapshot>,
}

/// One inner unit: its activation selector and incoming weights in edge
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedUnitSnapshot {
    pub activation: Option<Activation>,
    pub weights: Vec<f64>,
}

impl NetworkSnapshot {
    /// Encodes the snapshot as an opaque byte blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decodes a snapshot previously produced by [`NetworkSnapshot::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<NetworkSnapshot, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

fn layer_snapshot(layer: &InnerLayer) -> LayerSnapshot {
    LayerSnapshot {
        units: layer
            .units
            .iter()
            .map(|unit| WeightedUnitSnapshot {
                activation: unit.activation,
                weights: unit.connection_weights(),
            })
            .collect(),
    }
}

impl Network {
    /// Captures the current topology, activation settings and weights.
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            input_activations: self
                .input_layer
                .units
                .iter()
                .map(|unit| unit.activation)
                .collect(),
            hidden_layers: self.hidden_layers.iter().map(layer_snapshot).collect(),
            output_layer: layer_snapshot(&self.output_layer),
        }
    }

    /// Rebuilds a network from a snapshot.
    ///
    /// The topology is reconstructed first (full connectivity re-derived per
    /// the usual binding rules), then weights and activation selectors are
    /// injected. A snapshot whose weight vectors disagree with the rebuilt
    /// connectivity is rejected with a shape error.
    pub fn from_snapshot(snapshot: &NetworkSnapshot) -> Result<Network, NetError> {
        let mut network = Network::new(
            snapshot.input_activations.len(),
            snapshot.output_layer.units.len(),
        );

        for (unit, &activation) in network
            .input_layer
            .units
            .iter_mut()
            .zip(snapshot.input_activations.iter())
        {
            unit.activation = activation;
        }

        for layer in &snapshot.hidden_layers {
            network.create_hidden_layer(layer.units.len());
        }

        for (index, layer) in snapshot
            .hidden_layers
            .iter()
            .chain(std::iter::once(&snapshot.output_layer))
            .enumerate()
        {
            let rows: Vec<Vec<f64>> = layer.units.iter().map(|unit| unit.weights.clone()).collect();
            network.set_layer_weights(index, &rows)?;

            let target = if index == snapshot.hidden_layers.len() {
                &mut network.output_layer
            } else {
                &mut network.hidden_layers[index]
            };
            for (unit, unit_snapshot) in target.units.iter_mut().zip(layer.units.iter()) {
                unit.activation = unit_snapshot.activation;
            }
        }

        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::SizeMismatch;

    fn sample_network() -> Network {
        let mut net = Network::new(3, 2);
        net.create_hidden_layer(4);
        net.create_hidden_layer(2);
        net.randomize_weights();
        net.set_hidden_layer_activation(0, Activation::Sigmoid { beta: 0.5 })
            .unwrap();
        net.set_output_layer_activation(Activation::Tanh);
        net
    }

    #[test]
    fn snapshot_round_trip_preserves_everything() {
        let mut net = sample_network();
        let restored = Network::from_snapshot(&net.snapshot()).unwrap();

        assert_eq!(restored.perceptrons_by_layer(), net.perceptrons_by_layer());
        for index in 0..=net.hidden_layer_count() {
            assert_eq!(
                restored.layer_weights(index).unwrap(),
                net.layer_weights(index).unwrap()
            );
        }
        assert_eq!(restored.snapshot(), net.snapshot());

        // The clone computes the same outputs.
        let mut restored = restored;
        net.set_inputs(&[0.5, -1.0, 2.0]).unwrap();
        restored.set_inputs(&[0.5, -1.0, 2.0]).unwrap();
        assert_eq!(restored.calc_outputs().unwrap(), net.calc_outputs().unwrap());
    }

    #[test]
    fn blob_round_trip() {
        let net = sample_network();
        let snapshot = net.snapshot();

        let bytes = snapshot.to_bytes().unwrap();
        let decoded = NetworkSnapshot::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn inconsistent_weight_vectors_are_rejected() {
        let mut snapshot = sample_network().snapshot();
        snapshot.hidden_layers[1].units[0].weights.pop();

        let error = Network::from_snapshot(&snapshot).unwrap_err();
        assert_eq!(
            error,
            NetError::BadWeightLen {
                unit: 0,
                mismatch: SizeMismatch {
                    expected: 4,
                    got: 3
                }
            }
        );
    }
}
