use serde::{Deserialize, Serialize};

use super::error::NetError;

/// Scalar activation function applied to a unit's net input.
///
/// `Sigmoid` carries its steepness parameter `beta`; the other variants take
/// no configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Activation {
    /// 0 for negative input, 1 otherwise (an input of exactly 0 yields 1).
    Threshold,
    /// Implements the formula: `1 / (1 + exp(-(beta - x)))`.
    ///
    /// Note that this is centered on `beta - x`, not on `x` alone; the
    /// asymmetry is inherited behavior and kept as-is.
    Sigmoid { beta: f64 },
    /// Standard hyperbolic tangent.
    Tanh,
    /// 0 for negative input, the input itself otherwise.
    ReLU,
}

impl Activation {
    /// Applies the function to `x`.
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Threshold => {
                if x < 0.0 {
                    0.0
                } else {
                    1.0
                }
            }
            Activation::Sigmoid { beta } => 1.0 / (1.0 + (-(beta - x)).exp()),
            Activation::Tanh => x.tanh(),
            Activation::ReLU => {
                if x < 0.0 {
                    0.0
                } else {
                    x
                }
            }
        }
    }
}

impl Default for Activation {
    fn default() -> Activation {
        Activation::ReLU
    }
}

/// Applies the selected function, or fails if the selector is unconfigured.
pub(crate) fn activate(selector: Option<Activation>, x: f64) -> Result<f64, NetError> {
    match selector {
        Some(function) => Ok(function.apply(x)),
        None => Err(NetError::UnconfiguredActivation),
    }
}
