use thiserror::Error;

/// Error structure for collections size mismatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {expected} value(s), but got {got}")]
pub struct SizeMismatch {
    pub expected: usize,
    pub got: usize,
}

/// Errors reported by network operations.
///
/// Every variant is a usage error surfaced to the caller; the engine has no
/// transient failure modes and never retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetError {
    /// A hidden-layer (or weight-layer) index argument was out of bounds.
    #[error("layer index {index} is out of range ({count} available)")]
    LayerIndexOutOfRange { index: usize, count: usize },

    /// Input vector length differs from the input layer's unit count.
    #[error("bad inputs: {0}")]
    BadInputs(SizeMismatch),

    /// Desired-output vector length differs from the output layer's unit count.
    #[error("bad desired outputs: {0}")]
    BadDesiredOutputs(SizeMismatch),

    /// Weight matrix row count differs from the layer's unit count.
    #[error("bad weight matrix: {0} (rows)")]
    BadWeightRows(SizeMismatch),

    /// A weight vector's length differs from the unit's incoming edge count.
    #[error("bad weight vector for unit {unit}: {mismatch}")]
    BadWeightLen { unit: usize, mismatch: SizeMismatch },

    /// Training table input row count differs from its desired-output row count.
    #[error("training table has {inputs} input row(s) but {outputs} desired output row(s)")]
    UnbalancedTrainingTable { inputs: usize, outputs: usize },

    /// Breeding parents have different layer/unit counts.
    #[error("parent networks have mismatched topologies")]
    TopologyMismatch,

    /// A unit's activation-function selector has no configured value.
    /// Surfaced as an error rather than a silent 0, since a silent wrong
    /// output would corrupt every downstream computation undetectably.
    #[error("activation function is not configured")]
    UnconfiguredActivation,
}
