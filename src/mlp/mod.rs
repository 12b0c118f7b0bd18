//! Multilayer perceptron with backpropagation-based error-correction training

mod activation;
mod error;
mod layer;
mod net;
mod snapshot;
mod trainer;
mod unit;

pub use activation::Activation;
pub use error::{NetError, SizeMismatch};
pub use layer::{InnerLayer, InputLayer};
pub use net::Network;
pub use snapshot::{LayerSnapshot, NetworkSnapshot, WeightedUnitSnapshot};
pub use trainer::{breed, train_by_backpropagation, TrainingTable};
pub use unit::{Edge, InnerUnit, InputUnit, LayerRef, UnitRef};
