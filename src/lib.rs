//! Small feed-forward multilayer perceptron engine.
//!
//! Builds a network of layered computational units, propagates input values
//! forward to produce outputs, and adjusts connection weights backward with an
//! error-correction rule. Intended for embedding: the host supplies input and
//! desired-output vectors and consumes computed outputs and trained weights.

pub mod mlp;
