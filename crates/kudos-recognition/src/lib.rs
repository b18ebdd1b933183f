//! Peer recognition workflow.
//!
//! A recognition is a message from one user to another carrying a point
//! transfer. [`Recognitions::create`] writes the recognition row and the
//! paired transfer in one storage transaction, so an insufficient sender
//! balance rolls the whole thing back.

mod engine;

pub mod cli;

pub use engine::{RecognitionQuery, Recognitions};
