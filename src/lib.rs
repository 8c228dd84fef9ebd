// Practice engine for the dartdrill trainer. The terminal front-end in
// main.rs is a thin shell over these modules.
pub mod board;
pub mod checkout;
pub mod config;
pub mod error;
pub mod practice;
pub mod rules;
pub mod runtime;
pub mod session;
pub mod target;
pub mod target_bag;
pub mod throw_sim;

pub use error::{DrillError, Result};
