pub mod analysis;
pub mod classifier;
pub mod error;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod utils;

pub use error::{Result, ScoreError};
