//! Numerical helpers shared by the models and the optimizer.

pub mod optimization;
pub mod stats;

pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::{std_dev, yule_walker, z_score};
