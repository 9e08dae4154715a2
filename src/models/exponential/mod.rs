//! Exponential smoothing models.

mod holt_winters;

pub use holt_winters::{HoltWinters, SmoothingParams, MIN_OBSERVATIONS};
