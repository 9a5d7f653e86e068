//! Subgroup-specific quantile estimation and row centering

mod center;
mod estimate;

pub use center::center_rows;
pub use estimate::{estimate_quantiles, estimate_quantiles_with, EstimateParams, LabelPolicy};
