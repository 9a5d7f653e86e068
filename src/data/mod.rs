//! Data structures for subgroup-specific centering

mod expression_matrix;
mod gene_quantiles;
mod group_table;
mod quantile_table;

pub use expression_matrix::ExpressionMatrix;
pub use gene_quantiles::GeneQuantileMap;
pub use group_table::{GroupTable, GroupingScheme};
pub use quantile_table::QuantileTable;
