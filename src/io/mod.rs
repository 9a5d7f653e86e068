//! Input/Output for expression matrices, groupings and quantile tables

mod delimited;

pub use delimited::{
    read_expression_matrix, read_gene_quantiles, read_group_table,
    read_quantile_table, write_expression_matrix,
    write_quantile_table, write_quantile_table_json,
};
