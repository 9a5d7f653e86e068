//! subgroup_center: subgroup-specific gene centering in Rust
//!
//! Centers gene-expression rows on the quantile that reflects a gene's
//! position within a reference subgroup (e.g. IHC-defined breast cancer
//! subgroups) instead of on the plain marginal median.
//!
//! Two transforms make up the crate:
//! - [`estimate_quantiles`](centering::estimate_quantiles): for each gene and
//!   group, the empirical CDF of the group's samples at the gene's overall
//!   median.
//! - [`center_rows`](centering::center_rows): subtract, per gene, the value at
//!   a chosen quantile of that gene's own distribution.
//!
//! # Example
//!
//! ```ignore
//! use subgroup_center::prelude::*;
//!
//! let expression = read_expression_matrix("expression.tsv")?;
//! let groups = read_group_table("ihc_groups.csv")?;
//!
//! let quantiles = estimate_quantiles(&expression, &groups)?;
//! let target = GeneQuantileMap::from_table_column(&quantiles, "HER2+")?;
//! let centered = center_rows(&expression, &target)?;
//! ```

pub mod centering;
pub mod cli;
pub mod data;
pub mod error;
pub mod io;
pub mod stats;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::centering::{center_rows, estimate_quantiles, estimate_quantiles_with, EstimateParams, LabelPolicy};
    pub use crate::data::{ExpressionMatrix, GeneQuantileMap, GroupTable, GroupingScheme, QuantileTable};
    pub use crate::error::{CenteringError, Result};
    pub use crate::io::{
        read_expression_matrix, read_gene_quantiles, read_group_table, read_quantile_table,
        write_expression_matrix, write_quantile_table, write_quantile_table_json,
    };
}

use prelude::*;

/// Estimate group quantiles, then center every gene on one group's quantile
///
/// Convenience for the common case where a single reference subgroup is
/// known for the whole cohort. Genes whose quantile is missing for that
/// group fail with `MissingKey`.
pub fn center_on_group(
    expression: &ExpressionMatrix,
    groups: &GroupTable,
    label: &str,
) -> Result<ExpressionMatrix> {
    let quantiles = estimate_quantiles(expression, groups)?;
    let target = GeneQuantileMap::from_table_column(&quantiles, label)?;
    center_rows(expression, &target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_full_pipeline() {
        let samples = strings(&["s1", "s2", "s3", "s4", "s5", "s6"]);
        let expression = ExpressionMatrix::from_f64(
            array![
                [1.0, 2.0, 3.0, 7.0, 8.0, 9.0],          // higher in HER2+
                [5.0, 5.5, 6.0, 5.0, 5.5, 6.0],          // flat
                [9.0, 8.0, 7.0, 3.0, f64::NAN, 1.0],     // lower in HER2+
            ],
            strings(&["ERBB2", "ACTB", "ESR1"]),
            samples.clone(),
        )
        .unwrap();

        let groups = GroupTable::new(samples)
            .unwrap()
            .with_scheme("her2", &["HER2-", "HER2-", "HER2-", "HER2+", "HER2+", "HER2+"])
            .unwrap();

        let quantiles = estimate_quantiles(&expression, &groups).unwrap();
        assert_eq!(quantiles.n_genes(), 3);
        assert_eq!(quantiles.n_groups(), 2);

        // ERBB2 global median 5: every HER2- sample below, no HER2+ sample
        assert_eq!(quantiles.get("ERBB2", "HER2-"), Some(1.0));
        assert_eq!(quantiles.get("ERBB2", "HER2+"), Some(0.0));
        // ESR1 global median 7: HER2+ = {3, 1} both below
        assert_eq!(quantiles.get("ESR1", "HER2+"), Some(1.0));

        let centered = center_on_group(&expression, &groups, "HER2-").unwrap();
        assert_eq!(centered.gene_ids(), expression.gene_ids());
        assert_eq!(centered.sample_ids(), expression.sample_ids());

        // ERBB2 at q = 1.0 -> subtract the row maximum
        assert_eq!(centered.get(0, 5), Some(0.0));
        assert_eq!(centered.get(0, 0), Some(-8.0));
        // Missing input stays missing
        assert_eq!(centered.get(2, 4), None);
    }

    #[test]
    fn test_median_constant_matches_center_rows() {
        let expression = ExpressionMatrix::from_f64(
            array![[10.0, 20.0, 30.0, 40.0]],
            strings(&["gene1"]),
            strings(&["s1", "s2", "s3", "s4"]),
        )
        .unwrap();
        let q = GeneQuantileMap::constant(expression.gene_ids(), 0.5);
        let centered = center_rows(&expression, &q).unwrap();
        assert_eq!(
            centered.gene_row(0).to_vec(),
            vec![Some(-15.0), Some(-5.0), Some(5.0), Some(15.0)]
        );
    }

    #[test]
    fn test_center_on_group_with_fully_missing_gene() {
        let expression = ExpressionMatrix::from_f64(
            array![[1.0, 2.0, 3.0, 4.0], [f64::NAN, f64::NAN, f64::NAN, f64::NAN]],
            strings(&["g1", "g2"]),
            strings(&["s1", "s2", "s3", "s4"]),
        )
        .unwrap();
        let groups = GroupTable::new(strings(&["s1", "s2", "s3", "s4"]))
            .unwrap()
            .with_scheme("er", &["P", "P", "N", "N"])
            .unwrap();

        let centered = center_on_group(&expression, &groups, "P").unwrap();
        // g1 median 2.5, both P samples below -> q = 1, subtract the maximum
        assert_eq!(
            centered.gene_row(0).to_vec(),
            vec![Some(-3.0), Some(-2.0), Some(-1.0), Some(0.0)]
        );
        assert_eq!(centered.gene_row(1).to_vec(), vec![None; 4]);
    }
}
