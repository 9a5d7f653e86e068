//! Per-group ECDF quantile of each gene's global median
//!
//! For every gene the overall median is computed once from all non-missing
//! samples. For every (grouping scheme, label) subset the empirical CDF of the
//! gene's values inside that subset is evaluated at that median. The result is
//! the position of the gene's typical expression within each reference group.

use std::collections::{HashMap, HashSet};

use ndarray::Array2;
use rayon::prelude::*;

use crate::data::{ExpressionMatrix, GroupTable, QuantileTable};
use crate::error::{CenteringError, Result};
use crate::stats::{ecdf_at, median};

/// How output columns are named when several schemes use the same label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelPolicy {
    /// One column per distinct label; the scheme iterated last overwrites
    /// the cell for a shared label
    #[default]
    Shared,
    /// One column per (scheme, label), named `scheme:label`
    Namespaced,
}

/// Parameters for quantile estimation
#[derive(Debug, Clone, Default)]
pub struct EstimateParams {
    pub label_policy: LabelPolicy,
}

/// Samples of one group, resolved against the expression matrix columns
#[derive(Debug, Clone)]
struct GroupSubset {
    scheme: String,
    label: String,
    /// Output column in the quantile table
    column: usize,
    /// Column indices into the expression matrix
    samples: Vec<usize>,
}

/// Estimate per-group quantiles with default parameters
///
/// See [`estimate_quantiles_with`].
pub fn estimate_quantiles(expression: &ExpressionMatrix, groups: &GroupTable) -> Result<QuantileTable> {
    estimate_quantiles_with(expression, groups, &EstimateParams::default())
}

/// Estimate, for each gene and group, the ECDF of the group's values at the
/// gene's global median
///
/// Cells are `None` when the gene is entirely missing or the group has no
/// non-missing samples for the gene. Samples listed in `groups` but absent
/// from `expression` are ignored.
pub fn estimate_quantiles_with(
    expression: &ExpressionMatrix,
    groups: &GroupTable,
    params: &EstimateParams,
) -> Result<QuantileTable> {
    if expression.is_empty() {
        return Err(CenteringError::Shape {
            reason: format!(
                "expression matrix is {} genes x {} samples",
                expression.n_genes(),
                expression.n_samples()
            ),
        });
    }
    if groups.n_samples() == 0 || groups.n_schemes() == 0 {
        return Err(CenteringError::Shape {
            reason: format!(
                "group table is {} samples x {} schemes",
                groups.n_samples(),
                groups.n_schemes()
            ),
        });
    }

    let (columns, subsets) = build_subsets(expression, groups, params.label_policy)?;
    log::info!(
        "Estimating quantiles: {} genes, {} groups from {} schemes",
        expression.n_genes(),
        columns.len(),
        groups.n_schemes()
    );
    for subset in &subsets {
        log::debug!(
            "group {}={} -> column '{}' ({} matched samples)",
            subset.scheme,
            subset.label,
            columns[subset.column],
            subset.samples.len()
        );
    }

    let n_genes = expression.n_genes();
    let n_groups = columns.len();

    let flat: Vec<Option<f64>> = (0..n_genes)
        .into_par_iter()
        .flat_map_iter(|i| gene_quantiles(expression, i, &subsets, n_groups))
        .collect();

    let values = Array2::from_shape_vec((n_genes, n_groups), flat).map_err(|e| {
        CenteringError::Shape {
            reason: e.to_string(),
        }
    })?;

    QuantileTable::new(values, expression.gene_ids().to_vec(), columns)
}

/// One output row. Subsets are applied in order so later ones win.
fn gene_quantiles(
    expression: &ExpressionMatrix,
    gene_idx: usize,
    subsets: &[GroupSubset],
    n_groups: usize,
) -> Vec<Option<f64>> {
    let row = expression.gene_row(gene_idx);
    let mut out = vec![None; n_groups];

    let Some(global_median) = median(row.iter()) else {
        return out;
    };

    let mut subset_values: Vec<f64> = Vec::new();
    for subset in subsets {
        subset_values.clear();
        subset_values.extend(subset.samples.iter().filter_map(|&j| row[j]));
        out[subset.column] = ecdf_at(&subset_values, global_median);
    }
    out
}

/// Resolve every (scheme, label) pair to matrix column indices once, before
/// touching any gene
fn build_subsets(
    expression: &ExpressionMatrix,
    groups: &GroupTable,
    policy: LabelPolicy,
) -> Result<(Vec<String>, Vec<GroupSubset>)> {
    let sample_pos: HashMap<&str, usize> = expression
        .sample_ids()
        .iter()
        .enumerate()
        .map(|(j, s)| (s.as_str(), j))
        .collect();

    // Group-table row -> expression column, None when the sample is unknown
    let row_to_col: Vec<Option<usize>> = groups
        .sample_ids()
        .iter()
        .map(|s| sample_pos.get(s.as_str()).copied())
        .collect();

    let unmatched = row_to_col.iter().filter(|c| c.is_none()).count();
    if unmatched > 0 {
        log::warn!(
            "{} grouped samples are not in the expression matrix and will be ignored",
            unmatched
        );
    }

    let mut columns: Vec<String> = match policy {
        LabelPolicy::Shared => groups.distinct_labels().into_iter().map(String::from).collect(),
        LabelPolicy::Namespaced => Vec::new(),
    };
    let shared_column: HashMap<String, usize> = columns
        .iter()
        .enumerate()
        .map(|(i, label)| (label.clone(), i))
        .collect();

    let mut subsets = Vec::new();
    let mut seen_in: HashMap<String, usize> = HashMap::new();
    let mut collisions: HashSet<String> = HashSet::new();

    for (s, scheme) in groups.schemes().iter().enumerate() {
        for level in scheme.levels() {
            let column = match policy {
                LabelPolicy::Shared => {
                    if let Some(&prev) = seen_in.get(level) {
                        if prev != s {
                            collisions.insert(level.to_string());
                        }
                    } else {
                        seen_in.insert(level.to_string(), s);
                    }
                    *shared_column.get(level).ok_or_else(|| CenteringError::Label {
                        reason: format!("label '{}' of scheme '{}' has no output column", level, scheme.name()),
                    })?
                }
                LabelPolicy::Namespaced => {
                    columns.push(format!("{}:{}", scheme.name(), level));
                    columns.len() - 1
                }
            };

            let samples = scheme
                .samples_with_level(level)
                .into_iter()
                .filter_map(|row| row_to_col[row])
                .collect();

            subsets.push(GroupSubset {
                scheme: scheme.name().to_string(),
                label: level.to_string(),
                column,
                samples,
            });
        }
    }

    let mut collisions: Vec<String> = collisions.into_iter().collect();
    collisions.sort();
    for label in collisions {
        log::warn!(
            "Group label '{}' occurs in several grouping schemes; the last scheme's values are kept",
            label
        );
    }

    Ok((columns, subsets))
}
