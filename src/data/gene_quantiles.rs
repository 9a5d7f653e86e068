//! Per-gene quantile targets for row centering

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::QuantileTable;
use crate::error::{CenteringError, Result};

/// Gene id -> quantile of that gene's own distribution to subtract
///
/// An entry may be present but undefined (`None`), e.g. when the gene's
/// cell in a quantile table is missing. Centering turns such a gene into a
/// fully missing row; a gene with no entry at all is a `MissingKey` error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneQuantileMap {
    quantiles: HashMap<String, Option<f64>>,
}

impl GeneQuantileMap {
    pub fn new(quantiles: HashMap<String, f64>) -> Self {
        let quantiles = quantiles.into_iter().map(|(g, q)| (g, Some(q))).collect();
        Self { quantiles }
    }

    /// Same quantile for every gene (0.5 gives plain median centering)
    pub fn constant<S: AsRef<str>>(gene_ids: &[S], q: f64) -> Self {
        let quantiles = gene_ids
            .iter()
            .map(|g| (g.as_ref().to_string(), Some(q)))
            .collect();
        Self { quantiles }
    }

    /// Take one group's column of a quantile table for all genes
    ///
    /// Missing cells become undefined entries, so those genes center to a
    /// missing row instead of failing.
    pub fn from_table_column(table: &QuantileTable, label: &str) -> Result<Self> {
        let column = table
            .group_column(label)
            .ok_or_else(|| CenteringError::InvalidInput {
                reason: format!(
                    "group '{}' not found in quantile table (available: {})",
                    label,
                    table.group_labels().join(", ")
                ),
            })?;
        let quantiles = table
            .gene_ids()
            .iter()
            .cloned()
            .zip(column.iter().copied())
            .collect();
        Ok(Self { quantiles })
    }

    /// Set a gene's quantile; returns the previous entry if there was one
    pub fn insert(&mut self, gene_id: &str, q: f64) -> Option<Option<f64>> {
        self.quantiles.insert(gene_id.to_string(), Some(q))
    }

    /// Record a gene whose quantile is known to be undefined
    pub fn insert_undefined(&mut self, gene_id: &str) -> Option<Option<f64>> {
        self.quantiles.insert(gene_id.to_string(), None)
    }

    /// Defined quantile of a gene; `None` when absent or undefined
    pub fn get(&self, gene_id: &str) -> Option<f64> {
        self.quantiles.get(gene_id).copied().flatten()
    }

    /// Lookup that fails with `MissingKey` naming the gene when it has no
    /// entry; an undefined entry comes back as `Ok(None)`
    pub fn require(&self, gene_id: &str) -> Result<Option<f64>> {
        self.quantiles
            .get(gene_id)
            .copied()
            .ok_or_else(|| CenteringError::MissingKey {
                gene_id: gene_id.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.quantiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantiles.is_empty()
    }
}
