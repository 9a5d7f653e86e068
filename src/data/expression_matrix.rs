//! Expression matrix representation (genes x samples, missing-aware)

use std::collections::HashSet;

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::error::{CenteringError, Result};

/// Reject identifier lists containing duplicates.
///
/// `what` names the axis in the error message ("gene", "sample", ...).
pub(crate) fn ensure_unique(ids: &[String], what: &str) -> Result<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(CenteringError::Label {
                reason: format!("duplicate {} identifier '{}'", what, id),
            });
        }
    }
    Ok(())
}

/// A gene expression matrix
/// Rows are genes, columns are samples. `None` marks a missing measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionMatrix {
    /// Expression values (genes x samples)
    values: Array2<Option<f64>>,
    /// Gene identifiers (unique)
    gene_ids: Vec<String>,
    /// Sample identifiers (unique)
    sample_ids: Vec<String>,
}

impl ExpressionMatrix {
    /// Create a new expression matrix from missing-aware cells
    pub fn new(
        values: Array2<Option<f64>>,
        gene_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let (n_genes, n_samples) = values.dim();

        if gene_ids.len() != n_genes {
            return Err(CenteringError::DimensionMismatch {
                expected: format!("{} gene IDs", n_genes),
                got: format!("{} gene IDs", gene_ids.len()),
            });
        }

        if sample_ids.len() != n_samples {
            return Err(CenteringError::DimensionMismatch {
                expected: format!("{} sample IDs", n_samples),
                got: format!("{} sample IDs", sample_ids.len()),
            });
        }

        ensure_unique(&gene_ids, "gene")?;
        ensure_unique(&sample_ids, "sample")?;

        // NaN is never stored; it is the same thing as a missing cell.
        let values = values.mapv(|v| v.filter(|x| !x.is_nan()));

        Ok(Self {
            values,
            gene_ids,
            sample_ids,
        })
    }

    /// Same labels, new cells. Caller guarantees the shape matches.
    pub(crate) fn with_values(&self, values: Array2<Option<f64>>) -> Self {
        debug_assert_eq!(values.dim(), self.values.dim());
        Self {
            values,
            gene_ids: self.gene_ids.clone(),
            sample_ids: self.sample_ids.clone(),
        }
    }

    /// Create from a plain float array, treating NaN as missing
    pub fn from_f64(
        values: Array2<f64>,
        gene_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let cells = values.mapv(|x| if x.is_nan() { None } else { Some(x) });
        Self::new(cells, gene_ids, sample_ids)
    }

    /// Get the number of genes
    pub fn n_genes(&self) -> usize {
        self.values.nrows()
    }

    /// Get the number of samples
    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    /// Get the cells as a view
    pub fn values(&self) -> ArrayView2<'_, Option<f64>> {
        self.values.view()
    }

    /// Single cell lookup by position
    pub fn get(&self, gene_idx: usize, sample_idx: usize) -> Option<f64> {
        self.values.get((gene_idx, sample_idx)).copied().flatten()
    }

    /// Get gene IDs
    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    /// Get sample IDs
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Get the expression row of a specific gene
    pub fn gene_row(&self, gene_idx: usize) -> ArrayView1<'_, Option<f64>> {
        self.values.row(gene_idx)
    }

    /// Get gene index by ID
    pub fn gene_index(&self, gene_id: &str) -> Option<usize> {
        self.gene_ids.iter().position(|id| id == gene_id)
    }

    /// Get sample index by ID
    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|id| id == sample_id)
    }

    /// Number of missing cells in the whole matrix
    pub fn n_missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// True when the matrix has no genes or no samples
    pub fn is_empty(&self) -> bool {
        self.n_genes() == 0 || self.n_samples() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn test_expression_matrix_creation() {
        let values = array![[10.0, 20.0, 30.0], [5.0, f64::NAN, 25.0]];
        let matrix = ExpressionMatrix::from_f64(values, ids("gene", 2), ids("s", 3)).unwrap();
        assert_eq!(matrix.n_genes(), 2);
        assert_eq!(matrix.n_samples(), 3);
        assert_eq!(matrix.get(1, 1), None);
        assert_eq!(matrix.get(1, 2), Some(25.0));
        assert_eq!(matrix.n_missing(), 1);
        assert_eq!(matrix.gene_index("gene2"), Some(1));
        assert_eq!(matrix.sample_index("s4"), None);
    }

    #[test]
    fn test_nan_inside_some_is_missing() {
        let values = array![[Some(1.0), Some(f64::NAN)]];
        let matrix = ExpressionMatrix::new(values, ids("gene", 1), ids("s", 2)).unwrap();
        assert_eq!(matrix.get(0, 1), None);
    }

    #[test]
    fn test_duplicate_gene_ids_rejected() {
        let values = array![[1.0, 2.0], [3.0, 4.0]];
        let genes = vec!["gene1".to_string(), "gene1".to_string()];
        let result = ExpressionMatrix::from_f64(values, genes, ids("s", 2));
        assert!(matches!(result, Err(CenteringError::Label { .. })));
    }

    #[test]
    fn test_duplicate_sample_ids_rejected() {
        let values = array![[1.0, 2.0]];
        let samples = vec!["s1".to_string(), "s1".to_string()];
        let result = ExpressionMatrix::from_f64(values, ids("gene", 1), samples);
        assert!(matches!(result, Err(CenteringError::Label { .. })));
    }

    #[test]
    fn test_dimension_mismatch() {
        let values = array![[1.0, 2.0]];
        let result = ExpressionMatrix::from_f64(values, ids("gene", 2), ids("s", 2));
        assert!(matches!(result, Err(CenteringError::DimensionMismatch { .. })));
    }
}
