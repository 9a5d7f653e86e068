//! Gene x group table of ECDF quantile ranks

use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{CenteringError, Result};

/// Output of quantile estimation
///
/// Cell (gene, group) is the fraction of the group's non-missing samples that
/// lie at or below the gene's global median. `None` when the group has no
/// non-missing samples for that gene, or the gene itself is all missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileTable {
    gene_ids: Vec<String>,
    group_labels: Vec<String>,
    /// Quantile ranks (genes x groups)
    #[serde(with = "rows")]
    values: Array2<Option<f64>>,
}

impl QuantileTable {
    pub fn new(
        values: Array2<Option<f64>>,
        gene_ids: Vec<String>,
        group_labels: Vec<String>,
    ) -> Result<Self> {
        let (n_genes, n_groups) = values.dim();
        if gene_ids.len() != n_genes {
            return Err(CenteringError::DimensionMismatch {
                expected: format!("{} gene IDs", n_genes),
                got: format!("{} gene IDs", gene_ids.len()),
            });
        }
        if group_labels.len() != n_groups {
            return Err(CenteringError::DimensionMismatch {
                expected: format!("{} group labels", n_groups),
                got: format!("{} group labels", group_labels.len()),
            });
        }
        Ok(Self {
            gene_ids,
            group_labels,
            values,
        })
    }

    pub fn n_genes(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_groups(&self) -> usize {
        self.values.ncols()
    }

    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    pub fn group_labels(&self) -> &[String] {
        &self.group_labels
    }

    pub fn values(&self) -> ArrayView2<'_, Option<f64>> {
        self.values.view()
    }

    pub fn gene_index(&self, gene_id: &str) -> Option<usize> {
        self.gene_ids.iter().position(|id| id == gene_id)
    }

    pub fn group_index(&self, label: &str) -> Option<usize> {
        self.group_labels.iter().position(|l| l == label)
    }

    /// Cell lookup by identifiers; `None` for unknown ids or a missing cell
    pub fn get(&self, gene_id: &str, label: &str) -> Option<f64> {
        let i = self.gene_index(gene_id)?;
        let j = self.group_index(label)?;
        self.values[[i, j]]
    }

    /// All genes' values for one group
    pub fn group_column(&self, label: &str) -> Option<ArrayView1<'_, Option<f64>>> {
        self.group_index(label).map(|j| self.values.column(j))
    }
}

/// Serialize the matrix as a list of rows so JSON output reads naturally.
mod rows {
    use ndarray::Array2;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        values: &Array2<Option<f64>>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let rows: Vec<Vec<Option<f64>>> = values.outer_iter().map(|r| r.to_vec()).collect();
        rows.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Array2<Option<f64>>, D::Error> {
        let rows: Vec<Vec<Option<f64>>> = Vec::deserialize(deserializer)?;
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != n_cols) {
            return Err(D::Error::custom("ragged quantile table rows"));
        }
        let flat: Vec<Option<f64>> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec((n_rows, n_cols), flat).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn table() -> QuantileTable {
        QuantileTable::new(
            array![[Some(1.0), Some(0.0)], [None, Some(0.5)]],
            vec!["gene1".to_string(), "gene2".to_string()],
            vec!["X".to_string(), "Y".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup() {
        let t = table();
        assert_eq!(t.get("gene1", "X"), Some(1.0));
        assert_eq!(t.get("gene2", "X"), None);
        assert_eq!(t.get("gene3", "X"), None);
        let y = t.group_column("Y").unwrap();
        assert_eq!(y.to_vec(), vec![Some(0.0), Some(0.5)]);
    }

    #[test]
    fn test_json_serialization() {
        let t = table();
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("[[1.0,0.0],[null,0.5]]"), "got {}", json);
        let back: QuantileTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
