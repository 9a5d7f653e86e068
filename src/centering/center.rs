//! Quantile-based row centering

use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;

use crate::data::{ExpressionMatrix, GeneQuantileMap};
use crate::error::{CenteringError, Result};
use crate::stats::quantile;

/// Center every gene row on a quantile of its own distribution
///
/// For gene `g` the value at quantile `gene_quantile[g]` of the gene's
/// non-missing samples (linear interpolation between order statistics) is
/// subtracted from every sample. A quantile of 0.5 gives median centering.
///
/// Every gene of `expression` needs an entry in `gene_quantile`; the first
/// gene without one aborts with `MissingKey` before any row is computed.
/// Genes with an undefined entry, or with no non-missing samples, come back
/// entirely missing. The input matrix is not modified.
pub fn center_rows(expression: &ExpressionMatrix, gene_quantile: &GeneQuantileMap) -> Result<ExpressionMatrix> {
    let targets: Vec<Option<f64>> = expression
        .gene_ids()
        .iter()
        .map(|g| {
            let q = gene_quantile.require(g)?;
            if q.is_some_and(f64::is_nan) {
                return Err(CenteringError::InvalidInput {
                    reason: format!("quantile for gene '{}' is NaN", g),
                });
            }
            Ok(q)
        })
        .collect::<Result<_>>()?;

    let out_of_range = targets
        .iter()
        .flatten()
        .filter(|q| !(0.0..=1.0).contains(*q))
        .count();
    if out_of_range > 0 {
        log::warn!(
            "{} genes have a quantile outside [0, 1]; clamping to the row minimum/maximum",
            out_of_range
        );
    }

    let undefined = targets.iter().filter(|q| q.is_none()).count();
    if undefined > 0 {
        log::debug!("{} genes have an undefined quantile and stay missing", undefined);
    }

    let n_genes = expression.n_genes();
    let n_samples = expression.n_samples();
    log::info!("Centering {} genes x {} samples", n_genes, n_samples);

    let rows: Vec<Array1<Option<f64>>> = (0..n_genes)
        .into_par_iter()
        .map(|i| center_row(expression, i, targets[i]))
        .collect();

    let mut values = Array2::from_elem((n_genes, n_samples), None);
    for (mut out, row) in values.axis_iter_mut(Axis(0)).zip(rows) {
        out.assign(&row);
    }

    let all_missing = values
        .axis_iter(Axis(0))
        .filter(|r| r.iter().all(|v| v.is_none()))
        .count();
    if n_samples > 0 && all_missing > 0 {
        log::debug!("{} centered rows are fully missing", all_missing);
    }

    Ok(expression.with_values(values))
}

fn center_row(expression: &ExpressionMatrix, gene_idx: usize, q: Option<f64>) -> Array1<Option<f64>> {
    let row = expression.gene_row(gene_idx);
    match q.and_then(|q| quantile(row.iter(), q)) {
        // inf - inf is NaN, which is stored as missing
        Some(q_value) => row.mapv(|v| v.map(|x| x - q_value).filter(|d| !d.is_nan())),
        None => Array1::from_elem(row.len(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_median_centering() {
        let expression = ExpressionMatrix::from_f64(
            array![[10.0, 20.0, 30.0, 40.0]],
            strings(&["gene1"]),
            strings(&["s1", "s2", "s3", "s4"]),
        )
        .unwrap();
        let q = GeneQuantileMap::constant(&["gene1"], 0.5);

        let centered = center_rows(&expression, &q).unwrap();
        let row: Vec<Option<f64>> = centered.gene_row(0).to_vec();
        assert_eq!(row, vec![Some(-15.0), Some(-5.0), Some(5.0), Some(15.0)]);
    }

    #[test]
    fn test_shape_and_labels_preserved_input_untouched() {
        let expression = ExpressionMatrix::from_f64(
            array![[1.0, f64::NAN, 3.0], [4.0, 5.0, 6.0]],
            strings(&["g1", "g2"]),
            strings(&["a", "b", "c"]),
        )
        .unwrap();
        let snapshot = expression.clone();
        let mut q = GeneQuantileMap::default();
        q.insert("g1", 0.0);
        q.insert("g2", 1.0);

        let centered = center_rows(&expression, &q).unwrap();
        assert_eq!(expression, snapshot);
        assert_eq!(centered.gene_ids(), expression.gene_ids());
        assert_eq!(centered.sample_ids(), expression.sample_ids());
        assert_eq!(centered.values().dim(), expression.values().dim());

        // g1 min = 1, missing stays missing; g2 max = 6
        assert_eq!(centered.gene_row(0).to_vec(), vec![Some(0.0), None, Some(2.0)]);
        assert_eq!(centered.gene_row(1).to_vec(), vec![Some(-2.0), Some(-1.0), Some(0.0)]);
    }

    #[test]
    fn test_missing_quantile_is_error() {
        let expression = ExpressionMatrix::from_f64(
            array![[1.0, 2.0], [3.0, 4.0]],
            strings(&["g1", "g2"]),
            strings(&["a", "b"]),
        )
        .unwrap();
        let q = GeneQuantileMap::constant(&["g1"], 0.5);

        match center_rows(&expression, &q) {
            Err(CenteringError::MissingKey { gene_id }) => assert_eq!(gene_id, "g2"),
            other => panic!("expected MissingKey, got {:?}", other),
        }
    }

    #[test]
    fn test_all_missing_row_stays_missing() {
        let expression = ExpressionMatrix::from_f64(
            array![[f64::NAN, f64::NAN], [1.0, 3.0]],
            strings(&["g1", "g2"]),
            strings(&["a", "b"]),
        )
        .unwrap();
        let q = GeneQuantileMap::constant(&["g1", "g2"], 0.5);

        let centered = center_rows(&expression, &q).unwrap();
        assert_eq!(centered.gene_row(0).to_vec(), vec![None, None]);
        assert_eq!(centered.gene_row(1).to_vec(), vec![Some(-1.0), Some(1.0)]);
    }

    #[test]
    fn test_out_of_range_quantile_clamps() {
        let expression = ExpressionMatrix::from_f64(
            array![[2.0, 4.0, 8.0]],
            strings(&["g1"]),
            strings(&["a", "b", "c"]),
        )
        .unwrap();

        let low = center_rows(&expression, &GeneQuantileMap::constant(&["g1"], -1.0)).unwrap();
        assert_eq!(low.gene_row(0).to_vec(), vec![Some(0.0), Some(2.0), Some(6.0)]);

        let high = center_rows(&expression, &GeneQuantileMap::constant(&["g1"], 3.0)).unwrap();
        assert_eq!(high.gene_row(0).to_vec(), vec![Some(-6.0), Some(-4.0), Some(0.0)]);

        let nan = center_rows(&expression, &GeneQuantileMap::constant(&["g1"], f64::NAN));
        assert!(matches!(nan, Err(CenteringError::InvalidInput { .. })));
    }

    #[test]
    fn test_deterministic() {
        let expression = ExpressionMatrix::from_f64(
            array![[0.3, 1.7, 2.9, f64::NAN], [5.5, 0.1, 0.2, 0.3]],
            strings(&["g1", "g2"]),
            strings(&["a", "b", "c", "d"]),
        )
        .unwrap();
        let mut q = GeneQuantileMap::default();
        q.insert("g1", 0.37);
        q.insert("g2", 0.81);

        let first = center_rows(&expression, &q).unwrap();
        let second = center_rows(&expression, &q).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_undefined_quantile_gives_missing_row() {
        let expression = ExpressionMatrix::from_f64(
            array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            strings(&["g1", "g2"]),
            strings(&["a", "b", "c"]),
        )
        .unwrap();
        let mut q = GeneQuantileMap::default();
        q.insert("g1", 0.5);
        q.insert_undefined("g2");

        let centered = center_rows(&expression, &q).unwrap();
        assert_eq!(centered.gene_row(0).to_vec(), vec![Some(-1.0), Some(0.0), Some(1.0)]);
        assert_eq!(centered.gene_row(1).to_vec(), vec![None, None, None]);
    }

    #[test]
    fn test_infinite_values() {
        let expression = ExpressionMatrix::from_f64(
            array![[1.0, f64::INFINITY], [f64::NEG_INFINITY, 2.0]],
            strings(&["g1", "g2"]),
            strings(&["a", "b"]),
        )
        .unwrap();

        let at_min = center_rows(&expression, &GeneQuantileMap::constant(&["g1", "g2"], 0.0)).unwrap();
        assert_eq!(at_min.gene_row(0).to_vec(), vec![Some(0.0), Some(f64::INFINITY)]);
        // g2 minimum is -inf: 2 - (-inf) = inf, -inf - (-inf) is undefined
        assert_eq!(at_min.gene_row(1).to_vec(), vec![None, Some(f64::INFINITY)]);

        let at_max = center_rows(&expression, &GeneQuantileMap::constant(&["g1", "g2"], 1.0)).unwrap();
        assert_eq!(at_max.gene_row(0).to_vec(), vec![Some(f64::NEG_INFINITY), None]);
        assert_eq!(at_max.gene_row(1).to_vec(), vec![Some(f64::NEG_INFINITY), Some(0.0)]);
    }

    #[test]
    fn test_empty_matrices_returned_unchanged() {
        let no_genes =
            ExpressionMatrix::from_f64(Array2::zeros((0, 3)), vec![], strings(&["a", "b", "c"])).unwrap();
        let centered = center_rows(&no_genes, &GeneQuantileMap::default()).unwrap();
        assert_eq!(centered, no_genes);

        let no_samples = ExpressionMatrix::from_f64(Array2::zeros((2, 0)), strings(&["g1", "g2"]), vec![]).unwrap();
        let q = GeneQuantileMap::constant(&["g1", "g2"], 0.5);
        let centered = center_rows(&no_samples, &q).unwrap();
        assert_eq!(centered, no_samples);
        assert_eq!(centered.values().dim(), (2, 0));
    }
}
