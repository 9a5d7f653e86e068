//! Missing-aware statistical helpers shared by the estimator and the centerer
//!
//! Every function here takes `Option<f64>` cells and skips `None` explicitly,
//! so a missing measurement never leaks into an aggregate.

/// Collect the non-missing values of a row and sort them ascending.
///
/// Values may be infinite but never NaN: `ExpressionMatrix` stores NaN as `None`.
pub fn sorted_present<'a, I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Option<f64>>,
{
    let mut present: Vec<f64> = values.into_iter().filter_map(|v| *v).collect();
    present.sort_by(f64::total_cmp);
    present
}

/// Median of already sorted values; `None` when empty.
///
/// Even-length input averages the two middle order statistics. Middle
/// values of -inf and inf have no median and give `None`.
pub fn median_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let h = n / 2;
    if n % 2 == 1 {
        Some(sorted[h])
    } else {
        let m = (sorted[h - 1] + sorted[h]) / 2.0;
        (!m.is_nan()).then_some(m)
    }
}

/// Median over the non-missing cells of a row.
pub fn median<'a, I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Option<f64>>,
{
    median_sorted(&sorted_present(values))
}

/// Linear-interpolated quantile of already sorted values.
///
/// Position is `h = (n - 1) * q`; the result interpolates between the order
/// statistics at `floor(h)` and `floor(h) + 1`. `q` outside [0, 1] clamps to
/// the minimum or maximum. Returns `None` for empty input, a NaN `q`, or an
/// interpolation between -inf and inf.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 || q.is_nan() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let h = (n - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - lo as f64;
    // 0 * inf would be NaN, so exact order statistics skip the interpolation
    if frac == 0.0 || lo == hi {
        return Some(sorted[lo]);
    }
    let (a, b) = (sorted[lo], sorted[hi]);
    if a.is_infinite() || b.is_infinite() {
        let v = (1.0 - frac) * a + frac * b;
        return (!v.is_nan()).then_some(v);
    }
    Some(a + frac * (b - a))
}

/// Linear-interpolated quantile over the non-missing cells of a row.
pub fn quantile<'a, I>(values: I, q: f64) -> Option<f64>
where
    I: IntoIterator<Item = &'a Option<f64>>,
{
    quantile_sorted(&sorted_present(values), q)
}

/// Empirical CDF of `values` evaluated at `x`: fraction of values `<= x`.
///
/// Ties at `x` are counted (right-continuous step). `None` when `values`
/// is empty.
pub fn ecdf_at(values: &[f64], x: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let below = values.iter().filter(|&&v| v <= x).count();
    Some(below as f64 / values.len() as f64)
}
