pub struct StatsHelper;

impl StatsHelper {
    /// Smallest and largest finite values, skipping NaN and infinities.
    pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
        values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
