pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean, `None` for an empty slice.
    pub fn mean(samples: &[f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        let sum: f64 = samples.iter().sum();
        Some(sum / samples.len() as f64)
    }

    /// Rounded share of `part` in `whole` as a whole percentage, capped at 100.
    pub fn percent(part: u64, whole: u64) -> Option<u8> {
        if whole == 0 {
            return None;
        }
        let ratio = (part as f64 * 100.0 / whole as f64).round();
        Some(ratio.clamp(0.0, 100.0) as u8)
    }
}
