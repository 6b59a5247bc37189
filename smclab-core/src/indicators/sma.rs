//! Simple Moving Average (SMA).
//!
//! Rolling mean of a numeric series. First valid value at index `period - 1`.

/// Rolling mean of an arbitrary series; each window is summed afresh so the
/// result does not accumulate rounding drift over long series.
pub fn sma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        let sum: f64 = window.iter().sum();
        result[i] = sum / period as f64;
    }
    result
}
