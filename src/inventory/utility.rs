use chrono::{NaiveDateTime, NaiveTime, Timelike};

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Floors `at` down to the nearest multiple of `bucket_secs` since midnight.
///
/// `bucket_secs` must divide a day evenly, so bucket boundaries line up
/// across dates. A zero width leaves `at` unbucketed.
pub fn floor_to_bucket(at: NaiveDateTime, bucket_secs: u32) -> NaiveDateTime {
    if bucket_secs == 0 {
        return at;
    }
    let secs = at.time().num_seconds_from_midnight();
    let floored = secs - secs % bucket_secs;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(floored, 0).unwrap_or_default();
    at.date().and_time(time)
}
