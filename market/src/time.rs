use chrono::Utc;

/// Wall-clock milliseconds since the Unix epoch. Clamped to 0 before 1970.
pub fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}
