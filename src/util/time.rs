/// Current time in seconds since the UNIX epoch. Drives the playback
/// cadence, so it only needs to be monotonic enough between UI passes.
#[cfg(not(target_arch = "wasm32"))]
pub fn current_time_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Current time in seconds. On the web this is the page's performance
/// clock, which starts at navigation rather than the epoch; fine for
/// measuring intervals.
#[cfg(target_arch = "wasm32")]
pub fn current_time_secs() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| perf.now() / 1000.0)
        .unwrap_or(0.0)
}

/// Whole-second timestamp for stamping saved documents.
pub fn timestamp_secs() -> u64 {
    current_time_secs() as u64
}
