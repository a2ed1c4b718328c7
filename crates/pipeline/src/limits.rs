/// Hard ceiling on concurrent file analyses
pub const MAX_WORKERS: usize = 64;

pub const WORKERS_ENV: &str = "CODECITY_WORKERS";
pub const MAX_FILES_ENV: &str = "CODECITY_MAX_FILES";
pub const TIMEOUT_SECS_ENV: &str = "CODECITY_TIMEOUT_SECS";

/// Parse a numeric knob; blank or malformed input yields `None`.
pub(crate) fn parse_bounded(raw: Option<&str>, min: usize, max: usize) -> Option<usize> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<usize>().ok())
        .map(|v| v.clamp(min, max))
}

pub(crate) fn clamp_workers(workers: usize) -> usize {
    workers.clamp(1, MAX_WORKERS)
}

pub(crate) fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
