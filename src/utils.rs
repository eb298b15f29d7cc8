use crate::constants::DEFAULT_PORT;

/// Get the API port from the `STOCKDASH_PORT` environment variable or use
/// the default. Unparseable values fall back to the default.
pub fn get_port() -> u16 {
    std::env::var("STOCKDASH_PORT")
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
