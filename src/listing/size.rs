//! Human-readable byte sizes.

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Scale a byte count to the largest unit that keeps it below 1024.
///
/// TB is the last unit; larger sizes stay in TB.
pub fn scale_size(bytes: u64) -> (f64, &'static str) {
    let mut value = bytes as f64;
    for unit in &UNITS[..UNITS.len() - 1] {
        if value < 1024.0 {
            return (value, unit);
        }
        value /= 1024.0;
    }
    (value, UNITS[UNITS.len() - 1])
}

/// Format a byte count with one decimal place, e.g. `1.5 KB`.
pub fn format_size(bytes: u64) -> String {
    let (value, unit) = scale_size(bytes);
    format!("{value:.1} {unit}")
}
