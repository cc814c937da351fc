//! Human-facing size formatting.

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Split a byte count into a value rounded to two decimals and a base-1024 unit.
///
/// Sizes beyond the gigabyte range stay expressed in GB.
pub fn human_readable_size(size_bytes: u64) -> (f64, &'static str) {
    if size_bytes == 0 {
        return (0.0, UNITS[0]);
    }

    let mut exponent = 0usize;
    let mut scaled = size_bytes as f64;
    while scaled >= 1024.0 && exponent < UNITS.len() - 1 {
        scaled /= 1024.0;
        exponent += 1;
    }

    ((scaled * 100.0).round() / 100.0, UNITS[exponent])
}

/// Format a byte count as e.g. `"1.50 MB"`.
pub fn format_size(size_bytes: u64) -> String {
    let (value, unit) = human_readable_size(size_bytes);
    format!("{:.2} {}", value, unit)
}
