const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const STEP: f64 = 1024.0;

/// Formats a byte count with binary steps and at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= STEP && unit < UNITS.len() - 1 {
        value /= STEP;
        unit += 1;
    }

    if unit == 0 {
        return format!("{bytes} {}", UNITS[0]);
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
