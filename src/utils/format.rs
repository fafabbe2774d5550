//! Number formatting for size reports.
//!
//! Fixed `en-US` style: `,` thousands separator, at most two fraction
//! digits, trailing zeros trimmed.

/// Format with thousands separators and up to two fraction digits.
///
/// `signed` prints `+` for positive values; zero never gets a sign.
pub fn format_decimal(value: f64, signed: bool) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }

    let fixed = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + 4);
    if rounded < 0.0 {
        out.push('-');
    } else if signed {
        out.push('+');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Format a ratio as a signed percentage (`-0.5` → `-50%`), `n/a` when undefined.
pub fn format_percent(ratio: Option<f64>) -> String {
    match ratio {
        Some(ratio) => format!("{}%", format_decimal(ratio * 100.0, true)),
        None => "n/a".to_string(),
    }
}

/// Format a byte count with separators (`12345` → `12,345 bytes`).
pub fn format_bytes(bytes: u64) -> String {
    format!("{} bytes", group_thousands(&bytes.to_string()))
}

/// Format a byte count in kilobytes (1 kB = 1000 bytes).
pub fn format_kilobytes(bytes: i128, signed: bool) -> String {
    format!("{} kB", format_decimal(bytes as f64 / 1000.0, signed))
}

/// Count with noun, pluralized (`1 file`, `3 files`).
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
