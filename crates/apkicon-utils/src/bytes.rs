use crate::error::{BytesError, BytesResult};

const BINARY_UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Formats a byte count using binary units.
///
/// # Example
///
/// ```
/// use apkicon_utils::bytes::format_bytes;
///
/// assert_eq!(format_bytes(3 * 1024 * 1024 / 2, 2), "1.50 MiB");
/// ```
pub fn format_bytes(bytes: u64, precision: usize) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= 1024.0 && unit < BINARY_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{value:.precision$} {}", BINARY_UNITS[unit])
}

/// Parses a size such as `512`, `16 MiB` or `1.5GB` into bytes.
///
/// Binary (`KiB`, `MiB`, ...) and decimal (`KB`, `MB`, ...) suffixes are
/// accepted, case-insensitively. A bare number is taken as bytes.
///
/// # Errors
///
/// * [`BytesError::ParseFailed`] if the number or suffix cannot be understood.
///
/// # Example
///
/// ```
/// use apkicon_utils::bytes::parse_bytes;
///
/// assert_eq!(parse_bytes("16 MiB").unwrap(), 16 * 1024 * 1024);
/// ```
pub fn parse_bytes(input: &str) -> BytesResult<u64> {
    let trimmed = input.trim();
    if let Ok(value) = trimmed.parse::<u64>() {
        return Ok(value);
    }

    let upper = trimmed.to_ascii_uppercase();
    let split = upper
        .find(|c: char| c.is_ascii_alphabetic())
        .ok_or_else(|| {
            BytesError::ParseFailed {
                input: input.to_string(),
                reason: "Missing unit".into(),
            }
        })?;
    let (number, suffix) = upper.split_at(split);

    let number: f64 = number.trim().parse().map_err(|_| {
        BytesError::ParseFailed {
            input: input.to_string(),
            reason: "Invalid number".into(),
        }
    })?;

    let (exponent, base) = match suffix {
        "B" => (0, 1000.0),
        "KB" => (1, 1000.0),
        "MB" => (2, 1000.0),
        "GB" => (3, 1000.0),
        "TB" => (4, 1000.0),
        "KIB" => (1, 1024.0),
        "MIB" => (2, 1024.0),
        "GIB" => (3, 1024.0),
        "TIB" => (4, 1024.0),
        _ => {
            return Err(BytesError::ParseFailed {
                input: input.to_string(),
                reason: "Invalid suffix".into(),
            })
        }
    };

    Ok((number * f64::powi(base, exponent)).round() as u64)
}
