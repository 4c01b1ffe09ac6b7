use tracing::warn;

/// Convert a ClickUp duration (`H:MM` or `H:MM:SS`) to decimal hours.
///
/// Strings without a colon are read as hours already in decimal form. Anything
/// unparseable is logged and counted as zero so a single bad cell never aborts
/// a billing run.
///
/// ```
/// use foreflow_parser::parse_duration_to_decimal;
///
/// assert_eq!(parse_duration_to_decimal(Some("1:15")), 1.25);
/// assert_eq!(parse_duration_to_decimal(Some("2:30:00")), 2.5);
/// assert_eq!(parse_duration_to_decimal(None), 0.0);
/// ```
pub fn parse_duration_to_decimal(raw: Option<&str>) -> f64 {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return 0.0;
    };

    let parts: Vec<&str> = value.split(':').collect();
    let parsed = if parts.len() >= 2 {
        match (parts[0].trim().parse::<i64>(), parts[1].trim().parse::<i64>()) {
            (Ok(hours), Ok(minutes)) => Some(round2(hours as f64 + minutes as f64 / 60.0)),
            _ => None,
        }
    } else {
        value.parse::<f64>().ok().filter(|hours| hours.is_finite())
    };

    match parsed {
        Some(hours) if hours < 0.0 => {
            warn!(duration = value, "negative duration, defaulting to 0.0");
            0.0
        }
        Some(hours) => hours,
        None => {
            warn!(duration = value, "could not parse duration, defaulting to 0.0");
            0.0
        }
    }
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
