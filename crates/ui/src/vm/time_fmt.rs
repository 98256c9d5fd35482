use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// Short seconds label, e.g. `45s`.
#[must_use]
pub fn format_secs(secs: u64) -> String {
    format!("{secs}s")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[test]
    fn formats_minutes_precision() {
        let formatted = format_datetime(fixed_now());
        assert_eq!(formatted.len(), "2024-01-01 00:00".len());
        assert!(formatted.starts_with(&fixed_now().format("%Y-%m-%d").to_string()));
    }

    #[test]
    fn formats_seconds_label() {
        assert_eq!(format_secs(45), "45s");
        assert_eq!(format_secs(0), "0s");
    }
}
