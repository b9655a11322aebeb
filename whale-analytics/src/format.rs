//! Cell and summary formatting.

use crate::{coerce, columns::ColumnRole};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

/// Placeholder for absent values.
pub const PLACEHOLDER: &str = "—";

/// Epoch values above this are milliseconds, otherwise seconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e10;

/// Compact currency, eg/ `$1.23K`, `$4.50M`, `$2.00B`.
pub fn format_amount(amount: f64) -> String {
    let abs = amount.abs();
    if abs >= 1_000_000_000.0 {
        format!("${:.2}B", amount / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("${:.2}M", amount / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("${:.2}K", amount / 1_000.0)
    } else {
        format!("${amount:.2}")
    }
}

/// Format a numeric JSON value as compact currency. Non-numeric text is returned as is.
pub fn format_number(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => PLACEHOLDER.to_string(),
        Some(value) => match coerce::number(value) {
            Some(amount) => format_amount(amount),
            None => display_text(value),
        },
    }
}

/// Format an epoch number (seconds or milliseconds) or a date string, in UTC.
///
/// Unparseable input is returned as is; absent, zero and empty input is a placeholder.
pub fn format_date(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return PLACEHOLDER.to_string();
    };

    match value {
        Value::Null => PLACEHOLDER.to_string(),
        Value::Bool(false) => PLACEHOLDER.to_string(),
        Value::String(raw) if raw.is_empty() => PLACEHOLDER.to_string(),
        Value::Number(num) => match num.as_f64() {
            Some(epoch) if epoch == 0.0 => PLACEHOLDER.to_string(),
            Some(epoch) => datetime_from_epoch(epoch)
                .map(format_datetime)
                .unwrap_or_else(|| value.to_string()),
            None => value.to_string(),
        },
        Value::String(raw) => parse_date(raw)
            .map(format_datetime)
            .unwrap_or_else(|| raw.clone()),
        other => other.to_string(),
    }
}

/// Shorten `text` to `max_chars` characters, marking the cut with "...".
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let head: String = text.chars().take(max_chars).collect();
    format!("{head}...")
}

/// Shorten a wallet address to `0x1234...abcd`.
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() < 10 {
        return address.to_string();
    }

    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Render one table cell according to the role implied by its column name.
pub fn format_cell(value: Option<&Value>, key: &str) -> String {
    let Some(value) = value.filter(|value| !value.is_null()) else {
        return PLACEHOLDER.to_string();
    };

    match ColumnRole::of(key) {
        ColumnRole::Currency => coerce::number(value)
            .map(format_amount)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        ColumnRole::Date => format_date(Some(value)),
        ColumnRole::Opaque => match value {
            Value::Object(_) | Value::Array(_) => truncate_text(&value.to_string(), 25),
            other => truncate_text(&display_text(other), 35),
        },
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn datetime_from_epoch(epoch: f64) -> Option<DateTime<Utc>> {
    let millis = if epoch > EPOCH_MILLIS_THRESHOLD {
        epoch
    } else {
        epoch * 1000.0
    };

    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }

    DateTime::from_timestamp_millis(millis as i64)
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn format_datetime(datetime: DateTime<Utc>) -> String {
    datetime.format("%b %-d, %Y, %I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_amount() {
        struct TestCase {
            input: f64,
            expected: &'static str,
        }

        let tests = vec![
            // TC0: below a thousand
            TestCase {
                input: 12.5,
                expected: "$12.50",
            },
            // TC1: thousands
            TestCase {
                input: 1_234.0,
                expected: "$1.23K",
            },
            // TC2: millions
            TestCase {
                input: 4_500_000.0,
                expected: "$4.50M",
            },
            // TC3: billions
            TestCase {
                input: 2_000_000_000.0,
                expected: "$2.00B",
            },
            // TC4: negative thousands keep their sign
            TestCase {
                input: -1_500.0,
                expected: "$-1.50K",
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(format_amount(test.input), test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(None), PLACEHOLDER);
        assert_eq!(format_number(Some(&Value::Null)), PLACEHOLDER);
        assert_eq!(format_number(Some(&json!("2500"))), "$2.50K");
        assert_eq!(format_number(Some(&json!("n/a"))), "n/a");
    }

    #[test]
    fn test_format_date() {
        struct TestCase {
            input: Option<Value>,
            expected: &'static str,
        }

        let tests = vec![
            // TC0: unix seconds
            TestCase {
                input: Some(json!(1_700_000_000)),
                expected: "Nov 14, 2023, 10:13 PM",
            },
            // TC1: unix milliseconds
            TestCase {
                input: Some(json!(1_700_000_000_000_i64)),
                expected: "Nov 14, 2023, 10:13 PM",
            },
            // TC2: RFC 3339 string
            TestCase {
                input: Some(json!("2025-01-05T15:04:00Z")),
                expected: "Jan 5, 2025, 03:04 PM",
            },
            // TC3: plain date string
            TestCase {
                input: Some(json!("2024-12-31")),
                expected: "Dec 31, 2024, 12:00 AM",
            },
            // TC4: garbage string is returned as is
            TestCase {
                input: Some(json!("soon")),
                expected: "soon",
            },
            // TC5: absent
            TestCase {
                input: None,
                expected: PLACEHOLDER,
            },
            // TC6: zero epoch
            TestCase {
                input: Some(json!(0)),
                expected: PLACEHOLDER,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = format_date(test.input.as_ref());
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("Will it rain tomorrow?", 7), "Will it...");
        assert_eq!(truncate_text("ééééé", 3), "ééé...");
        assert_eq!(truncate_address("0x1234567890abcdef"), "0x1234...cdef");
        assert_eq!(truncate_address("0x1234"), "0x1234");
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(None, "question"), PLACEHOLDER);
        assert_eq!(format_cell(Some(&json!("1500")), "volume"), "$1.50K");
        assert_eq!(format_cell(Some(&json!("lots")), "liquidity"), PLACEHOLDER);
        assert_eq!(format_cell(Some(&json!(1_700_000_000)), "timestamp"), "Nov 14, 2023, 10:13 PM");
        assert_eq!(format_cell(Some(&json!(true)), "active"), "true");
        assert_eq!(
            format_cell(Some(&json!({"outcomes": ["Yes", "No"], "x": 1})), "meta"),
            r#"{"outcomes":["Yes","No"],..."#
        );
        assert_eq!(
            format_cell(
                Some(&json!("Will the Federal Reserve cut rates in March 2025?")),
                "question"
            ),
            "Will the Federal Reserve cut rates ..."
        );
    }
}
