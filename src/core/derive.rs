// LogVista - core/derive.rs
//
// Derived-field builder: coerced timestamps, hour-of-day buckets, and
// hour labels for the hourly chart.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::{LogTable, Value};
use crate::util::constants;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Compute the synthetic columns charts and filters depend on.
///
/// When the table has a `Datetime` column, every raw cell is parsed into
/// a timestamp; unparseable values coerce to `None` and never error.
/// `Hour` and `Hour_Label` are derived from the coerced timestamp and
/// appended to the column union (after `Region`, matching the order the
/// pipeline creates them in).
pub fn derive(table: &mut LogTable) {
    table.add_column(constants::COL_REGION);

    if !table.has_column(constants::COL_DATETIME) {
        return;
    }
    table.add_column(constants::COL_HOUR);
    table.add_column(constants::COL_HOUR_LABEL);

    let mut coerced = 0usize;
    for row in &mut table.rows {
        // Rows re-ingested from an export may already carry hour fields;
        // the coerced timestamp is authoritative, so recompute both.
        row.datetime = row.datetime_cell.as_ref().and_then(parse_datetime);
        if row.datetime.is_none() && row.datetime_cell.is_some() {
            coerced += 1;
        }
        row.hour = row.datetime.map(|dt| chrono::Timelike::hour(&dt));
        row.hour_label = row.hour.map(hour_label);
    }

    if coerced > 0 {
        tracing::debug!(rows = coerced, "Unparseable Datetime values coerced to null");
    }
}

/// Parse a raw `Datetime` cell into a timestamp.
///
/// Text cells go through an ordered list of chrono format strategies;
/// numeric cells are treated as Excel serial date-times. Returns `None`
/// on failure -- coercion is silent by design.
pub fn parse_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Text(s) => parse_datetime_text(s),
        Value::Number(n) => from_excel_serial(*n),
        _ => None,
    }
}

/// Ordered parse strategies for textual timestamps.
///
/// Tried most-common-first: ISO with/without fractional seconds and `T`
/// separator, RFC 3339 (offset discarded -- source data is naive),
/// slash-separated dates, then date-only forms treated as midnight.
fn parse_datetime_text(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d-%m-%Y %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    // RFC 3339 with an explicit offset; the offset is dropped because the
    // rest of the dataset carries no timezone.
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    // Date-only cells are treated as midnight.
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, format) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Convert an Excel serial date-time (days since 1899-12-30, time as the
/// fractional part) to a timestamp.  Out-of-range serials return `None`.
fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    // Serial 1 is 1900-01-01; 2958465 is 9999-12-31.
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let secs = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::seconds(secs))
}

/// 12-hour clock label for an hour bucket.
///
/// Midnight renders as "0:00 AM", not "12:00 AM". Long-standing label
/// behaviour; consumers key on the exact strings, so keep it.
pub fn hour_label(hour: u32) -> String {
    if hour > 12 {
        format!("{}:00 PM", hour - 12)
    } else if hour == 12 {
        "12:00 PM".to_string()
    } else {
        format!("{hour}:00 AM")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LogRow;

    fn table_with_datetimes(cells: Vec<Option<Value>>) -> LogTable {
        LogTable {
            rows: cells
                .into_iter()
                .map(|c| LogRow {
                    datetime_cell: c,
                    ..Default::default()
                })
                .collect(),
            columns: vec![constants::COL_DATETIME.to_string()],
        }
    }

    #[test]
    fn test_derive_parses_and_buckets() {
        let mut table = table_with_datetimes(vec![
            Some(Value::Text("2024-06-01 14:30:22".into())),
            Some(Value::Text("not a date".into())),
            None,
        ]);
        derive(&mut table);

        assert_eq!(table.rows[0].hour, Some(14));
        assert_eq!(table.rows[0].hour_label.as_deref(), Some("2:00 PM"));
        // Coercion: malformed cell becomes null, never an error.
        assert!(table.rows[1].datetime.is_none());
        assert!(table.rows[1].hour.is_none());
        assert!(table.rows[2].datetime.is_none());

        assert!(table.has_column(constants::COL_REGION));
        assert!(table.has_column(constants::COL_HOUR));
        assert!(table.has_column(constants::COL_HOUR_LABEL));
    }

    #[test]
    fn test_derive_without_datetime_column_adds_no_hour_columns() {
        let mut table = LogTable {
            rows: vec![LogRow::default()],
            columns: vec!["Exception".to_string()],
        };
        derive(&mut table);
        assert!(table.has_column(constants::COL_REGION));
        assert!(!table.has_column(constants::COL_HOUR));
        assert!(!table.has_column(constants::COL_HOUR_LABEL));
    }

    #[test]
    fn test_parse_datetime_text_variants() {
        let expect = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(14, 30, 22)
            .unwrap();
        for raw in [
            "2024-06-01 14:30:22",
            "2024-06-01T14:30:22",
            "2024-06-01 14:30:22.500",
            " 2024-06-01 14:30:22 ",
            "01-06-2024 14:30:22",
            "01/06/2024 14:30:22",
        ] {
            assert_eq!(
                parse_datetime(&Value::Text(raw.into())),
                Some(expect),
                "failed for {raw:?}"
            );
        }
    }

    #[test]
    fn test_parse_datetime_date_only_is_midnight() {
        let dt = parse_datetime(&Value::Text("2024-06-01".into())).unwrap();
        assert_eq!(dt.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn test_parse_datetime_excel_serial() {
        // 45444.5 = 2024-06-01 12:00:00
        let dt = parse_datetime(&Value::Number(45_444.5)).unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-06-01 12:00:00");
        // Serials outside the representable range coerce to null.
        assert!(parse_datetime(&Value::Number(-3.0)).is_none());
        assert!(parse_datetime(&Value::Number(0.0)).is_none());
    }

    /// Midnight keeps its historical label: "0:00 AM", not "12:00 AM".
    #[test]
    fn test_hour_label_boundaries() {
        assert_eq!(hour_label(0), "0:00 AM");
        assert_eq!(hour_label(1), "1:00 AM");
        assert_eq!(hour_label(11), "11:00 AM");
        assert_eq!(hour_label(12), "12:00 PM");
        assert_eq!(hour_label(13), "1:00 PM");
        assert_eq!(hour_label(23), "11:00 PM");
    }
}
