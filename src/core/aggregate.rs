// LogVista - core/aggregate.rs
//
// Chart aggregations over the filtered view. Each function is a pure
// summary of (table, view indices); rendering is the UI's problem.
// An aggregation whose required column is absent returns None and the
// corresponding chart is simply skipped -- never an error.

use crate::core::model::LogTable;
use crate::core::region::Region;
use crate::util::constants;
use std::collections::HashMap;

/// One bar of the hourly error-frequency histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyBucket {
    /// Hour of day, 0-23.
    pub hour: u32,
    /// 12-hour clock label for the axis.
    pub label: String,
    /// Rows in the filtered view falling in this hour.
    pub count: usize,
}

/// A (value, count) pair for the top-N and distribution charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Group the view by (hour, hour label) and count rows per bucket,
/// sorted ascending by hour. Only hours actually present appear.
/// Rows whose timestamp coerced to null carry no hour and are ignored.
///
/// Returns None when the table has no `Hour` column.
pub fn hourly_counts(table: &LogTable, view: &[usize]) -> Option<Vec<HourlyBucket>> {
    if !table.has_column(constants::COL_HOUR) {
        return None;
    }

    let mut counts: HashMap<u32, (String, usize)> = HashMap::new();
    for &idx in view {
        let Some(row) = table.rows.get(idx) else {
            continue;
        };
        let Some(hour) = row.hour else {
            continue;
        };
        let entry = counts
            .entry(hour)
            .or_insert_with(|| (row.hour_label.clone().unwrap_or_default(), 0));
        entry.1 += 1;
    }

    let mut buckets: Vec<HourlyBucket> = counts
        .into_iter()
        .map(|(hour, (label, count))| HourlyBucket { hour, label, count })
        .collect();
    buckets.sort_unstable_by_key(|b| b.hour);
    Some(buckets)
}

/// The 10 most frequent non-null `Exception` values in the view.
/// Ties are broken by first-encountered row order (stable), so the
/// result is deterministic for a given table.
///
/// Returns None when the table has no `Exception` column.
pub fn top_exceptions(table: &LogTable, view: &[usize]) -> Option<Vec<ValueCount>> {
    if !table.has_column(constants::COL_EXCEPTION) {
        return None;
    }
    Some(top_values(
        view.iter()
            .filter_map(|&idx| table.rows.get(idx))
            .filter_map(|row| row.exception.as_deref()),
        constants::TOP_N,
    ))
}

/// The 10 most frequently affected non-null `Object Name` values,
/// same algorithm as `top_exceptions`.
///
/// Returns None when the table has no `Object Name` column.
pub fn top_objects(table: &LogTable, view: &[usize]) -> Option<Vec<ValueCount>> {
    if !table.has_column(constants::COL_OBJECT_NAME) {
        return None;
    }
    Some(top_values(
        view.iter()
            .filter_map(|&idx| table.rows.get(idx))
            .filter_map(|row| row.object_name.as_deref()),
        constants::TOP_N,
    ))
}

/// Row count per region in the view, `Unknown` included, no top-N cap.
/// Descending by count with first-encountered tiebreak. Region is
/// attached at load time, so this aggregation is always available.
pub fn region_distribution(table: &LogTable, view: &[usize]) -> Vec<(Region, usize)> {
    let mut counts: HashMap<Region, (usize, usize)> = HashMap::new(); // region -> (first_seen, count)
    for (pos, &idx) in view.iter().enumerate() {
        let Some(row) = table.rows.get(idx) else {
            continue;
        };
        let entry = counts.entry(row.region).or_insert((pos, 0));
        entry.1 += 1;
    }

    let mut out: Vec<(Region, usize, usize)> = counts
        .into_iter()
        .map(|(region, (first_seen, count))| (region, first_seen, count))
        .collect();
    out.sort_unstable_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));
    out.into_iter().map(|(r, _, c)| (r, c)).collect()
}

/// Count distinct values in encounter order, then take the `n` largest
/// counts with first-seen tiebreak.
fn top_values<'a>(values: impl Iterator<Item = &'a str>, n: usize) -> Vec<ValueCount> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new(); // value -> (first_seen, count)
    for (pos, value) in values.enumerate() {
        let entry = counts.entry(value).or_insert((pos, 0));
        entry.1 += 1;
    }

    let mut out: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(value, (first_seen, count))| (value, first_seen, count))
        .collect();
    out.sort_unstable_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));
    out.truncate(n);
    out.into_iter()
        .map(|(value, _, count)| ValueCount {
            value: value.to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LogRow;

    fn table(rows: Vec<LogRow>, columns: &[&str]) -> LogTable {
        LogTable {
            rows,
            columns: columns.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn full_view(table: &LogTable) -> Vec<usize> {
        (0..table.rows.len()).collect()
    }

    #[test]
    fn test_hourly_counts_sorted_ascending() {
        let rows = vec![
            LogRow {
                hour: Some(14),
                hour_label: Some("2:00 PM".into()),
                ..Default::default()
            },
            LogRow {
                hour: Some(9),
                hour_label: Some("9:00 AM".into()),
                ..Default::default()
            },
            LogRow {
                hour: Some(14),
                hour_label: Some("2:00 PM".into()),
                ..Default::default()
            },
            LogRow::default(), // null hour ignored
        ];
        let t = table(rows, &["Datetime", "Hour", "Hour_Label"]);
        let buckets = hourly_counts(&t, &full_view(&t)).unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].hour, 9);
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[1].hour, 14);
        assert_eq!(buckets[1].label, "2:00 PM");
        assert_eq!(buckets[1].count, 2);
    }

    #[test]
    fn test_hourly_counts_skipped_without_hour_column() {
        let t = table(vec![LogRow::default()], &["Exception"]);
        assert!(hourly_counts(&t, &full_view(&t)).is_none());
    }

    #[test]
    fn test_top_exceptions_counts_and_caps_at_ten() {
        let mut rows = Vec::new();
        // 12 distinct exception types; type k appears k+1 times.
        for k in 0..12 {
            for _ in 0..=k {
                rows.push(LogRow {
                    exception: Some(format!("E{k}")),
                    ..Default::default()
                });
            }
        }
        rows.push(LogRow::default()); // null exception ignored
        let t = table(rows, &["Exception"]);
        let top = top_exceptions(&t, &full_view(&t)).unwrap();
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].value, "E11");
        assert_eq!(top[0].count, 12);
        // E0 (1 occurrence) and E1 (2) fall outside the top 10.
        assert!(top.iter().all(|v| v.value != "E0" && v.value != "E1"));
    }

    /// Equal counts keep first-encountered order.
    #[test]
    fn test_top_values_ties_stable_by_first_encounter() {
        let rows = vec![
            LogRow {
                exception: Some("Beta".into()),
                ..Default::default()
            },
            LogRow {
                exception: Some("Alpha".into()),
                ..Default::default()
            },
            LogRow {
                exception: Some("Beta".into()),
                ..Default::default()
            },
            LogRow {
                exception: Some("Alpha".into()),
                ..Default::default()
            },
        ];
        let t = table(rows, &["Exception"]);
        let top = top_exceptions(&t, &full_view(&t)).unwrap();
        assert_eq!(top[0].value, "Beta");
        assert_eq!(top[1].value, "Alpha");
    }

    #[test]
    fn test_top_objects_skipped_without_column() {
        let t = table(vec![LogRow::default()], &["Exception"]);
        assert!(top_objects(&t, &full_view(&t)).is_none());
    }

    #[test]
    fn test_region_distribution_counts_all_regions() {
        let mut rows = Vec::new();
        for _ in 0..2 {
            rows.push(LogRow {
                region: Region::Nashik,
                ..Default::default()
            });
        }
        for _ in 0..3 {
            rows.push(LogRow {
                region: Region::Mumbai,
                ..Default::default()
            });
        }
        rows.push(LogRow::default()); // Unknown counts too
        let t = table(rows, &["Region"]);
        let dist = region_distribution(&t, &full_view(&t));
        assert_eq!(dist[0], (Region::Mumbai, 3));
        assert_eq!(dist[1], (Region::Nashik, 2));
        assert_eq!(dist[2], (Region::Unknown, 1));
    }

    #[test]
    fn test_aggregations_respect_the_view() {
        let rows = vec![
            LogRow {
                region: Region::Mumbai,
                exception: Some("A".into()),
                ..Default::default()
            },
            LogRow {
                region: Region::Nashik,
                exception: Some("B".into()),
                ..Default::default()
            },
        ];
        let t = table(rows, &["Exception", "Region"]);
        // View containing only the second row.
        let dist = region_distribution(&t, &[1]);
        assert_eq!(dist, vec![(Region::Nashik, 1)]);
        let top = top_exceptions(&t, &[1]).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].value, "B");
    }
}
