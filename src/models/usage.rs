//! Usage analytics derived from the reservation snapshot.
//!
//! Recomputed in full on every snapshot change; each metric is a single
//! pass over the snapshot. A malformed record is excluded from the metrics
//! whose inputs it lacks and still counted everywhere else, so one bad
//! document never blanks the dashboard.

use std::collections::{BTreeMap, HashMap};

use chrono::Timelike;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Reservation;
use crate::time_utils::utc_day_key;

/// Truncation limit for the most-used-lockers ranking.
const TOP_LOCKERS_LIMIT: usize = 5;

/// Label used when a reservation carries no status.
const UNKNOWN_STATUS: &str = "unknown";

/// Reservation count for one locker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LockerUsage {
    pub locker_id: String,
    pub count: u32,
}

/// Reservation count for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DayCount {
    /// "YYYY-MM-DD"
    pub date: String,
    pub count: u32,
}

/// Reservation count for one status label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatusCount {
    pub status: String,
    pub count: u32,
}

/// Derived reservation metrics for the dashboard.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UsageStats {
    pub total_reservations: u32,
    /// Mean reservation length in minutes; `None` when no sample has a
    /// parseable start and end with the end after the start.
    pub average_duration_minutes: Option<f64>,
    /// Hour of day (0-23, UTC) with the most reservation starts; the
    /// lowest hour wins a tie. `None` when no start time parses.
    pub peak_hour: Option<u8>,
    /// Reservation starts per UTC hour of day.
    pub hour_histogram: [u32; 24],
    /// Most-used lockers, descending by count, truncated to five.
    pub top_lockers: Vec<LockerUsage>,
    /// Reservations per UTC calendar day of creation, ascending by date.
    pub reservations_per_day: Vec<DayCount>,
    /// Reservations per status label, descending by count.
    pub status_breakdown: Vec<StatusCount>,
}

impl UsageStats {
    /// Compute all metrics from the current snapshot.
    pub fn compute(reservations: &[Reservation]) -> Self {
        let hour_histogram = hour_histogram(reservations);
        Self {
            total_reservations: reservations.len() as u32,
            average_duration_minutes: average_duration(reservations),
            peak_hour: peak_hour(&hour_histogram),
            hour_histogram,
            top_lockers: top_lockers(reservations),
            reservations_per_day: reservations_per_day(reservations),
            status_breakdown: status_breakdown(reservations),
        }
    }
}

fn average_duration(reservations: &[Reservation]) -> Option<f64> {
    let mut sum = 0.0;
    let mut samples = 0u32;
    for minutes in reservations.iter().filter_map(Reservation::duration_minutes) {
        sum += minutes;
        samples += 1;
    }
    (samples > 0).then(|| sum / f64::from(samples))
}

fn hour_histogram(reservations: &[Reservation]) -> [u32; 24] {
    let mut histogram = [0u32; 24];
    for start in reservations.iter().filter_map(|r| r.start_at) {
        histogram[start.hour() as usize] += 1;
    }
    histogram
}

/// Index of the maximum bucket; ties resolve to the lowest hour.
fn peak_hour(histogram: &[u32; 24]) -> Option<u8> {
    let mut best: Option<(usize, u32)> = None;
    for (hour, &count) in histogram.iter().enumerate() {
        if count > 0 && best.map_or(true, |(_, max)| count > max) {
            best = Some((hour, count));
        }
    }
    best.map(|(hour, _)| hour as u8)
}

/// Group by locker id in first-encounter order, then stable-sort so ties
/// keep that order.
fn top_lockers(reservations: &[Reservation]) -> Vec<LockerUsage> {
    let mut ranking: Vec<LockerUsage> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for res in reservations {
        if res.locker_id.is_empty() {
            continue;
        }
        match positions.get(res.locker_id.as_str()) {
            Some(&at) => ranking[at].count += 1,
            None => {
                positions.insert(res.locker_id.as_str(), ranking.len());
                ranking.push(LockerUsage {
                    locker_id: res.locker_id.clone(),
                    count: 1,
                });
            }
        }
    }

    ranking.sort_by(|a, b| b.count.cmp(&a.count));
    ranking.truncate(TOP_LOCKERS_LIMIT);
    ranking
}

fn reservations_per_day(reservations: &[Reservation]) -> Vec<DayCount> {
    let mut days: BTreeMap<String, u32> = BTreeMap::new();
    for created in reservations.iter().filter_map(|r| r.created_at) {
        *days.entry(utc_day_key(created)).or_insert(0) += 1;
    }
    days.into_iter()
        .map(|(date, count)| DayCount { date, count })
        .collect()
}

/// Every reservation lands in exactly one bucket; a missing or blank
/// status counts as "unknown".
fn status_breakdown(reservations: &[Reservation]) -> Vec<StatusCount> {
    let mut breakdown: Vec<StatusCount> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for res in reservations {
        let label = match res.status.as_deref() {
            Some(status) if !status.trim().is_empty() => status,
            _ => UNKNOWN_STATUS,
        };
        match positions.get(label) {
            Some(&at) => breakdown[at].count += 1,
            None => {
                positions.insert(label.to_string(), breakdown.len());
                breakdown.push(StatusCount {
                    status: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    breakdown.sort_by(|a, b| b.count.cmp(&a.count));
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn instant(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn make_reservation(
        locker: &str,
        status: Option<&str>,
        created: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Reservation {
        Reservation {
            id: format!("res-{}", locker),
            locker_id: locker.to_string(),
            user_id: "user-1".to_string(),
            created_at: created.map(instant),
            start_at: start.map(instant),
            end_at: end.map(instant),
            status: status.map(String::from),
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let stats = UsageStats::compute(&[]);
        assert_eq!(stats.total_reservations, 0);
        assert_eq!(stats.average_duration_minutes, None);
        assert_eq!(stats.peak_hour, None);
        assert!(stats.top_lockers.is_empty());
        assert!(stats.reservations_per_day.is_empty());
        assert!(stats.status_breakdown.is_empty());
    }

    #[test]
    fn test_average_unavailable_iff_no_qualifying_sample() {
        // Unparseable / missing / non-positive samples: no average
        let unqualified = vec![
            make_reservation("A", Some("active"), None, Some("2024-01-01T10:00:00Z"), None),
            make_reservation("B", Some("active"), None, None, Some("2024-01-01T11:00:00Z")),
            make_reservation(
                "C",
                Some("active"),
                None,
                Some("2024-01-01T12:00:00Z"),
                Some("2024-01-01T11:00:00Z"),
            ),
        ];
        assert_eq!(UsageStats::compute(&unqualified).average_duration_minutes, None);

        // One qualifying sample is enough
        let mut with_sample = unqualified;
        with_sample.push(make_reservation(
            "D",
            Some("active"),
            None,
            Some("2024-01-01T10:00:00Z"),
            Some("2024-01-01T11:30:00Z"),
        ));
        assert_eq!(
            UsageStats::compute(&with_sample).average_duration_minutes,
            Some(90.0)
        );
    }

    #[test]
    fn test_average_is_mean_of_included_samples() {
        let reservations = vec![
            make_reservation(
                "A",
                None,
                None,
                Some("2024-01-01T10:00:00Z"),
                Some("2024-01-01T10:30:00Z"),
            ),
            make_reservation(
                "B",
                None,
                None,
                Some("2024-01-01T10:00:00Z"),
                Some("2024-01-01T11:30:00Z"),
            ),
            // excluded: zero duration
            make_reservation(
                "C",
                None,
                None,
                Some("2024-01-01T10:00:00Z"),
                Some("2024-01-01T10:00:00Z"),
            ),
        ];
        assert_eq!(
            UsageStats::compute(&reservations).average_duration_minutes,
            Some(60.0)
        );
    }

    #[test]
    fn test_peak_hour_tie_resolves_to_lowest() {
        // Hours: 1, 2, 2, 1, 3 -> counts [0,2,2,1,...]; first max is hour 1
        let reservations = vec![
            make_reservation("A", None, None, Some("2024-01-01T01:00:00Z"), None),
            make_reservation("B", None, None, Some("2024-01-02T02:00:00Z"), None),
            make_reservation("C", None, None, Some("2024-01-03T02:30:00Z"), None),
            make_reservation("D", None, None, Some("2024-01-04T01:15:00Z"), None),
            make_reservation("E", None, None, Some("2024-01-05T03:00:00Z"), None),
        ];
        let stats = UsageStats::compute(&reservations);
        assert_eq!(stats.peak_hour, Some(1));
        assert_eq!(stats.hour_histogram[1], 2);
        assert_eq!(stats.hour_histogram[2], 2);
        assert_eq!(stats.hour_histogram[3], 1);
    }

    #[test]
    fn test_peak_hour_first_max_scan() {
        let mut histogram = [0u32; 24];
        histogram[1] = 5;
        histogram[2] = 5;
        histogram[0] = 3;
        assert_eq!(peak_hour(&histogram), Some(1));
        assert_eq!(peak_hour(&[0u32; 24]), None);
    }

    #[test]
    fn test_top_lockers_stable_ties_and_truncation() {
        // Encounter order A, B, C with counts A:4, B:4, C:2
        let mut reservations = Vec::new();
        for _ in 0..4 {
            reservations.push(make_reservation("A", None, None, None, None));
            reservations.push(make_reservation("B", None, None, None, None));
        }
        // Re-order so interleaving doesn't matter, only first encounter
        reservations.push(make_reservation("C", None, None, None, None));
        reservations.push(make_reservation("C", None, None, None, None));
        // Three more singletons push the list past the truncation limit
        for locker in ["D", "E", "F"] {
            reservations.push(make_reservation(locker, None, None, None, None));
        }

        let top = UsageStats::compute(&reservations).top_lockers;
        assert_eq!(top.len(), 5);
        assert_eq!(
            top[0],
            LockerUsage {
                locker_id: "A".to_string(),
                count: 4
            }
        );
        assert_eq!(
            top[1],
            LockerUsage {
                locker_id: "B".to_string(),
                count: 4
            }
        );
        assert_eq!(
            top[2],
            LockerUsage {
                locker_id: "C".to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn test_top_lockers_skip_missing_id() {
        let reservations = vec![
            make_reservation("", Some("active"), None, None, None),
            make_reservation("A", Some("active"), None, None, None),
        ];
        let stats = UsageStats::compute(&reservations);
        assert_eq!(stats.top_lockers.len(), 1);
        // Still counted in the total and the status breakdown
        assert_eq!(stats.total_reservations, 2);
        assert_eq!(stats.status_breakdown[0].count, 2);
    }

    #[test]
    fn test_per_day_groups_and_sorts_ascending() {
        let reservations = vec![
            make_reservation("A", None, Some("2024-02-01T08:00:00Z"), None, None),
            make_reservation("B", None, Some("2024-01-15T23:59:00Z"), None, None),
            make_reservation("C", None, Some("2024-02-01T19:00:00Z"), None, None),
            // no creation instant: excluded from this metric only
            make_reservation("D", None, None, None, None),
        ];
        let days = UsageStats::compute(&reservations).reservations_per_day;
        assert_eq!(days.len(), 2);
        assert_eq!(
            days[0],
            DayCount {
                date: "2024-01-15".to_string(),
                count: 1
            }
        );
        assert_eq!(
            days[1],
            DayCount {
                date: "2024-02-01".to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn test_status_breakdown_sums_to_total() {
        let reservations = vec![
            make_reservation("A", Some("active"), None, None, None),
            make_reservation("B", Some("active"), None, None, None),
            make_reservation("C", Some("expired"), None, None, None),
            make_reservation("D", None, None, None, None),
            make_reservation("E", Some("  "), None, None, None),
        ];
        let stats = UsageStats::compute(&reservations);
        let sum: u32 = stats.status_breakdown.iter().map(|s| s.count).sum();
        assert_eq!(sum, stats.total_reservations);

        assert_eq!(stats.status_breakdown[0].status, "active");
        assert_eq!(stats.status_breakdown[0].count, 2);
        assert_eq!(stats.status_breakdown[1].status, "unknown");
        assert_eq!(stats.status_breakdown[1].count, 2);
        assert_eq!(stats.status_breakdown[2].status, "expired");
        assert_eq!(stats.status_breakdown[2].count, 1);
    }

    #[test]
    fn test_malformed_record_never_blanks_other_metrics() {
        let reservations = vec![
            make_reservation("A", Some("active"), Some("2024-01-01T01:00:00Z"),
                Some("2024-01-01T01:00:00Z"), Some("2024-01-01T02:00:00Z")),
            // nothing parseable at all
            make_reservation("", None, None, None, None),
        ];
        let stats = UsageStats::compute(&reservations);
        assert_eq!(stats.total_reservations, 2);
        assert_eq!(stats.average_duration_minutes, Some(60.0));
        assert_eq!(stats.peak_hour, Some(1));
        assert_eq!(stats.top_lockers.len(), 1);
        assert_eq!(stats.reservations_per_day.len(), 1);
        assert_eq!(stats.status_breakdown.len(), 2);
    }

    #[test]
    fn test_peak_hour_uses_utc() {
        let offset_start = Utc.with_ymd_and_hms(2024, 1, 1, 23, 0, 0).unwrap();
        let reservations = vec![Reservation {
            id: "r".to_string(),
            locker_id: "A".to_string(),
            user_id: "u".to_string(),
            created_at: None,
            start_at: Some(offset_start),
            end_at: None,
            status: None,
        }];
        assert_eq!(UsageStats::compute(&reservations).peak_hour, Some(23));
    }
}
