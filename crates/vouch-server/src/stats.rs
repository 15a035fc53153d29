use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use vouch_types::UserRecord;

/// Days covered by the user-creation graph.
pub const GRAPH_DAYS: u32 = 7;

/// Users created on one UTC calendar day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    /// `YYYY-MM-DD`.
    pub day: NaiveDate,
    pub count: u64,
}

/// Count records by creation day over the `days` days ending at `today`.
///
/// Every day in the window is present, oldest first, including days with no
/// users. Records created outside the window are ignored.
pub fn count_by_day(records: &[UserRecord], today: NaiveDate, days: u32) -> Vec<DayCount> {
    if days == 0 {
        return Vec::new();
    }
    let start = today
        .checked_sub_days(Days::new(u64::from(days - 1)))
        .unwrap_or(NaiveDate::MIN);

    let mut buckets: Vec<DayCount> = start
        .iter_days()
        .take_while(|day| *day <= today)
        .map(|day| DayCount { day, count: 0 })
        .collect();

    for day in records.iter().filter_map(|r| r.created()).map(|t| t.date_naive()) {
        if day < start || day > today {
            continue;
        }
        let offset = (day - start).num_days() as usize;
        buckets[offset].count += 1;
    }
    buckets
}
