use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

use super::model::{BookingRecord, CategoryColumn};

/// Length of the arrival-airport ranking.
pub const TOP_AIRPORTS: usize = 10;

/// Number of bins in the passenger-age histogram.
pub const AGE_BINS: usize = 10;

// ---------------------------------------------------------------------------
// Result tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

/// Calendar month bucket, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub month: YearMonth,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    /// `"lo-hi"` with both bounds truncated to integers.
    pub label: String,
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

impl HistogramBin {
    fn new(lo: f64, hi: f64, count: usize) -> Self {
        HistogramBin {
            label: format!("{}-{}", lo.trunc() as i64, hi.trunc() as i64),
            lo,
            hi,
            count,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// Count occurrences, most frequent first. Equal counts keep the order in
/// which the values were first seen.
fn ranked_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<CategoryCount> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match slots.get(value) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }
    // sort_by is stable
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(value, count)| CategoryCount {
            value: value.to_string(),
            count,
        })
        .collect()
}

pub fn category_counts(records: &[&BookingRecord], column: CategoryColumn) -> Vec<CategoryCount> {
    ranked_counts(records.iter().map(|rec| column.value_of(rec)))
}

pub fn status_distribution(records: &[&BookingRecord]) -> Vec<CategoryCount> {
    category_counts(records, CategoryColumn::FlightStatus)
}

pub fn gender_counts(records: &[&BookingRecord]) -> Vec<CategoryCount> {
    category_counts(records, CategoryColumn::Gender)
}

pub fn continent_counts(records: &[&BookingRecord]) -> Vec<CategoryCount> {
    category_counts(records, CategoryColumn::Continent)
}

/// The [`TOP_AIRPORTS`] busiest arrival airports.
pub fn top_arrival_airports(records: &[&BookingRecord]) -> Vec<CategoryCount> {
    let mut ranked = ranked_counts(records.iter().map(|rec| rec.arrival_airport.as_str()));
    ranked.truncate(TOP_AIRPORTS);
    ranked
}

/// Flights per observed month, oldest first. Null dates are skipped and
/// months without flights do not appear.
pub fn monthly_trend(records: &[&BookingRecord]) -> Vec<MonthlyCount> {
    let mut buckets: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for date in records.iter().filter_map(|rec| rec.departure_date) {
        *buckets.entry(YearMonth::of(date)).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(month, count)| MonthlyCount { month, count })
        .collect()
}

pub fn age_histogram(records: &[&BookingRecord]) -> Vec<HistogramBin> {
    let ages: Vec<f64> = records
        .iter()
        .filter_map(|rec| rec.age)
        .map(f64::from)
        .collect();
    histogram(&ages, AGE_BINS)
}

/// Equal-width histogram over `[min, max]` of `values`.
///
/// Bins are half-open except the last, which also takes `max`. When every
/// value is equal a single bin `[v, v]` is returned. No values, no bins.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![HistogramBin::new(min, max, values.len())];
    }

    let width = (max - min) / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { max } else { min + width * i as f64 })
        .collect();

    let mut counts = vec![0usize; bins];
    for &v in values {
        let mut idx = (((v - min) / width) as usize).min(bins - 1);
        // Correct for rounding near an edge.
        if idx > 0 && v < edges[idx] {
            idx -= 1;
        } else if idx + 1 < bins && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    edges
        .windows(2)
        .zip(counts)
        .map(|(edge, count)| HistogramBin::new(edge[0], edge[1], count))
        .collect()
}

// ---------------------------------------------------------------------------
// DashboardSummary – everything the charts need
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Number of filtered bookings.
    pub total: usize,
    pub status_distribution: Vec<CategoryCount>,
    pub top_airports: Vec<CategoryCount>,
    pub monthly_trend: Vec<MonthlyCount>,
    pub age_histogram: Vec<HistogramBin>,
    pub gender_counts: Vec<CategoryCount>,
    pub continent_counts: Vec<CategoryCount>,
}

impl DashboardSummary {
    pub fn compute(records: &[&BookingRecord]) -> Self {
        DashboardSummary {
            total: records.len(),
            status_distribution: status_distribution(records),
            top_airports: top_arrival_airports(records),
            monthly_trend: monthly_trend(records),
            age_histogram: age_histogram(records),
            gender_counts: gender_counts(records),
            continent_counts: continent_counts(records),
        }
    }
}
