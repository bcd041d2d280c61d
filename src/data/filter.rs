use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::{BookingDataset, BookingRecord, CategoryColumn};

// ---------------------------------------------------------------------------
// DateRange – closed departure-date interval
// ---------------------------------------------------------------------------

/// Inclusive on both ends. `start > end` contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// A null date is never inside a range.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        date.is_some_and(|d| self.start <= d && d <= self.end)
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria
// ---------------------------------------------------------------------------

/// The user's constraints on the dataset.
///
/// * `date_range` is `None` → no date constraint, null dates pass
/// * A column absent from `categories` → no constraint on that column
/// * A column present with an empty set → nothing passes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub date_range: Option<DateRange>,
    pub categories: BTreeMap<CategoryColumn, BTreeSet<String>>,
}

impl FilterCriteria {
    /// Criteria selecting every observed value, bounded by the observed dates.
    pub fn all_of(dataset: &BookingDataset) -> Self {
        FilterCriteria {
            date_range: dataset
                .date_bounds
                .map(|(start, end)| DateRange::new(start, end)),
            categories: dataset.unique_values.clone(),
        }
    }

    pub fn matches(&self, record: &BookingRecord) -> bool {
        if let Some(range) = &self.date_range {
            if !range.contains(record.departure_date) {
                return false;
            }
        }
        self.categories
            .iter()
            .all(|(col, allowed)| allowed.contains(col.value_of(record)))
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Records passing `criteria`, in input order.
pub fn apply<'a, I>(records: I, criteria: &FilterCriteria) -> Vec<&'a BookingRecord>
where
    I: IntoIterator<Item = &'a BookingRecord>,
{
    records
        .into_iter()
        .filter(|rec| criteria.matches(rec))
        .collect()
}

/// Return indices of records that pass all active filters.
pub fn filtered_indices(records: &[BookingRecord], criteria: &FilterCriteria) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::fixtures::{booking, date};

    fn sample() -> Vec<BookingRecord> {
        vec![
            booking(Some(date(2022, 1, 5)), "EU", "On Time", "Male", Some(30), "LHR"),
            booking(Some(date(2022, 2, 10)), "NAM", "Delayed", "Female", Some(45), "JFK"),
            booking(None, "EU", "Cancelled", "Female", Some(22), "CDG"),
            booking(Some(date(2022, 3, 31)), "AS", "On Time", "Male", None, "NRT"),
        ]
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn unconstrained_criteria_is_identity() {
        let records = sample();
        let out = apply(&records, &FilterCriteria::default());
        assert_eq!(out, records.iter().collect::<Vec<_>>());
    }

    #[test]
    fn all_observed_values_drop_only_null_dates() {
        let records = sample();
        let ds = BookingDataset::from_records(records.clone(), Vec::new());
        let out = apply(&records, &FilterCriteria::all_of(&ds));
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|r| r.departure_date.is_some()));

        // Without the date interval every record survives.
        let criteria = FilterCriteria {
            date_range: None,
            ..FilterCriteria::all_of(&ds)
        };
        assert_eq!(apply(&records, &criteria).len(), records.len());
    }

    #[test]
    fn covering_range_and_every_category_is_identity() {
        let records: Vec<BookingRecord> = sample()
            .into_iter()
            .filter(|r| r.departure_date.is_some())
            .collect();
        let criteria = FilterCriteria {
            date_range: Some(DateRange::new(date(2000, 1, 1), date(2100, 12, 31))),
            categories: CategoryColumn::ALL
                .into_iter()
                .map(|col| (col, records.iter().map(|r| col.value_of(r).to_string()).collect()))
                .collect(),
        };
        let out = apply(&records, &criteria);
        assert_eq!(out, records.iter().collect::<Vec<_>>());
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let records = sample();
        let criteria = FilterCriteria {
            date_range: Some(DateRange::new(date(2022, 1, 5), date(2022, 3, 31))),
            ..Default::default()
        };
        let airports: Vec<&str> = apply(&records, &criteria)
            .iter()
            .map(|r| r.arrival_airport.as_str())
            .collect();
        assert_eq!(airports, ["LHR", "JFK", "NRT"]);
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let records = sample();
        let criteria = FilterCriteria {
            date_range: Some(DateRange::new(date(2022, 12, 31), date(2022, 1, 1))),
            ..Default::default()
        };
        assert!(apply(&records, &criteria).is_empty());
    }

    #[test]
    fn empty_category_set_excludes_everything() {
        let records = sample();
        let mut criteria = FilterCriteria::default();
        criteria
            .categories
            .insert(CategoryColumn::Gender, BTreeSet::new());
        assert!(apply(&records, &criteria).is_empty());
    }

    #[test]
    fn predicates_are_conjunctive() {
        let records = sample();
        let mut criteria = FilterCriteria::default();
        criteria
            .categories
            .insert(CategoryColumn::Continent, set(&["EU", "AS"]));
        criteria
            .categories
            .insert(CategoryColumn::Gender, set(&["Female"]));
        let out = apply(&records, &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].arrival_airport, "CDG");

        assert_eq!(filtered_indices(&records, &criteria), [2]);
    }

    // -- properties --

    fn arb_record() -> impl Strategy<Value = BookingRecord> {
        (
            prop::option::weighted(0.9, 0u32..60),
            prop::sample::select(vec!["EU", "NAM", "AS", "AF"]),
            prop::sample::select(vec!["On Time", "Delayed", "Cancelled"]),
            prop::sample::select(vec!["Male", "Female"]),
            prop::option::of(0u32..90),
            prop::sample::select(vec!["LHR", "JFK", "CDG", "NRT", "SYD"]),
        )
            .prop_map(|(day, continent, status, gender, age, airport)| {
                let departure = day.map(|d| date(2022, 1, 1) + chrono::Days::new(u64::from(d)));
                booking(departure, continent, status, gender, age, airport)
            })
    }

    fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
        (
            prop::option::of((0u64..60, 0u64..60)),
            prop::sample::subsequence(vec!["EU", "NAM", "AS", "AF"], 0..=4),
            prop::sample::subsequence(vec!["On Time", "Delayed", "Cancelled"], 0..=3),
            prop::sample::subsequence(vec!["Male", "Female"], 0..=2),
        )
            .prop_map(|(range, continents, statuses, genders)| {
                let base = date(2022, 1, 1);
                let mut categories = BTreeMap::new();
                categories.insert(CategoryColumn::Continent, set(&continents));
                categories.insert(CategoryColumn::FlightStatus, set(&statuses));
                categories.insert(CategoryColumn::Gender, set(&genders));
                FilterCriteria {
                    date_range: range.map(|(a, b)| {
                        DateRange::new(base + chrono::Days::new(a), base + chrono::Days::new(b))
                    }),
                    categories,
                }
            })
    }

    proptest! {
        #[test]
        fn result_is_an_ordered_subset_satisfying_every_predicate(
            records in prop::collection::vec(arb_record(), 0..40),
            criteria in arb_criteria(),
        ) {
            let out = apply(&records, &criteria);
            let idx = filtered_indices(&records, &criteria);
            prop_assert_eq!(out.len(), idx.len());
            prop_assert!(idx.windows(2).all(|w| w[0] < w[1]));
            for (rec, &i) in out.iter().zip(&idx) {
                prop_assert!(std::ptr::eq(*rec, &records[i]));
                if let Some(range) = &criteria.date_range {
                    prop_assert!(rec.departure_date.is_some());
                    prop_assert!(range.contains(rec.departure_date));
                }
                for (col, allowed) in &criteria.categories {
                    prop_assert!(allowed.contains(col.value_of(rec)));
                }
            }
        }

        #[test]
        fn filtering_is_idempotent(
            records in prop::collection::vec(arb_record(), 0..40),
            criteria in arb_criteria(),
        ) {
            let once = apply(&records, &criteria);
            let twice = apply(once.iter().copied(), &criteria);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn maximal_criteria_without_dates_is_identity(
            records in prop::collection::vec(arb_record(), 0..40),
        ) {
            let ds = BookingDataset::from_records(records.clone(), Vec::new());
            let criteria = FilterCriteria { date_range: None, ..FilterCriteria::all_of(&ds) };
            let out = apply(&records, &criteria);
            prop_assert_eq!(out, records.iter().collect::<Vec<_>>());
        }
    }
}
