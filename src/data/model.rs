use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Header schema
// ---------------------------------------------------------------------------

pub const DEPARTURE_DATE: &str = "Departure Date";
pub const AIRPORT_CONTINENT: &str = "Airport Continent";
pub const FLIGHT_STATUS: &str = "Flight Status";
pub const GENDER: &str = "Gender";
pub const AGE: &str = "Age";
pub const ARRIVAL_AIRPORT: &str = "Arrival Airport";

/// Columns every input file must carry. Anything else is kept as an extra.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    DEPARTURE_DATE,
    AIRPORT_CONTINENT,
    FLIGHT_STATUS,
    GENDER,
    AGE,
    ARRIVAL_AIRPORT,
];

// ---------------------------------------------------------------------------
// CategoryColumn – the filterable categorical dimensions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryColumn {
    Continent,
    FlightStatus,
    Gender,
}

impl CategoryColumn {
    pub const ALL: [CategoryColumn; 3] = [
        CategoryColumn::Continent,
        CategoryColumn::FlightStatus,
        CategoryColumn::Gender,
    ];

    /// Header name of the column in the source file.
    pub fn header(self) -> &'static str {
        match self {
            CategoryColumn::Continent => AIRPORT_CONTINENT,
            CategoryColumn::FlightStatus => FLIGHT_STATUS,
            CategoryColumn::Gender => GENDER,
        }
    }

    pub fn value_of(self, record: &BookingRecord) -> &str {
        match self {
            CategoryColumn::Continent => &record.continent,
            CategoryColumn::FlightStatus => &record.flight_status,
            CategoryColumn::Gender => &record.gender,
        }
    }
}

impl fmt::Display for CategoryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// BookingRecord – one row of the source file
// ---------------------------------------------------------------------------

/// A single passenger booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRecord {
    /// `None` when the source value was blank or could not be parsed.
    pub departure_date: Option<NaiveDate>,
    pub continent: String,
    pub flight_status: String,
    pub gender: String,
    /// `None` when the source value was blank or not a non-negative integer.
    pub age: Option<u32>,
    pub arrival_airport: String,
    /// Remaining columns, verbatim, aligned with [`BookingDataset::extra_columns`].
    pub extra: Vec<String>,
}

impl BookingRecord {
    /// Text for column `idx` of [`BookingDataset::column_names`].
    pub fn cell(&self, idx: usize) -> String {
        match idx {
            0 => self
                .departure_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            1 => self.continent.clone(),
            2 => self.flight_status.clone(),
            3 => self.gender.clone(),
            4 => self.age.map(|a| a.to_string()).unwrap_or_default(),
            5 => self.arrival_airport.clone(),
            n => self.extra.get(n - 6).cloned().unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// BookingDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
#[derive(Debug, Clone)]
pub struct BookingDataset {
    /// All bookings, in file order.
    pub records: Vec<BookingRecord>,
    /// Names of the non-required columns, in file order.
    pub extra_columns: Vec<String>,
    /// For each categorical column the sorted set of distinct values.
    pub unique_values: BTreeMap<CategoryColumn, BTreeSet<String>>,
    /// Earliest and latest non-null departure date.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
    /// Rows whose departure date is null.
    pub null_dates: usize,
}

impl BookingDataset {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<BookingRecord>, extra_columns: Vec<String>) -> Self {
        let mut unique_values: BTreeMap<CategoryColumn, BTreeSet<String>> = CategoryColumn::ALL
            .iter()
            .map(|&col| (col, BTreeSet::new()))
            .collect();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;
        let mut null_dates = 0;

        for rec in &records {
            for col in CategoryColumn::ALL {
                if let Some(set) = unique_values.get_mut(&col) {
                    if !set.contains(col.value_of(rec)) {
                        set.insert(col.value_of(rec).to_string());
                    }
                }
            }
            match rec.departure_date {
                Some(d) => {
                    date_bounds = Some(match date_bounds {
                        Some((lo, hi)) => (lo.min(d), hi.max(d)),
                        None => (d, d),
                    });
                }
                None => null_dates += 1,
            }
        }

        BookingDataset {
            records,
            extra_columns,
            unique_values,
            date_bounds,
            null_dates,
        }
    }

    /// Display column names: the required columns first, then the extras.
    pub fn column_names(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.extra_columns.iter().cloned())
            .collect()
    }

    /// Number of bookings.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
