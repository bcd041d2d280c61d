use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{
    BookingDataset, BookingRecord, AGE, AIRPORT_CONTINENT, ARRIVAL_AIRPORT, DEPARTURE_DATE,
    FLIGHT_STATUS, GENDER, REQUIRED_COLUMNS,
};
use crate::error::{LoadError, LoadResult};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a booking dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` / `.txt` – delimited text with a header row (recommended)
/// * `.json`    – `[{ "Departure Date": "6/28/2022", "Age": 62, ... }, ...]`
/// * `.parquet` – one column per header name
pub fn load_file(path: &Path) -> LoadResult<BookingDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" | "tsv" | "txt" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::info!(
        "Loaded {} bookings from {} ({} extra columns)",
        dataset.len(),
        path.display(),
        dataset.extra_columns.len()
    );
    if dataset.null_dates > 0 {
        log::warn!(
            "{} of {} bookings have no parseable departure date",
            dataset.null_dates,
            dataset.len()
        );
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Dataset cache
// ---------------------------------------------------------------------------

/// Loads each path at most once and hands out shared, read-only datasets.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<BookingDataset>>,
}

impl DatasetCache {
    pub fn get_or_load(&mut self, path: &Path) -> LoadResult<Arc<BookingDataset>> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Some(dataset) = self.entries.get(&key) {
            log::debug!("Dataset cache hit for {}", key.display());
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load_file(path)?);
        self.entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

/// Date layouts tried in order. Month-first wins over day-first.
const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// Parse a departure date, returning `None` for blank or unrecognised text.
pub fn parse_departure_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse an age. Accepts `34` and `34.0`; anything else is `None`.
pub fn parse_age(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if let Ok(age) = s.parse::<u32>() {
        return Some(age);
    }
    whole_age(s.parse().ok()?)
}

/// A float age counts only when it is a non-negative whole number.
fn whole_age(f: f64) -> Option<u32> {
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64).then_some(f as u32)
}

// ---------------------------------------------------------------------------
// Header layout shared by all formats
// ---------------------------------------------------------------------------

/// Where each required column sits, plus every other column in order.
#[derive(Debug)]
struct ColumnLayout {
    /// Indexed like [`REQUIRED_COLUMNS`].
    required: [usize; 6],
    extras: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_headers<S: AsRef<str>>(headers: &[S]) -> LoadResult<Self> {
        let names: Vec<&str> = headers.iter().map(|h| h.as_ref().trim()).collect();

        let mut required = [0usize; 6];
        let mut missing = Vec::new();
        for (slot, wanted) in REQUIRED_COLUMNS.iter().enumerate() {
            match names.iter().position(|name| name == wanted) {
                Some(idx) => required[slot] = idx,
                None => missing.push(wanted.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let extras = names
            .iter()
            .enumerate()
            .filter(|(idx, _)| !required.contains(idx))
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();
        Ok(ColumnLayout { required, extras })
    }

    /// Source index of a required column.
    fn index_of(&self, column: &str) -> usize {
        let slot = REQUIRED_COLUMNS
            .iter()
            .position(|c| *c == column)
            .unwrap_or_default();
        self.required[slot]
    }

    fn extra_columns(&self) -> Vec<String> {
        self.extras.iter().map(|(_, name)| name.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> LoadResult<BookingDataset> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    load_csv_str(&text)
}

/// Parse delimited text. The delimiter is guessed from the header line.
fn load_csv_str(text: &str) -> LoadResult<BookingDataset> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let delimiter = detect_delimiter(text.lines().next().unwrap_or(""));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let layout = ColumnLayout::from_headers(&headers)?;

    let field = |record: &csv::StringRecord, column: &str| -> String {
        record
            .get(layout.index_of(column))
            .unwrap_or("")
            .to_string()
    };

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(BookingRecord {
            departure_date: parse_departure_date(&field(&record, DEPARTURE_DATE)),
            continent: field(&record, AIRPORT_CONTINENT),
            flight_status: field(&record, FLIGHT_STATUS),
            gender: field(&record, GENDER),
            age: parse_age(&field(&record, AGE)),
            arrival_airport: field(&record, ARRIVAL_AIRPORT),
            extra: layout
                .extras
                .iter()
                .map(|(idx, _)| record.get(*idx).unwrap_or("").to_string())
                .collect(),
        });
    }

    Ok(BookingDataset::from_records(records, layout.extra_columns()))
}

/// Pick the separator that occurs most often in the header line.
fn detect_delimiter(header_line: &str) -> u8 {
    let mut best = b',';
    let mut best_count = 0;
    for sep in [b',', b';', b'\t', b'|'] {
        let count = header_line.bytes().filter(|&b| b == sep).count();
        if count > best_count {
            best = sep;
            best_count = count;
        }
    }
    best
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Departure Date": 1656374400000, "Airport Continent": "NAM", "Age": 62, ... },
///   ...
/// ]
/// ```
///
/// Dates may be text or epoch milliseconds.
fn load_json(path: &Path) -> LoadResult<BookingDataset> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    load_json_str(&text)
}

fn load_json_str(text: &str) -> LoadResult<BookingDataset> {
    let rows: Vec<JsonValue> = serde_json::from_str(text)?;

    // Union of keys over every object, in first-seen order.
    let mut headers: Vec<String> = Vec::new();
    for obj in rows.iter().filter_map(JsonValue::as_object) {
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut records = Vec::with_capacity(rows.len());
    for (row, value) in rows.iter().enumerate() {
        let obj = value.as_object().ok_or_else(|| LoadError::InvalidRow {
            row,
            message: "not a JSON object".to_string(),
        })?;
        let text = |column: &str| json_text(obj.get(column));

        records.push(BookingRecord {
            departure_date: obj.get(DEPARTURE_DATE).and_then(json_date),
            continent: text(AIRPORT_CONTINENT),
            flight_status: text(FLIGHT_STATUS),
            gender: text(GENDER),
            age: obj.get(AGE).and_then(json_age),
            arrival_airport: text(ARRIVAL_AIRPORT),
            extra: layout
                .extras
                .iter()
                .map(|(_, name)| json_text(obj.get(name)))
                .collect(),
        });
    }

    Ok(BookingDataset::from_records(records, layout.extra_columns()))
}

fn json_text(val: Option<&JsonValue>) -> String {
    match val {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

fn json_date(val: &JsonValue) -> Option<NaiveDate> {
    match val {
        JsonValue::String(s) => parse_departure_date(s),
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

fn json_age(val: &JsonValue) -> Option<u32> {
    match val {
        JsonValue::Number(n) => match n.as_u64() {
            Some(i) => u32::try_from(i).ok(),
            None => n.as_f64().and_then(whole_age),
        },
        JsonValue::String(s) => parse_age(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file whose column names match the CSV header.
///
/// `Departure Date` may be a Date32/Date64/Timestamp column or text. Works
/// with files written by both **Pandas** (`df.to_parquet()`) and **Polars**.
fn load_parquet(path: &Path) -> LoadResult<BookingDataset> {
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let layout = ColumnLayout::from_headers(&headers)?;
    let reader = builder.build()?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let column = |name: &str| batch.column(layout.index_of(name));

        let dates = date_column(DEPARTURE_DATE, column(DEPARTURE_DATE))?;
        let ages = age_column(AGE, column(AGE))?;
        let continents = text_column(column(AIRPORT_CONTINENT))?;
        let statuses = text_column(column(FLIGHT_STATUS))?;
        let genders = text_column(column(GENDER))?;
        let airports = text_column(column(ARRIVAL_AIRPORT))?;
        let extras = layout
            .extras
            .iter()
            .map(|(idx, _)| text_column(batch.column(*idx)))
            .collect::<LoadResult<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            records.push(BookingRecord {
                departure_date: dates[row],
                continent: continents[row].clone(),
                flight_status: statuses[row].clone(),
                gender: genders[row].clone(),
                age: ages[row],
                arrival_airport: airports[row].clone(),
                extra: extras.iter().map(|col| col[row].clone()).collect(),
            });
        }
    }

    Ok(BookingDataset::from_records(records, layout.extra_columns()))
}

// -- Arrow helpers --

fn is_text(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
    )
}

/// Render any castable column as text; nulls become empty strings.
fn text_column(col: &ArrayRef) -> LoadResult<Vec<String>> {
    let utf8 = cast(col.as_ref(), &DataType::Utf8)?;
    let strings = utf8.as_string::<i32>();
    Ok((0..strings.len())
        .map(|i| {
            if strings.is_null(i) {
                String::new()
            } else {
                strings.value(i).trim().to_string()
            }
        })
        .collect())
}

fn date_column(name: &str, col: &ArrayRef) -> LoadResult<Vec<Option<NaiveDate>>> {
    match col.data_type() {
        dt if is_text(dt) => Ok(text_column(col)?
            .iter()
            .map(|s| parse_departure_date(s))
            .collect()),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            let days = cast(col.as_ref(), &DataType::Date32)?;
            let days = days.as_primitive::<Date32Type>();
            Ok((0..days.len())
                .map(|i| {
                    if days.is_null(i) {
                        None
                    } else {
                        days.value_as_date(i)
                    }
                })
                .collect())
        }
        other => Err(LoadError::UnsupportedColumnType {
            column: name.to_string(),
            data_type: other.to_string(),
        }),
    }
}

fn age_column(name: &str, col: &ArrayRef) -> LoadResult<Vec<Option<u32>>> {
    match col.data_type() {
        dt if is_text(dt) => Ok(text_column(col)?.iter().map(|s| parse_age(s)).collect()),
        dt if dt.is_floating() => {
            let floats = cast(col.as_ref(), &DataType::Float64)?;
            let floats = floats.as_primitive::<Float64Type>();
            Ok((0..floats.len())
                .map(|i| {
                    if floats.is_null(i) {
                        None
                    } else {
                        whole_age(floats.value(i))
                    }
                })
                .collect())
        }
        dt if dt.is_integer() => {
            let ints = cast(col.as_ref(), &DataType::Int64)?;
            let ints = ints.as_primitive::<Int64Type>();
            Ok((0..ints.len())
                .map(|i| {
                    if ints.is_null(i) {
                        None
                    } else {
                        u32::try_from(ints.value(i)).ok()
                    }
                })
                .collect())
        }
        other => Err(LoadError::UnsupportedColumnType {
            column: name.to_string(),
            data_type: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{
        Date32Array, Float64Array, Int64Array, StringArray, TimestampMillisecondArray,
    };
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::{Builder, NamedTempFile};

    use super::*;
    use crate::data::model::CategoryColumn;

    const HEADER: &str = "Passenger ID,Gender,Age,Airport Continent,Departure Date,Arrival Airport,Pilot Name,Flight Status";

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_common_date_layouts() {
        assert_eq!(parse_departure_date("6/28/2022"), Some(date(2022, 6, 28)));
        assert_eq!(parse_departure_date("12-26-2022"), Some(date(2022, 12, 26)));
        assert_eq!(parse_departure_date("2022-01-19"), Some(date(2022, 1, 19)));
        assert_eq!(parse_departure_date(" 2022/03/05 "), Some(date(2022, 3, 5)));
        assert_eq!(
            parse_departure_date("2022-04-01T08:30:00Z"),
            Some(date(2022, 4, 1))
        );
        assert_eq!(
            parse_departure_date("2022-04-01 08:30:00"),
            Some(date(2022, 4, 1))
        );
    }

    #[test]
    fn unparseable_dates_become_none() {
        assert_eq!(parse_departure_date(""), None);
        assert_eq!(parse_departure_date("not a date"), None);
        assert_eq!(parse_departure_date("13/45/2022"), None);
    }

    #[test]
    fn parses_ages() {
        assert_eq!(parse_age("62"), Some(62));
        assert_eq!(parse_age(" 34.0 "), Some(34));
        assert_eq!(parse_age("34.5"), None);
        assert_eq!(parse_age("-3"), None);
        assert_eq!(parse_age(""), None);
        assert_eq!(parse_age("old"), None);
    }

    #[test]
    fn detects_delimiters() {
        assert_eq!(detect_delimiter("a,b,c"), b',');
        assert_eq!(detect_delimiter("a;b;c"), b';');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("a|b|c"), b'|');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn csv_loads_typed_fields_and_extras() {
        let text = format!(
            "{HEADER}\n\
             ABVWIQ,Female,62,NAM,6/28/2022,CXF,Fransisco Hazeldine,On Time\n\
             jkXXAX,Male,62,AS,12-26-2022,YCO,Marla Parsonage,On Time\n\
             CdUz2g,Male,67,AS,not-a-date,GNB,Rhonda Amber,Delayed\n"
        );
        let ds = load_csv_str(&text).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.extra_columns, ["Passenger ID", "Pilot Name"]);
        let first = &ds.records[0];
        assert_eq!(first.departure_date, Some(date(2022, 6, 28)));
        assert_eq!(first.gender, "Female");
        assert_eq!(first.age, Some(62));
        assert_eq!(first.arrival_airport, "CXF");
        assert_eq!(first.extra, ["ABVWIQ", "Fransisco Hazeldine"]);

        // The bad date nulls the field, not the row.
        assert_eq!(ds.records[2].departure_date, None);
        assert_eq!(ds.records[2].flight_status, "Delayed");
        assert_eq!(ds.null_dates, 1);
        assert_eq!(ds.date_bounds, Some((date(2022, 6, 28), date(2022, 12, 26))));
    }

    #[test]
    fn csv_with_semicolons_and_padded_headers() {
        let text = "Departure Date ; Airport Continent ; Flight Status ; Gender ; Age ; Arrival Airport\n\
                    2022-01-19;EU;Cancelled;Male;;LHR\n";
        let ds = load_csv_str(text).unwrap();
        assert_eq!(ds.len(), 1);
        assert!(ds.extra_columns.is_empty());
        assert_eq!(ds.records[0].continent, "EU");
        assert_eq!(ds.records[0].age, None);
        assert_eq!(ds.records[0].arrival_airport, "LHR");
    }

    #[test]
    fn csv_missing_columns_are_listed() {
        let err = load_csv_str("Departure Date,Gender,Age\n6/28/2022,Male,30\n").unwrap_err();
        match err {
            LoadError::MissingColumns(missing) => assert_eq!(
                missing,
                ["Airport Continent", "Flight Status", "Arrival Airport"]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_csv_has_no_schema() {
        assert!(matches!(
            load_csv_str(""),
            Err(LoadError::MissingColumns(missing)) if missing.len() == REQUIRED_COLUMNS.len()
        ));
    }

    #[test]
    fn csv_ragged_row_fails_the_load() {
        let text = format!("{HEADER}\nABVWIQ,Female,62\n");
        assert!(matches!(load_csv_str(&text), Err(LoadError::Csv(_))));
    }

    #[test]
    fn json_records_with_epoch_dates() {
        let text = r#"[
            {"Departure Date": 1656374400000, "Airport Continent": "NAM", "Flight Status": "On Time",
             "Gender": "Female", "Age": 62, "Arrival Airport": "CXF", "Nationality": "Japan"},
            {"Departure Date": "garbage", "Airport Continent": "EU", "Flight Status": "Delayed",
             "Gender": "Male", "Age": null, "Arrival Airport": "LHR", "Nationality": null}
        ]"#;
        let ds = load_json_str(text).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.extra_columns, ["Nationality"]);
        assert_eq!(ds.records[0].departure_date, Some(date(2022, 6, 28)));
        assert_eq!(ds.records[0].age, Some(62));
        assert_eq!(ds.records[0].extra, ["Japan"]);
        assert_eq!(ds.records[1].departure_date, None);
        assert_eq!(ds.records[1].age, None);
        assert_eq!(ds.records[1].extra, [""]);
    }

    #[test]
    fn json_rows_must_be_objects() {
        let text = r#"[
            {"Departure Date": "2022-01-01", "Airport Continent": "EU", "Flight Status": "Delayed",
             "Gender": "Male", "Age": 3, "Arrival Airport": "LHR"},
            42
        ]"#;
        assert!(matches!(
            load_json_str(text),
            Err(LoadError::InvalidRow { row: 1, .. })
        ));
    }

    #[test]
    fn json_headers_union_keys_across_rows() {
        let text = r#"[
            {"Departure Date": "2022-01-01", "Airport Continent": "EU", "Flight Status": "Delayed",
             "Gender": "Male", "Arrival Airport": "LHR"},
            {"Departure Date": "2022-01-02", "Airport Continent": "AS", "Flight Status": "On Time",
             "Gender": "Female", "Age": 41, "Arrival Airport": "NRT", "Pilot Name": "Rhonda Amber"}
        ]"#;
        let ds = load_json_str(text).unwrap();

        assert_eq!(ds.extra_columns, ["Pilot Name"]);
        assert_eq!(ds.records[0].age, None);
        assert_eq!(ds.records[0].extra, [""]);
        assert_eq!(ds.records[1].age, Some(41));
        assert_eq!(ds.records[1].extra, ["Rhonda Amber"]);
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let file = temp_file(".csv", &format!("{HEADER}\nA,Male,30,EU,1/2/2022,LHR,P,On Time\n"));
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(
            ds.unique_values[&CategoryColumn::Continent]
                .iter()
                .collect::<Vec<_>>(),
            ["EU"]
        );

        let other = temp_file(".xlsx", "");
        assert!(matches!(
            load_file(other.path()),
            Err(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(matches!(load_file(&path), Err(LoadError::Io { .. })));
    }

    #[test]
    fn cache_loads_each_path_once() {
        let mut file = temp_file(".csv", &format!("{HEADER}\nA,Male,30,EU,1/2/2022,LHR,P,On Time\n"));
        let mut cache = DatasetCache::default();

        let first = cache.get_or_load(file.path()).unwrap();

        // A second request must not touch the file again.
        file.as_file_mut().set_len(0).unwrap();
        let second = cache.get_or_load(file.path()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let file = temp_file(".csv", "Gender\nMale\n");
        let mut cache = DatasetCache::default();
        assert!(cache.get_or_load(file.path()).is_err());
        assert_eq!(cache.len(), 0);
    }

    // -- Parquet --

    fn parquet_file(columns: Vec<(&str, ArrayRef)>) -> NamedTempFile {
        let batch = RecordBatch::try_from_iter(columns).unwrap();
        let file = Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    /// Required columns around the given date and age arrays.
    fn booking_columns(dates: ArrayRef, ages: ArrayRef) -> Vec<(&'static str, ArrayRef)> {
        let rows = dates.len();
        let text = |value: &str| Arc::new(StringArray::from(vec![value; rows])) as ArrayRef;
        vec![
            (DEPARTURE_DATE, dates),
            (AIRPORT_CONTINENT, text("EU")),
            (FLIGHT_STATUS, text("On Time")),
            (GENDER, text("Female")),
            (AGE, ages),
            (ARRIVAL_AIRPORT, text("LHR")),
        ]
    }

    #[test]
    fn parquet_date32_dates_and_int_ages() {
        // 19171 days after the epoch is 2022-06-28.
        let dates = Arc::new(Date32Array::from(vec![Some(19171), None])) as ArrayRef;
        let ages = Arc::new(Int64Array::from(vec![Some(62), Some(-3)])) as ArrayRef;
        let file = parquet_file(booking_columns(dates, ages));

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].departure_date, Some(date(2022, 6, 28)));
        assert_eq!(ds.records[1].departure_date, None);
        assert_eq!(ds.records[0].age, Some(62));
        assert_eq!(ds.records[1].age, None);
        assert_eq!(ds.records[0].continent, "EU");
        assert_eq!(ds.null_dates, 1);
    }

    #[test]
    fn parquet_timestamp_dates_keep_the_day() {
        // 2022-06-28 08:30:00 UTC
        let dates =
            Arc::new(TimestampMillisecondArray::from(vec![Some(1_656_405_000_000)])) as ArrayRef;
        let ages = Arc::new(Int64Array::from(vec![Some(30)])) as ArrayRef;
        let file = parquet_file(booking_columns(dates, ages));

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.records[0].departure_date, Some(date(2022, 6, 28)));
    }

    #[test]
    fn parquet_text_dates_and_float_ages() {
        let dates = Arc::new(StringArray::from(vec!["6/28/2022", "TBD", "2022-01-19"])) as ArrayRef;
        let ages = Arc::new(Float64Array::from(vec![Some(34.0), Some(34.5), None])) as ArrayRef;
        let mut columns = booking_columns(dates, ages);
        columns.push((
            "Nationality",
            Arc::new(StringArray::from(vec!["Japan", "Brazil", "France"])) as ArrayRef,
        ));
        let file = parquet_file(columns);

        let ds = load_file(file.path()).unwrap();
        let dates: Vec<_> = ds.records.iter().map(|r| r.departure_date).collect();
        assert_eq!(dates, [Some(date(2022, 6, 28)), None, Some(date(2022, 1, 19))]);

        let ages: Vec<_> = ds.records.iter().map(|r| r.age).collect();
        assert_eq!(ages, [Some(34), None, None]);

        assert_eq!(ds.extra_columns, ["Nationality"]);
        assert_eq!(ds.records[1].extra, ["Brazil"]);
    }

    #[test]
    fn parquet_missing_columns_are_listed() {
        let dates = Arc::new(StringArray::from(vec!["6/28/2022"])) as ArrayRef;
        let ages = Arc::new(Int64Array::from(vec![Some(30)])) as ArrayRef;
        let columns = booking_columns(dates, ages)
            .into_iter()
            .filter(|(name, _)| *name != GENDER && *name != ARRIVAL_AIRPORT)
            .collect();
        let file = parquet_file(columns);

        match load_file(file.path()) {
            Err(LoadError::MissingColumns(missing)) => {
                assert_eq!(missing, [GENDER, ARRIVAL_AIRPORT]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }
}
