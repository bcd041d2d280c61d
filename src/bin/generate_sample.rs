use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Days, NaiveDate};
use clap::Parser;
use parquet::arrow::ArrowWriter;

const HEADER: [&str; 10] = [
    "Passenger ID",
    "Gender",
    "Age",
    "Nationality",
    "Airport Name",
    "Airport Continent",
    "Departure Date",
    "Arrival Airport",
    "Pilot Name",
    "Flight Status",
];

const CONTINENTS: [(&str, &[(&str, &str)]); 5] = [
    ("NAM", &[("JFK", "John F Kennedy International"), ("LAX", "Los Angeles International"), ("YYZ", "Toronto Pearson")]),
    ("EU", &[("LHR", "Heathrow"), ("CDG", "Charles de Gaulle"), ("FRA", "Frankfurt am Main")]),
    ("AS", &[("NRT", "Narita International"), ("SIN", "Singapore Changi"), ("DXB", "Dubai International")]),
    ("AF", &[("JNB", "O. R. Tambo International"), ("CAI", "Cairo International")]),
    ("OC", &[("SYD", "Sydney Kingsford Smith"), ("AKL", "Auckland")]),
];

const STATUSES: [&str; 3] = ["On Time", "Delayed", "Cancelled"];
const GENDERS: [&str; 2] = ["Male", "Female"];
const NATIONALITIES: [&str; 6] = ["Japan", "Brazil", "France", "Nigeria", "Canada", "India"];
const PILOTS: [&str; 4] = ["Edithe Leggis", "Fransisco Hazeldine", "Marla Parsonage", "Rhonda Amber"];

#[derive(Parser)]
#[command(name = "generate_sample")]
#[command(about = "Write a synthetic airline booking dataset (.csv or .parquet)")]
struct Args {
    /// Output file; `.parquet`/`.pq` writes Parquet, anything else CSV
    #[arg(default_value = "sample_bookings.csv")]
    output: PathBuf,

    /// Number of bookings
    #[arg(long, default_value_t = 5000)]
    rows: usize,

    /// Seed for the deterministic generator
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

/// One generated row, text-encoded the way the real dataset is.
struct SampleRow {
    passenger_id: String,
    gender: &'static str,
    age: Option<i64>,
    nationality: &'static str,
    airport_name: &'static str,
    continent: &'static str,
    departure_date: String,
    arrival_airport: &'static str,
    pilot: &'static str,
    status: &'static str,
}

impl SampleRow {
    fn fields(&self) -> [String; 10] {
        [
            self.passenger_id.clone(),
            self.gender.to_string(),
            self.age.map(|a| a.to_string()).unwrap_or_default(),
            self.nationality.to_string(),
            self.airport_name.to_string(),
            self.continent.to_string(),
            self.departure_date.clone(),
            self.arrival_airport.to_string(),
            self.pilot.to_string(),
            self.status.to_string(),
        ]
    }
}

fn generate_rows(count: usize, rng: &mut SimpleRng) -> Vec<SampleRow> {
    let first_day = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default();
    let id_chars: Vec<char> = ('A'..='Z').chain('a'..='z').chain('0'..='9').collect();

    (0..count)
        .map(|_| {
            let (continent, airports) = *rng.pick(&CONTINENTS);
            let (code, name) = *rng.pick(airports);

            // Busier summer months.
            let day = if rng.next_f64() < 0.3 {
                150 + rng.below(90)
            } else {
                rng.below(365)
            };
            let date = first_day + Days::new(day as u64);
            // A few malformed dates, in the mixed layouts of the real file.
            let departure_date = match rng.below(100) {
                0 => "TBD".to_string(),
                1..=40 => date.format("%m-%d-%Y").to_string(),
                _ => date.format("%-m/%-d/%Y").to_string(),
            };

            let age = if rng.below(50) == 0 {
                None
            } else {
                Some(1 + rng.below(90) as i64)
            };

            SampleRow {
                passenger_id: (0..6).map(|_| *rng.pick(&id_chars)).collect(),
                gender: *rng.pick(&GENDERS),
                age,
                nationality: *rng.pick(&NATIONALITIES),
                airport_name: name,
                continent,
                departure_date,
                arrival_airport: code,
                pilot: *rng.pick(&PILOTS),
                status: *rng.pick(&STATUSES),
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(HEADER).context("writing header")?;
    for row in rows {
        writer.write_record(row.fields()).context("writing row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let text_column = |idx: usize| -> ArrayRef {
        Arc::new(StringArray::from(
            rows.iter()
                .map(|r| r.fields()[idx].clone())
                .collect::<Vec<String>>(),
        ))
    };

    let mut fields = Vec::with_capacity(HEADER.len());
    let mut columns = Vec::with_capacity(HEADER.len());
    for (idx, name) in HEADER.iter().enumerate() {
        if *name == "Age" {
            fields.push(Field::new(*name, DataType::Int64, true));
            columns.push(Arc::new(Int64Array::from(
                rows.iter().map(|r| r.age).collect::<Vec<Option<i64>>>(),
            )) as ArrayRef);
        } else {
            fields.push(Field::new(*name, DataType::Utf8, false));
            columns.push(text_column(idx));
        }
    }

    let schema = Arc::new(Schema::new(fields));
    let batch =
        RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let rows = generate_rows(args.rows, &mut rng);

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "parquet" | "pq" => write_parquet(&args.output, &rows)?,
        _ => write_csv(&args.output, &rows)?,
    }

    println!("Wrote {} bookings to {}", rows.len(), args.output.display());
    Ok(())
}
