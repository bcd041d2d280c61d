/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → BookingDataset (cached per path)
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ BookingDataset │  Vec<BookingRecord>, distinct values, date bounds
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterCriteria → filtered records
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  six chart tables → DashboardSummary
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
