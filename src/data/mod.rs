/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → CrimeDataset (once, at startup)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ CrimeDataset  │  Vec<CrimeRecord>, unique values, coordinates
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  month range + crime types → matching rows
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group / sort / slice per view
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
