//! Data layer: core types, loading, and filtering.
//!
//! Architecture:
//! ```text
//!  .xlsx / .xls / .ods / .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  Working_Sheet, columns A..AI, ≤ 80,000 rows → RecordSet
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ RecordSet  │  column names + Vec<Record>
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  name search + multi-selects → filtered RecordSet
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
