//! bojstat_rust
//!
//! A lightweight Rust library for retrieving time-series statistics from the
//! Bank of Japan time-series data search API, reshaped into tidy long-format
//! rows. Pairs with the `bojstat` CLI.
//!
//! ### Features
//! - Fetch observations by series code or by hierarchical position, with
//!   automatic chunking (250 codes per request) and continuation-token
//!   pagination
//! - Fetch and search per-database series metadata
//! - Built-in request spacing to keep load on the server down
//! - Save results as CSV or JSON in a tidy, analysis-friendly schema
//! - Quick per-series summary statistics (min, max, mean, median)
//!
//! ### Example
//! ```no_run
//! use bojstat_rs::{Client, Lang};
//!
//! let client = Client::new(Lang::En);
//! let rows = client.get_data_all("FM08", &["FXERD01".into()], Some("202401"), Some("202412"))?;
//! bojstat_rs::storage::save_csv(&rows, "fx_2024.csv")?;
//! let stats = bojstat_rs::stats::grouped_summary(&rows);
//! println!("{:#?}", stats);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod reference;
pub mod stats;
pub mod storage;

pub use api::{Client, HttpTransport, Transport};
pub use error::{Error, MAX_CODES_PER_REQUEST};
pub use models::{Frequency, Lang, LayerSpec, MetadataRow, ObservationRow};
