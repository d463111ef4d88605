//! Output grid stores for simulated generation.
//!
//! Each simulated year produces one store per energy kind, dimensioned
//! `(lat, lon, hour)` and pre-filled with NaN placeholders. Cells are written
//! once, as a whole hourly series.

pub mod config;
pub mod error;
pub mod store;

pub use config::{StoreConfig, ZarrCompression};
pub use error::{Result, StoreError};
pub use store::{ensure_grid_store, store_exists, store_path, OutputGridStore};
