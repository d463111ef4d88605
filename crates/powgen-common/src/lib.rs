//! Common types and utilities shared across the power generation crates.

pub mod calendar;
pub mod error;
pub mod grid;
pub mod kind;

pub use calendar::{month_day, DAYS_PER_YEAR, HOURS_PER_DAY};
pub use error::{GridError, GridResult};
pub use grid::{
    build_coordinates, coordinates_from_bounds, flat_index, unflatten_index, GridConfig,
};
pub use kind::EnergyKind;
