//! Solar geometry and irradiance decomposition.
//!
//! Splits hourly global horizontal irradiance (GHI) into direct normal (DNI)
//! and diffuse horizontal (DHI) components:
//!
//! 1. Solar geometry per day: equation of time, declination, hour angles and
//!    the analytical zenith angle.
//! 2. DISC: clearness index and air mass give a first DNI estimate.
//! 3. DIRINT: the DISC estimate is scaled by a Perez coefficient looked up
//!    from the zenith-independent clearness index, its hour-to-hour
//!    variability and the zenith angle.
//! 4. `DHI = GHI - DNI * cos(zenith)`.
//!
//! All angles crossing the public API are documented with their unit; most
//! take degrees, the analytical zenith works in radians.

pub mod atmosphere;
mod coefficients;
pub mod decompose;
pub mod dirint;
pub mod disc;
pub mod error;
pub mod geometry;

pub use atmosphere::relative_airmass_kasten1966;
pub use decompose::{decompose_day, DayInput, DayIrradiance};
pub use dirint::dirint;
pub use disc::{clearness_index, disc, DiscOutput};
pub use error::{IrradianceError, IrradianceResult};
pub use geometry::{
    declination_spencer71, equation_of_time_pvcdrom, extra_radiation_spencer, hour_angle,
    solar_zenith_analytical,
};
