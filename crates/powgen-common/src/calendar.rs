//! Fixed 365-day calendar used by the resource files.
//!
//! Leap days are never represented: an hourly series always covers 365 days
//! and day `n` maps to the same month and day in every year.

use crate::error::{GridError, GridResult};

pub const DAYS_PER_YEAR: usize = 365;
pub const HOURS_PER_DAY: usize = 24;

/// Days elapsed before the first of each month.
const CUMULATIVE_DAYS: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Convert a 1-based day of year into `(month, day)`, both 1-based.
pub fn month_day(day_of_year: i64) -> GridResult<(u32, u32)> {
    if !(1..=DAYS_PER_YEAR as i64).contains(&day_of_year) {
        return Err(GridError::InvalidDayOfYear(day_of_year));
    }

    let month = CUMULATIVE_DAYS
        .iter()
        .rposition(|&before| day_of_year > before)
        .ok_or(GridError::InvalidDayOfYear(day_of_year))?;
    let day = day_of_year - CUMULATIVE_DAYS[month];

    Ok((month as u32 + 1, day as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_day_boundaries() {
        assert_eq!(month_day(1).unwrap(), (1, 1));
        assert_eq!(month_day(31).unwrap(), (1, 31));
        assert_eq!(month_day(32).unwrap(), (2, 1));
        assert_eq!(month_day(59).unwrap(), (2, 28));
        assert_eq!(month_day(60).unwrap(), (3, 1));
        assert_eq!(month_day(334).unwrap(), (11, 30));
        assert_eq!(month_day(335).unwrap(), (12, 1));
        assert_eq!(month_day(365).unwrap(), (12, 31));
    }

    #[test]
    fn test_month_day_out_of_range() {
        assert_eq!(month_day(0), Err(GridError::InvalidDayOfYear(0)));
        assert_eq!(month_day(366), Err(GridError::InvalidDayOfYear(366)));
        assert_eq!(month_day(-4), Err(GridError::InvalidDayOfYear(-4)));
    }

    #[test]
    fn test_month_day_covers_every_day_once() {
        let mut previous = (0, 0);
        for doy in 1..=365 {
            let (m, d) = month_day(doy).unwrap();
            assert!((m, d) > previous);
            previous = (m, d);
        }
        assert_eq!(previous, (12, 31));
    }
}
