//! Per-location extraction of raw resource series.

use tracing::debug;

use crate::channel::Channel;
use crate::dataset::ResourceDataset;
use crate::error::{ReaderError, ReaderResult};

/// Every raw hourly series for one location, in archive units.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResourceBundle {
    /// Surface shortwave flux, W/m²
    pub ghi: Vec<f64>,
    pub u2m: Vec<f64>,
    pub v2m: Vec<f64>,
    pub u10m: Vec<f64>,
    pub v10m: Vec<f64>,
    pub u50m: Vec<f64>,
    pub v50m: Vec<f64>,
    /// 2 m temperature, K
    pub t2m: Vec<f64>,
    /// Surface pressure, Pa
    pub ps: Vec<f64>,
}

impl RawResourceBundle {
    /// Common length of all series.
    pub fn len(&self) -> usize {
        self.ghi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ghi.is_empty()
    }
}

/// 10 m and 50 m wind components for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct WindPair {
    pub u10m: Vec<f64>,
    pub v10m: Vec<f64>,
    pub u50m: Vec<f64>,
    pub v50m: Vec<f64>,
}

/// Read every channel for the location at `index`.
///
/// All channels are checked for presence before any data is read, so a
/// misconfigured archive fails with `MissingVariable` up front.
pub fn extract_raw_bundle<D: ResourceDataset + ?Sized>(
    dataset: &D,
    index: usize,
) -> ReaderResult<RawResourceBundle> {
    require_channels(dataset, &Channel::ALL)?;
    dataset.check_index(index)?;

    let bundle = RawResourceBundle {
        ghi: dataset.read_location(Channel::Swgdn, index)?,
        u2m: dataset.read_location(Channel::U2m, index)?,
        v2m: dataset.read_location(Channel::V2m, index)?,
        u10m: dataset.read_location(Channel::U10m, index)?,
        v10m: dataset.read_location(Channel::V10m, index)?,
        u50m: dataset.read_location(Channel::U50m, index)?,
        v50m: dataset.read_location(Channel::V50m, index)?,
        t2m: dataset.read_location(Channel::T2m, index)?,
        ps: dataset.read_location(Channel::Ps, index)?,
    };

    let n = bundle.ghi.len();
    for (channel, series) in [
        (Channel::U2m, &bundle.u2m),
        (Channel::V2m, &bundle.v2m),
        (Channel::U10m, &bundle.u10m),
        (Channel::V10m, &bundle.v10m),
        (Channel::U50m, &bundle.u50m),
        (Channel::V50m, &bundle.v50m),
        (Channel::T2m, &bundle.t2m),
        (Channel::Ps, &bundle.ps),
    ] {
        check_len(channel, series.len(), n)?;
    }

    debug!(index = index, samples = n, "Extracted raw resource bundle");
    Ok(bundle)
}

/// Read only the 10 m and 50 m wind components at `index`.
pub fn extract_wind_pair<D: ResourceDataset + ?Sized>(
    dataset: &D,
    index: usize,
) -> ReaderResult<WindPair> {
    require_channels(dataset, &Channel::WIND_SHEAR)?;
    dataset.check_index(index)?;

    let pair = WindPair {
        u10m: dataset.read_location(Channel::U10m, index)?,
        v10m: dataset.read_location(Channel::V10m, index)?,
        u50m: dataset.read_location(Channel::U50m, index)?,
        v50m: dataset.read_location(Channel::V50m, index)?,
    };
    let n = pair.u50m.len();
    check_len(Channel::U10m, pair.u10m.len(), n)?;
    check_len(Channel::V10m, pair.v10m.len(), n)?;
    check_len(Channel::V50m, pair.v50m.len(), n)?;
    Ok(pair)
}

fn require_channels<D: ResourceDataset + ?Sized>(
    dataset: &D,
    channels: &[Channel],
) -> ReaderResult<()> {
    match channels.iter().find(|c| !dataset.has_channel(**c)) {
        Some(missing) => Err(ReaderError::MissingVariable(
            missing.variable_name().to_string(),
        )),
        None => Ok(()),
    }
}

fn check_len(channel: Channel, got: usize, expected: usize) -> ReaderResult<()> {
    if got != expected {
        return Err(ReaderError::invalid_format(format!(
            "{} has {} samples, expected {}",
            channel, got, expected
        )));
    }
    Ok(())
}
