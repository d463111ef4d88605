//! Archive channels consumed by the pipeline.

use std::fmt;

/// Hourly variables read from the reanalysis archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    /// Surface incoming shortwave flux (W/m²)
    Swgdn,
    /// 2 m eastward wind (m/s)
    U2m,
    /// 2 m northward wind (m/s)
    V2m,
    /// 10 m eastward wind (m/s)
    U10m,
    /// 10 m northward wind (m/s)
    V10m,
    /// 50 m eastward wind (m/s)
    U50m,
    /// 50 m northward wind (m/s)
    V50m,
    /// 2 m air temperature (K)
    T2m,
    /// Surface pressure (Pa)
    Ps,
}

impl Channel {
    pub const ALL: [Channel; 9] = [
        Channel::Swgdn,
        Channel::U2m,
        Channel::V2m,
        Channel::U10m,
        Channel::V10m,
        Channel::U50m,
        Channel::V50m,
        Channel::T2m,
        Channel::Ps,
    ];

    /// Channels needed for the 100 m shear extrapolation.
    pub const WIND_SHEAR: [Channel; 4] =
        [Channel::U10m, Channel::V10m, Channel::U50m, Channel::V50m];

    /// Variable name inside the archive.
    pub fn variable_name(&self) -> &'static str {
        match self {
            Channel::Swgdn => "SWGDN",
            Channel::U2m => "U2M",
            Channel::V2m => "V2M",
            Channel::U10m => "U10M",
            Channel::V10m => "V10M",
            Channel::U50m => "U50M",
            Channel::V50m => "V50M",
            Channel::T2m => "T2M",
            Channel::Ps => "PS",
        }
    }

    /// Look up a channel by archive variable name.
    pub fn from_variable_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.variable_name() == name)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.variable_name())
    }
}
