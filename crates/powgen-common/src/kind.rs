//! Energy kinds produced by the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two simulated energy types. Each gets its own output store per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyKind {
    Solar,
    Wind,
}

impl EnergyKind {
    pub const ALL: [EnergyKind; 2] = [EnergyKind::Solar, EnergyKind::Wind];

    /// Stem used in output store names, e.g. `2016_solar_ac_generation`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyKind::Solar => "solar",
            EnergyKind::Wind => "wind",
        }
    }
}

impl fmt::Display for EnergyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(EnergyKind::Solar.to_string(), "solar");
        assert_eq!(EnergyKind::Wind.as_str(), "wind");
    }

    #[test]
    fn test_all_kinds_distinct() {
        assert_eq!(EnergyKind::ALL.len(), 2);
        assert_ne!(EnergyKind::ALL[0], EnergyKind::ALL[1]);
    }
}
