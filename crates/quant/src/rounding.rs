//! Real-to-integer rounding modes

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuantError;

/// How a scaled real value is turned into an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingMode {
    /// Round to nearest, ties away from zero
    #[default]
    NearestTiesAway,
    /// Round to nearest, ties to even (banker's rounding)
    NearestTiesEven,
    /// Truncate toward zero, same as a C float-to-int cast
    TowardZero,
    /// Round toward negative infinity
    Floor,
}

impl RoundingMode {
    /// Apply the rounding mode, returning an integral float
    pub fn apply(self, value: f32) -> f32 {
        match self {
            RoundingMode::NearestTiesAway => value.round(),
            RoundingMode::NearestTiesEven => value.round_ties_even(),
            RoundingMode::TowardZero => value.trunc(),
            RoundingMode::Floor => value.floor(),
        }
    }

    /// Name used in configuration
    pub fn as_str(self) -> &'static str {
        match self {
            RoundingMode::NearestTiesAway => "nearest-away",
            RoundingMode::NearestTiesEven => "nearest-even",
            RoundingMode::TowardZero => "toward-zero",
            RoundingMode::Floor => "floor",
        }
    }
}

impl FromStr for RoundingMode {
    type Err = QuantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest-away" | "nearest" => Ok(RoundingMode::NearestTiesAway),
            "nearest-even" => Ok(RoundingMode::NearestTiesEven),
            "toward-zero" | "truncate" => Ok(RoundingMode::TowardZero),
            "floor" => Ok(RoundingMode::Floor),
            other => Err(QuantError::UnknownRoundingMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties() {
        assert_eq!(RoundingMode::NearestTiesAway.apply(2.5), 3.0);
        assert_eq!(RoundingMode::NearestTiesAway.apply(-2.5), -3.0);
        assert_eq!(RoundingMode::NearestTiesEven.apply(2.5), 2.0);
        assert_eq!(RoundingMode::NearestTiesEven.apply(3.5), 4.0);
    }

    #[test]
    fn test_directed() {
        assert_eq!(RoundingMode::TowardZero.apply(-96.7), -96.0);
        assert_eq!(RoundingMode::TowardZero.apply(96.7), 96.0);
        assert_eq!(RoundingMode::Floor.apply(-96.2), -97.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("floor".parse::<RoundingMode>().unwrap(), RoundingMode::Floor);
        assert_eq!(
            " Toward-Zero ".parse::<RoundingMode>().unwrap(),
            RoundingMode::TowardZero
        );
        assert!(matches!(
            "sideways".parse::<RoundingMode>(),
            Err(QuantError::UnknownRoundingMode(_))
        ));
        for mode in [
            RoundingMode::NearestTiesAway,
            RoundingMode::NearestTiesEven,
            RoundingMode::TowardZero,
            RoundingMode::Floor,
        ] {
            assert_eq!(mode.as_str().parse::<RoundingMode>().unwrap(), mode);
        }
    }
}
