use std::fmt::Display;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

/// Number of `Points` units in one whole loyalty point.
pub const POINTS_SCALE: i64 = 100;

//--------------------------------------       Points        ---------------------------------------------------------
/// A loyalty-point amount, stored as a whole number of hundredths.
///
/// The accrual system reports amounts as JSON numbers (e.g. `500` or `729.98`). These are converted to the nearest
/// hundredth on the way in and rendered as a number with two decimals on the way out.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash)]
#[sqlx(transparent)]
pub struct Points(i64);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as loyalty points: {0}")]
pub struct PointsConversionError(String);

impl From<i64> for Points {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<f64> for Points {
    type Error = PointsConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(PointsConversionError(format!("{value} is not a finite number")));
        }
        if value < 0.0 {
            return Err(PointsConversionError(format!("{value} is negative")));
        }
        let scaled = (value * POINTS_SCALE as f64).round();
        if scaled > i64::MAX as f64 {
            return Err(PointsConversionError(format!("{value} is too large")));
        }
        #[allow(clippy::cast_possible_truncation)]
        let hundredths = scaled as i64;
        Ok(Self(hundredths))
    }
}

impl Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = POINTS_SCALE.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / scale, abs % scale)
    }
}

impl Points {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_whole(points: i64) -> Self {
        Self(points * POINTS_SCALE)
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / POINTS_SCALE as f64
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Points {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Points::try_from(value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Points::from(50_000).to_string(), "500.00");
        assert_eq!(Points::from(72_998).to_string(), "729.98");
        assert_eq!(Points::from(5).to_string(), "0.05");
        assert_eq!(Points::from(-150).to_string(), "-1.50");
        assert_eq!(Points::default().to_string(), "0.00");
    }

    #[test]
    fn from_float_rounds_to_hundredths() {
        assert_eq!(Points::try_from(500.0).unwrap(), Points::from_whole(500));
        assert_eq!(Points::try_from(0.1).unwrap(), Points::from(10));
        assert_eq!(Points::try_from(0.125).unwrap(), Points::from(13));
        assert_eq!(Points::try_from(0.004).unwrap(), Points::default());
    }

    #[test]
    fn from_float_rejects_nonsense() {
        assert!(Points::try_from(-1.0).is_err());
        assert!(Points::try_from(f64::NAN).is_err());
        assert!(Points::try_from(f64::INFINITY).is_err());
        assert!(Points::try_from(1e300).is_err());
    }

    #[test]
    fn json() {
        let p: Points = serde_json::from_str("500").unwrap();
        assert_eq!(p, Points::from_whole(500));
        let p: Points = serde_json::from_str("729.98").unwrap();
        assert_eq!(p.value(), 72_998);
        assert_eq!(serde_json::to_string(&Points::from(72_998)).unwrap(), "729.98");
        assert!(serde_json::from_str::<Points>("-3").is_err());
    }
}
