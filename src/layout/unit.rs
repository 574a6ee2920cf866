use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::error::{CardError, CardResult};

static PIXELS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+px$").expect("pixel pattern"));
static PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d{0,2}\.\d*%$|^-?\d{0,2}%$|^-?100%$").expect("percent pattern")
});
static GRID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("grid pattern"));

/// One parsed coordinate or length.
///
/// Parsed once when the configuration is loaded so the hot path never re-reads strings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dimension {
    /// Absolute pixels (`"12px"`, `"-27px"`).
    Pixels(f64),
    /// Percentage of the axis extent (`"50%"`, `"-12.5%"`).
    Percent(f64),
    /// Whole grid cells (`3`, `"3"`).
    Grid(f64),
}

impl Dimension {
    /// Parse one literal against the closed grammar `<int>px | <pct>% | <uint>`.
    pub fn parse(literal: &str) -> CardResult<Self> {
        if PIXELS.is_match(literal) {
            let px: i64 = literal[..literal.len() - 2].parse().map_err(|e| {
                CardError::layout(format!("extracting {literal:?} as an integer: {e}"))
            })?;
            return Ok(Self::Pixels(px as f64));
        }
        if PERCENT.is_match(literal) {
            let pct: f64 = literal[..literal.len() - 1].parse().map_err(|e| {
                CardError::layout(format!("extracting {literal:?} as a percentage: {e}"))
            })?;
            return Ok(Self::Percent(pct));
        }
        if GRID.is_match(literal) {
            let cells: f64 = literal.parse().map_err(|e| {
                CardError::layout(format!("extracting {literal:?} as a grid count: {e}"))
            })?;
            return Ok(Self::Grid(cells));
        }
        Err(CardError::layout(format!(
            "unrecognized coordinate {literal:?}: expected <n>px, <n>% or a whole grid count"
        )))
    }

    /// Convert to absolute pixels for an axis of `axis_extent` pixels split into cells of
    /// `grid_unit` pixels.
    pub fn resolve(self, axis_extent: u32, grid_unit: f64) -> f64 {
        match self {
            Self::Pixels(px) => px,
            Self::Percent(pct) => (pct / 100.0) * f64::from(axis_extent),
            Self::Grid(cells) => cells * grid_unit,
        }
    }
}

/// Parse-and-resolve in one step.
pub fn resolve_unit(literal: &str, axis_extent: u32, grid_unit: f64) -> CardResult<f64> {
    Ok(Dimension::parse(literal)?.resolve(axis_extent, grid_unit))
}

impl FromStr for Dimension {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixels(px) => write!(f, "{px}px"),
            Self::Percent(pct) => write!(f, "{pct}%"),
            Self::Grid(cells) => write!(f, "{cells}"),
        }
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawDimension {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

impl<'de> serde::Deserialize<'de> for Dimension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let literal = match RawDimension::deserialize(deserializer)? {
            RawDimension::Unsigned(v) => v.to_string(),
            RawDimension::Signed(v) => v.to_string(),
            // Integral floats print without a fraction and therefore read as grid counts.
            RawDimension::Float(v) => v.to_string(),
            RawDimension::Text(s) => s,
        };
        Dimension::parse(&literal).map_err(serde::de::Error::custom)
    }
}

impl serde::Serialize for Dimension {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Grid(cells) if cells.fract() == 0.0 && *cells >= 0.0 => {
                serializer.serialize_u64(*cells as u64)
            }
            other => serializer.collect_str(other),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/unit.rs"]
mod tests;
