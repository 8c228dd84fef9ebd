use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::board::{
    segment_angle, Point, DOUBLE_INNER_RADIUS, DOUBLE_OUTER_RADIUS, INNER_BULL_RADIUS,
    OUTER_BULL_RADIUS, TRIPLE_INNER_RADIUS, TRIPLE_OUTER_RADIUS,
};
use crate::error::DrillError;

/// Broad category of an aim point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetKind {
    Single,
    Double,
    Triple,
    Bull,
}

/// An aim point on the board. [`Target::single`] and friends, label parsing
/// and deserialization all keep numbers within 1..=20. Variants built
/// directly are unchecked until [`Target::validate`] runs; config validation
/// and the throw entry point both call it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Single(u8),
    Double(u8),
    Triple(u8),
    OuterBull,
    Bull,
}

pub const DEFAULT_TARGET: Target = Target::Triple(20);

fn check_number(n: u8) -> crate::Result<u8> {
    if (1..=20).contains(&n) {
        Ok(n)
    } else {
        Err(DrillError::invalid("segment number", n, "must be within 1..=20"))
    }
}

impl Target {
    pub fn single(n: u8) -> crate::Result<Self> {
        check_number(n).map(Target::Single)
    }

    pub fn double(n: u8) -> crate::Result<Self> {
        check_number(n).map(Target::Double)
    }

    pub fn triple(n: u8) -> crate::Result<Self> {
        check_number(n).map(Target::Triple)
    }

    pub fn validate(self) -> crate::Result<Self> {
        match self.number() {
            Some(n) => check_number(n).map(|_| self),
            None => Ok(self),
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            Target::Single(_) => TargetKind::Single,
            Target::Double(_) => TargetKind::Double,
            Target::Triple(_) => TargetKind::Triple,
            Target::OuterBull | Target::Bull => TargetKind::Bull,
        }
    }

    pub fn number(&self) -> Option<u8> {
        match *self {
            Target::Single(n) | Target::Double(n) | Target::Triple(n) => Some(n),
            Target::OuterBull | Target::Bull => None,
        }
    }

    /// Nominal score when the dart lands where it was aimed.
    pub fn score(&self) -> u32 {
        match *self {
            Target::Single(n) => n as u32,
            Target::Double(n) => 2 * n as u32,
            Target::Triple(n) => 3 * n as u32,
            Target::OuterBull => 25,
            Target::Bull => 50,
        }
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Target::Double(_) | Target::Bull)
    }

    pub fn label(&self) -> String {
        match *self {
            Target::Single(n) => n.to_string(),
            Target::Double(n) => format!("D{n}"),
            Target::Triple(n) => format!("T{n}"),
            Target::OuterBull => "25".to_string(),
            Target::Bull => "BULL".to_string(),
        }
    }

    /// Centre of the region this target names. Singles aim at the wide
    /// outer single band.
    pub fn aim_point(&self) -> Point {
        let angle = self.number().and_then(segment_angle).unwrap_or(0.0);
        match self {
            Target::Single(_) => Point::polar((TRIPLE_OUTER_RADIUS + DOUBLE_INNER_RADIUS) / 2.0, angle),
            Target::Triple(_) => Point::polar((TRIPLE_INNER_RADIUS + TRIPLE_OUTER_RADIUS) / 2.0, angle),
            Target::Double(_) => Point::polar((DOUBLE_INNER_RADIUS + DOUBLE_OUTER_RADIUS) / 2.0, angle),
            Target::OuterBull => Point::polar((INNER_BULL_RADIUS + OUTER_BULL_RADIUS) / 2.0, 0.0),
            Target::Bull => Point::default(),
        }
    }

    /// The 62 targets used by basic practice: every single, double and
    /// triple plus both bulls.
    pub fn basic_set() -> Vec<Target> {
        (1..=20u8)
            .map(Target::Single)
            .chain((1..=20u8).map(Target::Double))
            .chain((1..=20u8).map(Target::Triple))
            .chain([Target::OuterBull, Target::Bull])
            .collect()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Target {
    type Err = DrillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_uppercase();
        let unknown = || DrillError::UnknownTarget(s.to_string());
        match label.as_str() {
            "BULL" | "DB" | "50" => return Ok(Target::Bull),
            "25" | "SB" | "OUTER" => return Ok(Target::OuterBull),
            _ => {}
        }
        let (ctor, digits): (fn(u8) -> crate::Result<Target>, &str) =
            if let Some(rest) = label.strip_prefix('D') {
                (Target::double, rest)
            } else if let Some(rest) = label.strip_prefix('T') {
                (Target::triple, rest)
            } else if let Some(rest) = label.strip_prefix('S') {
                (Target::single, rest)
            } else {
                (Target::single, label.as_str())
            };
        let n: u8 = digits.parse().map_err(|_| unknown())?;
        ctor(n).map_err(|_| unknown())
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
