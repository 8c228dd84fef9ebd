use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::board::{resolve, Point, Ring};
use crate::error::DrillError;
use crate::target::Target;

/// Outcome of one simulated dart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThrowResult {
    pub target: Target,
    pub landing_point: Point,
    pub score: u32,
    pub ring: Ring,
    pub segment: Option<u8>,
}

impl ThrowResult {
    pub fn is_double(&self) -> bool {
        self.ring.is_double()
    }

    /// Short label of what was actually hit, e.g. `T20`, `D5`, `BULL`, `MISS`.
    pub fn hit_label(&self) -> String {
        match (self.ring, self.segment) {
            (Ring::InnerBull, _) => "BULL".to_string(),
            (Ring::OuterBull, _) => "25".to_string(),
            (Ring::Triple, Some(n)) => format!("T{n}"),
            (Ring::Double, Some(n)) => format!("D{n}"),
            (_, Some(n)) => n.to_string(),
            _ => "MISS".to_string(),
        }
    }
}

fn validate_spread(std_dev_mm: f64) -> crate::Result<f64> {
    if !std_dev_mm.is_finite() || std_dev_mm < 0.0 {
        return Err(DrillError::invalid(
            "std dev",
            std_dev_mm,
            "must be a finite, non-negative number of millimetres",
        ));
    }
    Ok(std_dev_mm)
}

/// Throws one dart at `target` with independent Gaussian error on each axis.
pub fn execute_throw<R: Rng + ?Sized>(
    target: Target,
    std_dev_mm: f64,
    rng: &mut R,
) -> crate::Result<ThrowResult> {
    let target = target.validate()?;
    Ok(ThrowSimulator::new(std_dev_mm)?.throw_at(target, rng))
}

/// A thrower with a fixed skill level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowSimulator {
    std_dev_mm: f64,
}

impl ThrowSimulator {
    pub fn new(std_dev_mm: f64) -> crate::Result<Self> {
        Ok(Self {
            std_dev_mm: validate_spread(std_dev_mm)?,
        })
    }

    pub fn std_dev_mm(&self) -> f64 {
        self.std_dev_mm
    }

    pub fn throw_at<R: Rng + ?Sized>(&self, target: Target, rng: &mut R) -> ThrowResult {
        let aim = target.aim_point();
        let dx: f64 = StandardNormal.sample(rng);
        let dy: f64 = StandardNormal.sample(rng);
        let landing_point = Point::new(aim.x + dx * self.std_dev_mm, aim.y + dy * self.std_dev_mm);
        let resolution = resolve(landing_point);
        ThrowResult {
            target,
            landing_point,
            score: resolution.score,
            ring: resolution.ring,
            segment: resolution.segment,
        }
    }
}
