//! Regulation dartboard geometry.
//!
//! Coordinates are millimetres from the board centre, x to the right and y up.
//! Angles are degrees measured clockwise from straight up, so the 20 segment is
//! centred on 0°.

use serde::{Deserialize, Serialize};

pub const INNER_BULL_RADIUS: f64 = 6.35;
pub const OUTER_BULL_RADIUS: f64 = 15.9;
pub const TRIPLE_INNER_RADIUS: f64 = 99.0;
pub const TRIPLE_OUTER_RADIUS: f64 = 107.0;
pub const DOUBLE_INNER_RADIUS: f64 = 162.0;
pub const DOUBLE_OUTER_RADIUS: f64 = 170.0;

pub const SEGMENT_ANGLE: f64 = 18.0;

/// Segment numbers clockwise starting from the top.
pub const SEGMENT_ORDER: [u8; 20] = [
    20, 1, 18, 4, 13, 6, 10, 15, 2, 17, 3, 19, 7, 16, 8, 11, 14, 9, 12, 5,
];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` along the clockwise-from-up `angle`.
    pub fn polar(radius: f64, angle_deg: f64) -> Self {
        let rad = angle_deg.to_radians();
        Self {
            x: radius * rad.sin(),
            y: radius * rad.cos(),
        }
    }

    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Clockwise angle from straight up, normalised to `[0, 360)`.
    pub fn angle(&self) -> f64 {
        let deg = self.x.atan2(self.y).to_degrees();
        if deg < 0.0 {
            deg + 360.0
        } else {
            deg
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Ring {
    InnerBull,
    OuterBull,
    InnerSingle,
    Triple,
    OuterSingle,
    Double,
    Miss,
}

impl Ring {
    pub fn multiplier(&self) -> u32 {
        match self {
            Ring::InnerSingle | Ring::OuterSingle => 1,
            Ring::Double => 2,
            Ring::Triple => 3,
            Ring::InnerBull | Ring::OuterBull | Ring::Miss => 0,
        }
    }

    /// Double ring and the inner bull both satisfy a double-out finish.
    pub fn is_double(&self) -> bool {
        matches!(self, Ring::Double | Ring::InnerBull)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub ring: Ring,
    pub segment: Option<u8>,
    pub score: u32,
}

/// Segment number under a clockwise-from-up angle in degrees.
pub fn segment_at(angle_deg: f64) -> u8 {
    let normalised = (angle_deg + SEGMENT_ANGLE / 2.0).rem_euclid(360.0);
    let idx = (normalised / SEGMENT_ANGLE).floor() as usize % SEGMENT_ORDER.len();
    SEGMENT_ORDER[idx]
}

/// Midpoint angle of a segment, `None` for numbers outside 1..=20.
pub fn segment_angle(number: u8) -> Option<f64> {
    SEGMENT_ORDER
        .iter()
        .position(|&n| n == number)
        .map(|idx| idx as f64 * SEGMENT_ANGLE)
}

fn ring_at(radius: f64) -> Ring {
    if radius <= INNER_BULL_RADIUS {
        Ring::InnerBull
    } else if radius <= OUTER_BULL_RADIUS {
        Ring::OuterBull
    } else if radius <= TRIPLE_INNER_RADIUS {
        Ring::InnerSingle
    } else if radius <= TRIPLE_OUTER_RADIUS {
        Ring::Triple
    } else if radius <= DOUBLE_INNER_RADIUS {
        Ring::OuterSingle
    } else if radius <= DOUBLE_OUTER_RADIUS {
        Ring::Double
    } else {
        Ring::Miss
    }
}

pub fn resolve(point: Point) -> Resolution {
    let ring = ring_at(point.radius());
    match ring {
        Ring::InnerBull => Resolution {
            ring,
            segment: None,
            score: 50,
        },
        Ring::OuterBull => Resolution {
            ring,
            segment: None,
            score: 25,
        },
        Ring::Miss => Resolution {
            ring,
            segment: None,
            score: 0,
        },
        _ => {
            let segment = segment_at(point.angle());
            Resolution {
                ring,
                segment: Some(segment),
                score: segment as u32 * ring.multiplier(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_centre_is_inner_bull() {
        let r = resolve(Point::new(0.0, 0.0));
        assert_eq!(r.ring, Ring::InnerBull);
        assert_eq!(r.score, 50);
        assert_eq!(r.segment, None);
    }

    #[test]
    fn test_outer_bull() {
        let r = resolve(Point::new(0.0, 10.0));
        assert_eq!(r.ring, Ring::OuterBull);
        assert_eq!(r.score, 25);
    }

    #[test]
    fn test_triple_twenty_straight_up() {
        let r = resolve(Point::new(0.0, 103.0));
        assert_eq!(r.ring, Ring::Triple);
        assert_eq!(r.segment, Some(20));
        assert_eq!(r.score, 60);
    }

    #[test]
    fn test_double_three_straight_down() {
        let r = resolve(Point::new(0.0, -166.0));
        assert_eq!(r.ring, Ring::Double);
        assert_eq!(r.segment, Some(3));
        assert_eq!(r.score, 6);
    }

    #[test]
    fn test_single_six_to_the_right() {
        let inner = resolve(Point::new(50.0, 0.0));
        assert_eq!(inner.ring, Ring::InnerSingle);
        assert_eq!(inner.segment, Some(6));
        assert_eq!(inner.score, 6);

        let outer = resolve(Point::new(130.0, 0.0));
        assert_eq!(outer.ring, Ring::OuterSingle);
        assert_eq!(outer.score, 6);
    }

    #[test]
    fn test_off_board_scores_zero() {
        let r = resolve(Point::new(0.0, 171.0));
        assert_eq!(r.ring, Ring::Miss);
        assert_eq!(r.score, 0);
        assert_eq!(r.segment, None);
    }

    #[test]
    fn test_ring_boundaries_belong_inside() {
        assert_eq!(resolve(Point::new(0.0, INNER_BULL_RADIUS)).ring, Ring::InnerBull);
        assert_eq!(resolve(Point::new(0.0, TRIPLE_OUTER_RADIUS)).ring, Ring::Triple);
        assert_eq!(resolve(Point::new(0.0, DOUBLE_OUTER_RADIUS)).ring, Ring::Double);
    }

    #[test]
    fn test_every_segment_midpoint_round_trips() {
        for &n in SEGMENT_ORDER.iter() {
            let angle = segment_angle(n).unwrap();
            assert_eq!(segment_at(angle), n);
            let r = resolve(Point::polar(134.5, angle));
            assert_eq!(r.segment, Some(n));
        }
    }

    #[test]
    fn test_segment_edges_have_no_gaps() {
        // Boundary between 20 (0°) and 1 (18°) sits at 9°, half-open towards 1.
        assert_eq!(segment_at(8.999), 20);
        assert_eq!(segment_at(9.0), 1);
        assert_eq!(segment_at(351.0), 20);
        assert_eq!(segment_at(350.999), 5);
        assert_eq!(segment_at(-5.0), 20);
    }

    #[test]
    fn test_segment_angle_rejects_unknown_number() {
        assert_eq!(segment_angle(0), None);
        assert_eq!(segment_angle(21), None);
    }

    #[test]
    fn test_point_angle_is_clockwise_from_up() {
        assert!((Point::new(1.0, 0.0).angle() - 90.0).abs() < 1e-9);
        assert!((Point::new(0.0, -1.0).angle() - 180.0).abs() < 1e-9);
        assert!((Point::new(-1.0, 0.0).angle() - 270.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_resolution_is_consistent(x in -200.0f64..200.0, y in -200.0f64..200.0) {
            let r = resolve(Point::new(x, y));
            prop_assert!(r.score <= 60);
            let numbered = !matches!(r.ring, Ring::InnerBull | Ring::OuterBull | Ring::Miss);
            prop_assert_eq!(r.segment.is_some(), numbered);
            if let Some(n) = r.segment {
                prop_assert!((1..=20).contains(&n));
                prop_assert_eq!(r.score % n as u32, 0);
            }
        }
    }
}
