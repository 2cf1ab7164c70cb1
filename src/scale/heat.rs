use serde::Serialize;

use crate::stats::JoinedView;

use super::color::{Rgb, interpolate_blues};

/// Fractions of the domain shown as legend ticks.
const TICK_FRACTIONS: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

/// Round a vote count up to the nearest hundred (437 → 500, 0 → 0).
pub fn round_up_hundred(max: u64) -> u64 {
    max.div_ceil(100) * 100
}

/// Continuous vote-count color scale over `[0, max rounded up to 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatScale {
    domain_max: u64,
}

/// One legend stop of the heat scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaleTick {
    pub value: u64,
    pub color: Rgb,
}

impl HeatScale {
    /// Scale whose domain covers `raw_max` after rounding.
    pub fn new(raw_max: u64) -> Self {
        Self { domain_max: round_up_hundred(raw_max) }
    }

    /// Scale covering every precinct's vote count in the joined view.
    pub fn from_view(view: &JoinedView) -> Self {
        Self::new(view.iter().map(|(_, stat)| stat.votes).max().unwrap_or(0))
    }

    pub fn domain(&self) -> (u64, u64) {
        (0, self.domain_max)
    }

    /// Color for a vote count; an empty domain maps everything to the light end.
    pub fn color(&self, votes: u64) -> Rgb {
        if self.domain_max == 0 {
            return interpolate_blues(0.0);
        }
        interpolate_blues(votes as f64 / self.domain_max as f64)
    }

    /// Evenly spaced legend stops, values rounded to the nearest hundred.
    pub fn ticks(&self) -> Vec<ScaleTick> {
        let last = (TICK_FRACTIONS.len() - 1) as f64;
        TICK_FRACTIONS.iter().enumerate()
            .map(|(i, fraction)| ScaleTick {
                value: ((self.domain_max as f64 * fraction / 100.0).round() as u64) * 100,
                color: interpolate_blues(i as f64 / last),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_is_rounded_up_to_the_next_hundred() {
        assert_eq!(round_up_hundred(437), 500);
        assert_eq!(round_up_hundred(500), 500);
        assert_eq!(round_up_hundred(501), 600);
        assert_eq!(round_up_hundred(1), 100);
        assert_eq!(round_up_hundred(0), 0);
        assert_eq!(HeatScale::new(437).domain(), (0, 500));
    }

    #[test]
    fn zero_votes_get_the_low_end_color() {
        let scale = HeatScale::new(437);
        assert_eq!(scale.color(0), interpolate_blues(0.0));
        assert_eq!(scale.color(500), interpolate_blues(1.0));

        let empty = HeatScale::new(0);
        assert_eq!(empty.color(0), interpolate_blues(0.0));
    }

    #[test]
    fn ticks_cover_the_domain() {
        let ticks = HeatScale::new(437).ticks();
        let values: Vec<u64> = ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![0, 100, 200, 300, 400, 500]);
        assert_eq!(ticks[0].color, interpolate_blues(0.0));
        assert_eq!(ticks[5].color, interpolate_blues(1.0));
    }
}
