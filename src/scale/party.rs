use std::collections::HashMap;

use anyhow::Result;

use crate::{stats::JoinedView, types::{CandidateVotes, PrecinctStat}};

use super::color::{NEUTRAL_GRAY, Rgb};

/// Winner of a race in one precinct: the candidate with the strictly highest vote count.
///
/// Ties keep the first candidate encountered at the highest count, so the result is
/// stable under the feed's candidate order. A candidate needs at least one vote to win;
/// `None` means nobody received votes.
pub fn winner(candidates: &[CandidateVotes]) -> Option<&CandidateVotes> {
    let mut best: Option<&CandidateVotes> = None;
    for candidate in candidates {
        let leading = best.map_or(0, |b| b.votes);
        if candidate.votes > leading {
            best = Some(candidate);
        }
    }
    best
}

/// Configured party colors with a neutral fallback.
#[derive(Debug, Clone, Default)]
pub struct PartyPalette {
    colors: HashMap<String, Rgb>,
}

impl PartyPalette {
    pub fn new(colors: HashMap<String, Rgb>) -> Self {
        Self { colors }
    }

    /// Palette from `party → "#rrggbb"` pairs.
    pub fn from_hex<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let colors = pairs.into_iter()
            .map(|(party, hex)| Ok((party.to_string(), Rgb::from_hex(hex)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { colors })
    }

    /// Configured color of `party`, gray when the party is unknown or absent.
    pub fn color(&self, party: Option<&str>) -> Rgb {
        party.and_then(|p| self.colors.get(p)).copied().unwrap_or(NEUTRAL_GRAY)
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Linear map from a numeric domain into a numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Values are clamped to the range; a degenerate domain maps to the range start.
    pub fn apply(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span <= 0.0 || !x.is_finite() {
            return r0;
        }
        let t = ((x - d0) / span).clamp(0.0, 1.0);
        r0 + (r1 - r0) * t
    }
}

/// Fill of one precinct in the categorical view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoricalFill {
    pub color: Rgb,
    pub opacity: f64,
}

/// Party-winner color scale with opacity proportional to turnout volume.
#[derive(Debug, Clone)]
pub struct CategoricalScale<'a> {
    palette: &'a PartyPalette,
    opacity: LinearScale,
}

impl<'a> CategoricalScale<'a> {
    /// Opacity runs from `opacity_range.0` at zero votes to `opacity_range.1` at the
    /// largest precinct total in the view.
    pub fn from_view(view: &JoinedView, palette: &'a PartyPalette, opacity_range: (f64, f64)) -> Self {
        let max_votes = view.iter().map(|(_, stat)| stat.votes).max().unwrap_or(0);
        Self { palette, opacity: LinearScale::new((0.0, max_votes as f64), opacity_range) }
    }

    pub fn fill(&self, stat: &PrecinctStat) -> CategoricalFill {
        let color = match stat.candidates.as_deref().and_then(winner) {
            Some(w) => self.palette.color(w.party.as_deref()),
            None => NEUTRAL_GRAY,
        };
        CategoricalFill { color, opacity: self.opacity.apply(stat.votes as f64) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(name: &str, party: Option<&str>, votes: u64) -> CandidateVotes {
        CandidateVotes::new(name, party, votes)
    }

    #[test]
    fn ties_keep_the_first_candidate_at_the_maximum() {
        let candidates = vec![c("A", None, 10), c("B", None, 10), c("C", None, 5)];
        assert_eq!(winner(&candidates).map(|w| w.name.as_str()), Some("A"));
    }

    #[test]
    fn strictly_higher_later_candidate_wins() {
        let candidates = vec![c("A", None, 3), c("B", None, 10), c("C", None, 10)];
        assert_eq!(winner(&candidates).map(|w| w.name.as_str()), Some("B"));
    }

    #[test]
    fn no_votes_means_no_winner() {
        assert!(winner(&[c("A", None, 0), c("B", None, 0)]).is_none());
        assert!(winner(&[]).is_none());
    }

    #[test]
    fn palette_falls_back_to_gray() {
        let palette = PartyPalette::from_hex([("Democratic", "#0015BC")]).unwrap();
        assert_eq!(palette.color(Some("Democratic")), Rgb::new(0x00, 0x15, 0xbc));
        assert_eq!(palette.color(Some("Libertarian")), NEUTRAL_GRAY);
        assert_eq!(palette.color(None), NEUTRAL_GRAY);
    }

    #[test]
    fn linear_scale_maps_and_clamps() {
        let scale = LinearScale::new((0.0, 200.0), (0.3, 0.9));
        assert!((scale.apply(0.0) - 0.3).abs() < 1e-12);
        assert!((scale.apply(100.0) - 0.6).abs() < 1e-12);
        assert!((scale.apply(400.0) - 0.9).abs() < 1e-12);

        let degenerate = LinearScale::new((0.0, 0.0), (0.3, 0.9));
        assert_eq!(degenerate.apply(0.0), 0.3);
    }

    #[test]
    fn fill_uses_winner_party_and_vote_volume() {
        let palette = PartyPalette::from_hex([("Republican", "#E81B23")]).unwrap();
        let scale = CategoricalScale {
            palette: &palette,
            opacity: LinearScale::new((0.0, 100.0), (0.3, 0.9)),
        };

        let won = PrecinctStat::from_candidates(None, 0, vec![c("A", Some("Republican"), 60), c("B", Some("Green"), 40)]);
        let fill = scale.fill(&won);
        assert_eq!(fill.color, Rgb::new(0xe8, 0x1b, 0x23));
        assert!((fill.opacity - 0.9).abs() < 1e-12);

        let empty = PrecinctStat::zeroed();
        let fill = scale.fill(&empty);
        assert_eq!(fill.color, NEUTRAL_GRAY);
        assert!((fill.opacity - 0.3).abs() < 1e-12);
    }
}
