//! Color and opacity scales derived from joined statistics.
//!
//! Everything here is a pure function of its inputs so scales can be checked without
//! a rendering surface.

mod color;
mod heat;
mod party;

pub use color::{DISTRICT_GRAY, NEUTRAL_GRAY, Rgb, STROKE, STROKE_HOVER, WHITE, interpolate_blues};
pub use heat::{HeatScale, ScaleTick, round_up_hundred};
pub use party::{CategoricalFill, CategoricalScale, LinearScale, PartyPalette, winner};
