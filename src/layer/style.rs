use serde::Serialize;

use crate::scale::{Rgb, STROKE, STROKE_HOVER};

/// Path style of one rendered feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Style {
    pub fill_color: Rgb,
    pub fill_opacity: f64,
    pub stroke_color: Rgb,
    pub stroke_weight: f64,
}

impl Style {
    pub fn new(fill_color: Rgb, fill_opacity: f64) -> Self {
        Self { fill_color, fill_opacity, stroke_color: STROKE, stroke_weight: 1.0 }
    }

    pub fn with_stroke(self, stroke_color: Rgb, stroke_weight: f64) -> Self {
        Self { stroke_color, stroke_weight, ..self }
    }

    pub fn with_fill_opacity(self, fill_opacity: f64) -> Self {
        Self { fill_opacity, ..self }
    }
}

/// Which of a feature's styles is currently shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualState {
    #[default]
    Base,
    Hovered,
    Selected,
}

/// Base, hover and selected styles of one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureStyle {
    pub base: Style,
    pub hover: Style,
    pub selected: Style,
}

impl FeatureStyle {
    /// No election chosen: fill by legislative district.
    pub fn district(fill: Rgb) -> Self {
        let base = Style::new(fill, 0.5).with_stroke(STROKE, 2.0);
        Self {
            base,
            hover: base.with_stroke(STROKE, 3.0).with_fill_opacity(0.8),
            selected: base.with_stroke(STROKE, 3.0).with_fill_opacity(0.9),
        }
    }

    /// Vote-count heat view.
    pub fn heat(fill: Rgb) -> Self {
        let base = Style::new(fill, 0.7);
        let emphasized = base.with_stroke(STROKE_HOVER, 3.0).with_fill_opacity(0.9);
        Self { base, hover: emphasized, selected: emphasized }
    }

    /// Party-win view; opacity carries the vote volume, so emphasis leaves it alone.
    pub fn categorical(fill: Rgb, opacity: f64) -> Self {
        let base = Style::new(fill, opacity);
        let emphasized = base.with_stroke(STROKE_HOVER, 3.0);
        Self { base, hover: emphasized, selected: emphasized }
    }

    pub fn for_state(&self, state: VisualState) -> &Style {
        match state {
            VisualState::Base => &self.base,
            VisualState::Hovered => &self.hover,
            VisualState::Selected => &self.selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn district_style_emphasizes_on_hover_and_selection() {
        let style = FeatureStyle::district(Rgb::new(0xff, 0x7f, 0x00));
        assert_eq!(style.base.fill_opacity, 0.5);
        assert_eq!(style.base.stroke_weight, 2.0);
        assert_eq!(style.hover.fill_opacity, 0.8);
        assert_eq!(style.selected.fill_opacity, 0.9);
        assert_eq!(style.for_state(VisualState::Selected).stroke_weight, 3.0);
    }

    #[test]
    fn categorical_hover_keeps_the_volume_opacity() {
        let style = FeatureStyle::categorical(Rgb::new(0, 0, 255), 0.42);
        assert_eq!(style.hover.fill_opacity, 0.42);
        assert_eq!(style.hover.stroke_color, STROKE_HOVER);
    }
}
