use crate::types::PrecinctId;

/// Result of toggling a precinct's selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Selected { id: PrecinctId, previous: Option<PrecinctId> },
    Deselected(PrecinctId),
}

/// Hovered and selected precinct; at most one of each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    hovered: Option<PrecinctId>,
    selected: Option<PrecinctId>,
}

impl Selection {
    pub fn hovered(&self) -> Option<&PrecinctId> {
        self.hovered.as_ref()
    }

    pub fn selected(&self) -> Option<&PrecinctId> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, id: &PrecinctId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// Returns the previously hovered precinct if it differs.
    pub fn hover(&mut self, id: &PrecinctId) -> Option<PrecinctId> {
        match self.hovered.replace(id.clone()) {
            Some(previous) if &previous != id => Some(previous),
            _ => None,
        }
    }

    /// Leaving a precinct other than the hovered one changes nothing.
    pub fn unhover(&mut self, id: &PrecinctId) -> bool {
        if self.hovered.as_ref() == Some(id) {
            self.hovered = None;
            true
        } else {
            false
        }
    }

    /// Selecting the selected precinct deselects it.
    pub fn toggle(&mut self, id: &PrecinctId) -> SelectionChange {
        if self.is_selected(id) {
            self.selected = None;
            SelectionChange::Deselected(id.clone())
        } else {
            let previous = self.selected.replace(id.clone());
            SelectionChange::Selected { id: id.clone(), previous }
        }
    }

    /// Drop the selection, returning what was selected.
    pub fn clear(&mut self) -> Option<PrecinctId> {
        self.selected.take()
    }

    /// Forget both hover and selection, e.g. after the layer is rebuilt.
    pub fn reset(&mut self) {
        self.hovered = None;
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_twice_deselects() {
        let mut selection = Selection::default();
        let a = PrecinctId::new("4");
        assert_eq!(selection.toggle(&a), SelectionChange::Selected { id: a.clone(), previous: None });
        assert_eq!(selection.toggle(&a), SelectionChange::Deselected(a.clone()));
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn selecting_another_replaces_the_selection() {
        let mut selection = Selection::default();
        let (a, b) = (PrecinctId::new("4"), PrecinctId::new("5"));
        selection.toggle(&a);
        assert_eq!(selection.toggle(&b), SelectionChange::Selected { id: b.clone(), previous: Some(a) });
        assert!(selection.is_selected(&b));
    }

    #[test]
    fn hover_tracks_a_single_precinct() {
        let mut selection = Selection::default();
        let (a, b) = (PrecinctId::new("1"), PrecinctId::new("2"));
        assert_eq!(selection.hover(&a), None);
        assert_eq!(selection.hover(&b), Some(a.clone()));
        assert!(!selection.unhover(&a));
        assert!(selection.unhover(&b));
        assert_eq!(selection.hovered(), None);
    }
}
