use std::{collections::HashMap, fmt, sync::Arc};

use crate::types::PrecinctId;

/// Pointer interaction a feature can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEvent {
    HoverEnter,
    HoverLeave,
    Click,
}

/// What a handler asks the map to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    Highlight(PrecinctId),
    Unhighlight(PrecinctId),
    ToggleSelect(PrecinctId),
}

pub type Handler = Arc<dyn Fn(&PrecinctId) -> Reaction + Send + Sync>;

/// Handlers to install on every feature of a layer.
#[derive(Clone, Default)]
pub struct Bindings {
    handlers: Vec<(PointerEvent, Handler)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, event: PointerEvent, handler: impl Fn(&PrecinctId) -> Reaction + Send + Sync + 'static) -> Self {
        self.handlers.push((event, Arc::new(handler)));
        self
    }

    /// Hover highlights, click toggles selection.
    pub fn standard() -> Self {
        Self::new()
            .on(PointerEvent::HoverEnter, |id| Reaction::Highlight(id.clone()))
            .on(PointerEvent::HoverLeave, |id| Reaction::Unhighlight(id.clone()))
            .on(PointerEvent::Click, |id| Reaction::ToggleSelect(id.clone()))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &(PointerEvent, Handler)> {
        self.handlers.iter()
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.handlers.iter().map(|(event, _)| event)).finish()
    }
}

/// Handlers attached to one feature.
#[derive(Clone, Default)]
pub(crate) struct HandlerSet {
    handlers: HashMap<PointerEvent, Vec<Handler>>,
}

impl HandlerSet {
    pub(crate) fn on(&mut self, event: PointerEvent, handler: Handler) {
        self.handlers.entry(event).or_default().push(handler);
    }

    pub(crate) fn off_all(&mut self) {
        self.handlers.clear();
    }

    pub(crate) fn count(&self, event: PointerEvent) -> usize {
        self.handlers.get(&event).map_or(0, Vec::len)
    }

    pub(crate) fn fire(&self, event: PointerEvent, id: &PrecinctId) -> Vec<Reaction> {
        self.handlers.get(&event)
            .map(|handlers| handlers.iter().map(|handler| handler(id)).collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.handlers.iter().map(|(event, handlers)| (event, handlers.len())))
            .finish()
    }
}
