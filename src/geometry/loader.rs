use std::{thread, time::Duration};

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError, bounded};

use crate::error::DecodeError;

use super::{decode::decode_archive, feature::FeatureCollection, source::GeometrySource};

/// Completion of a geometry load.
#[derive(Debug)]
pub enum LoadEvent {
    Loaded(FeatureCollection),
    Error(DecodeError),
}

impl From<Result<FeatureCollection, DecodeError>> for LoadEvent {
    fn from(result: Result<FeatureCollection, DecodeError>) -> Self {
        match result {
            Ok(collection) => LoadEvent::Loaded(collection),
            Err(err) => LoadEvent::Error(err),
        }
    }
}

/// Identifies one load among those started for the same target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

/// Issues load tickets; only the most recently issued one is current, so a slow
/// older load cannot replace a newer one.
#[derive(Debug, Clone, Default)]
pub struct LoadSequence {
    latest: u64,
}

impl LoadSequence {
    pub fn issue(&mut self) -> LoadTicket {
        self.latest += 1;
        LoadTicket(self.latest)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest
    }
}

/// Fetches and decodes geometry archives off the calling thread.
pub struct GeometryLoader;

impl GeometryLoader {
    /// Start loading `source` on a background thread.
    pub fn spawn(source: GeometrySource) -> LoadHandle {
        let (tx, rx) = bounded(1);
        let label = source.to_string();

        let spawned = thread::Builder::new()
            .name("geometry-loader".into())
            .spawn(move || {
                let event = Self::load(&source);
                // The handle may have been dropped; nobody is left to tell.
                let _ = tx.send(event);
            });

        match spawned {
            Ok(_) => LoadHandle { rx, immediate: None, label },
            Err(e) => LoadHandle {
                rx,
                immediate: Some(LoadEvent::Error(DecodeError::Unreadable(format!("could not start loader: {e}")))),
                label,
            },
        }
    }

    /// Fetch and decode on the current thread.
    pub fn load(source: &GeometrySource) -> LoadEvent {
        let event: LoadEvent = source.read().and_then(|bytes| decode_archive(&bytes)).into();
        match &event {
            LoadEvent::Loaded(collection) => {
                tracing::info!(source = %source, features = collection.len(), "[geometry::loader] loaded");
            }
            LoadEvent::Error(err) => {
                tracing::warn!(source = %source, error = %err, "[geometry::loader] failed");
            }
        }
        event
    }
}

/// Pending geometry load. Exactly one [`LoadEvent`] is delivered; a worker that dies
/// without reporting is surfaced as [`DecodeError::Interrupted`].
pub struct LoadHandle {
    rx: Receiver<LoadEvent>,
    immediate: Option<LoadEvent>,
    label: String,
}

impl LoadHandle {
    /// Source description, for error panels and logs.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Non-blocking poll.
    pub fn try_recv(&mut self) -> Option<LoadEvent> {
        if let Some(event) = self.immediate.take() {
            return Some(event);
        }
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(LoadEvent::Error(DecodeError::Interrupted)),
        }
    }

    /// Wait up to `timeout` for the result.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<LoadEvent> {
        if let Some(event) = self.immediate.take() {
            return Some(event);
        }
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(LoadEvent::Error(DecodeError::Interrupted)),
        }
    }

    /// Block until the result arrives.
    pub fn wait(mut self) -> LoadEvent {
        if let Some(event) = self.immediate.take() {
            return event;
        }
        self.rx.recv().unwrap_or(LoadEvent::Error(DecodeError::Interrupted))
    }
}
