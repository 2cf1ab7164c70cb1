use std::{sync::Arc, thread, time::Duration};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::{
    error::FetchError,
    state::{FetchRequest, PendingFetch, Ticket},
    stats::StatsTable,
};

use super::ElectionFeed;

/// Outcome of one statistics request, tagged with the ticket it was issued under.
#[derive(Debug)]
pub struct FetchCompletion {
    pub ticket: Ticket,
    pub request: FetchRequest,
    pub result: Result<StatsTable, FetchError>,
}

/// Runs feed requests on background threads and collects their completions.
///
/// Completions arrive in finishing order, not submission order; the map context
/// decides which ones are still current.
pub struct FetchWorker {
    feed: Arc<dyn ElectionFeed>,
    tx: Sender<FetchCompletion>,
    rx: Receiver<FetchCompletion>,
}

impl FetchWorker {
    pub fn new(feed: Arc<dyn ElectionFeed>) -> Self {
        let (tx, rx) = unbounded();
        Self { feed, tx, rx }
    }

    pub fn feed(&self) -> &Arc<dyn ElectionFeed> {
        &self.feed
    }

    /// Start `pending` on its own thread.
    pub fn submit(&self, pending: PendingFetch) {
        let feed = Arc::clone(&self.feed);
        let tx = self.tx.clone();
        let fallback = (pending.ticket, pending.request.clone());

        let spawned = thread::Builder::new()
            .name("stats-fetch".into())
            .spawn(move || {
                let completion = Self::run_on(feed.as_ref(), pending);
                let _ = tx.send(completion);
            });

        if let Err(e) = spawned {
            tracing::warn!(error = %e, "[feed::worker] could not start fetch thread");
            let (ticket, request) = fallback;
            let _ = self.tx.send(FetchCompletion {
                ticket,
                request,
                result: Err(FetchError::Transport(format!("could not start fetch: {e}"))),
            });
        }
    }

    /// Perform `pending` on the current thread.
    pub fn run(&self, pending: PendingFetch) -> FetchCompletion {
        Self::run_on(self.feed.as_ref(), pending)
    }

    pub fn try_recv(&self) -> Option<FetchCompletion> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<FetchCompletion> {
        self.rx.recv_timeout(timeout).ok()
    }

    fn run_on(feed: &dyn ElectionFeed, pending: PendingFetch) -> FetchCompletion {
        let result = match &pending.request {
            FetchRequest::Votes { date } => feed.fetch_election_votes(date),
            FetchRequest::Results { date, race } => feed.fetch_election_results(date, race),
        };
        if let Err(err) = &result {
            tracing::warn!(request = ?pending.request, error = %err, "[feed::worker] fetch failed");
        }
        FetchCompletion { ticket: pending.ticket, request: pending.request, result }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        feed::{ContactMessage, PcoDirectory, PrecinctListing},
        state::{ElectionCatalog, FilterMachine},
        types::{PrecinctId, PrecinctStat},
    };

    #[derive(Default)]
    struct CountingFeed {
        calls: AtomicUsize,
    }

    impl ElectionFeed for CountingFeed {
        fn fetch_election_votes(&self, _date: &str) -> Result<StatsTable, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
            let stat = PrecinctStat { votes: n + 1, ..PrecinctStat::zeroed() };
            Ok(StatsTable::from_rows([(PrecinctId::new("1"), stat)]))
        }

        fn fetch_election_results(&self, date: &str, race: &str) -> Result<StatsTable, FetchError> {
            Err(FetchError::NotFound(format!("{date}/{race}")))
        }

        fn fetch_precinct_list(&self) -> Result<Vec<PrecinctListing>, FetchError> {
            Ok(Vec::new())
        }

        fn submit_contact_message(&self, _message: &ContactMessage) -> Result<(), FetchError> {
            Ok(())
        }

        fn fetch_catalog(&self) -> Result<ElectionCatalog, FetchError> {
            Ok(ElectionCatalog::default())
        }

        fn fetch_pco_directory(&self) -> Result<PcoDirectory, FetchError> {
            Ok(PcoDirectory::default())
        }
    }

    #[test]
    fn completions_keep_their_ticket() {
        let worker = FetchWorker::new(Arc::new(CountingFeed::default()));
        let mut filter = FilterMachine::default();
        let pending = filter.select_election("2024-11-05").unwrap();
        let ticket = pending.ticket;

        worker.submit(pending);
        let completion = worker.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(completion.ticket, ticket);
        assert!(filter.is_current(completion.ticket));
        assert_eq!(completion.result.unwrap().len(), 1);
    }

    #[test]
    fn failures_are_delivered_not_dropped() {
        let worker = FetchWorker::new(Arc::new(CountingFeed::default()));
        let mut filter = FilterMachine::default();
        filter.select_election("2024-11-05").unwrap();
        let completion = worker.run(filter.select_race("Governor").unwrap());
        assert!(matches!(completion.result, Err(FetchError::NotFound(_))));
    }
}
