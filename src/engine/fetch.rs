/// Loading track items in the background, keeping only the newest request's answer.
use std::fmt::Debug;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::types::TrackItemBatch;

/// Where track items come from. Returns items overlapping `[begin, end]`.
pub trait RecordSource {
    fn fetch_records(&self, begin: DateTime<Local>, end: DateTime<Local>) -> Result<TrackItemBatch>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

/// Tracks which request is the current one. Answers to older requests are stale.
#[derive(Debug)]
pub struct FetchCoordinator<P> {
    next_id: u64,
    latest: Option<(RequestId, P)>,
    pending: bool,
}

impl<P> Default for FetchCoordinator<P> {
    fn default() -> Self {
        Self {
            next_id: 0,
            latest: None,
            pending: false,
        }
    }
}

impl<P: Clone + Debug> FetchCoordinator<P> {
    /// Registers a new request, superseding any in-flight one.
    pub fn request(&mut self, params: P) -> RequestId {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        log::debug!("Fetch {id:?} requested for {params:?}");
        self.latest = Some((id, params));
        self.pending = true;
        id
    }

    /// Returns the result if `id` is the latest request, `None` when it is stale.
    pub fn accept<T>(&mut self, id: RequestId, result: Result<T>) -> Option<Result<T>> {
        match &self.latest {
            Some((latest, _)) if *latest == id => {
                self.pending = false;
                Some(result)
            }
            _ => {
                log::debug!("Discarding stale fetch response {id:?}");
                None
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn latest_params(&self) -> Option<&P> {
        self.latest.as_ref().map(|(_, params)| params)
    }
}

struct FetchResponse<P> {
    id: RequestId,
    params: P,
    result: Result<TrackItemBatch>,
}

/// Runs each fetch on its own thread and hands back the newest answer.
pub struct Loader<P> {
    coordinator: FetchCoordinator<P>,
    tx: Sender<FetchResponse<P>>,
    rx: Receiver<FetchResponse<P>>,
}

impl<P> Default for Loader<P> {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            coordinator: FetchCoordinator::default(),
            tx,
            rx,
        }
    }
}

impl<P: Clone + Debug + Send + 'static> Loader<P> {
    pub fn spawn<F>(&mut self, params: P, fetch: F) -> RequestId
    where
        F: FnOnce() -> Result<TrackItemBatch> + Send + 'static,
    {
        let id = self.coordinator.request(params.clone());
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = fetch();
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send(FetchResponse { id, params, result });
        });
        id
    }

    /// Drains finished fetches and returns the answer to the latest request, if it arrived.
    pub fn poll(&mut self) -> Option<(P, Result<TrackItemBatch>)> {
        let mut accepted = None;
        while let Ok(response) = self.rx.try_recv() {
            if let Some(result) = self.coordinator.accept(response.id, response.result) {
                accepted = Some((response.params, result));
            }
        }
        accepted
    }

    pub fn is_loading(&self) -> bool {
        self.coordinator.is_pending()
    }

    pub fn latest_params(&self) -> Option<&P> {
        self.coordinator.latest_params()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::types::tests::{app_item, local};

    fn batch_with(id: u32) -> TrackItemBatch {
        std::iter::once(app_item(
            id,
            "code",
            "file",
            local(2024, 5, 1, 10, 0),
            local(2024, 5, 1, 11, 0),
        ))
        .collect()
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut coordinator = FetchCoordinator::default();
        let first = coordinator.request("march");
        let second = coordinator.request("april");

        assert!(coordinator.accept(second, Ok(2)).is_some());
        assert!(coordinator.accept(first, Ok(1)).is_none());
        assert_eq!(coordinator.latest_params(), Some(&"april"));
        assert!(!coordinator.is_pending());
    }

    #[test]
    fn failed_latest_response_is_surfaced() {
        let mut coordinator: FetchCoordinator<&str> = FetchCoordinator::default();
        let id = coordinator.request("march");
        let result = coordinator.accept::<u32>(id, Err(anyhow::anyhow!("disk gone")));
        assert!(matches!(result, Some(Err(_))));
    }

    fn poll_until<P: Clone + Debug + Send + 'static>(
        loader: &mut Loader<P>,
    ) -> Option<(P, Result<TrackItemBatch>)> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(answer) = loader.poll() {
                return Some(answer);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn slow_earlier_fetch_does_not_overwrite_later_one() {
        let mut loader = Loader::default();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        loader.spawn("march", move || {
            release_rx.recv().ok();
            Ok(batch_with(1))
        });
        loader.spawn("april", || Ok(batch_with(2)));

        let (params, result) = poll_until(&mut loader).unwrap();
        assert_eq!(params, "april");
        assert_eq!(result.unwrap().iter().next().map(|item| item.id), Some(2));
        assert!(!loader.is_loading());

        release_tx.send(()).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        assert!(loader.poll().is_none());
    }
}
