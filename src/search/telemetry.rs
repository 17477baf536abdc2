//! Progress reporting for running searches.
//!
//! A `ProgressChannel` is owned by the caller and lent to each search through
//! its `SearchContext`. Emission is fire-and-forget: listener errors and
//! panics are logged and swallowed, and an empty channel costs one lock.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::game_state::onitama_types::CandidateMove;

/// Which part of a multi-phase search produced an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Priority,
    Shallow,
    Minimax,
    AlphaBeta,
    MonteCarlo,
}

/// Per-candidate statistics, e.g. Monte Carlo win rates.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateStat {
    pub mv: CandidateMove,
    pub simulations: u64,
    pub win_rate: f64,
}

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub algorithm: &'static str,
    pub phase: Option<SearchPhase>,
    pub best_move: Option<CandidateMove>,
    pub score: i32,
    pub depth: u8,
    /// Nodes visited, or simulations run for sampling phases.
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub candidates: Vec<CandidateStat>,
    pub emitted_at: DateTime<Utc>,
}

impl ProgressUpdate {
    pub fn new(algorithm: &'static str) -> Self {
        Self {
            algorithm,
            phase: None,
            best_move: None,
            score: 0,
            depth: 0,
            nodes: 0,
            elapsed_ms: 0,
            candidates: Vec::new(),
            emitted_at: Utc::now(),
        }
    }
}

pub type ListenerResult = Result<(), String>;
type Listener = Arc<dyn Fn(&ProgressUpdate) -> ListenerResult + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct ProgressChannel {
    name: String,
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
}

impl ProgressChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ProgressUpdate) -> ListenerResult + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(listener)));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    /// Listeners run outside the lock, so they may subscribe or unsubscribe
    /// on this channel. A listener removed mid-emit still sees this update.
    pub fn emit(&self, update: ProgressUpdate) {
        let listeners: Vec<(SubscriptionId, Listener)> = self.lock().clone();
        for (id, listener) in &listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(&update))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(
                    "progress listener {:?} on '{}' failed: {}",
                    id, self.name, err
                ),
                Err(_) => warn!("progress listener {:?} on '{}' panicked", id, self.name),
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
        match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for ProgressChannel {
    fn default() -> Self {
        Self::new("search")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn emit_without_listeners_is_a_no_op() {
        let channel = ProgressChannel::default();
        channel.emit(ProgressUpdate::new("test"));
        assert_eq!(channel.listener_count(), 0);
    }

    #[test]
    fn listeners_receive_updates_until_unsubscribed() {
        let channel = ProgressChannel::new("ai-progress");
        let seen = Arc::new(AtomicU64::new(0));
        let sink = Arc::clone(&seen);
        let id = channel.subscribe(move |u| {
            assert_eq!(u.algorithm, "test");
            sink.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        channel.emit(ProgressUpdate::new("test"));
        assert!(channel.unsubscribe(id));
        channel.emit(ProgressUpdate::new("test"));

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(!channel.unsubscribe(id));
    }

    #[test]
    fn failing_and_panicking_listeners_do_not_stop_others() {
        let channel = ProgressChannel::default();
        let seen = Arc::new(AtomicU64::new(0));
        channel.subscribe(|_| Err("display detached".to_owned()));
        channel.subscribe(|_| panic!("listener bug"));
        let sink = Arc::clone(&seen);
        channel.subscribe(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        channel.emit(ProgressUpdate::new("test"));
        channel.emit(ProgressUpdate::new("test"));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listener_can_unsubscribe_itself_during_emit() {
        let channel = Arc::new(ProgressChannel::default());
        let own_id = Arc::new(Mutex::new(None));
        let seen = Arc::new(AtomicU64::new(0));

        let handle = Arc::clone(&channel);
        let slot = Arc::clone(&own_id);
        let sink = Arc::clone(&seen);
        let id = channel.subscribe(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
            let own = slot.lock().map_err(|e| e.to_string())?.take();
            if let Some(own) = own {
                handle.unsubscribe(own);
            }
            Ok(())
        });
        *own_id.lock().expect("lock") = Some(id);

        let (done_tx, done_rx) = mpsc::channel();
        let emitter = Arc::clone(&channel);
        thread::spawn(move || {
            emitter.emit(ProgressUpdate::new("test"));
            emitter.emit(ProgressUpdate::new("test"));
            let _ = done_tx.send(());
        });

        done_rx
            .recv_timeout(Duration::from_secs(3))
            .expect("emit returns while a listener unsubscribes itself");
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(channel.listener_count(), 0);
    }

    #[test]
    fn listener_can_subscribe_during_emit() {
        let channel = Arc::new(ProgressChannel::default());
        let handle = Arc::clone(&channel);
        channel.subscribe(move |_| {
            handle.subscribe(|_| Ok(()));
            Ok(())
        });
        channel.emit(ProgressUpdate::new("test"));
        assert_eq!(channel.listener_count(), 2);
    }
}
