//! Delayed action timer: disable the adapter, wait, then re-enable it
//!
//! Single slot. Starting a session cancels and joins the previous one first,
//! so two workers never run at once. Cancellation is cooperative through a
//! per-session flag polled every `poll_interval`.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex as StdMutex,
    },
    time::Duration,
};

use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{sleep, timeout, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    controller::Controller,
    state::{AdapterState, FinishedSession, SessionOutcome, TargetState, TimerStatus},
};

/// Timing knobs for the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    /// Cancellation takes effect within this long during the wait
    pub poll_interval: Duration,
    /// How long `cancel` waits for the worker before aborting it
    pub cancel_wait: Duration,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            cancel_wait: Duration::from_secs(1),
        }
    }
}

struct ActiveSession {
    id: u64,
    cancel: Arc<AtomicBool>,
    worker: JoinHandle<SessionOutcome>,
}

/// State shared with the worker
struct TimerShared {
    status_tx: watch::Sender<TimerStatus>,
    last_finished: StdMutex<Option<FinishedSession>>,
}

impl TimerShared {
    fn finish(&self, id: u64, outcome: SessionOutcome) {
        let session = FinishedSession { id, outcome };
        if let Ok(mut last) = self.last_finished.lock() {
            *last = Some(session);
        }
        self.status_tx.send_replace(TimerStatus::finished(session));
    }
}

pub struct DelayedActionTimer {
    controller: Arc<Controller>,
    settings: TimerSettings,
    slot: Mutex<Option<ActiveSession>>,
    next_id: AtomicU64,
    shared: Arc<TimerShared>,
}

impl DelayedActionTimer {
    pub fn new(controller: Arc<Controller>, settings: TimerSettings) -> Self {
        let (status_tx, _) = watch::channel(TimerStatus::idle());
        Self {
            controller,
            settings,
            slot: Mutex::new(None),
            next_id: AtomicU64::new(1),
            shared: Arc::new(TimerShared {
                status_tx,
                last_finished: StdMutex::new(None),
            }),
        }
    }

    pub fn status(&self) -> TimerStatus {
        self.shared.status_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerStatus> {
        self.shared.status_tx.subscribe()
    }

    /// The most recently ended session
    pub fn last_finished(&self) -> Option<FinishedSession> {
        self.shared.last_finished.lock().ok().and_then(|last| *last)
    }

    /// Start a disable-wait-enable session, superseding any running one
    ///
    /// Returns the new session id. The previous worker has stopped touching
    /// the adapter by the time this returns.
    pub async fn start(&self, duration_seconds: u64) -> u64 {
        let mut slot = self.slot.lock().await;
        if let Some(previous) = slot.take() {
            info!("Replacing timer session {}", previous.id);
            self.stop(previous).await;
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let cancel = Arc::new(AtomicBool::new(false));
        info!("Timer session {}: disabling for {}s", id, duration_seconds);
        self.shared
            .status_tx
            .send_replace(TimerStatus::running(id, duration_seconds, duration_seconds));

        let worker = tokio::spawn(run_session(
            id,
            Duration::from_secs(duration_seconds),
            Arc::clone(&self.controller),
            Arc::clone(&cancel),
            Arc::clone(&self.shared),
            self.settings.poll_interval,
        ));

        *slot = Some(ActiveSession { id, cancel, worker });
        id
    }

    /// Stop the running session, if any, without touching the adapter
    ///
    /// Returns how the session ended, or `None` if there was nothing to cancel.
    pub async fn cancel(&self) -> Option<SessionOutcome> {
        let mut slot = self.slot.lock().await;
        match slot.take() {
            Some(session) => Some(self.stop(session).await),
            None => {
                debug!("No timer session to cancel");
                None
            }
        }
    }

    /// Cancel the timer and make sure the adapter ends up enabled
    pub async fn cancel_and_enable(&self) -> AdapterState {
        self.cancel().await;
        self.controller.set_state(TargetState::Enabled).await
    }

    async fn stop(&self, session: ActiveSession) -> SessionOutcome {
        let ActiveSession { id, cancel, mut worker } = session;
        cancel.store(true, Ordering::SeqCst);

        match timeout(self.settings.cancel_wait, &mut worker).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                warn!("Timer session {} ended abnormally: {}", id, e);
                self.shared.finish(id, SessionOutcome::Aborted);
                SessionOutcome::Aborted
            }
            Err(_) => {
                warn!(
                    "Timer session {} did not stop within {:?}, aborting it",
                    id, self.settings.cancel_wait
                );
                worker.abort();
                let _ = worker.await;
                // A command already handed to the controller still completes and is recorded
                self.shared.finish(id, SessionOutcome::Aborted);
                SessionOutcome::Aborted
            }
        }
    }
}

/// Body of one timer session
async fn run_session(
    id: u64,
    duration: Duration,
    controller: Arc<Controller>,
    cancel: Arc<AtomicBool>,
    shared: Arc<TimerShared>,
    poll_interval: Duration,
) -> SessionOutcome {
    let outcome =
        disable_wait_enable(id, duration, &controller, &cancel, &shared, poll_interval).await;
    match outcome {
        SessionOutcome::Completed => info!("Timer session {} completed", id),
        _ => info!("Timer session {} cancelled", id),
    }
    shared.finish(id, outcome);
    outcome
}

async fn disable_wait_enable(
    id: u64,
    duration: Duration,
    controller: &Controller,
    cancel: &AtomicBool,
    shared: &TimerShared,
    poll_interval: Duration,
) -> SessionOutcome {
    let state = controller.set_state(TargetState::Disabled).await;
    if state != AdapterState::Disabled {
        warn!("Timer session {}: adapter is {} after disable", id, state);
    }

    let start_time = Instant::now();
    loop {
        if cancel.load(Ordering::SeqCst) {
            return SessionOutcome::Cancelled;
        }

        let elapsed = start_time.elapsed();
        if elapsed >= duration {
            break;
        }

        let remaining = duration - elapsed;
        shared.status_tx.send_replace(TimerStatus::running(
            id,
            duration.as_secs(),
            remaining.as_secs_f64().ceil() as u64,
        ));
        sleep(poll_interval.min(remaining)).await;
    }

    if cancel.load(Ordering::SeqCst) {
        return SessionOutcome::Cancelled;
    }

    info!("Timer session {} expired, re-enabling", id);
    controller.set_state(TargetState::Enabled).await;
    SessionOutcome::Completed
}
