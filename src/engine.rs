//! Engine wiring: shared state, scheduler loops, and the caller-facing API.
//!
//! A [`ChatEngine`] owns the roster, the active set, the message stream and
//! the notification tracker behind one state lock, so every append is
//! serialized no matter which producer it came from (background generator,
//! user send, delayed admin reply). Periodic work runs on spawned tokio
//! tasks that select on a shared shutdown channel; one-shot reply timers
//! select on the same channel, so [`ChatEngine::stop`] cancels everything
//! and leaves no dangling timers behind.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tokio::sync::watch;

use crate::config::ChatConfig;
use crate::content;
use crate::event::{now_millis, Attachment, Category, EventId, MessageEvent};
use crate::identity::{Identity, Roster, ADMIN_ID};
use crate::notify::{NotificationSnapshot, NotificationTracker};
use crate::presence::ActiveSet;
use crate::responder;
use crate::simlog;
use crate::stream::MessageStream;

/// Errors surfaced by the engine API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Private messages may only target the admin channel.
    InvalidRecipient(String),
    /// The engine was stopped; no further sends are accepted.
    Stopped,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidRecipient(recipient) => {
                write!(f, "invalid private recipient: {recipient}")
            }
            EngineError::Stopped => write!(f, "engine is stopped"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Lifecycle of an engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Initializing,
    Running,
    Stopped,
}

/// Counters exposed to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub unseen_count: u64,
    /// Size of the current active set, the honest "online" number; any
    /// display ceiling is the caller's concern.
    pub approx_online_count: usize,
}

/// Callback invoked for every appended event.
pub type EventCallback = Arc<dyn Fn(&MessageEvent) + Send + Sync>;

struct EngineState {
    stream: MessageStream,
    active: ActiveSet,
    tracker: NotificationTracker,
    rng: ChaCha8Rng,
}

struct EngineInner {
    config: ChatConfig,
    local_user_id: String,
    roster: Roster,
    state: Mutex<EngineState>,
    subscribers: Mutex<Vec<EventCallback>>,
    status: Mutex<EngineStatus>,
    visible: AtomicBool,
    welcomed: AtomicBool,
    next_event_id: AtomicU64,
    shutdown_tx: watch::Sender<bool>,
}

/// Handle to a running engine. Cheap to clone; all clones share one engine.
#[derive(Clone)]
pub struct ChatEngine {
    inner: Arc<EngineInner>,
}

impl ChatEngine {
    /// Build the roster and initial active set, then move to `Running` and
    /// spawn the production and rotation loops.
    ///
    /// Must be called from within a tokio runtime. The loops keep running
    /// until [`stop`](Self::stop) is called, even after every handle clone
    /// is dropped.
    pub fn start(config: ChatConfig, local_user_id: impl Into<String>) -> Self {
        let local_user_id = local_user_id.into();
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let roster = Roster::generate(&mut rng, config.roster_size);
        let active = ActiveSet::initial(&mut rng, &roster, config.active_set_size);
        let (shutdown_tx, _) = watch::channel(false);

        let inner = Arc::new(EngineInner {
            state: Mutex::new(EngineState {
                stream: MessageStream::new(config.stream_cap),
                active,
                tracker: NotificationTracker::new(),
                rng,
            }),
            local_user_id,
            roster,
            subscribers: Mutex::new(Vec::new()),
            status: Mutex::new(EngineStatus::Initializing),
            visible: AtomicBool::new(false),
            welcomed: AtomicBool::new(false),
            next_event_id: AtomicU64::new(1),
            shutdown_tx,
            config,
        });

        *inner.status.lock().unwrap() = EngineStatus::Running;
        spawn_production_loop(Arc::clone(&inner));
        spawn_rotation_loop(Arc::clone(&inner));
        simlog!(
            "engine running: roster={} active={} user={}",
            inner.roster.len(),
            inner.config.active_set_size,
            crate::logging::user_id(&inner.local_user_id)
        );

        ChatEngine { inner }
    }

    pub fn status(&self) -> EngineStatus {
        *self.inner.status.lock().unwrap()
    }

    pub fn local_user_id(&self) -> &str {
        &self.inner.local_user_id
    }

    /// Post a public message as the local user. Appends synchronously and
    /// schedules the admin's delayed reaction before returning.
    ///
    /// The reaction is a standalone event (its `reply_to_id` is unset);
    /// `reply_to` on the user's own message may reference an already
    /// evicted event and is stored as-is.
    pub fn send(
        &self,
        body: impl Into<String>,
        attachment: Option<Attachment>,
        reply_to: Option<EventId>,
    ) -> Result<EventId, EngineError> {
        self.ensure_running()?;
        let event = MessageEvent {
            id: self.inner.allocate_id(),
            author_id: self.inner.local_user_id.clone(),
            body: body.into(),
            created_at: now_millis(),
            category: Category::General,
            is_private: false,
            recipient_id: None,
            reply_to_id: reply_to,
            attachment,
        };
        let id = event.id;
        self.inner.append(event.clone());
        schedule_reaction(&self.inner, &event);
        Ok(id)
    }

    /// Post to the private support channel. The only valid recipient is
    /// [`ADMIN_ID`]; anything else is rejected and nothing is appended.
    pub fn send_private(
        &self,
        body: impl Into<String>,
        recipient: &str,
    ) -> Result<EventId, EngineError> {
        self.ensure_running()?;
        if recipient != ADMIN_ID {
            return Err(EngineError::InvalidRecipient(recipient.to_string()));
        }
        let event = MessageEvent {
            id: self.inner.allocate_id(),
            author_id: self.inner.local_user_id.clone(),
            body: body.into(),
            created_at: now_millis(),
            category: Category::General,
            is_private: true,
            recipient_id: Some(ADMIN_ID.to_string()),
            reply_to_id: None,
            attachment: None,
        };
        let id = event.id;
        self.inner.append(event.clone());
        schedule_reaction(&self.inner, &event);
        Ok(id)
    }

    /// Register a callback invoked for every appended event. Callbacks run
    /// on the appending task and must not block.
    pub fn subscribe(&self, callback: EventCallback) {
        self.inner.subscribers.lock().unwrap().push(callback);
    }

    /// Inform the engine whether the feed is currently on-screen. The first
    /// transition to visible triggers the one-time welcome event.
    pub fn set_visible(&self, visible: bool) {
        self.inner.visible.store(visible, Ordering::Relaxed);
        if visible
            && !self.inner.welcomed.swap(true, Ordering::SeqCst)
            && self.status() == EngineStatus::Running
        {
            let body = {
                let mut state = self.inner.state.lock().unwrap();
                responder::welcome_body(&mut state.rng)
            };
            let delay = self.inner.config.reply_delay();
            let event = self.inner.admin_event(
                body,
                now_millis() + delay.as_millis() as u64,
                false,
                None,
            );
            schedule_delayed(&self.inner, event, delay);
        }
    }

    /// Reset the unseen counter and advance the last-seen watermark.
    pub fn mark_seen(&self) {
        self.inner.state.lock().unwrap().tracker.mark_seen();
    }

    pub fn notifications(&self) -> NotificationSnapshot {
        self.inner.state.lock().unwrap().tracker.snapshot()
    }

    pub fn stats(&self) -> Stats {
        let state = self.inner.state.lock().unwrap();
        Stats {
            unseen_count: state.tracker.snapshot().unseen_count,
            approx_online_count: state.active.len(),
        }
    }

    /// Snapshot of the current feed, oldest first.
    pub fn all(&self) -> Vec<MessageEvent> {
        self.inner.state.lock().unwrap().stream.all()
    }

    pub fn find(&self, id: EventId) -> Option<MessageEvent> {
        self.inner.state.lock().unwrap().stream.find(id)
    }

    /// Identities currently in the active set, oldest member first.
    pub fn online_users(&self) -> Vec<Identity> {
        let ids = self.inner.state.lock().unwrap().active.ids();
        ids.iter()
            .filter_map(|id| self.inner.roster.get(id).cloned())
            .collect()
    }

    pub fn roster_identity(&self, id: &str) -> Option<Identity> {
        self.inner.roster.get(id).cloned()
    }

    /// Cancel the periodic loops and every pending delayed reply. Calling
    /// `stop` on an already-stopped engine is a no-op.
    pub fn stop(&self) {
        {
            let mut status = self.inner.status.lock().unwrap();
            if *status == EngineStatus::Stopped {
                return;
            }
            *status = EngineStatus::Stopped;
        }
        let _ = self.inner.shutdown_tx.send(true);
        simlog!("engine stopped");
    }

    fn ensure_running(&self) -> Result<(), EngineError> {
        match self.status() {
            EngineStatus::Stopped => Err(EngineError::Stopped),
            EngineStatus::Initializing | EngineStatus::Running => Ok(()),
        }
    }
}

impl EngineInner {
    fn allocate_id(&self) -> EventId {
        self.next_event_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Serialized append: feed the notification tracker, insert into the
    /// stream, then fan out to subscribers outside the state lock.
    fn append(&self, event: MessageEvent) {
        if *self.status.lock().unwrap() == EngineStatus::Stopped {
            return;
        }
        let visible = self.visible.load(Ordering::Relaxed);
        {
            let mut state = self.state.lock().unwrap();
            state.tracker.on_new_event(&event, visible);
            state.stream.append(event.clone());
        }
        let subscribers: Vec<EventCallback> = self.subscribers.lock().unwrap().clone();
        for callback in &subscribers {
            callback(&event);
        }
    }

    fn admin_event(
        &self,
        body: String,
        created_at: u64,
        is_private: bool,
        recipient_id: Option<String>,
    ) -> MessageEvent {
        MessageEvent {
            id: self.allocate_id(),
            author_id: ADMIN_ID.to_string(),
            body,
            created_at,
            category: Category::General,
            is_private,
            recipient_id,
            reply_to_id: None,
            attachment: None,
        }
    }
}

/// Fire-and-forget one-shot timer. The task selects on the shutdown
/// channel, so `stop()` cancels it instead of leaking a dangling timer.
fn schedule_delayed(inner: &Arc<EngineInner>, event: MessageEvent, delay: Duration) {
    let inner = Arc::clone(inner);
    let mut shutdown_rx = inner.shutdown_tx.subscribe();
    tokio::spawn(async move {
        if *shutdown_rx.borrow() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => inner.append(event),
            _ = shutdown_rx.changed() => {}
        }
    });
}

/// Schedule the admin's reaction to a local-user message: same privacy and
/// (mirrored) recipient as the trigger, `created_at` pinned to trigger time
/// plus the configured delay.
fn schedule_reaction(inner: &Arc<EngineInner>, trigger: &MessageEvent) {
    if !responder::should_reply(trigger, &inner.local_user_id) {
        return;
    }
    let body = {
        let mut state = inner.state.lock().unwrap();
        responder::reply_body(&mut state.rng, trigger.category)
    };
    let delay = inner.config.reply_delay();
    let recipient = trigger.is_private.then(|| inner.local_user_id.clone());
    let event = inner.admin_event(
        body,
        trigger.created_at + delay.as_millis() as u64,
        trigger.is_private,
        recipient,
    );
    schedule_delayed(inner, event, delay);
}

/// One production tick: a random active member posts a weighted-random
/// category message. Background withdrawals additionally get delayed admin
/// commentary.
fn produce_background_message(inner: &Arc<EngineInner>) {
    let (event, commentary) = {
        let mut state = inner.state.lock().unwrap();
        let EngineState { active, rng, .. } = &mut *state;
        let Some(author_id) = active.pick(rng) else {
            return;
        };
        let category = inner.config.category_weights.sample(rng.gen::<f64>());
        let body = content::generate_body(rng, category);
        let commentary = (category == Category::Withdrawal)
            .then(|| responder::reply_body(rng, Category::Withdrawal));
        let event = MessageEvent {
            id: inner.allocate_id(),
            author_id,
            body,
            created_at: now_millis(),
            category,
            is_private: false,
            recipient_id: None,
            reply_to_id: None,
            attachment: None,
        };
        (event, commentary)
    };
    let trigger_at = event.created_at;
    inner.append(event);
    if let Some(body) = commentary {
        let delay = inner.config.commentary_delay();
        let event = inner.admin_event(body, trigger_at + delay.as_millis() as u64, false, None);
        schedule_delayed(inner, event, delay);
    }
}

fn rotate_active_set(inner: &EngineInner) {
    let outcome = {
        let mut state = inner.state.lock().unwrap();
        let EngineState { active, rng, .. } = &mut *state;
        active.rotate(rng, &inner.roster, inner.config.rotation_swap_size)
    };
    if outcome.is_partial() {
        simlog!(
            "rotation degraded: swapped {} of {} requested",
            outcome.swapped,
            outcome.requested
        );
    } else {
        simlog!("rotation: swapped {} members", outcome.swapped);
    }
}

fn spawn_production_loop(inner: Arc<EngineInner>) {
    if inner.config.message_interval().is_zero() {
        return;
    }
    let mut shutdown_rx = inner.shutdown_tx.subscribe();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(inner.config.message_interval());
        // The first interval tick completes immediately; consume it so
        // production starts one full period after start().
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => produce_background_message(&inner),
                _ = shutdown_rx.changed() => break,
            }
        }
    });
}

fn spawn_rotation_loop(inner: Arc<EngineInner>) {
    if inner.config.rotation_interval().is_zero() {
        return;
    }
    let mut shutdown_rx = inner.shutdown_tx.subscribe();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(inner.config.rotation_interval());
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => rotate_active_set(&inner),
                _ = shutdown_rx.changed() => break,
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        assert_eq!(
            EngineError::InvalidRecipient("guest-0001".to_string()).to_string(),
            "invalid private recipient: guest-0001"
        );
        assert_eq!(EngineError::Stopped.to_string(), "engine is stopped");
    }

    #[test]
    fn test_stats_serialize_shape() {
        let stats = Stats {
            unseen_count: 3,
            approx_online_count: 50,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["unseen_count"], 3);
        assert_eq!(json["approx_online_count"], 50);
    }
}
