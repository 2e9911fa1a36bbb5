//! Single-slot notification channel. A new notification replaces the current
//! one and restarts the visibility timer; each notification clears itself after
//! `NOTIFICATION_LIFETIME` unless replaced first.

use std::sync::{Arc, Mutex, PoisonError};
use tokio::{
    runtime::Handle,
    sync::watch,
    time::{Duration, Instant, sleep_until},
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const NOTIFICATION_LIFETIME: Duration = Duration::from_millis(5000);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub error: bool,
}

impl Notification {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: false,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: true,
        }
    }
}

#[derive(Default)]
struct Slot {
    current: Option<(Notification, Instant)>,
    generation: u64,
    timer: Option<CancellationToken>,
}

struct Inner {
    slot: Mutex<Slot>,
    tx: watch::Sender<Option<Notification>>,
    lifetime: Duration,
}

#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        Self::with_lifetime(NOTIFICATION_LIFETIME)
    }

    #[must_use]
    pub fn with_lifetime(lifetime: Duration) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot::default()),
                tx,
                lifetime,
            }),
        }
    }

    /// Replaces the live notification and restarts its lifetime.
    pub fn notify(&self, notification: Notification) {
        let expires_at = Instant::now() + self.inner.lifetime;
        let token = CancellationToken::new();

        // Publishing under the slot lock keeps the channel in the slot's order.
        let generation = {
            let mut slot = self.lock();
            if let Some(previous) = slot.timer.replace(token.clone()) {
                previous.cancel();
            }
            slot.generation += 1;
            slot.current = Some((notification.clone(), expires_at));
            debug!(error = notification.error, "notification posted");
            self.inner.tx.send_replace(Some(notification));
            slot.generation
        };

        // Outside a runtime the slot still expires lazily through `current`.
        if let Ok(handle) = Handle::try_current() {
            let notifier = self.clone();
            handle.spawn(async move {
                tokio::select! {
                    () = token.cancelled() => {}
                    () = sleep_until(expires_at) => notifier.expire(generation),
                }
            });
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(Notification::info(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(Notification::error(message));
    }

    /// Live notification, never one whose lifetime has passed.
    #[must_use]
    pub fn current(&self) -> Option<Notification> {
        let slot = self.lock();
        match &slot.current {
            Some((notification, expires_at)) if Instant::now() < *expires_at => {
                Some(notification.clone())
            }
            _ => None,
        }
    }

    pub fn clear(&self) {
        let mut slot = self.lock();
        if let Some(timer) = slot.timer.take() {
            timer.cancel();
        }
        slot.generation += 1;
        slot.current = None;
        self.inner.tx.send_replace(None);
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.inner.tx.subscribe()
    }

    fn expire(&self, generation: u64) {
        let mut slot = self.lock();
        if slot.generation != generation {
            return;
        }
        slot.current = None;
        slot.timer = None;
        self.inner.tx.send_replace(None);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.inner
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
