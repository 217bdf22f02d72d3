//! Transient success/error notifications with scoped auto-dismiss timers

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, message: message.into() }
    }
}

/// Holds at most one visible notification.
///
/// Every `show` replaces the visible notification and aborts the previous
/// dismiss timer. Dropping the last handle aborts any pending timer; the
/// timer task only holds a weak reference back to the center.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<State>,
    dismiss_after: Duration,
}

/// Notification, generation and timer change together under one lock
#[derive(Default)]
struct State {
    current: Option<Notification>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl NotificationCenter {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            inner: Arc::new(Inner { state: Mutex::new(State::default()), dismiss_after }),
        }
    }

    /// Show `notification`, superseding whatever is visible
    pub fn show(&self, notification: Notification) {
        let mut state = lock(&self.inner.state);
        state.generation += 1;
        state.current = Some(notification);

        let generation = state.generation;
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                let weak: Weak<Inner> = Arc::downgrade(&self.inner);
                let delay = self.inner.dismiss_after;
                Some(rt.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(inner) = weak.upgrade() {
                        inner.clear_if_current(generation);
                    }
                }))
            }
            Err(_) => {
                debug!("no tokio runtime; notification stays until dismissed");
                None
            }
        };

        if let Some(previous) = std::mem::replace(&mut state.timer, handle) {
            previous.abort();
        }
    }

    /// The visible notification, if any
    pub fn current(&self) -> Option<Notification> {
        lock(&self.inner.state).current.clone()
    }

    pub fn dismiss(&self) {
        let mut state = lock(&self.inner.state);
        state.generation += 1;
        state.current = None;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
    }
}

impl Inner {
    fn clear_if_current(&self, generation: u64) {
        let mut state = lock(&self.state);
        if state.generation == generation {
            state.current = None;
            state.timer = None;
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(timer) = lock(&self.state).timer.take() {
            timer.abort();
        }
    }
}
