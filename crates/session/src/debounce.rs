use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

type SendFn<T> = Arc<dyn Fn(T) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

struct Slot<T> {
    pending: Option<T>,
    armed:   bool,
}

/// Coalesces bursts of values into a single deferred send.
///
/// The first [`schedule`](Self::schedule) opens a window of `delay`; further
/// calls inside the window only replace the pending value. When the window
/// closes the latest value is sent once and the next call opens a new window.
/// The window is never extended.
pub struct Debouncer<T> {
    delay:  Duration,
    slot:   Arc<Mutex<Slot<T>>>,
    send:   SendFn<T>,
    cancel: CancellationToken,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(delay: Duration, send: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::with_cancel(delay, CancellationToken::new(), send)
    }

    /// Like [`new`](Self::new), but the timer stops (dropping any pending
    /// value) when `cancel` fires.
    pub fn with_cancel<F, Fut>(delay: Duration, cancel: CancellationToken, send: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let send: SendFn<T> = Arc::new(move |value: T| {
            Box::pin(send(value)) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        Self {
            delay,
            slot: Arc::new(Mutex::new(Slot { pending: None, armed: false })),
            send,
            cancel,
        }
    }

    /// Queue `value`, arming the timer if it isn't already running.
    pub fn schedule(&self, value: T) {
        {
            let mut slot = lock(&self.slot);
            slot.pending = Some(value);
            if slot.armed {
                return;
            }
            slot.armed = true;
        }

        let slot   = Arc::clone(&self.slot);
        let send   = Arc::clone(&self.send);
        let cancel = self.cancel.clone();
        let delay  = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let mut slot = lock(&slot);
                    slot.armed = false;
                    slot.pending = None;
                    debug!("debounce timer cancelled");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let value = {
                let mut slot = lock(&slot);
                slot.armed = false;
                slot.pending.take()
            };
            if let Some(value) = value {
                send(value).await;
            }
        });
    }

    /// Whether a send is currently scheduled.
    pub fn is_pending(&self) -> bool {
        lock(&self.slot).armed
    }

    /// Stop the timer and drop any pending value. Later calls to
    /// [`schedule`](Self::schedule) are discarded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// The slot is only held for a field swap, so a poisoned lock still holds
/// consistent data.
fn lock<T>(slot: &Mutex<Slot<T>>) -> std::sync::MutexGuard<'_, Slot<T>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
