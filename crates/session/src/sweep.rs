use edugrid_config::TimingConfig;
use edugrid_core::{Message, Result, SweepSummary};
use edugrid_device::{DeviceClient, SweepData};
use std::future::Future;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Anything that can answer a sweep data poll.
pub trait SweepSource: Send + Sync + 'static {
    fn fetch_sweep(&self) -> impl Future<Output = Result<SweepData>> + Send;
}

impl SweepSource for DeviceClient {
    fn fetch_sweep(&self) -> impl Future<Output = Result<SweepData>> + Send {
        DeviceClient::fetch_sweep(self)
    }
}

/// Poll `source` until the firmware reports the sweep as done.
///
/// Every successful poll is summarised and forwarded as
/// [`Message::SweepUpdated`]. While the sweep is running the next poll
/// follows after `sweep_poll`; a failed poll is retried after `sweep_retry`
/// with no attempt limit. Returns the final summary, or `None` when cancelled
/// or when the message bus is gone.
pub async fn poll_sweep<S: SweepSource>(
    source: S,
    timing: TimingConfig,
    bus:    mpsc::Sender<Message>,
    cancel: CancellationToken,
) -> Option<SweepSummary> {
    loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => return None,
            res = source.fetch_sweep() => res,
        };

        let delay = match result {
            Ok(data) => {
                let summary = data.summary();
                if bus.send(Message::SweepUpdated(summary.clone())).await.is_err() {
                    return None;
                }
                if data.done {
                    info!(
                        "Sweep finished: {} I-V points, {}",
                        summary.iv_curve.len(),
                        if summary.mpp.is_some() { summary.mpp_label() } else { "no MPP".into() }
                    );
                    let _ = bus.send(Message::SweepFinished).await;
                    return Some(summary);
                }
                timing.sweep_poll()
            }
            Err(e) => {
                warn!("Sweep poll failed: {e}; retrying in {}ms", timing.sweep_retry_ms);
                timing.sweep_retry()
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edugrid_core::UiError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    /// Replays a fixed script of poll results, recording when each poll ran.
    #[derive(Clone)]
    struct Scripted {
        script: Arc<Mutex<VecDeque<Result<SweepData>>>>,
        polls:  Arc<Mutex<Vec<Instant>>>,
    }

    impl Scripted {
        fn new(script: Vec<Result<SweepData>>) -> Self {
            Self {
                script: Arc::new(Mutex::new(script.into())),
                polls:  Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl SweepSource for Scripted {
        fn fetch_sweep(&self) -> impl Future<Output = Result<SweepData>> + Send {
            self.polls.lock().unwrap().push(Instant::now());
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(SweepData::default()));
            async move { next }
        }
    }

    fn partial(done: bool) -> SweepData {
        SweepData {
            voltages: vec![2.0, 1.0, 3.0],
            currents: vec![1.0, 2.0, 3.0],
            powers:   vec![2.0, 2.0, 9.0],
            in_progress: !done,
            done,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_done_with_retry_backoff() {
        let source = Scripted::new(vec![
            Ok(partial(false)),
            Err(UiError::Http("timeout".into())),
            Ok(partial(true)),
        ]);
        let polls = Arc::clone(&source.polls);
        let (tx, mut rx) = mpsc::channel(16);

        let start = Instant::now();
        let summary = poll_sweep(source, TimingConfig::default(), tx, CancellationToken::new())
            .await
            .expect("finished");

        assert_eq!(summary.mpp.map(|m| m.power), Some(9.0));

        let offsets: Vec<Duration> = polls.lock().unwrap().iter().map(|t| *t - start).collect();
        assert_eq!(
            offsets,
            vec![
                Duration::ZERO,
                Duration::from_millis(120),
                Duration::from_millis(370),
            ]
        );

        let mut updates = 0;
        let mut finished = false;
        while let Ok(msg) = rx.try_recv() {
            match msg {
                Message::SweepUpdated(_) => updates += 1,
                Message::SweepFinished => finished = true,
                _ => {}
            }
        }
        assert_eq!(updates, 2);
        assert!(finished);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_polling() {
        let source = Scripted::new(vec![]);
        let polls = Arc::clone(&source.polls);
        let (tx, _rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(poll_sweep(source, TimingConfig::default(), tx, cancel.clone()));
        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.cancel();

        assert!(task.await.expect("join").is_none());
        let count = polls.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(polls.lock().unwrap().len(), count);
        assert!(count >= 4);
    }
}
