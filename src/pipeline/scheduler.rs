//! Frame schedulers - where render loop iterations run.
//!
//! A scheduled callback is invoked once per frame until it returns
//! [`FrameControl::Stop`]. Returning is the only yield point; a callback
//! that is running always finishes its iteration.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::BridgeError;

/// What a frame callback wants next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}

pub type FrameCallback = Box<dyn FnMut() -> FrameControl + Send>;

/// Runs frame callbacks on the render context.
pub trait FrameScheduler: Send + Sync {
    fn schedule(&self, callback: FrameCallback) -> Result<(), BridgeError>;
}

// =============================================================================
// ThreadFrameScheduler
// =============================================================================

/// One named render thread per scheduled callback, ticking at a fixed
/// interval. The thread exits when its callback stops.
#[derive(Debug, Clone)]
pub struct ThreadFrameScheduler {
    interval: Duration,
}

impl ThreadFrameScheduler {
    pub const THREAD_NAME: &'static str = "flexcanvas-render";

    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Tick at the configured frame rate.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.frame_interval())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl FrameScheduler for ThreadFrameScheduler {
    fn schedule(&self, mut callback: FrameCallback) -> Result<(), BridgeError> {
        let interval = self.interval;
        thread::Builder::new()
            .name(Self::THREAD_NAME.to_string())
            .spawn(move || {
                loop {
                    let started = Instant::now();
                    if callback() == FrameControl::Stop {
                        break;
                    }
                    // Sleep for whatever is left of the frame
                    if let Some(rest) = interval.checked_sub(started.elapsed()) {
                        thread::sleep(rest);
                    }
                }
                tracing::debug!("render thread exiting");
            })
            .map(|_| ())
            .map_err(|err| BridgeError::Spawn(err.to_string()))
    }
}

// =============================================================================
// ManualFrameScheduler
// =============================================================================

/// Callbacks run only when the owner calls [`tick`](Self::tick).
///
/// For hosts that own their display link, and for deterministic tests.
#[derive(Default)]
pub struct ManualFrameScheduler {
    callbacks: Mutex<Vec<FrameCallback>>,
    ticking: AtomicBool,
}

impl ManualFrameScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Run every pending callback once. Returns how many ran.
    ///
    /// Callbacks scheduled during the tick run on the next one.
    pub fn tick(&self) -> usize {
        if self.ticking.swap(true, Ordering::Acquire) {
            return 0;
        }
        let mut running = std::mem::take(&mut *self.callbacks.lock());
        let count = running.len();
        running.retain_mut(|callback| callback() == FrameControl::Continue);

        let mut callbacks = self.callbacks.lock();
        let scheduled = std::mem::replace(&mut *callbacks, running);
        callbacks.extend(scheduled);
        drop(callbacks);

        self.ticking.store(false, Ordering::Release);
        count
    }

    /// Callbacks still waiting for a tick.
    pub fn pending(&self) -> usize {
        self.callbacks.lock().len()
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn schedule(&self, callback: FrameCallback) -> Result<(), BridgeError> {
        self.callbacks.lock().push(callback);
        Ok(())
    }
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for Arc<S> {
    fn schedule(&self, callback: FrameCallback) -> Result<(), BridgeError> {
        (**self).schedule(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    fn counting(limit: usize, hits: Arc<AtomicUsize>) -> FrameCallback {
        Box::new(move || {
            let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= limit {
                FrameControl::Stop
            } else {
                FrameControl::Continue
            }
        })
    }

    #[test]
    fn test_manual_runs_until_stop() {
        let scheduler = ManualFrameScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        scheduler.schedule(counting(3, hits.clone())).unwrap();

        assert_eq!(scheduler.tick(), 1);
        assert_eq!(scheduler.tick(), 1);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.tick(), 1);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.tick(), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_thread_scheduler_ticks_at_configured_rate() {
        let config = Config {
            frame_rate: 120,
            ..Config::default()
        };
        let scheduler = ThreadFrameScheduler::from_config(&config);
        assert_eq!(scheduler.interval(), config.frame_interval());
        assert_eq!(scheduler.interval(), Duration::from_nanos(8_333_333));
    }

    #[test]
    fn test_thread_scheduler_stops() {
        let scheduler = ThreadFrameScheduler::new(Duration::from_millis(1));
        let (tx, rx) = mpsc::channel();
        let mut frames = 0;
        scheduler
            .schedule(Box::new(move || {
                frames += 1;
                let name = thread::current().name().map(str::to_string);
                if frames == 5 {
                    let _ = tx.send(name);
                    FrameControl::Stop
                } else {
                    FrameControl::Continue
                }
            }))
            .unwrap();

        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some(ThreadFrameScheduler::THREAD_NAME));
    }
}
