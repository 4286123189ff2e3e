//! Periodic events for the interactive session loop.
//!
//! A [`Ticker`] sends a clone of its event into the loop's channel once per
//! period until it is dropped. Dropping stops and joins the thread, so a
//! ticker never outlives the state that owns it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub struct Ticker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn start<E>(period: Duration, tx: Sender<E>, event: E) -> Self
    where
        E: Clone + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let mut next = Instant::now() + period;
            loop {
                let now = Instant::now();
                if now < next {
                    thread::park_timeout(next - now);
                }
                if flag.load(Ordering::Acquire) {
                    return;
                }
                // Spurious wakeup
                if Instant::now() < next {
                    continue;
                }
                next += period;
                if tx.send(event.clone()).is_err() {
                    return;
                }
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

/// Send `event` once after `delay`, unless the receiver is gone
pub fn after<E>(delay: Duration, tx: Sender<E>, event: E)
where
    E: Send + 'static,
{
    thread::spawn(move || {
        thread::sleep(delay);
        let _ = tx.send(event);
    });
}
