use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding-window request counter keyed by client address.
#[derive(Debug, Clone)]
pub struct IpRateLimiter {
    inner: Arc<Mutex<Buckets>>,
    window: Duration,
    max_requests: usize,
}

#[derive(Debug, Default)]
struct Buckets {
    queues: HashMap<String, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

impl Buckets {
    // Drops every key whose window has fully expired, at most once per window.
    fn sweep(&mut self, now: Instant, window: Duration) {
        if let Some(last) = self.last_sweep {
            if now.duration_since(last) < window {
                return;
            }
        }

        self.queues.retain(|_, queue| {
            prune(queue, now, window);
            !queue.is_empty()
        });
        self.last_sweep = Some(now);
    }
}

fn prune(queue: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(front) = queue.front() {
        if now.duration_since(*front) > window {
            queue.pop_front();
        } else {
            break;
        }
    }
}

impl IpRateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Buckets::default())),
            window,
            max_requests,
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut guard = self.inner.lock();
        guard.sweep(now, self.window);

        let queue = guard.queues.entry(key.to_string()).or_default();
        prune(queue, now, self.window);

        if queue.len() >= self.max_requests {
            return false;
        }

        queue.push_back(now);
        true
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.inner.lock().queues.len()
    }
}
