//! Tile spawner - a periodic schedule that only produces spawn intents
//!
//! The host's timer and the render tick interleave. Neither touches the tile
//! collection from here: firings queue `SpawnIntent`s, and the scene drains
//! them on its own call path. Deadlines are pumped with wall-clock ms so the
//! same schedule works with or without a host timer.

use std::collections::VecDeque;

use log::debug;

use crate::domain::MIN_SPAWN_INTERVAL_MS;

/// Request to create one tile stamped with `wall_ms`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnIntent {
    pub wall_ms: f64,
}

pub struct TileSpawner {
    interval_ms: f64,
    running: bool,
    next_due_ms: Option<f64>,
    queue: VecDeque<SpawnIntent>,
}

impl TileSpawner {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: sanitize_interval(interval_ms),
            running: false,
            next_due_ms: None,
            queue: VecDeque::new(),
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn next_due_ms(&self) -> Option<f64> {
        self.next_due_ms
    }

    /// Start the schedule with one immediate intent. No-op while running.
    pub fn start(&mut self, now_ms: f64) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.queue.push_back(SpawnIntent { wall_ms: now_ms });
        self.next_due_ms = Some(now_ms + self.interval_ms);
        debug!("spawner started, every {}ms", self.interval_ms);
        true
    }

    /// Stop the schedule and drop anything not yet drained.
    pub fn stop(&mut self) {
        if self.running {
            debug!("spawner stopped, {} pending intents dropped", self.queue.len());
        }
        self.running = false;
        self.next_due_ms = None;
        self.queue.clear();
    }

    /// Restart from `t = 0`: fresh deadline and one immediate intent.
    pub fn reset_and_restart(&mut self, now_ms: f64) {
        self.stop();
        self.start(now_ms);
    }

    /// Host timer callback: queue one intent now and re-anchor the deadline.
    pub fn fire(&mut self, now_ms: f64) -> bool {
        if !self.running {
            return false;
        }
        self.queue.push_back(SpawnIntent { wall_ms: now_ms });
        self.next_due_ms = Some(now_ms + self.interval_ms);
        true
    }

    /// Queue an intent if the deadline has passed.
    ///
    /// At most one intent per call. A gap longer than one interval (stalled
    /// host, background tab) re-anchors the schedule to `now_ms` instead of
    /// replaying the missed firings.
    pub fn pump(&mut self, now_ms: f64) -> bool {
        let Some(due) = self.next_due_ms else {
            return false;
        };
        if !self.running || now_ms < due {
            return false;
        }
        self.queue.push_back(SpawnIntent { wall_ms: now_ms });
        let next = due + self.interval_ms;
        self.next_due_ms = Some(if next <= now_ms { now_ms + self.interval_ms } else { next });
        true
    }

    pub fn set_interval(&mut self, interval_ms: f64) {
        let interval_ms = sanitize_interval(interval_ms);
        if let Some(due) = self.next_due_ms {
            self.next_due_ms = Some(due - self.interval_ms + interval_ms);
        }
        self.interval_ms = interval_ms;
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Take every queued intent, oldest first.
    pub fn drain(&mut self) -> Vec<SpawnIntent> {
        self.queue.drain(..).collect()
    }
}

fn sanitize_interval(interval_ms: f64) -> f64 {
    if interval_ms.is_finite() {
        interval_ms.max(MIN_SPAWN_INTERVAL_MS)
    } else {
        1000.0
    }
}
