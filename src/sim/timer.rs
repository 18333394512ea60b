//! Deferred one-shot tasks keyed to the engine clock
//!
//! Simulations schedule follow-up work (serving the ball after a goal) here
//! instead of holding callbacks. Clearing the queue on restart or cleanup
//! guarantees nothing fires into a torn-down or restarted game.

#[derive(Debug, Clone)]
struct Scheduled<T> {
    /// Scheduling order, breaks ties between equal due times
    seq: u64,
    due: f64,
    task: T,
}

#[derive(Debug, Clone)]
pub struct Timers<T> {
    pending: Vec<Scheduled<T>>,
    next_seq: u64,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once the clock reaches `now + delay` (seconds)
    pub fn schedule(&mut self, now: f64, delay: f64, task: T) {
        self.pending.push(Scheduled {
            seq: self.next_seq,
            due: now + delay,
            task,
        });
        self.next_seq += 1;
    }

    /// Remove and return every task due at `now`, earliest first
    pub fn poll(&mut self, now: f64) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|s| s.task).collect()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
