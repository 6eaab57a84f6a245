//! Deferred, cancellable timed events
//!
//! Timed sequences (the start countdown, HUD message expiry) are queued here
//! instead of running as suspended routines. Each entry belongs to a
//! sequence; cancelling the sequence drops its entries before they can fire.

/// Identifies one scheduled sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceToken(u64);

#[derive(Debug, Clone)]
struct Scheduled<T> {
    due: f64,
    token: SequenceToken,
    /// Insertion order, so equal due times fire first-in first-out
    order: u64,
    payload: T,
}

/// Queue of payloads released once the clock reaches their due time
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    pending: Vec<Scheduled<T>>,
    next_token: u64,
    next_order: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Tolerance for due times that land a rounding error after `now`
    const DUE_EPSILON: f64 = 1e-9;

    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_token: 0,
            next_order: 0,
        }
    }

    /// Start a new sequence
    pub fn begin_sequence(&mut self) -> SequenceToken {
        let token = SequenceToken(self.next_token);
        self.next_token += 1;
        token
    }

    pub fn schedule(&mut self, token: SequenceToken, due: f64, payload: T) {
        let order = self.next_order;
        self.next_order += 1;
        self.pending.push(Scheduled {
            due,
            token,
            order,
            payload,
        });
    }

    /// Drop every pending entry of a sequence; returns how many were dropped
    pub fn cancel(&mut self, token: SequenceToken) -> usize {
        let before = self.pending.len();
        self.pending.retain(|entry| entry.token != token);
        before - self.pending.len()
    }

    /// Drop everything
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn is_pending(&self, token: SequenceToken) -> bool {
        self.pending.iter().any(|entry| entry.token == token)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every entry due at `now`, earliest first, with its due time
    pub fn poll(&mut self, now: f64) -> Vec<(SequenceToken, f64, T)> {
        let (mut due, waiting): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|entry| entry.due <= now + Self::DUE_EPSILON);
        self.pending = waiting;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.order.cmp(&b.order)));
        due.into_iter()
            .map(|entry| (entry.token, entry.due, entry.payload))
            .collect()
    }
}
