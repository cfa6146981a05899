//! Cancellable scheduled callbacks, timer-agnostic.
//!
//! The caller owns the timer: it calls [`Debounce::schedule`] on every event,
//! arms its timer with the returned ticket, and hands the ticket back through
//! [`Debounce::fire`] when the timer elapses. Only the newest ticket fires.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebounceTicket(u64);

impl DebounceTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Debounce {
    delay_ms: u32,
    generation: u64,
    pending: Option<u64>,
}

impl Debounce {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            generation: 0,
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Supersede any pending ticket with a new one.
    pub fn schedule(&mut self) -> DebounceTicket {
        self.generation += 1;
        self.pending = Some(self.generation);
        DebounceTicket(self.generation)
    }

    /// True exactly once, for the most recently scheduled ticket.
    pub fn fire(&mut self, ticket: DebounceTicket) -> bool {
        if self.pending == Some(ticket.0) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
