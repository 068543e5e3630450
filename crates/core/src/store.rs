//! State store seam.
//!
//! Both the evaluation state and the dispatch state live behind this
//! trait so rule logic stays ignorant of durability. The reference
//! backend is in-memory with process lifetime; a durable, atomically-
//! updatable backend can be swapped in without touching evaluators.

/// Get/set of an immutable state snapshot.
pub trait StateStore<S: Clone>: Send {
    /// Current state snapshot.
    fn load(&self) -> S;

    /// Replace the stored state with the given snapshot.
    fn save(&mut self, state: S);
}

/// In-memory store; state lives for the process lifetime.
#[derive(Debug, Default)]
pub struct MemoryStore<S> {
    state: S,
}

impl<S: Clone + Default> MemoryStore<S> {
    pub fn new() -> Self {
        Self {
            state: S::default(),
        }
    }
}

impl<S: Clone> MemoryStore<S> {
    /// Seed the store with a pre-built state (tests, replay).
    pub fn with_state(state: S) -> Self {
        Self { state }
    }
}

impl<S: Clone + Send> StateStore<S> for MemoryStore<S> {
    fn load(&self) -> S {
        self.state.clone()
    }

    fn save(&mut self, state: S) {
        self.state = state;
    }
}
