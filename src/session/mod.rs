mod registry;

pub use registry::{ SessionHandle, SessionRegistry, DEFAULT_IDLE_TIMEOUT };

use crate::models::chat::Turn;

/// Ordered turns of one interactive session.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    turns: Vec<Turn>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the conversation with the system instruction. Does nothing once
    /// the session already holds turns.
    pub fn initialize(&mut self, instruction: &str) {
        if self.turns.is_empty() {
            self.turns.push(Turn::system(instruction));
        }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
