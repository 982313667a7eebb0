pub mod core {
    pub mod game;
    pub mod protocol;
    pub mod scoring;
}

pub mod cli;
pub mod client;
pub mod host;

// Re-export for convenience
pub use crate::core::game::{GameState, Outcome, Seat};
