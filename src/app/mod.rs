//! The caller side of the engine: session state, pure filter recomputation
//! and one command per user action.

pub mod commands;
pub mod filtering;
pub mod state;

pub use state::{AppState, Preview};
