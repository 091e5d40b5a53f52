// Public API - what other modules can use
pub use state::{Controls, UiState};

// Internal modules
mod state;
