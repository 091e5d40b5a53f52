use thiserror::Error;

/// Errors surfaced while setting up the plugin
///
/// Event handling never produces these; see [`crate::event::HandlerError`].
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid plugin options: {0}")]
    Config(#[from] serde_json::Error),
}
