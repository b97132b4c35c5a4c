/// Receives the full-session reset that follows an unrecoverable
/// authentication failure. A UI returns to its root view here; a terminal
/// front end tells the user to sign in again.
pub trait Navigator: Send + Sync {
    fn reset_to_root(&self);
}

/// Default navigator: records the reset in the log and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn reset_to_root(&self) {
        tracing::warn!("Session reset, returning to application root");
    }
}
