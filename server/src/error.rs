use thiserror::Error;

use tether_shared::UserId;

/// Recoverable server-surface errors. Configuration problems never
/// appear here; those panic at startup.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerError {
    #[error("user {0} is not connected")]
    UnknownUser(UserId),
}
