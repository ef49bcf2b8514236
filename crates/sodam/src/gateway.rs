//! Reply delivery seam toward the chat platform.
//!
//! The actual gateway (connection, presence, interaction routing) is an
//! external collaborator; command handlers and relay callbacks only ever see
//! this trait, which keeps them testable without a chat platform.

use tracing::info;

pub trait Responder: Send + Sync {
    /// Deliver a reply addressed to whoever invoked the command.
    fn reply(&self, title: &str, body: &str);
}

/// Front end for console-invoked commands: replies go to the process log.
pub struct ConsoleResponder;

impl Responder for ConsoleResponder {
    fn reply(&self, title: &str, body: &str) {
        info!("{title}: {body}");
    }
}
