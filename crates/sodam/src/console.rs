//! Console command input.
//!
//! A dedicated reader thread blocks on stdin and hands complete lines to the
//! main loop over a channel; it never calls into bot logic itself, so all
//! dispatch happens on the loop that also drains the relay.

use std::io::BufRead;

use tokio::sync::mpsc;
use tracing::debug;

/// Spawns the detached reader thread and returns the receiving end. The
/// thread exits when stdin closes or the receiver is dropped.
pub fn spawn_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();

        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };

            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            if tx.send(line).is_err() {
                break;
            }
        }

        debug!("console reader exiting");
    });

    rx
}
