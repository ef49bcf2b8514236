//! Command registry and invocation model.
//!
//! Commands arrive either from the chat gateway or from the console; both
//! are normalized into an [`Invocation`] before dispatch. The registry is a
//! plain table of named run hooks, with the dictionary and translation
//! modules gated by their config sections.

pub mod info;
pub mod krdict;
pub mod owner;
pub mod papago;

use sodam_relay::Transport;

use crate::bot::Bot;
use crate::config::Config;

pub const GENERIC_ERROR: &str =
    "An unknown error has occured while processing your request.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// Local console input; always owner-privileged.
    Console,
    User(u64),
}

/// One parsed command invocation: `name key=value ... free text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub sender:  Sender,
    options:     Vec<(String, String)>,
    positional:  Vec<String>,
}

impl Invocation {
    /// Parses a console line. Returns `None` for blank input.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();

        let command = tokens.next()?.trim_start_matches('/').to_string();
        if command.is_empty() {
            return None;
        }

        let mut options = Vec::new();
        let mut positional = Vec::new();

        for token in tokens {
            match token.split_once('=') {
                Some((key, value)) => options.push((key.to_string(), value.to_string())),
                None => positional.push(token.to_string()),
            }
        }

        Some(Self {
            command,
            sender: Sender::Console,
            options,
            positional,
        })
    }

    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The free text after the command name, for commands whose main
    /// argument was given without a `key=` prefix.
    pub fn rest(&self) -> Option<String> {
        if self.positional.is_empty() {
            None
        } else {
            Some(self.positional.join(" "))
        }
    }
}

pub struct Command<C: Transport> {
    pub name:        &'static str,
    pub description: &'static str,
    pub run:         fn(&Bot<C>, &Invocation),
}

/// Builds the command table, dropping commands whose module is disabled.
pub fn registry<C: Transport>(config: &Config) -> Vec<Command<C>> {
    let mut commands = vec![
        Command {
            name:        "info",
            description: "Show information about this bot",
            run:         info::run,
        },
        Command {
            name:        "krd",
            description: "Search the given text in the Korean dictionaries \
                          by the National Institute of Korean Language",
            run:         krdict::run,
        },
        Command {
            name:        "msg",
            description: "Send a message as the bot (owner only)",
            run:         owner::run_msg,
        },
        Command {
            name:        "ppg",
            description: "Translate the given text between two languages \
                          using the Papago NMT API",
            run:         papago::run,
        },
        Command {
            name:        "stop",
            description: "Shut down the bot (owner only)",
            run:         owner::run_stop,
        },
    ];

    commands.retain(|command| match command.name {
        "krd" => config.krdict.enable,
        "ppg" => config.papago.enable,
        _ => true,
    });

    commands
}
