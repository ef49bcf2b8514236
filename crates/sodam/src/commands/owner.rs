//! Owner-only commands: `/msg` and `/stop`.

use sodam_relay::Transport;
use tracing::info;

use crate::bot::Bot;
use crate::commands::Invocation;

const OWNER_ONLY: &str = "This command can only be invoked by the bot owner.";

pub fn run_msg<C: Transport>(bot: &Bot<C>, invocation: &Invocation) {
    if !bot.is_owner(invocation.sender) {
        bot.responder().reply("Message", OWNER_ONLY);
        return;
    }

    let text = match invocation
        .option("text")
        .map(str::to_string)
        .or_else(|| invocation.rest())
    {
        Some(text) => text,
        None => {
            bot.responder().reply("Message", "Missing `text` option.");
            return;
        }
    };

    bot.responder().reply("Message", &text);
}

pub fn run_stop<C: Transport>(bot: &Bot<C>, invocation: &Invocation) {
    if !bot.is_owner(invocation.sender) {
        bot.responder().reply("sodam", OWNER_ONLY);
        return;
    }

    info!("stop requested by the owner");

    bot.responder().reply("sodam", "Shutting down the bot...");
    bot.stop();
}
