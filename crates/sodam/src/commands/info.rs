//! `/info`: version, uptime and process statistics.

use std::time::Duration;

use sodam_relay::Transport;

use crate::bot::Bot;
use crate::commands::Invocation;

pub fn run<C: Transport>(bot: &Bot<C>, _invocation: &Invocation) {
    let (cpu, ram) = bot.process_stats();

    let mut modules = Vec::new();
    if bot.config().krdict.enable {
        modules.push("krdict");
    }
    if bot.config().papago.enable {
        modules.push("papago");
    }

    let body = format!(
        "{}\nVersion: v{}\nUptime: {}\nCPU: {cpu:.1}%\nRAM: {ram:.1}MB\nModules: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        format_uptime(bot.uptime()),
        if modules.is_empty() {
            "none".to_string()
        } else {
            modules.join(", ")
        },
    );

    bot.responder().reply("sodam", &body);
}

fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();

    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
