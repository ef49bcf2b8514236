//! `/ppg`: Papago machine translation.

use std::sync::Arc;

use sodam_providers::ProviderError;
use sodam_providers::papago::{self, Translation, is_supported_language};
use sodam_relay::Transport;
use tracing::{debug, warn};

use crate::bot::Bot;
use crate::commands::{GENERIC_ERROR, Invocation};

/// Upstream rejects longer inputs anyway; failing locally keeps the error
/// message usable.
const MAX_TEXT_CHARS: usize = 256;

pub fn run<C: Transport>(bot: &Bot<C>, invocation: &Invocation) {
    let text = match invocation
        .option("text")
        .map(str::to_string)
        .or_else(|| invocation.rest())
    {
        Some(text) => text,
        None => {
            bot.responder().reply("Translation", "Missing `text` option.");
            return;
        }
    };

    let source = invocation.option("source").unwrap_or("en").to_string();
    let target = invocation.option("target").unwrap_or("ko").to_string();

    let length = text.chars().count();
    if length > MAX_TEXT_CHARS {
        bot.responder().reply(
            "Translation",
            &format!(
                "The length of the `text` option (`{length}` characters) must be \
                 less than or equal to `{MAX_TEXT_CHARS}` characters."
            ),
        );
        return;
    }

    for code in [source.as_str(), target.as_str()] {
        if !is_supported_language(code) {
            bot.responder().reply(
                "Translation",
                &format!("`{code}` is not a supported language code."),
            );
            return;
        }
    }

    let request = papago::translate_request(
        &bot.config().papago.client_id,
        &bot.config().papago.client_secret,
        &source,
        &target,
        &text,
    )
    .timeout(bot.request_timeout());

    let responder = Arc::clone(bot.responder());
    let original = text.clone();
    let id = bot.relay().submit(
        request,
        Box::new(move |reply| {
            if let Some(error) = &reply.error {
                warn!(%error, "translation request failed");
                responder.reply("Translation", GENERIC_ERROR);
                return;
            }

            match papago::parse_translation(&reply.body) {
                Ok(translation) => {
                    responder.reply("Translation", &format_translation(&original, &translation));
                }
                Err(ProviderError::Api { code }) => {
                    warn!(%code, "translation API reported an error");
                    responder.reply("Translation", message_for_code(&code));
                }
                Err(error) => {
                    warn!(%error, "malformed translation response");
                    responder.reply("Translation", GENERIC_ERROR);
                }
            }
        }),
    );

    debug!(id = id.value(), %source, %target, "translation submitted");
}

fn format_translation(original: &str, translation: &Translation) -> String {
    format!(
        "Source ({}): {original}\nTarget ({}): {}",
        translation.source_lang, translation.target_lang, translation.text
    )
}

fn message_for_code(code: &str) -> &'static str {
    match code {
        "024" => {
            "Invalid client id or client secret given, please check your \
             configuration file."
        }
        "N2MT05" => "Target language must not be the same as the source language.",
        _ => GENERIC_ERROR,
    }
}
