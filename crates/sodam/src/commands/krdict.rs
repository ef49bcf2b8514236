//! `/krd`: Korean dictionary search.

use std::sync::Arc;

use sodam_providers::ProviderError;
use sodam_providers::krdict::{self, Dictionary, SearchPage};
use sodam_relay::Transport;
use tracing::{debug, warn};

use crate::bot::Bot;
use crate::commands::{GENERIC_ERROR, Invocation};

pub fn run<C: Transport>(bot: &Bot<C>, invocation: &Invocation) {
    let query = match invocation
        .option("query")
        .map(str::to_string)
        .or_else(|| invocation.rest())
    {
        Some(query) => query,
        None => {
            bot.responder().reply("Results", "Missing `query` option.");
            return;
        }
    };

    let translated = invocation.option("translated") != Some("false");
    let dictionary = match invocation.option("dict") {
        Some("opendict") => Dictionary::Opendict,
        _ => Dictionary::Basic,
    };
    let api_key = match dictionary {
        Dictionary::Basic => &bot.config().krdict.api_key,
        Dictionary::Opendict => &bot.config().krdict.opendict_api_key,
    };

    let request = krdict::search_request(dictionary, api_key, &query, translated)
        .timeout(bot.request_timeout());

    let responder = Arc::clone(bot.responder());
    let id = bot.relay().submit(
        request,
        Box::new(move |reply| {
            if let Some(error) = &reply.error {
                warn!(%error, "dictionary request failed");
                responder.reply("Results", GENERIC_ERROR);
                return;
            }

            match krdict::parse_search(&reply.body, translated) {
                Ok(page) => responder.reply("Results", &format_page(&page)),
                Err(ProviderError::Api { code }) => {
                    warn!(%code, "dictionary API reported an error");
                    responder.reply("Results", GENERIC_ERROR);
                }
                Err(error) => {
                    warn!(%error, "malformed dictionary response");
                    responder.reply("Results", GENERIC_ERROR);
                }
            }
        }),
    );

    debug!(id = id.value(), %query, ?dictionary, "dictionary search submitted");
}

fn format_page(page: &SearchPage) -> String {
    if page.total == 0 || page.entries.is_empty() {
        return "No results found.".to_string();
    }

    let mut out = String::new();

    for entry in &page.entries {
        match &entry.origin {
            Some(origin) => out.push_str(&format!(
                "[**{} ({origin}) 「{}」**]({})\n",
                entry.word, entry.pos, entry.link
            )),
            None => out.push_str(&format!(
                "[**{} 「{}」**]({})\n",
                entry.word, entry.pos, entry.link
            )),
        }

        for sense in &entry.senses {
            out.push_str(&format!(
                "**{}. {}**\n- {}\n",
                sense.order, sense.headline, sense.definition
            ));
        }

        out.push('\n');
    }

    out.trim_end().to_string()
}
