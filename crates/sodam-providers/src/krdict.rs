//! National Institute of Korean Language dictionary APIs: the Basic Korean
//! Dictionary and the Urimalsaem open dictionary share one search schema.

use quick_xml::Reader;
use quick_xml::events::Event;
use sodam_relay::TransferRequest;

use crate::error::ProviderError;

pub const KRDICT_URL: &str = "https://krdict.korean.go.kr/api/search";
pub const OPENDICT_URL: &str = "https://opendict.korean.go.kr/api/search";

/// Senses beyond this are dropped; reply messages can only hold so much.
const SENSE_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dictionary {
    #[default]
    Basic,
    Opendict,
}

impl Dictionary {
    pub fn url(self) -> &'static str {
        match self {
            Dictionary::Basic => KRDICT_URL,
            Dictionary::Opendict => OPENDICT_URL,
        }
    }
}

/// Builds the form-encoded search request. `translated` asks the upstream to
/// include English sense translations.
pub fn search_request(
    dictionary: Dictionary,
    api_key: &str,
    query: &str,
    translated: bool,
) -> TransferRequest {
    let request = TransferRequest::post(dictionary.url())
        .form("key", api_key)
        .form("q", query)
        .form("advanced", "y");

    if translated {
        request.form("translated", "y").form("trans_lang", "1")
    } else {
        request
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Result count reported by the upstream, clamped to the page size.
    pub total:   u32,
    pub entries: Vec<DictEntry>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DictEntry {
    pub word:   String,
    pub origin: Option<String>,
    pub pos:    String,
    pub link:   String,
    pub senses: Vec<Sense>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Sense {
    pub order:      u32,
    /// The headword (native results) or its translation (translated results).
    pub headline:   String,
    pub definition: String,
}

/// Parses a search response document.
///
/// `translated` selects which sense fields the caller asked for:
/// `definition` for native results, `trans_word`/`trans_dfn` for translated
/// ones. An `<error>` document maps to [`ProviderError::Api`].
pub fn parse_search(payload: &[u8], translated: bool) -> Result<SearchPage, ProviderError> {
    if payload.is_empty() {
        return Err(ProviderError::EmptyPayload);
    }

    let document = std::str::from_utf8(payload).map_err(|_| ProviderError::Utf8)?;

    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut page = SearchPage::default();
    let mut buf = Vec::new();
    let mut current_tag = String::new();
    let mut in_item = false;
    let mut in_error = false;
    let mut error_code = String::new();
    let mut item = DictEntry::default();
    let mut sense = Sense::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                match name.as_str() {
                    "error" => in_error = true,
                    "item" => {
                        in_item = true;
                        item = DictEntry::default();
                    }
                    _ => {}
                }

                current_tag = name;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();

                if in_error {
                    if current_tag == "error_code" {
                        error_code = text;
                    }
                } else if in_item {
                    match current_tag.as_str() {
                        "word" => item.word = text,
                        "origin" => item.origin = Some(text),
                        "pos" => item.pos = text,
                        "link" => item.link = text,
                        "sense_order" => sense.order = text.parse().unwrap_or(0),
                        "definition" if !translated => {
                            sense.headline = item.word.clone();
                            sense.definition = text;
                            push_sense(&mut item, &mut sense);
                        }
                        "trans_word" if translated => sense.headline = text,
                        "trans_dfn" if translated => {
                            sense.definition = text;
                            push_sense(&mut item, &mut sense);
                        }
                        _ => {}
                    }
                } else {
                    match current_tag.as_str() {
                        "total" => page.total = text.parse().unwrap_or(0),
                        "num" => {
                            let num = text.parse().unwrap_or(0);
                            if page.total > num {
                                page.total = num;
                            }
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                match name.as_str() {
                    "item" => {
                        in_item = false;
                        page.entries.push(std::mem::take(&mut item));
                    }
                    "error" => return Err(ProviderError::Api { code: error_code }),
                    _ => {}
                }

                current_tag.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ProviderError::Xml(e)),
            _ => {}
        }

        buf.clear();
    }

    Ok(page)
}

fn push_sense(item: &mut DictEntry, sense: &mut Sense) {
    if item.senses.len() < SENSE_LIMIT {
        item.senses.push(std::mem::take(sense));
    } else {
        *sense = Sense::default();
    }
}
