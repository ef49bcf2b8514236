//! NAVER Papago NMT translation API.

use serde::Deserialize;
use sodam_relay::TransferRequest;

use crate::error::ProviderError;

pub const PAPAGO_URL: &str = "https://openapi.naver.com/v1/papago/n2mt";

/// Languages the NMT endpoint accepts, as (display name, code) pairs.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("Chinese (Simplified)", "zh-CN"),
    ("Chinese (Traditional)", "zh-TW"),
    ("English", "en"),
    ("French", "fr"),
    ("German", "de"),
    ("Indonesian", "id"),
    ("Italian", "it"),
    ("Japanese", "ja"),
    ("Korean", "ko"),
    ("Russian", "ru"),
    ("Spanish", "es"),
    ("Thai", "th"),
    ("Vietnamese", "vi"),
];

pub fn is_supported_language(code: &str) -> bool {
    LANGUAGES.iter().any(|(_, c)| *c == code)
}

/// Builds the translation request. Authentication rides in two custom
/// headers rather than the form body.
pub fn translate_request(
    client_id: &str,
    client_secret: &str,
    source: &str,
    target: &str,
    text: &str,
) -> TransferRequest {
    TransferRequest::post(PAPAGO_URL)
        .form("source", source)
        .form("target", target)
        .form("text", text)
        .header("X-Naver-Client-Id", client_id)
        .header("X-Naver-Client-Secret", client_secret)
}

#[derive(Debug, PartialEq, Eq)]
pub struct Translation {
    pub source_lang: String,
    pub target_lang: String,
    pub text:        String,
}

#[derive(Deserialize)]
struct Envelope {
    message: Option<Message>,
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
}

#[derive(Deserialize)]
struct Message {
    result: TranslateResult,
}

#[derive(Deserialize)]
struct TranslateResult {
    #[serde(rename = "srcLangType")]
    src_lang_type: String,
    #[serde(rename = "tarLangType")]
    tar_lang_type: String,
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Parses a translation response. An `errorCode` body maps to
/// [`ProviderError::Api`]; a body with neither result nor error code is
/// treated as an unknown upstream error.
pub fn parse_translation(payload: &[u8]) -> Result<Translation, ProviderError> {
    if payload.is_empty() {
        return Err(ProviderError::EmptyPayload);
    }

    let envelope: Envelope = serde_json::from_slice(payload)?;

    if let Some(code) = envelope.error_code {
        return Err(ProviderError::Api { code });
    }

    match envelope.message {
        Some(message) => Ok(Translation {
            source_lang: message.result.src_lang_type,
            target_lang: message.result.tar_lang_type,
            text:        message.result.translated_text,
        }),
        None => Err(ProviderError::Api {
            code: "unknown".to_string(),
        }),
    }
}
