use axum::Json;
use serde::{Serialize, Serializer};
use vidscribe::languages::SUPPORTED_LANGUAGES;

/// `{"languages": {"auto": "Auto-detect", "en": "English", ...}}`
#[derive(Serialize)]
pub struct LanguagesResponse {
    #[serde(serialize_with = "serialize_table")]
    pub languages: &'static [(&'static str, &'static str)],
}

// An object rather than an array of pairs, keeping table order.
fn serialize_table<S: Serializer>(
    table: &&'static [(&'static str, &'static str)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(table.iter().copied())
}

pub async fn languages_handler() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: SUPPORTED_LANGUAGES,
    })
}
