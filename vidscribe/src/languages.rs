//! Language table advertised by the HTTP API.
//!
//! Informational only: the pipeline forwards whatever code the caller sends.

/// `(code, display name)` pairs, `auto` first.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("auto", "Auto-detect"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("tr", "Turkish"),
    ("pl", "Polish"),
    ("nl", "Dutch"),
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("no", "Norwegian"),
    ("fi", "Finnish"),
    ("tl", "Filipino/Tagalog"),
    ("th", "Thai"),
    ("vi", "Vietnamese"),
    ("id", "Indonesian"),
    ("ms", "Malay"),
    ("uk", "Ukrainian"),
    ("cs", "Czech"),
    ("hu", "Hungarian"),
    ("ro", "Romanian"),
    ("bg", "Bulgarian"),
    ("hr", "Croatian"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("et", "Estonian"),
    ("lv", "Latvian"),
    ("lt", "Lithuanian"),
    ("mt", "Maltese"),
    ("cy", "Welsh"),
    ("is", "Icelandic"),
    ("mk", "Macedonian"),
    ("sq", "Albanian"),
    ("eu", "Basque"),
    ("gl", "Galician"),
    ("ca", "Catalan"),
    ("he", "Hebrew"),
    ("fa", "Persian"),
    ("ur", "Urdu"),
    ("bn", "Bengali"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("ml", "Malayalam"),
    ("kn", "Kannada"),
    ("gu", "Gujarati"),
    ("pa", "Punjabi"),
    ("ne", "Nepali"),
    ("si", "Sinhala"),
    ("my", "Myanmar"),
    ("km", "Khmer"),
    ("lo", "Lao"),
    ("ka", "Georgian"),
    ("am", "Amharic"),
    ("az", "Azerbaijani"),
    ("be", "Belarusian"),
    ("bs", "Bosnian"),
    ("kk", "Kazakh"),
    ("ky", "Kyrgyz"),
    ("lb", "Luxembourgish"),
    ("mg", "Malagasy"),
    ("mi", "Maori"),
    ("mr", "Marathi"),
    ("mn", "Mongolian"),
    ("ps", "Pashto"),
    ("sd", "Sindhi"),
    ("so", "Somali"),
    ("sw", "Swahili"),
    ("tg", "Tajik"),
    ("tt", "Tatar"),
    ("tk", "Turkmen"),
    ("uz", "Uzbek"),
    ("yi", "Yiddish"),
    ("yo", "Yoruba"),
    ("zu", "Zulu"),
];
