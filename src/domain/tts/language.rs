use lingua::{Language, LanguageDetector, LanguageDetectorBuilder};
use serde::Serialize;

/// Language code that asks the service to detect the language of the text.
pub const AUTO_DETECT: &str = "auto";

/// A language the front end offers, with the regional routing hint used
/// when a request does not name one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupportedLanguage {
    pub code: &'static str,
    pub name: &'static str,
    pub domain_variant: &'static str,
}

pub const SUPPORTED_LANGUAGES: &[SupportedLanguage] = &[
    SupportedLanguage { code: "pt-br", name: "Portuguese (Brazil)", domain_variant: "com.br" },
    SupportedLanguage { code: "pt-pt", name: "Portuguese (Portugal)", domain_variant: "pt" },
    SupportedLanguage { code: "en-us", name: "English (US)", domain_variant: "com" },
    SupportedLanguage { code: "en-gb", name: "English (UK)", domain_variant: "co.uk" },
    SupportedLanguage { code: "en-au", name: "English (Australia)", domain_variant: "com.au" },
    SupportedLanguage { code: "es-es", name: "Spanish (Spain)", domain_variant: "es" },
    SupportedLanguage { code: "es-mx", name: "Spanish (Mexico)", domain_variant: "com.mx" },
    SupportedLanguage { code: "fr", name: "French", domain_variant: "fr" },
    SupportedLanguage { code: "de", name: "German", domain_variant: "de" },
    SupportedLanguage { code: "it", name: "Italian", domain_variant: "it" },
    SupportedLanguage { code: "ru", name: "Russian", domain_variant: "ru" },
    SupportedLanguage { code: "zh-cn", name: "Chinese (Simplified)", domain_variant: "com" },
    SupportedLanguage { code: "ja", name: "Japanese", domain_variant: "co.jp" },
    SupportedLanguage { code: "ko", name: "Korean", domain_variant: "co.kr" },
    SupportedLanguage { code: "ar", name: "Arabic", domain_variant: "com" },
    SupportedLanguage { code: "hi", name: "Hindi", domain_variant: "co.in" },
];

/// Normalize a language code for lookups and cache keys (`PT-BR ` -> `pt-br`).
pub fn normalize_language_code(code: &str) -> String {
    code.trim().replace('_', "-").to_lowercase()
}

pub fn find_language(code: &str) -> Option<&'static SupportedLanguage> {
    SUPPORTED_LANGUAGES.iter().find(|language| language.code == code)
}

/// Default regional variant for a language code, if the language is known.
pub fn default_domain_variant(code: &str) -> Option<&'static str> {
    find_language(code).map(|language| language.domain_variant)
}

/// Primary subtag of a language code (`pt-br` -> `pt`).
pub fn primary_subtag(code: &str) -> &str {
    code.split('-').next().unwrap_or(code)
}

/// Build the detector over the languages the front end offers.
pub fn build_detector() -> LanguageDetector {
    let languages = vec![
        Language::English,
        Language::Portuguese,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Russian,
        Language::Chinese,
        Language::Japanese,
        Language::Korean,
        Language::Arabic,
        Language::Hindi,
    ];

    LanguageDetectorBuilder::from_languages(&languages).build()
}

/// Detect the language of the given text and map it to a supported code.
pub fn detect_language(detector: &LanguageDetector, text: &str) -> Option<&'static str> {
    let code = match detector.detect_language_of(text)? {
        Language::English => "en-us",
        Language::Portuguese => "pt-br",
        Language::Spanish => "es-es",
        Language::French => "fr",
        Language::German => "de",
        Language::Italian => "it",
        Language::Russian => "ru",
        Language::Chinese => "zh-cn",
        Language::Japanese => "ja",
        Language::Korean => "ko",
        Language::Arabic => "ar",
        Language::Hindi => "hi",
        #[allow(unreachable_patterns)]
        _ => return None,
    };
    Some(code)
}
