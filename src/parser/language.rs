use regex::Regex;
use whatlang::Lang;

/// Outcome of a successful language guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Confident guess; carries a two-letter code for English, the
    /// detector's own code otherwise.
    Reliable(&'static str),
    Unreliable,
}

pub trait LanguageDetector {
    /// `None` means the language could not be identified at all.
    fn detect(&self, text: &str) -> Option<Detection>;
}

/// Trigram/script detection backed by `whatlang`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<Detection> {
        let info = whatlang::detect(text)?;
        if !info.is_reliable() {
            return Some(Detection::Unreliable);
        }
        Some(Detection::Reliable(language_code(info.lang())))
    }
}

fn language_code(lang: Lang) -> &'static str {
    match lang {
        Lang::Eng => "en",
        other => other.code(),
    }
}

/// Splits text into lowercase `\w+` tokens.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    word: Regex,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer {
            word: Regex::new(r"\w+").unwrap(),
        }
    }
}

impl Tokenizer {
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.word
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
