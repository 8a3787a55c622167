use std::fmt;
use std::str::FromStr;

/// Languages the search fan-out can query in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchLang {
    En,
    Hi,
    Ta,
}

impl SearchLang {
    pub const ALL: [SearchLang; 3] = [SearchLang::En, SearchLang::Hi, SearchLang::Ta];

    pub fn code(self) -> &'static str {
        match self {
            SearchLang::En => "en",
            SearchLang::Hi => "hi",
            SearchLang::Ta => "ta",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SearchLang::En => "English",
            SearchLang::Hi => "Hindi",
            SearchLang::Ta => "Tamil",
        }
    }
}

impl fmt::Display for SearchLang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported search language '{0}' (expected en, hi or ta)")]
pub struct UnknownLang(String);

impl FromStr for SearchLang {
    type Err = UnknownLang;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(SearchLang::En),
            "hi" => Ok(SearchLang::Hi),
            "ta" => Ok(SearchLang::Ta),
            other => Err(UnknownLang(other.to_string())),
        }
    }
}

/// Script-level guess at the language of `text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detected {
    English,
    Hindi,
    Tamil,
    Other,
}

pub fn detect(text: &str) -> Detected {
    let mut letters = 0usize;
    let mut ascii_letters = 0usize;
    let mut devanagari = 0usize;
    let mut tamil = 0usize;

    for c in text.chars().filter(|c| c.is_alphabetic() || is_indic_mark(*c)) {
        letters += 1;
        match c {
            'a'..='z' | 'A'..='Z' => ascii_letters += 1,
            '\u{0900}'..='\u{097F}' => devanagari += 1,
            '\u{0B80}'..='\u{0BFF}' => tamil += 1,
            _ => {}
        }
    }

    if letters == 0 {
        return Detected::Other;
    }
    if ascii_letters == letters {
        return Detected::English;
    }
    if tamil > 0 && tamil >= devanagari {
        Detected::Tamil
    } else if devanagari > 0 {
        Detected::Hindi
    } else {
        Detected::Other
    }
}

pub fn is_english(text: &str) -> bool {
    detect(text) == Detected::English
}

/// Combining vowel signs are not `is_alphabetic` in every Indic block.
fn is_indic_mark(c: char) -> bool {
    matches!(c, '\u{0900}'..='\u{097F}' | '\u{0B80}'..='\u{0BFF}')
}
