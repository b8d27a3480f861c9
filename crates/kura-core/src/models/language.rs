use serde::{Deserialize, Serialize};

/// Text direction of the hosting document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn as_attr(&self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_attr())
    }
}

/// Supported interface languages. The set is closed: every value maps to a
/// translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
    Es,
    Ar,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::Fr, Language::En, Language::Es, Language::Ar];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
            Language::Es => "es",
            Language::Ar => "ar",
        }
    }

    /// Parse a stored language code. Returns `None` for anything outside the
    /// supported set; callers fall back to the default.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "fr" => Some(Language::Fr),
            "en" => Some(Language::En),
            "es" => Some(Language::Es),
            "ar" => Some(Language::Ar),
            _ => None,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Language::Ar => Direction::Rtl,
            _ => Direction::Ltr,
        }
    }

    /// Name of the language in French, as used in assistant instructions.
    pub fn french_name(&self) -> &'static str {
        match self {
            Language::Fr => "français",
            Language::En => "anglais",
            Language::Es => "espagnol",
            Language::Ar => "arabe",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| format!("unsupported language: {}", s))
    }
}
