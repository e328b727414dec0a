//! Localized text: one string per locale tag.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Locales the service produces text for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    English,
    Tamil,
}

impl Locale {
    /// Every supported locale, primary first.
    pub const ALL: [Locale; 2] = [Locale::English, Locale::Tamil];

    /// The locale used when a requested translation is missing.
    pub const PRIMARY: Locale = Locale::English;

    /// The tag used as the JSON key (`en`, `ta`).
    pub const fn tag(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Tamil => "ta",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A user-facing string in several languages, keyed by locale tag.
///
/// Serializes as a plain JSON object: `{"en": "Cotton", "ta": "பருத்தி"}`.
/// Tags outside [`Locale::ALL`] are kept as-is so callers can add languages
/// without touching this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    /// English and Tamil text, the pair every record in this service carries.
    pub fn new(en: impl Into<String>, ta: impl Into<String>) -> Self {
        Self::default()
            .with(Locale::English.tag(), en)
            .with(Locale::Tamil.tag(), ta)
    }

    /// Add or replace the text for `tag`.
    pub fn with(mut self, tag: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(tag.into(), text.into());
        self
    }

    /// Text for `locale`, if present.
    pub fn get(&self, locale: Locale) -> Option<&str> {
        self.0.get(locale.tag()).map(String::as_str)
    }

    /// Text for `locale`, falling back to the primary locale, then to "".
    pub fn resolve(&self, locale: Locale) -> &str {
        self.get(locale)
            .or_else(|| self.get(Locale::PRIMARY))
            .unwrap_or("")
    }

    /// True when every supported locale has a non-blank translation.
    pub fn is_complete(&self) -> bool {
        Locale::ALL
            .iter()
            .all(|l| self.get(*l).is_some_and(|s| !s.trim().is_empty()))
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.get(Locale::English), self.get(Locale::Tamil)) {
            (Some(en), Some(ta)) if en != ta => write!(f, "{} ({})", en, ta),
            _ => f.write_str(self.resolve(Locale::PRIMARY)),
        }
    }
}
