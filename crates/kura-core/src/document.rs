//! Hosting document attributes driven by the language preference.

use crate::models::{Direction, Language};

/// Attributes of the hosting document that follow the language preference.
pub trait Document {
    fn set_direction(&mut self, direction: Direction);
    fn set_language(&mut self, language: Language);
}

/// In-memory document attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentState {
    pub direction: Direction,
    pub language: Option<Language>,
}

impl Document for DocumentState {
    fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    fn set_language(&mut self, language: Language) {
        self.language = Some(language);
    }
}

/// Apply the side effects of a language value to the document.
pub(crate) fn apply_language<D: Document + ?Sized>(document: &mut D, language: Language) {
    document.set_direction(language.direction());
    document.set_language(language);
}
