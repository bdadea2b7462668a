//! Locale-specific child rows attached to an entity after it is loaded.
//!
//! `translation` holds the row resolved for the requested locale;
//! `translations` holds every candidate row. Either may be absent. The
//! composite is a read-only view and is never written back through the
//! owning entity.

use serde::{Deserialize, Serialize};

use crate::options::LoadOptions;

pub trait TranslationRow {
    fn locale(&self) -> &str;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Translations<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<Vec<T>>,
}

impl<T> Default for Translations<T> {
    fn default() -> Self {
        Self {
            translation: None,
            translations: None,
        }
    }
}

/// Outcome of looking up one locale.
#[derive(Debug, PartialEq)]
pub enum TranslationLookup<'a, T> {
    /// Nothing was loaded.
    NoCandidates,
    DirectHit(&'a T),
    /// Found by scanning the candidate set.
    FallbackHit(&'a T),
    Miss,
}

impl<'a, T> TranslationLookup<'a, T> {
    #[must_use]
    pub fn row(self) -> Option<&'a T> {
        match self {
            TranslationLookup::DirectHit(t) | TranslationLookup::FallbackHit(t) => Some(t),
            TranslationLookup::NoCandidates | TranslationLookup::Miss => None,
        }
    }
}

impl<T: TranslationRow> Translations<T> {
    #[must_use]
    pub fn resolved(row: Option<T>) -> Self {
        Self {
            translation: row,
            translations: None,
        }
    }

    #[must_use]
    pub fn all(rows: Vec<T>) -> Self {
        Self {
            translation: None,
            translations: Some(rows),
        }
    }

    /// Picks what to attach for `load` out of the rows loaded for one entity.
    ///
    /// With `include_all_translations` every row is kept. With a locale, the
    /// row for that locale is kept, else the row for `default_locale`.
    /// Without either nothing is attached.
    #[must_use]
    pub fn resolve(rows: Vec<T>, load: &LoadOptions, default_locale: Option<&str>) -> Self {
        if load.include_all_translations {
            return Self::all(rows);
        }
        let Some(locale) = load.locale.as_deref() else {
            return Self::default();
        };
        let mut exact = None;
        let mut fallback = None;
        for row in rows {
            if row.locale() == locale {
                exact = Some(row);
                break;
            }
            if fallback.is_none() && default_locale.is_some_and(|d| row.locale() == d) {
                fallback = Some(row);
            }
        }
        Self::resolved(exact.or(fallback))
    }

    pub fn lookup(&self, locale: &str) -> TranslationLookup<'_, T> {
        if self.translation.is_none() && self.translations.is_none() {
            return TranslationLookup::NoCandidates;
        }
        if let Some(t) = &self.translation
            && t.locale() == locale
        {
            return TranslationLookup::DirectHit(t);
        }
        self.translations
            .iter()
            .flatten()
            .find(|t| t.locale() == locale)
            .map_or(TranslationLookup::Miss, TranslationLookup::FallbackHit)
    }

    /// Row for `locale`: the resolved row if it matches, else a scan of the
    /// candidates. `None` means absent content, not an error.
    pub fn get_translation(&self, locale: &str) -> Option<&T> {
        self.lookup(locale).row()
    }

    /// Without a locale only the resolved slot is consulted; candidates are
    /// ignored. With a locale this agrees with [`Self::get_translation`].
    pub fn has_translation(&self, locale: Option<&str>) -> bool {
        match locale {
            None => self.translation.is_some(),
            Some(locale) => self.get_translation(locale).is_some(),
        }
    }

    /// Locales present in either slot, resolved row first, without duplicates.
    pub fn locales(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let rows = self.translation.iter().chain(self.translations.iter().flatten());
        for row in rows {
            if !out.contains(&row.locale()) {
                out.push(row.locale());
            }
        }
        out
    }
}

/// An entity carrying a [`Translations`] composite.
pub trait Translatable {
    type Translation: TranslationRow;

    fn translations(&self) -> &Translations<Self::Translation>;

    fn set_translations(&mut self, translations: Translations<Self::Translation>);

    fn get_translation(&self, locale: &str) -> Option<&Self::Translation> {
        self.translations().get_translation(locale)
    }

    fn has_translation(&self, locale: Option<&str>) -> bool {
        self.translations().has_translation(locale)
    }
}
