use serde::Serialize;

use crate::film::Actor;
use crate::util::QueryString;

/// Release years the wizard accepts.
pub const YEAR_MIN: i32 = 1900;
pub const YEAR_MAX: i32 = 2025;

const DATE_RANGE_WARNING: &str = "Release Date Start must be less than Release Date End.";

/// The wizard's current selections, mirrored into a query string so the
/// in-progress state is shareable and bookmarkable.
///
/// Every setter updates the in-memory field and the matching query key in
/// one step; clearing a field removes its key. Setters are idempotent, so
/// re-applying the same selection leaves the location unchanged.
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    mood: Option<String>,
    genre: Option<String>,
    language: Option<String>,
    actor: Option<Actor>,
    release_date_start: Option<i32>,
    release_date_end: Option<i32>,
    query: QueryString,
}

/// Wire form of a completed selection, sent to the recommendation
/// endpoint. The actor is flattened to a name.
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceSelection {
    pub mood: Option<String>,
    pub language: Option<String>,
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub release_date_start: Option<String>,
    pub release_date_end: Option<String>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mood(&self) -> Option<&str> {
        self.mood.as_deref()
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    pub fn release_date_start(&self) -> Option<i32> {
        self.release_date_start
    }

    pub fn release_date_end(&self) -> Option<i32> {
        self.release_date_end
    }

    pub fn set_mood(&mut self, mood: Option<String>) {
        self.query.update("mood", mood.as_deref());
        self.mood = mood;
    }

    pub fn set_genre(&mut self, genre: Option<String>) {
        self.query.update("genre", genre.as_deref());
        self.genre = genre;
    }

    pub fn set_language(&mut self, language: Option<String>) {
        self.query.update("language", language.as_deref());
        self.language = language;
    }

    pub fn set_actor(&mut self, actor: Option<Actor>) {
        self.query
            .update("actor", actor.as_ref().map(|a| a.name.as_str()));
        self.actor = actor;
    }

    /// Out-of-range years are refused and the previous value kept.
    pub fn set_release_date_start(&mut self, year: Option<i32>) {
        if let Some(y) = year {
            if !(YEAR_MIN..=YEAR_MAX).contains(&y) {
                return;
            }
        }
        self.query
            .update("release_date_start", year.map(|y| y.to_string()).as_deref());
        self.release_date_start = year;
    }

    pub fn set_release_date_end(&mut self, year: Option<i32>) {
        if let Some(y) = year {
            if !(YEAR_MIN..=YEAR_MAX).contains(&y) {
                return;
            }
        }
        self.query
            .update("release_date_end", year.map(|y| y.to_string()).as_deref());
        self.release_date_end = year;
    }

    /// Soft warning when both years are set out of order. Shown to the
    /// user, never blocks advancement.
    pub fn date_range_warning(&self) -> Option<&'static str> {
        match (self.release_date_start, self.release_date_end) {
            (Some(start), Some(end)) if start >= end => Some(DATE_RANGE_WARNING),
            _ => None,
        }
    }

    /// Shareable location reflecting the current selections.
    pub fn location(&self, path: &str) -> String {
        self.query.location(path)
    }

    pub fn query(&self) -> &QueryString {
        &self.query
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn selection(&self) -> PreferenceSelection {
        PreferenceSelection {
            mood: self.mood.clone(),
            language: self.language.clone(),
            genre: self.genre.clone(),
            actor: self.actor.as_ref().map(|a| a.name.clone()),
            release_date_start: self.release_date_start.map(|y| y.to_string()),
            release_date_end: self.release_date_end.map(|y| y.to_string()),
        }
    }
}
