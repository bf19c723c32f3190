use serde::{Deserialize, Serialize};

/// Minimal film record used for result cards. Identity is `id`;
/// everything else is presentation data and may be absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmSummary {
    pub id: String,
    pub title: String,
    pub cover_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
}

impl FilmSummary {
    pub fn new(id: impl Into<String>, title: impl Into<String>, cover_image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            cover_image: cover_image.into(),
            rating: None,
            year: None,
            genres: None,
        }
    }
}

/// Extended record for the per-film detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmDetail {
    pub id: String,
    pub title: String,
    pub director: String,
    pub cover_image: String,
    #[serde(default)]
    pub trailer_url: Option<String>,
    pub description: String,
    pub release_date: String,
    pub language: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub actors: Vec<CastMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// A person from the catalog's people search, selectable as a
/// preferred actor in the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}
