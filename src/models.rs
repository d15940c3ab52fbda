use serde::{Deserialize, Serialize};

use crate::entities::{actor, director, episode, movie, season, tv_show};

/// Uniform body of every JSON response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> Envelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self { success: true, data: Some(data), message: message.into() }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { success: false, data: None, message: message.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Director {
    pub id: i32,
    pub name: String,
}

impl From<director::Model> for Director {
    fn from(m: director::Model) -> Self {
        Self { id: m.id, name: m.name }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i32,
    pub name: String,
}

impl From<actor::Model> for Actor {
    fn from(m: actor::Model) -> Self {
        Self { id: m.id, name: m.name }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub genre: String,
    pub year: i32,
    pub director: Director,
    pub actors: Vec<Actor>,
}

impl Movie {
    pub fn assemble(m: movie::Model, director: Director, actors: Vec<Actor>) -> Self {
        Self { id: m.id, title: m.title, genre: m.genre, year: m.year, director, actors }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    pub id: i32,
    pub title: String,
    pub genre: String,
}

impl From<tv_show::Model> for Show {
    fn from(m: tv_show::Model) -> Self {
        Self { id: m.id, title: m.title, genre: m.genre }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSummary {
    pub id: i32,
    pub season_number: i32,
    pub show: Show,
}

impl SeasonSummary {
    pub fn assemble(m: season::Model, show: Show) -> Self {
        Self { id: m.id, season_number: m.season_number, show }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeDetail {
    pub id: i32,
    pub title: String,
    pub episode_number: i32,
    pub season: SeasonSummary,
    pub director: Director,
}

impl EpisodeDetail {
    pub fn assemble(m: episode::Model, season: SeasonSummary, director: Director) -> Self {
        Self { id: m.id, title: m.title, episode_number: m.episode_number, season, director }
    }
}

/// Filters accepted by `GET /movies`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MovieQuery {
    pub genre: Option<String>,
    pub sort: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovieSort {
    Title,
    Year,
}

impl MovieSort {
    /// Only the exact field names are recognised; anything else means unsorted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "title" => Some(Self::Title),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Year => "year",
        }
    }
}

/// Body of `POST /movies`. Every field is optional so that missing values
/// surface as validation errors instead of deserialization failures.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_ids: Option<Vec<i32>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_accepts_only_exact_names() {
        assert_eq!(MovieSort::parse("title"), Some(MovieSort::Title));
        assert_eq!(MovieSort::parse("year"), Some(MovieSort::Year));
        assert_eq!(MovieSort::parse("Title"), None);
        assert_eq!(MovieSort::parse("bogus"), None);
    }

    #[test]
    fn envelope_serializes_null_data_on_failure() {
        let body = serde_json::to_value(Envelope::<()>::fail("nope")).unwrap();
        assert_eq!(body, serde_json::json!({ "success": false, "data": null, "message": "nope" }));
    }

    #[test]
    fn episode_uses_camel_case_keys() {
        let ep = EpisodeDetail {
            id: 3,
            title: "Pilot".into(),
            episode_number: 1,
            season: SeasonSummary {
                id: 2,
                season_number: 1,
                show: Show { id: 1, title: "Lost".into(), genre: "Drama".into() },
            },
            director: Director { id: 4, name: "J. J. Abrams".into() },
        };
        let body = serde_json::to_value(&ep).unwrap();
        assert_eq!(body["episodeNumber"], 1);
        assert_eq!(body["season"]["seasonNumber"], 1);
        assert_eq!(body["season"]["show"]["id"], 1);
    }
}
