//! Thin wrappers around the public content APIs
//!
//! Each provider is a GET + JSON decode against a configurable endpoint;
//! everything heavier (formatting, keyboards, error replies) stays in the
//! handlers.

/// Shared HTTP plumbing for the providers
pub mod http;

use crate::config::Settings;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Errors produced by the content providers
#[derive(Debug, Error)]
pub enum ContentError {
    /// Connectivity failure before a response was received
    #[error("network error: {0}")]
    Network(String),
    /// The API answered with a non-success status
    #[error("api error: {0}")]
    Api(String),
    /// The response body did not match the expected shape
    #[error("unexpected payload: {0}")]
    Json(String),
}

/// Category of fetched content
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContentKind {
    /// Cat fact from catfact.ninja
    CatFact,
    /// Two-part joke
    Joke,
    /// Random fact
    RandomFact,
}

impl ContentKind {
    /// Callback payload tag for this kind
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::CatFact => "catfact",
            Self::Joke => "joke",
            Self::RandomFact => "randomfact",
        }
    }

    /// Parses a callback payload tag back into a kind
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "catfact" => Some(Self::CatFact),
            "joke" => Some(Self::Joke),
            "randomfact" => Some(Self::RandomFact),
            _ => None,
        }
    }

    /// Human-readable header used in replies
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::CatFact => "🐱 Факт о котах",
            Self::Joke => "😂 Шутка",
            Self::RandomFact => "🧠 Случайный факт",
        }
    }
}

/// A two-part joke
#[derive(Debug, Clone, Deserialize)]
pub struct Joke {
    /// Joke setup line
    pub setup: String,
    /// Joke punchline
    pub punchline: String,
}

/// Age guessed from a name
#[derive(Debug, Clone, Deserialize)]
pub struct AgePrediction {
    /// The name the prediction was made for
    pub name: String,
    /// Predicted age; absent when the API has no data for the name
    pub age: Option<u32>,
}

/// Gender guessed from a name
#[derive(Debug, Clone, Deserialize)]
pub struct GenderPrediction {
    /// The name the prediction was made for
    pub name: String,
    /// Predicted gender; absent when the API has no data for the name
    pub gender: Option<String>,
    /// Confidence of the prediction, 0.0..=1.0
    pub probability: Option<f64>,
}

#[derive(Deserialize)]
struct CatFactResponse {
    fact: String,
}

#[derive(Deserialize)]
struct RandomFactResponse {
    text: String,
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ContentError> {
    serde_json::from_value(value).map_err(|e| ContentError::Json(e.to_string()))
}

fn url_with_name(base: &str, name: &str) -> Result<reqwest::Url, ContentError> {
    reqwest::Url::parse_with_params(base, &[("name", name)])
        .map_err(|e| ContentError::Api(format!("invalid request url: {e}")))
}

/// Client for all content providers
///
/// Holds one reqwest client and the endpoint configuration; cheap to clone
/// behind an `Arc` and shared by every handler.
pub struct ContentClient {
    http: HttpClient,
    settings: Arc<Settings>,
}

impl ContentClient {
    /// Creates a client with the standard timeout configuration
    #[must_use]
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            http: http::create_http_client(),
            settings,
        }
    }

    /// Fetches a cat fact
    ///
    /// # Errors
    ///
    /// Returns a `ContentError` when the API is unreachable or answers with
    /// an unexpected payload.
    pub async fn cat_fact(&self) -> Result<String, ContentError> {
        let value = http::fetch_json_with_retry(&self.http, &self.settings.cat_fact_url).await?;
        decode::<CatFactResponse>(value).map(|r| r.fact)
    }

    /// Fetches a two-part joke
    ///
    /// # Errors
    ///
    /// Returns a `ContentError` when the API is unreachable or answers with
    /// an unexpected payload.
    pub async fn joke(&self) -> Result<Joke, ContentError> {
        let value = http::fetch_json_with_retry(&self.http, &self.settings.joke_url).await?;
        decode(value)
    }

    /// Fetches a random fact
    ///
    /// # Errors
    ///
    /// Returns a `ContentError` when the API is unreachable or answers with
    /// an unexpected payload.
    pub async fn random_fact(&self) -> Result<String, ContentError> {
        let value =
            http::fetch_json_with_retry(&self.http, &self.settings.random_fact_url).await?;
        decode::<RandomFactResponse>(value).map(|r| r.text)
    }

    /// Predicts an age from a name
    ///
    /// # Errors
    ///
    /// Returns a `ContentError` when the API is unreachable or answers with
    /// an unexpected payload.
    pub async fn predict_age(&self, name: &str) -> Result<AgePrediction, ContentError> {
        let url = url_with_name(&self.settings.agify_url, name)?;
        let value = http::fetch_json_with_retry(&self.http, url.as_str()).await?;
        decode(value)
    }

    /// Predicts a gender from a name
    ///
    /// # Errors
    ///
    /// Returns a `ContentError` when the API is unreachable or answers with
    /// an unexpected payload.
    pub async fn predict_gender(&self, name: &str) -> Result<GenderPrediction, ContentError> {
        let url = url_with_name(&self.settings.genderize_url, name)?;
        let value = http::fetch_json_with_retry(&self.http, url.as_str()).await?;
        decode(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_round_trip() {
        for kind in [ContentKind::CatFact, ContentKind::Joke, ContentKind::RandomFact] {
            assert_eq!(ContentKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ContentKind::from_tag("weather"), None);
    }

    #[test]
    fn test_decode_cat_fact() -> Result<(), ContentError> {
        let value = json!({ "fact": "Cats sleep a lot.", "length": 17 });
        let decoded: CatFactResponse = decode(value)?;
        assert_eq!(decoded.fact, "Cats sleep a lot.");
        Ok(())
    }

    #[test]
    fn test_decode_joke() -> Result<(), ContentError> {
        let value = json!({
            "id": 42,
            "type": "general",
            "setup": "Why did the chicken cross the road?",
            "punchline": "To get to the other side."
        });
        let joke: Joke = decode(value)?;
        assert_eq!(joke.setup, "Why did the chicken cross the road?");
        assert_eq!(joke.punchline, "To get to the other side.");
        Ok(())
    }

    #[test]
    fn test_decode_random_fact() -> Result<(), ContentError> {
        let value = json!({ "id": "abc", "text": "Bananas are berries.", "language": "en" });
        let decoded: RandomFactResponse = decode(value)?;
        assert_eq!(decoded.text, "Bananas are berries.");
        Ok(())
    }

    #[test]
    fn test_decode_age_prediction_with_null_age() -> Result<(), ContentError> {
        let value = json!({ "name": "xqzw", "age": null, "count": 0 });
        let decoded: AgePrediction = decode(value)?;
        assert_eq!(decoded.name, "xqzw");
        assert_eq!(decoded.age, None);
        Ok(())
    }

    #[test]
    fn test_decode_gender_prediction() -> Result<(), ContentError> {
        let value = json!({
            "name": "alex",
            "gender": "male",
            "probability": 0.87,
            "count": 12345
        });
        let decoded: GenderPrediction = decode(value)?;
        assert_eq!(decoded.gender.as_deref(), Some("male"));
        Ok(())
    }

    #[test]
    fn test_decode_rejects_malformed_payload() {
        let value = json!({ "unexpected": true });
        let result: Result<CatFactResponse, _> = decode(value);
        assert!(matches!(result, Err(ContentError::Json(_))));
    }

    #[test]
    fn test_url_with_name_encodes_query() -> Result<(), ContentError> {
        let url = url_with_name("https://api.agify.io", "анна мария")?;
        assert!(url.as_str().starts_with("https://api.agify.io/?name="));
        assert!(!url.as_str().contains(' '));
        Ok(())
    }
}
