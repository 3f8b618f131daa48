// Artsy API response types.
// Defines immutable records decoded best-effort from Artsy JSON payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::error::{EmergenceError, Result};

/// Placeholder Artsy puts in image URL templates.
const VERSION_PLACEHOLDER: &str = ":version";

/// Decode a single record, yielding `None` when a required field is missing
/// or has the wrong type.
pub fn decode<T: DeserializeOwned>(json: &Value) -> Option<T> {
    T::deserialize(json).ok()
}

/// Decode a JSON array element by element, dropping entries that fail.
///
/// A body that is not an array is an error; bad entries inside one are not.
pub fn decode_list<T: DeserializeOwned>(json: &Value) -> Result<Vec<T>> {
    let items = json.as_array().ok_or_else(|| {
        EmergenceError::Decode(format!("expected a JSON array, got {}", kind_of(json)))
    })?;

    let decoded: Vec<T> = items.iter().filter_map(decode).collect();
    if decoded.len() < items.len() {
        debug!(
            total = items.len(),
            dropped = items.len() - decoded.len(),
            record = std::any::type_name::<T>(),
            "dropped undecodable list entries"
        );
    }
    Ok(decoded)
}

fn kind_of(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Nested lists follow the same drop-bad-entries policy; null or absent is empty.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().iter().filter_map(decode).collect())
}

/// Optional timestamps that do not parse are treated as absent.
fn lenient_datetime<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Fill in an Artsy `:version` URL template.
///
/// An empty version list means the template is not restricted.
fn versioned_url(template: Option<&str>, versions: &[String], version: &str) -> Option<String> {
    let template = template?;
    if !versions.is_empty() && !versions.iter().any(|v| v == version) {
        return None;
    }
    Some(template.replace(VERSION_PLACEHOLDER, version))
}

/// Artist credited on an artwork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
}

/// Image attached to an artwork or show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub image_versions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_default: bool,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
}

impl Image {
    /// URL for a named version such as `large`.
    pub fn url_for(&self, version: &str) -> Option<String> {
        versioned_url(self.image_url.as_deref(), &self.image_versions, version)
    }
}

/// Artwork shown at a gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: String,
    pub title: String,
    pub medium: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub artists: Vec<Artist>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub images: Vec<Image>,
}

impl Artwork {
    /// The image flagged default, else the first image.
    pub fn default_image(&self) -> Option<&Image> {
        default_image(&self.images)
    }
}

fn default_image(images: &[Image]) -> Option<&Image> {
    images
        .iter()
        .find(|image| image.is_default)
        .or_else(|| images.first())
}

/// Gallery or institution hosting a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: String,
    pub name: String,
}

/// A gallery show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_partner")]
    pub partner: Option<Partner>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub image_versions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub images: Vec<Image>,
}

fn lenient_partner<'de, D>(deserializer: D) -> std::result::Result<Option<Partner>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(decode))
}

impl Show {
    /// Cover image URL: the show's own image, else its default installation shot.
    pub fn image_url_for(&self, version: &str) -> Option<String> {
        versioned_url(self.image_url.as_deref(), &self.image_versions, version)
            .or_else(|| default_image(&self.images).and_then(|image| image.url_for(version)))
    }
}

/// A place shows can be searched near.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(id: &str, name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            latitude,
            longitude,
        }
    }
}

/// Body of the token exchange response.
#[derive(Debug, Clone, Deserialize)]
pub struct XAppTokenResponse {
    pub xapp_token: String,
    /// Expiry as an ISO-8601 timestamp, despite the name.
    pub expires_in: String,
}
