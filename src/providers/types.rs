use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Extra request parameters (`maxwidth`, `key`, ...), kept sorted by key.
pub type Params = BTreeMap<String, String>;

/// oEmbed resource type discriminant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    Link,
    Photo,
    Video,
    Rich,
    Other(String),
}

impl MediaType {
    pub fn parse(value: &str) -> Self {
        match value {
            "link" => MediaType::Link,
            "photo" => MediaType::Photo,
            "video" => MediaType::Video,
            "rich" => MediaType::Rich,
            other => MediaType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MediaType::Link => "link",
            MediaType::Photo => "photo",
            MediaType::Video => "video",
            MediaType::Rich => "rich",
            MediaType::Other(other) => other,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded provider response
///
/// The record keeps every field the provider returned. After normalization
/// `url` and `title` are always present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Accepts only JSON objects
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Field rendered as markup text: strings verbatim, other scalars via JSON.
    pub fn field(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn url(&self) -> String {
        self.field("url").unwrap_or_default()
    }

    pub fn title(&self) -> String {
        self.field("title").unwrap_or_default()
    }

    pub fn html(&self) -> Option<String> {
        self.field("html")
    }

    pub fn media_type(&self) -> Option<MediaType> {
        self.0
            .get("type")
            .and_then(Value::as_str)
            .map(MediaType::parse)
    }

    /// Back-fill `url` with the requested URL and `title` with `url`.
    pub fn normalize(&mut self, requested_url: &str) {
        if self.field("url").is_none() {
            self.0
                .insert("url".to_string(), Value::String(requested_url.to_string()));
        }
        if self.field("title").is_none() {
            let url = self.0.get("url").cloned().unwrap_or(Value::Null);
            self.0.insert("title".to_string(), url);
        }
    }
}

impl From<Map<String, Value>> for Metadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_backfills_url_and_title() {
        let mut metadata = Metadata::from_value(json!({"type": "link"})).unwrap();
        metadata.normalize("http://example.com/a");

        assert_eq!(metadata.url(), "http://example.com/a");
        assert_eq!(metadata.title(), "http://example.com/a");
        assert_eq!(metadata.media_type(), Some(MediaType::Link));
    }

    #[test]
    fn test_normalize_title_follows_provider_url() {
        let mut metadata =
            Metadata::from_value(json!({"type": "photo", "url": "notitle.jpg"})).unwrap();
        metadata.normalize("http://photo-notitle");

        assert_eq!(metadata.url(), "notitle.jpg");
        assert_eq!(metadata.title(), "notitle.jpg");
    }

    #[test]
    fn test_normalize_keeps_existing_fields() {
        let mut metadata =
            Metadata::from_value(json!({"title": "t", "url": "u", "width": 99})).unwrap();
        metadata.normalize("http://other");

        assert_eq!(metadata.title(), "t");
        assert_eq!(metadata.url(), "u");
        assert_eq!(metadata.field("width").as_deref(), Some("99"));
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Metadata::from_value(json!(["a"])).is_none());
        assert!(Metadata::from_value(json!("bad")).is_none());
    }

    #[test]
    fn test_media_type_other() {
        let metadata = Metadata::from_value(json!({"type": "audio"})).unwrap();
        assert_eq!(
            metadata.media_type(),
            Some(MediaType::Other("audio".to_string()))
        );
        assert_eq!(MediaType::Video.to_string(), "video");
    }
}
