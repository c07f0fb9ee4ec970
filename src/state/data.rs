/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the persistence layer, the store and the UI layer.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// How long a story stays visible after creation (24 hours)
pub const STORY_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Opaque, immutable story identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for StoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for StoryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encoded image payload (JPEG bytes produced by the encoder)
///
/// Serialized as base64 so the persisted JSON record stays compact.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct EncodedImage(Vec<u8>);

impl EncodedImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

// Payloads are large; print the size only
impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedImage({} bytes)", self.0.len())
    }
}

impl Serialize for EncodedImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for EncodedImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// A single uploaded photo story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Unique key used for lookup and removal
    pub id: StoryId,
    /// Encoded image payload
    pub image: EncodedImage,
    /// Creation time in milliseconds since the Unix epoch
    pub created_at: i64,
    /// Set once the story has been displayed in the viewer
    pub viewed: bool,
}

impl Story {
    /// Build a fresh, unviewed story
    pub fn new(image: EncodedImage, created_at: i64) -> Self {
        Self {
            id: StoryId::new(),
            image,
            created_at,
            viewed: false,
        }
    }

    /// A story is active while it is younger than 24 hours
    pub fn is_active(&self, now: i64) -> bool {
        now - self.created_at < STORY_TTL_MS
    }
}

/// The persisted record: only the collection, never the viewing cursor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub stories: Vec<Story>,
}
