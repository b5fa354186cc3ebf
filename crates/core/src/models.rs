use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Literal marker meaning "tag absent or blank" at the prompt and
/// tag-container boundaries. Internally absence is `TagValue::missing`.
pub const SENTINEL: &str = "N";

/// A tag value as read from a file's tag container.
///
/// `None` means absent, empty, or whitespace-only; the literal sentinel
/// only appears when the value is rendered for a prompt payload or a tag
/// write, so a real tag value that happens to equal `"N"` never gets
/// special treatment internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagValue(Option<String>);

impl TagValue {
    pub fn missing() -> Self {
        Self(None)
    }

    pub fn present(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    /// Normalize a raw container value: absent, empty, or whitespace-only
    /// collapses to missing.
    pub fn from_raw(raw: Option<String>) -> Self {
        match raw {
            Some(v) if !v.trim().is_empty() => Self(Some(v)),
            _ => Self(None),
        }
    }

    pub fn as_option(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Render for a prompt payload or a tag-container write.
    pub fn render(&self) -> &str {
        self.0.as_deref().unwrap_or(SENTINEL)
    }
}

/// One file's metadata snapshot.
///
/// Created once per source file by the extractor and read-only afterward.
/// `metadata` keeps the configured tag order with no duplicate keys.
#[derive(Debug, Clone)]
pub struct TagRecord {
    pub filename: String,
    pub cleaned_filename: String,
    pub metadata: Vec<(String, TagValue)>,
}

impl Serialize for TagRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("filename", &self.filename)?;
        map.serialize_entry("cleaned_filename", &self.cleaned_filename)?;
        map.serialize_entry("metadata", &MetadataMap(&self.metadata))?;
        map.end()
    }
}

struct MetadataMap<'a>(&'a [(String, TagValue)]);

impl Serialize for MetadataMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, value.render())?;
        }
        map.end()
    }
}

/// Totals reported when a run reaches its terminal state.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub scanned: usize,
    pub applied: usize,
}
