//! Field paths over loosely-typed provider payloads
//!
//! Provider response shapes drift between model variants, so image
//! references are located through an ordered list of candidate paths.
//! The first path that resolves wins.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One step of a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A path into a JSON tree, e.g. `data.output[0].url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldPathError {
    #[error("field path is empty")]
    Empty,

    #[error("invalid field path `{path}`: {reason}")]
    Invalid { path: String, reason: String },
}

impl FieldPath {
    /// Starts a path at an object key
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Key(key.into())],
        }
    }

    /// Appends an object key
    pub fn then(mut self, key: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(key.into()));
        self
    }

    /// Appends an array index
    pub fn at(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Resolves the path, treating `null` as absent
    pub fn lookup<'a>(&self, payload: &'a Value) -> Option<&'a Value> {
        let mut current = payload;
        for segment in &self.segments {
            current = match segment {
                Segment::Key(key) => current.as_object()?.get(key)?,
                Segment::Index(idx) => current.as_array()?.get(*idx)?,
            };
        }
        (!current.is_null()).then_some(current)
    }

    /// Resolves the path to a non-empty string
    pub fn lookup_str<'a>(&self, payload: &'a Value) -> Option<&'a str> {
        self.lookup(payload)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{key}")?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = FieldPathError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let path = path.trim();
        if path.is_empty() {
            return Err(FieldPathError::Empty);
        }

        let invalid = |reason: &str| FieldPathError::Invalid {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        for part in path.split('.') {
            let (key, mut rest) = match part.find('[') {
                Some(pos) => part.split_at(pos),
                None => (part, ""),
            };
            if key.is_empty() && (segments.is_empty() || rest.is_empty()) {
                return Err(invalid("empty key"));
            }
            if !key.is_empty() {
                segments.push(Segment::Key(key.to_string()));
            }
            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(|| invalid("unclosed `[`"))?;
                let index = rest[1..close]
                    .parse::<usize>()
                    .map_err(|_| invalid("index must be a non-negative integer"))?;
                segments.push(Segment::Index(index));
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(invalid("unexpected characters after `]`"));
                }
            }
        }

        Ok(Self { segments })
    }
}

/// Returns the first candidate path that resolves to a defined value
pub fn extract_first<'a>(payload: &'a Value, paths: &[FieldPath]) -> Option<&'a Value> {
    paths.iter().find_map(|path| path.lookup(payload))
}

/// Returns the first candidate path that resolves to a non-empty string
pub fn extract_str<'a>(payload: &'a Value, paths: &[FieldPath]) -> Option<&'a str> {
    paths.iter().find_map(|path| path.lookup_str(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_dotted_and_indexed() {
        let path: FieldPath = "data.output[0].url".parse().unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("data".into()),
                Segment::Key("output".into()),
                Segment::Index(0),
                Segment::Key("url".into()),
            ]
        );
        assert_eq!(path.to_string(), "data.output[0].url");
        assert_eq!(path, FieldPath::key("data").then("output").at(0).then("url"));
    }

    #[test]
    fn test_parse_nested_indices() {
        let path: FieldPath = "grid[1][2]".parse().unwrap();
        assert_eq!(path, FieldPath::key("grid").at(1).at(2));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!("".parse::<FieldPath>(), Err(FieldPathError::Empty));
        assert!("a..b".parse::<FieldPath>().is_err());
        assert!("a[x]".parse::<FieldPath>().is_err());
        assert!("a[0".parse::<FieldPath>().is_err());
        assert!("a[0]b".parse::<FieldPath>().is_err());
    }

    #[test]
    fn test_lookup_treats_null_as_absent() {
        let payload = json!({ "image": null, "images": [] });
        assert!(FieldPath::key("image").lookup(&payload).is_none());
        assert!(FieldPath::key("images").at(0).lookup(&payload).is_none());
        assert!(FieldPath::key("image").then("url").lookup(&payload).is_none());
    }

    #[test]
    fn test_top_level_path_wins_over_nested() {
        let payload = json!({
            "output": [{ "url": "https://top/level.jpg" }],
            "data": { "output": [{ "url": "https://nested/one.jpg" }] }
        });
        let paths = [
            FieldPath::key("output").at(0).then("url"),
            FieldPath::key("data").then("output").at(0).then("url"),
        ];
        assert_eq!(extract_str(&payload, &paths), Some("https://top/level.jpg"));
    }

    #[test]
    fn test_falls_back_to_later_path() {
        let payload = json!({
            "output": [{ "url": "" }],
            "data": { "output": [{ "url": "https://nested/one.jpg" }] }
        });
        let paths = [
            FieldPath::key("output").at(0).then("url"),
            FieldPath::key("data").then("output").at(0).then("url"),
        ];
        assert_eq!(extract_str(&payload, &paths), Some("https://nested/one.jpg"));
        assert!(extract_first(&payload, &paths[..1]).is_some());
    }

    #[test]
    fn test_no_candidate_resolves() {
        let payload = json!({ "status": "succeeded" });
        let paths = [FieldPath::key("output").at(0).then("url")];
        assert_eq!(extract_str(&payload, &paths), None);
        assert_eq!(extract_first(&payload, &paths), None);
    }
}
