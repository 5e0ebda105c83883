//! Metadata extraction from test annotations
//!
//! Annotations are free-form (type, description) pairs attached by test
//! authors. Recognized types route to fixed metadata fields; everything
//! else lands in the open parameters map.

use crate::{Severity, TestMetadata};
use serde::{Deserialize, Serialize};

/// A single annotation as attached to a test by its author
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Annotation {
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: Some(description.into()),
        }
    }
}

/// Build the metadata record for one test from its ordered annotations and
/// its title path (outermost grouping first, test name last).
///
/// Single-valued fields are last-write-wins across annotations; `tag`
/// accumulates in order. When the describe hierarchy was not set via
/// annotations it is filled from the title path, without ever overwriting
/// an annotation-derived value.
pub fn extract(annotations: &[Annotation], title_path: &[String]) -> TestMetadata {
    let mut metadata = TestMetadata::default();

    for annotation in annotations {
        let kind = annotation.kind.to_lowercase();
        let value = annotation.description.clone().unwrap_or_default();

        match kind.as_str() {
            "epic" => metadata.epic = Some(value),
            "feature" => metadata.feature = Some(value),
            "story" => metadata.story = Some(value),
            "suite" => metadata.suite = Some(value),
            "subsuite" => metadata.sub_suite = Some(value),
            "parentsuite" => metadata.parent_suite = Some(value),
            "owner" => metadata.owner = Some(value),
            "description" => metadata.description = Some(value),
            "tag" => metadata.tags.push(value),
            "severity" => match Severity::parse(&value) {
                Some(severity) => metadata.severity = Some(severity),
                // Outside the closed set: keep the raw value as a parameter
                None => {
                    if !value.is_empty() {
                        metadata.parameters.insert(kind, value);
                    }
                }
            },
            _ => {
                if !value.is_empty() {
                    metadata.parameters.insert(kind, value);
                }
            }
        }
    }

    // Title-path fallback: position 0 is the file-level grouping, then the
    // describe blocks. Only fills fields the annotations left unset.
    if title_path.len() > 1 {
        if metadata.parent_suite.is_none() {
            metadata.parent_suite = Some(title_path[0].clone());
        }
        if metadata.suite.is_none() && title_path.len() > 2 {
            metadata.suite = Some(title_path[1].clone());
        }
        if metadata.sub_suite.is_none() && title_path.len() > 3 {
            metadata.sub_suite = Some(title_path[2].clone());
        }
    }

    metadata
}
