// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node record wire format.
//!
//! A node describes itself to the traversal engine as a single line of
//! `/`-delimited fields, the first of which is the kind tag:
//!
//! ```text
//! Start
//! DialogueNode/<dialogueKey>/<choiceAKey>/<choiceBKey>/<choiceCKey>/<choiceDKey>
//! ```
//!
//! Fields themselves never contain the delimiter; the graph rejects keys that
//! would break this on insertion.

use std::fmt;

/// Field delimiter
pub const DELIMITER: char = '/';

/// Kind tag of the entry node
pub const START_TAG: &str = "Start";

/// Kind tag of a dialogue line with four choices
pub const DIALOGUE_TAG: &str = "DialogueNode";

/// A parsed node record: kind tag followed by ordered fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    kind: String,
    fields: Vec<String>,
}

impl NodeRecord {
    /// Create a record from a kind tag and its fields
    pub fn new(kind: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            kind: kind.into(),
            fields,
        }
    }

    /// Split a serialized record into its kind tag and fields
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(DELIMITER);
        // `split` always yields at least one item, even for an empty string
        let kind = parts.next().unwrap_or_default().to_string();
        Self {
            kind,
            fields: parts.map(str::to_string).collect(),
        }
    }

    /// Kind tag
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Fields after the kind tag
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field at `index`, if present
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

impl fmt::Display for NodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)?;
        for field in &self.fields {
            write!(f, "{DELIMITER}{field}")?;
        }
        Ok(())
    }
}
