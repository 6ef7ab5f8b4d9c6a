//! GraphQL response types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A GraphQL error returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    /// The error message.
    pub message: String,

    /// Locations in the document where the error occurred.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<GraphQLLocation>,

    /// Path to the field that caused the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,

    /// Additional error metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref path) = self.path {
            write!(f, " (at ")?;
            for (i, segment) in path.iter().enumerate() {
                match segment {
                    PathSegment::Field(name) if i > 0 => write!(f, ".{}", name)?,
                    PathSegment::Field(name) => write!(f, "{}", name)?,
                    PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
                }
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::error::Error for GraphQLError {}

/// A location in a GraphQL document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQLLocation {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

/// A segment in an error path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A field name.
    Field(String),
    /// An array index.
    Index(usize),
}

/// The ordered list of errors from a response's `errors` member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphQLErrorList(Vec<GraphQLError>);

impl GraphQLErrorList {
    /// Number of errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The errors in server emission order.
    pub fn as_slice(&self) -> &[GraphQLError] {
        &self.0
    }

    /// Iterate over the errors in server emission order.
    pub fn iter(&self) -> std::slice::Iter<'_, GraphQLError> {
        self.0.iter()
    }

    /// The messages joined with `"; "`, or `None` when empty.
    pub fn error_message(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(
                self.0
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        }
    }
}

impl From<Vec<GraphQLError>> for GraphQLErrorList {
    fn from(errors: Vec<GraphQLError>) -> Self {
        Self(errors)
    }
}

impl<'a> IntoIterator for &'a GraphQLErrorList {
    type Item = &'a GraphQLError;
    type IntoIter = std::slice::Iter<'a, GraphQLError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for GraphQLErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for GraphQLErrorList {}

/// The top-level shape of a GraphQL response body.
///
/// Both members stay undecoded so the reconciler can decide which one to
/// interpret. Only a JSON object is accepted at the top level.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub(crate) struct ResponseEnvelope {
    pub(crate) data: Option<Value>,
    pub(crate) errors: Option<Value>,
}

impl From<Map<String, Value>> for ResponseEnvelope {
    fn from(mut members: Map<String, Value>) -> Self {
        Self {
            data: members.remove("data"),
            errors: members.remove("errors"),
        }
    }
}

impl ResponseEnvelope {
    /// True when `errors` is present and neither `null` nor `[]`.
    pub(crate) fn has_errors(&self) -> bool {
        match &self.errors {
            None | Some(Value::Null) => false,
            Some(Value::Array(errors)) => !errors.is_empty(),
            Some(_) => true,
        }
    }
}
