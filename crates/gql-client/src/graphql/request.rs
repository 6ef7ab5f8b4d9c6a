//! GraphQL request types.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Variables of a GraphQL request, keyed by name.
pub type Variables = Map<String, Value>;

/// A GraphQL request envelope.
///
/// Serializes to the wire body `{"query": ..., "variables": ..., "operationName": ...}`.
/// Empty variables and a missing operation name are left out of the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLRequest {
    /// The GraphQL query string.
    pub query: String,

    /// Variables for the query.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub variables: Variables,

    /// Optional operation name (for documents with multiple operations).
    #[serde(skip_serializing_if = "Option::is_none", rename = "operationName")]
    pub operation_name: Option<String>,
}

impl GraphQLRequest {
    /// Create a request for the given query text.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let request = GraphQLRequest::new(r#"
    ///     query GetUsers {
    ///         users {
    ///             id
    ///             name
    ///         }
    ///     }
    /// "#)
    /// .operation_name("GetUsers");
    /// ```
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Variables::new(),
            operation_name: None,
        }
    }

    /// Set the operation name. An empty name clears it.
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.operation_name = (!name.is_empty()).then_some(name);
        self
    }

    /// Replace all variables with the fields of a serializable value.
    ///
    /// The value must serialize to a JSON object; `null` (for example `()` or
    /// `None`) clears the variables.
    pub fn variables<V: Serialize + ?Sized>(mut self, variables: &V) -> Result<Self> {
        self.variables = match serde_json::to_value(variables) {
            Ok(Value::Object(map)) => map,
            Ok(Value::Null) => Variables::new(),
            Ok(other) => {
                return Err(Error::invalid_envelope(format!(
                    "variables must be a JSON object, got {}",
                    json_kind(&other)
                )));
            }
            Err(e) => return Err(Error::encode(e)),
        };
        Ok(self)
    }

    /// Whether this request carries the introspection query.
    pub fn is_introspection(&self) -> bool {
        self.query == INTROSPECTION_QUERY
    }

    /// Encode the envelope as a JSON request body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.query.trim().is_empty() {
            return Err(Error::invalid_envelope("query must not be empty"));
        }
        serde_json::to_vec(self).map_err(Error::encode)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Standard introspection query for schema metadata.
///
/// Requests whose query text is exactly this constant are sent without
/// credentials.
pub const INTROSPECTION_QUERY: &str = r#"
    query IntrospectionQuery {
        __schema {
            queryType { name }
            mutationType { name }
            subscriptionType { name }
            types {
                ...FullType
            }
            directives {
                name
                description
                locations
                args {
                    ...InputValue
                }
            }
        }
    }

    fragment FullType on __Type {
        kind
        name
        description
        fields(includeDeprecated: true) {
            name
            description
            args {
                ...InputValue
            }
            type {
                ...TypeRef
            }
            isDeprecated
            deprecationReason
        }
        inputFields {
            ...InputValue
        }
        interfaces {
            ...TypeRef
        }
        enumValues(includeDeprecated: true) {
            name
            description
            isDeprecated
            deprecationReason
        }
        possibleTypes {
            ...TypeRef
        }
    }

    fragment InputValue on __InputValue {
        name
        description
        type {
            ...TypeRef
        }
        defaultValue
    }

    fragment TypeRef on __Type {
        kind
        name
        ofType {
            kind
            name
            ofType {
                kind
                name
                ofType {
                    kind
                    name
                    ofType {
                        kind
                        name
                        ofType {
                            kind
                            name
                            ofType {
                                kind
                                name
                                ofType {
                                    kind
                                    name
                                }
                            }
                        }
                    }
                }
            }
        }
    }
"#;
