use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

lazy_static! {
    static ref UNQUOTED_IDENTIFIER: Regex = Regex::new("^[a-z][a-z0-9_]*$").unwrap();
}

// Keywords that can't be used as an unquoted identifier even if they match the pattern above.
const RESERVED_KEYWORDS: &[&str] = &[
    "add", "allow", "alter", "and", "apply", "asc", "authorize", "batch", "begin", "by",
    "columnfamily", "create", "delete", "desc", "describe", "drop", "entries", "execute",
    "from", "full", "grant", "if", "in", "index", "infinity", "insert", "into", "is",
    "keyspace", "limit", "materialized", "mbean", "mbeans", "modify", "nan", "norecursive",
    "not", "null", "of", "on", "or", "order", "primary", "rename", "replace", "revoke",
    "schema", "select", "set", "table", "to", "token", "truncate", "unlogged", "unset",
    "update", "use", "using", "view", "where", "with",
];

/// The name of a schema object (keyspace, table, column, type, function...).
///
/// Identifiers are stored in their internal form, which is the exact form the cluster keeps
/// in its system tables: case-sensitive and without quotes. Two identifiers are equal iff
/// their internal forms are equal, regardless of how they were spelled in CQL.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    internal: Arc<str>,
}

impl Identifier {
    /// Build an identifier from its internal form, as found in system rows.
    pub fn from_internal(internal: impl AsRef<str>) -> Self {
        Self {
            internal: Arc::from(internal.as_ref()),
        }
    }

    /// Build an identifier from a CQL fragment: quoted names are taken verbatim (with `""`
    /// unescaped), unquoted ones are case-insensitive and get lowercased.
    pub fn from_cql(cql: &str) -> Self {
        let internal = match cql
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            Some(quoted) => quoted.replace("\"\"", "\""),
            None => cql.to_lowercase(),
        };
        Self::from_internal(internal)
    }

    pub fn as_internal(&self) -> &str {
        &self.internal
    }

    /// Render the identifier as a CQL fragment. When `pretty` is set, quotes are only added
    /// if the identifier couldn't be parsed back without them.
    pub fn as_cql(&self, pretty: bool) -> String {
        if pretty && !Self::needs_quotes(&self.internal) {
            self.internal.to_string()
        } else {
            format!("\"{}\"", self.internal.replace('"', "\"\""))
        }
    }

    fn needs_quotes(internal: &str) -> bool {
        !UNQUOTED_IDENTIFIER.is_match(internal) || RESERVED_KEYWORDS.contains(&internal)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.internal)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.internal)
    }
}

impl From<&str> for Identifier {
    fn from(internal: &str) -> Self {
        Self::from_internal(internal)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.internal)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let internal = String::deserialize(deserializer)?;
        Ok(Self::from_internal(internal))
    }
}
