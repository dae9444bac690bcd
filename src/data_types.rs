use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::identifier::Identifier;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, Display, AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NativeType {
    Ascii,
    BigInt,
    Blob,
    Boolean,
    Counter,
    Date,
    Decimal,
    Double,
    Duration,
    Float,
    Inet,
    Int,
    SmallInt,
    #[strum(to_string = "text", serialize = "varchar")]
    Text,
    Time,
    Timestamp,
    TimeUuid,
    TinyInt,
    Uuid,
    VarInt,
}

/// A fully resolved column, field, argument or return type.
///
/// User-defined types are referenced by keyspace and name, their definition lives in the
/// keyspace's type collection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    Native(NativeType),
    List {
        element: Box<DataType>,
        frozen: bool,
    },
    Set {
        element: Box<DataType>,
        frozen: bool,
    },
    Map {
        key: Box<DataType>,
        value: Box<DataType>,
        frozen: bool,
    },
    Tuple(Vec<DataType>),
    Vector {
        element: Box<DataType>,
        dimensions: u16,
    },
    UserDefined {
        keyspace: Identifier,
        name: Identifier,
        frozen: bool,
    },
    // Server-side class name of a custom type
    Custom(String),
}

impl DataType {
    pub fn is_frozen(&self) -> bool {
        match self {
            DataType::List { frozen, .. }
            | DataType::Set { frozen, .. }
            | DataType::Map { frozen, .. }
            | DataType::UserDefined { frozen, .. } => *frozen,
            DataType::Tuple(_) => true,
            _ => false,
        }
    }

    fn freeze(self) -> Self {
        match self {
            DataType::List { element, .. } => DataType::List {
                element,
                frozen: true,
            },
            DataType::Set { element, .. } => DataType::Set {
                element,
                frozen: true,
            },
            DataType::Map { key, value, .. } => DataType::Map {
                key,
                value,
                frozen: true,
            },
            DataType::UserDefined { keyspace, name, .. } => DataType::UserDefined {
                keyspace,
                name,
                frozen: true,
            },
            other => other,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = match self {
            DataType::Native(native) => return write!(f, "{native}"),
            DataType::Tuple(types) => {
                return write!(f, "tuple<{}>", types.iter().join(", "))
            }
            DataType::Vector {
                element,
                dimensions,
            } => return write!(f, "vector<{element}, {dimensions}>"),
            DataType::Custom(class) => return write!(f, "'{class}'"),
            DataType::List { element, .. } => format!("list<{element}>"),
            DataType::Set { element, .. } => format!("set<{element}>"),
            DataType::Map { key, value, .. } => format!("map<{key}, {value}>"),
            DataType::UserDefined { keyspace, name, .. } => {
                format!("{}.{}", keyspace.as_cql(true), name.as_cql(true))
            }
        };

        if self.is_frozen() {
            write!(f, "frozen<{inner}>")
        } else {
            f.write_str(&inner)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid type {typ:?} at position {position}: {reason}")]
pub struct DataTypeError {
    pub typ: String,
    pub position: usize,
    pub reason: String,
}

/// Parse a type as it appears in schema rows (e.g. `map<text, frozen<list<int>>>`).
///
/// Unqualified user type names are resolved against `keyspace`, the keyspace owning the
/// object being parsed.
pub fn parse_data_type(typ: &str, keyspace: &Identifier) -> Result<DataType, DataTypeError> {
    let mut parser = TypeParser {
        input: typ,
        position: 0,
        depth: 0,
        keyspace,
    };

    let data_type = parser.parse_type()?;
    parser.skip_whitespace();
    if parser.position < typ.len() {
        return Err(parser.error("leftover characters"));
    }
    Ok(data_type)
}

struct TypeParser<'a> {
    input: &'a str,
    position: usize,
    depth: usize,
    keyspace: &'a Identifier,
}

/// Deepest nesting of parameterized types accepted in a single type string.
const MAX_TYPE_DEPTH: usize = 64;

impl<'a> TypeParser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn error(&self, reason: &str) -> DataTypeError {
        DataTypeError {
            typ: self.input.to_string(),
            position: self.position,
            reason: reason.to_string(),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.position += rest.len() - rest.trim_start().len();
    }

    fn expect(&mut self, c: char) -> Result<(), DataTypeError> {
        self.skip_whitespace();
        if self.peek() == Some(c) {
            self.position += c.len_utf8();
            Ok(())
        } else {
            Err(self.error(&format!("expected {c:?}")))
        }
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let end = rest.find(|c: char| !predicate(c)).unwrap_or(rest.len());
        self.position += end;
        &rest[..end]
    }

    fn parse_type(&mut self) -> Result<DataType, DataTypeError> {
        if self.depth >= MAX_TYPE_DEPTH {
            return Err(self.error("type nested too deeply"));
        }
        self.depth += 1;
        let parsed = self.parse_type_at_depth();
        self.depth -= 1;
        parsed
    }

    fn parse_type_at_depth(&mut self) -> Result<DataType, DataTypeError> {
        self.skip_whitespace();
        match self.peek() {
            Some('\'') => return self.parse_custom(),
            Some('"') => return self.parse_user_type(None),
            _ => {}
        }

        let token = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        if token.is_empty() {
            return Err(self.error("expected a type name"));
        }

        // A keyspace-qualified user type
        if self.peek() == Some('.') {
            self.position += 1;
            return self.parse_user_type(Some(Identifier::from_cql(token)));
        }

        let parsed = match token.to_ascii_lowercase().as_str() {
            "frozen" => {
                self.expect('<')?;
                let inner = self.parse_type()?;
                self.expect('>')?;
                inner.freeze()
            }
            "list" => {
                self.expect('<')?;
                let element = Box::new(self.parse_type()?);
                self.expect('>')?;
                DataType::List {
                    element,
                    frozen: false,
                }
            }
            "set" => {
                self.expect('<')?;
                let element = Box::new(self.parse_type()?);
                self.expect('>')?;
                DataType::Set {
                    element,
                    frozen: false,
                }
            }
            "map" => {
                self.expect('<')?;
                let key = Box::new(self.parse_type()?);
                self.expect(',')?;
                let value = Box::new(self.parse_type()?);
                self.expect('>')?;
                DataType::Map {
                    key,
                    value,
                    frozen: false,
                }
            }
            "tuple" => {
                self.expect('<')?;
                let mut types = vec![self.parse_type()?];
                loop {
                    self.skip_whitespace();
                    match self.peek() {
                        Some(',') => {
                            self.position += 1;
                            types.push(self.parse_type()?);
                        }
                        Some('>') => {
                            self.position += 1;
                            break;
                        }
                        _ => return Err(self.error("expected ',' or '>'")),
                    }
                }
                DataType::Tuple(types)
            }
            "vector" => {
                self.expect('<')?;
                let element = Box::new(self.parse_type()?);
                self.expect(',')?;
                self.skip_whitespace();
                let dimensions = self
                    .take_while(|c| c.is_ascii_digit())
                    .parse::<u16>()
                    .map_err(|_| self.error("expected vector dimensions"))?;
                self.expect('>')?;
                DataType::Vector {
                    element,
                    dimensions,
                }
            }
            _ => match NativeType::from_str(token) {
                Ok(native) => DataType::Native(native),
                Err(_) => DataType::UserDefined {
                    keyspace: self.keyspace.clone(),
                    name: Identifier::from_cql(token),
                    frozen: false,
                },
            },
        };

        Ok(parsed)
    }

    fn parse_user_type(
        &mut self,
        keyspace: Option<Identifier>,
    ) -> Result<DataType, DataTypeError> {
        let name = if self.peek() == Some('"') {
            self.parse_quoted_name()?
        } else {
            let token = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
            if token.is_empty() {
                return Err(self.error("expected a user type name"));
            }
            Identifier::from_cql(token)
        };

        match keyspace {
            Some(keyspace) => Ok(DataType::UserDefined {
                keyspace,
                name,
                frozen: false,
            }),
            // A quoted name may itself be a keyspace qualifier
            None if self.peek() == Some('.') => {
                self.position += 1;
                self.parse_user_type(Some(name))
            }
            None => Ok(DataType::UserDefined {
                keyspace: self.keyspace.clone(),
                name,
                frozen: false,
            }),
        }
    }

    fn parse_quoted_name(&mut self) -> Result<Identifier, DataTypeError> {
        let start = self.position;
        self.position += 1;
        loop {
            match self.rest().find('"') {
                None => return Err(self.error("unterminated quoted name")),
                Some(idx) => {
                    self.position += idx + 1;
                    // `""` is an escaped quote inside the name
                    if self.peek() == Some('"') {
                        self.position += 1;
                    } else {
                        break;
                    }
                }
            }
        }
        Ok(Identifier::from_cql(&self.input[start..self.position]))
    }

    fn parse_custom(&mut self) -> Result<DataType, DataTypeError> {
        self.position += 1;
        match self.rest().find('\'') {
            Some(end) => {
                let class = self.rest()[..end].to_string();
                self.position += end + 1;
                Ok(DataType::Custom(class))
            }
            None => Err(self.error("unterminated custom type")),
        }
    }
}
