//! Identifier column declarations and their resolution into column specs.
//!
//! A record type declares its identifier columns as a list of [`ColumnDecl`] entries.
//! Resolving the list fills in the default size and alphabet for everything the
//! entries leave out, producing one [`ColumnSpec`] per column in declaration order.
//!
//! Declarations can also be read from loosely typed JSON with
//! [`ColumnDecls::from_value`], which accepts the same shapes as older configuration
//! files: a single column name, a list of names and override objects, or an object
//! keyed by column name.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{Config, Error, Generator};

/// A fully resolved identifier column.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub size: usize,
    pub alphabet: String,
}

impl ColumnSpec {
    /// Creates a generator producing values for this column.
    pub fn generator(&self) -> Result<Generator, Error> {
        Generator::with_size_and_alphabet(self.size, &self.alphabet)
    }
}

/// One entry of an identifier column declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnDecl {
    /// A column using the default size and alphabet.
    PlainName(String),
    /// A positional entry carrying its own column name.
    IndexedOverride {
        name: String,
        size: Option<usize>,
        alphabet: Option<String>,
    },
    /// An entry declared under `key`.  A non-empty `name` replaces `key` as the
    /// column name.
    NamedOverride {
        key: String,
        name: Option<String>,
        size: Option<usize>,
        alphabet: Option<String>,
    },
}

impl ColumnDecl {
    /// Resolves the entry, taking anything it leaves out from `config`.
    ///
    /// An explicit size of zero is rejected rather than replaced by the default.  An
    /// empty alphabet counts as unset.
    pub fn resolve(&self, config: &Config) -> Result<ColumnSpec, Error> {
        let (name, size, alphabet) = match self {
            ColumnDecl::PlainName(name) => (name.as_str(), None, None),
            ColumnDecl::IndexedOverride {
                name,
                size,
                alphabet,
            } => (name.as_str(), *size, alphabet.as_deref()),
            ColumnDecl::NamedOverride {
                key,
                name,
                size,
                alphabet,
            } => {
                let name = name.as_deref().filter(|name| !name.is_empty());
                (name.unwrap_or(key.as_str()), *size, alphabet.as_deref())
            }
        };

        if name.is_empty() {
            return Err(Error::EmptyColumnName);
        }
        let size = match size {
            None => config.size,
            Some(0) => {
                return Err(Error::InvalidSize {
                    column: Some(name.to_string()),
                })
            }
            Some(size) => size,
        };
        let alphabet = alphabet
            .filter(|alphabet| !alphabet.is_empty())
            .unwrap_or(config.alphabet);

        Ok(ColumnSpec {
            name: name.to_string(),
            size,
            alphabet: alphabet.to_string(),
        })
    }
}

impl From<&str> for ColumnDecl {
    fn from(name: &str) -> Self {
        ColumnDecl::PlainName(name.to_string())
    }
}

impl From<String> for ColumnDecl {
    fn from(name: String) -> Self {
        ColumnDecl::PlainName(name)
    }
}

/// An ordered identifier column declaration.
///
/// Duplicate column names are kept.  When a record is populated the first of them fills
/// the column and the rest find it already set.
///
/// # Examples
///
/// ```
/// use nanoid_columns::{ColumnDecl, ColumnDecls};
///
/// let decls: ColumnDecls = vec![
///     ColumnDecl::from("nanoid"),
///     ColumnDecl::IndexedOverride {
///         name: "short_code".to_string(),
///         size: Some(8),
///         alphabet: Some("0123456789ABCDEF".to_string()),
///     },
/// ]
/// .into();
///
/// let specs = decls.resolve().unwrap();
/// assert_eq!(specs[0].size, 21);
/// assert_eq!(specs[1].name, "short_code");
/// assert_eq!(specs[1].size, 8);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnDecls(Vec<ColumnDecl>);

impl ColumnDecls {
    pub fn new() -> Self {
        ColumnDecls(Vec::new())
    }

    /// Appends an entry.
    pub fn with(mut self, decl: impl Into<ColumnDecl>) -> Self {
        self.0.push(decl.into());
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnDecl> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves every entry with the global configuration, or the built-in defaults if
    /// no global configuration is set.
    pub fn resolve(&self) -> Result<Vec<ColumnSpec>, Error> {
        self.resolve_with(&Config::global_or_default())
    }

    /// Resolves every entry with defaults from `config`.  Fails on the first invalid
    /// entry.
    pub fn resolve_with(&self, config: &Config) -> Result<Vec<ColumnSpec>, Error> {
        let specs = self
            .0
            .iter()
            .map(|decl| decl.resolve(config))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(columns = specs.len(), "Resolved identifier column declaration");
        Ok(specs)
    }

    /// Reads a declaration from loosely typed JSON.
    ///
    /// - A string is a single column name.
    /// - An array holds positional entries: column names, or objects with a `key`
    ///   naming the column and optional `size` and `alphabets`.
    /// - An object maps keys to entries.  Keys that read as numbers are positional
    ///   entries as above.  Any other key names the column, unless its object value has
    ///   a non-empty string `key` of its own.
    ///
    /// A `size` counts only when it is a positive integer and an alphabet only when it is
    /// a non-empty string; anything else falls back to the default.  Entries matching
    /// none of these shapes are skipped with a warning instead of failing.
    ///
    /// # Examples
    ///
    /// ```
    /// use nanoid_columns::ColumnDecls;
    /// use serde_json::json;
    ///
    /// let decls = ColumnDecls::from_value(&json!({
    ///     "nanoid": {},
    ///     "custom_nanoid": {"key": "other_name", "alphabets": "ABC"},
    /// }));
    /// let specs = decls.resolve().unwrap();
    /// assert_eq!(specs[0].name, "nanoid");
    /// assert_eq!(specs[1].name, "other_name");
    /// assert_eq!(specs[1].alphabet, "ABC");
    /// ```
    pub fn from_value(value: &Value) -> ColumnDecls {
        match value {
            Value::String(name) if !name.is_empty() => {
                ColumnDecls(vec![ColumnDecl::PlainName(name.clone())])
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| positional_entry(&index.to_string(), item))
                .collect(),
            Value::Object(entries) => entries
                .iter()
                .filter_map(|(key, item)| {
                    if is_numeric(key) {
                        positional_entry(key, item)
                    } else {
                        named_entry(key, item)
                    }
                })
                .collect(),
            other => {
                warn!(declaration = %other, "Skipping column declaration that is not a name, list or map");
                ColumnDecls::new()
            }
        }
    }
}

fn is_numeric(key: &str) -> bool {
    key.trim().parse::<f64>().map_or(false, f64::is_finite)
}

fn positional_entry(index: &str, value: &Value) -> Option<ColumnDecl> {
    match value {
        Value::String(name) if !name.is_empty() => Some(ColumnDecl::PlainName(name.clone())),
        Value::Object(fields) => match fields.get("key") {
            Some(Value::String(name)) if !name.is_empty() => Some(ColumnDecl::IndexedOverride {
                name: name.clone(),
                size: size_field(fields),
                alphabet: alphabet_field(fields),
            }),
            _ => {
                warn!(entry = %index, "Skipping positional column declaration without a key");
                None
            }
        },
        other => {
            warn!(entry = %index, value = %other, "Skipping malformed positional column declaration");
            None
        }
    }
}

fn named_entry(key: &str, value: &Value) -> Option<ColumnDecl> {
    match value {
        Value::Object(fields) => {
            let name = fields
                .get("key")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .map(str::to_string);
            if key.is_empty() && name.is_none() {
                warn!("Skipping named column declaration without a column name");
                return None;
            }
            Some(ColumnDecl::NamedOverride {
                key: key.to_string(),
                name,
                size: size_field(fields),
                alphabet: alphabet_field(fields),
            })
        }
        other => {
            warn!(entry = %key, value = %other, "Skipping malformed named column declaration");
            None
        }
    }
}

fn size_field(fields: &Map<String, Value>) -> Option<usize> {
    fields
        .get("size")
        .and_then(Value::as_u64)
        .filter(|&size| size > 0)
        .and_then(|size| usize::try_from(size).ok())
}

fn alphabet_field(fields: &Map<String, Value>) -> Option<String> {
    fields
        .get("alphabets")
        .and_then(Value::as_str)
        .filter(|alphabet| !alphabet.is_empty())
        .map(str::to_string)
}

impl From<&str> for ColumnDecls {
    fn from(name: &str) -> Self {
        ColumnDecls(vec![ColumnDecl::from(name)])
    }
}

impl From<String> for ColumnDecls {
    fn from(name: String) -> Self {
        ColumnDecls(vec![ColumnDecl::from(name)])
    }
}

impl From<ColumnDecl> for ColumnDecls {
    fn from(decl: ColumnDecl) -> Self {
        ColumnDecls(vec![decl])
    }
}

impl From<Vec<ColumnDecl>> for ColumnDecls {
    fn from(decls: Vec<ColumnDecl>) -> Self {
        ColumnDecls(decls)
    }
}

impl FromIterator<ColumnDecl> for ColumnDecls {
    fn from_iter<I: IntoIterator<Item = ColumnDecl>>(iter: I) -> Self {
        ColumnDecls(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ColumnDecls {
    type Item = &'a ColumnDecl;
    type IntoIter = std::slice::Iter<'a, ColumnDecl>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for ColumnDecls {
    /// Accepts the same shapes as [`ColumnDecls::from_value`].
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(ColumnDecls::from_value(&value))
    }
}

/// Resolves a declaration with the global or built-in defaults.
///
/// # Examples
///
/// ```
/// use nanoid_columns::{resolve, DEFAULT_ALPHABET};
///
/// let specs = resolve("nanoid").unwrap();
/// assert_eq!(specs.len(), 1);
/// assert_eq!(specs[0].name, "nanoid");
/// assert_eq!(specs[0].alphabet, DEFAULT_ALPHABET);
/// ```
pub fn resolve(raw: impl Into<ColumnDecls>) -> Result<Vec<ColumnSpec>, Error> {
    raw.into().resolve()
}
