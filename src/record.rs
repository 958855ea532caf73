use std::fmt;

use crate::ColumnDecls;

/// The type of a record's primary key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyType {
    Numeric,
    String,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyType::Numeric => write!(f, "int"),
            KeyType::String => write!(f, "string"),
        }
    }
}

/// Primary key settings handed to the persistence layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrimaryKeyConfig {
    pub incrementing: bool,
    pub key_type: KeyType,
}

impl PrimaryKeyConfig {
    /// A database assigned, auto-incrementing integer key.
    pub const AUTO_INCREMENT: PrimaryKeyConfig = PrimaryKeyConfig {
        incrementing: true,
        key_type: KeyType::Numeric,
    };

    /// A string key generated before insert.
    pub const GENERATED_STRING: PrimaryKeyConfig = PrimaryKeyConfig {
        incrementing: false,
        key_type: KeyType::String,
    };
}

/// Mutable view of a record that is about to be inserted.
///
/// Implemented by the persistence layer for its own record types.  Attribute names
/// are column names.
pub trait Record {
    /// Returns whether `attribute` currently holds a value.
    fn is_set(&self, attribute: &str) -> bool;

    fn set_attribute(&mut self, attribute: &str, value: String);

    /// The name of the primary key attribute.
    fn key_name(&self) -> &str;

    fn configure_primary_key(&mut self, config: PrimaryKeyConfig);
}

/// Declares the identifier columns of a record type.
///
/// # Examples
///
/// ```
/// use nanoid_columns::{ColumnDecl, ColumnDecls, GeneratesNanoIds};
///
/// struct Post;
///
/// impl GeneratesNanoIds for Post {
///     fn nanoid_columns() -> ColumnDecls {
///         ColumnDecls::from("nanoid").with(ColumnDecl::IndexedOverride {
///             name: "share_code".to_string(),
///             size: Some(10),
///             alphabet: None,
///         })
///     }
/// }
///
/// assert_eq!(Post::nanoid_column(), "nanoid");
/// assert_eq!(Post::nanoid_columns().len(), 2);
/// ```
pub trait GeneratesNanoIds {
    /// The main identifier column, also used as the route key.
    fn nanoid_column() -> &'static str {
        "nanoid"
    }

    /// Every identifier column populated before insert.  Defaults to the main column.
    fn nanoid_columns() -> ColumnDecls {
        ColumnDecls::from(Self::nanoid_column())
    }

    /// Whether the primary key is a generated identifier rather than an
    /// auto-incrementing integer.
    fn nanoid_primary_key() -> bool {
        false
    }
}
