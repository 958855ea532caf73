//! `nanoid_columns` generates compact, URL-safe random identifiers and attaches them to
//! database records, either as a secondary lookup key or as the primary key.
//!
//! Identifiers are strings of a fixed number of symbols, each drawn independently and
//! uniformly from an alphabet.  The defaults, 21 symbols from the 64 character alphabet
//! `A-Za-z0-9_-`, give 126 random bits, about as many as a random UUID in a much shorter
//! string that needs no escaping in URLs.
//!
//! Random values come from `rand::thread_rng()`, a cryptographically secure generator
//! seeded by the operating system.  Nothing here checks for uniqueness: size the
//! identifiers so that collisions are negligible for your record counts, and let a
//! unique index in the database catch the rest.
//!
//! The persistence layer stays in charge of the records.  It implements the small
//! [`Record`] trait for the records it inserts and [`Finder`] for lookups, and calls
//! [`NanoIdHook::before_insert`] right before issuing an insert.
//!
//! # Usage
//!
//! ## Declaring identifier columns
//!
//! A record type lists its identifier columns by implementing [`GeneratesNanoIds`].  Before
//! insert, every declared column that is still unset gets a freshly generated value;
//! values set by the caller are kept.
//!
//! ```
//! use std::collections::HashMap;
//! use nanoid_columns::{
//!     before_insert, ColumnDecl, ColumnDecls, GeneratesNanoIds, PrimaryKeyConfig, Record,
//! };
//!
//! #[derive(Default)]
//! struct Post {
//!     attributes: HashMap<String, String>,
//! }
//!
//! impl Record for Post {
//!     fn is_set(&self, attribute: &str) -> bool {
//!         self.attributes.contains_key(attribute)
//!     }
//!     fn set_attribute(&mut self, attribute: &str, value: String) {
//!         self.attributes.insert(attribute.to_string(), value);
//!     }
//!     fn key_name(&self) -> &str {
//!         "id"
//!     }
//!     fn configure_primary_key(&mut self, _config: PrimaryKeyConfig) {}
//! }
//!
//! impl GeneratesNanoIds for Post {
//!     fn nanoid_columns() -> ColumnDecls {
//!         ColumnDecls::from("nanoid").with(ColumnDecl::IndexedOverride {
//!             name: "share_code".to_string(),
//!             size: Some(10),
//!             alphabet: Some("0123456789".to_string()),
//!         })
//!     }
//! }
//!
//! let mut post = Post::default();
//! post.set_attribute("nanoid", "kept-as-is".to_string());
//! before_insert(&mut post).unwrap();
//!
//! assert_eq!(post.attributes["nanoid"], "kept-as-is");
//! assert_eq!(post.attributes["share_code"].len(), 10);
//! ```
//!
//! Record types keyed by an identifier return `true` from
//! [`GeneratesNanoIds::nanoid_primary_key`].  The hook then tells the persistence layer
//! that the key is a string and not auto-incrementing, and generates the key if it is
//! unset.
//!
//! ## Configuration
//!
//! Defaults for columns that don't override size or alphabet come from the global
//! [`Config`], if one was set.
//!
//! ```
//! use nanoid_columns::{resolve, Config};
//!
//! Config::set_global(Config::new().size(12).unwrap());
//! assert_eq!(resolve("nanoid").unwrap()[0].size, 12);
//! ```
//!
//! ## Low level API
//!
//! [`generate`] and [`Generator`] produce identifiers directly.
//!
//! ```
//! use nanoid_columns::{generate, Generator, Config};
//!
//! let id = generate(21, "_-0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ").unwrap();
//! assert_eq!(id.len(), 21);
//!
//! let generator = Generator::new(&Config::new().alphabet("abc").unwrap());
//! assert!(generator.generate().chars().all(|c| "abc".contains(c)));
//! ```
//!

mod binding;
mod columns;
mod config;
mod field;
mod generator;
mod hook;
mod record;

#[cfg(test)]
mod fixtures;

pub use binding::{
    find_by_nanoids, resolve_route_binding, route_key_name, select_column, where_nanoid,
    BindingError, Finder, NanoIdQuery,
};
pub use columns::{resolve, ColumnDecl, ColumnDecls, ColumnSpec};
pub use config::{Config, ConfigError, DEFAULT_ALPHABET, DEFAULT_SIZE};
pub use field::{IdKind, NanoId};
pub use generator::{generate, generate_with, Error, Generator};
pub use hook::{
    assign_primary_key, before_insert, populate_columns, InsertError, NanoIdHook, RetryError,
};
pub use record::{GeneratesNanoIds, KeyType, PrimaryKeyConfig, Record};
