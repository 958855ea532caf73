//! The pre-insert extension point.
//!
//! The persistence layer calls [`NanoIdHook::before_insert`] with the record it is about
//! to insert.  The hook fills in identifier columns that are still unset and, for record
//! types keyed by an identifier, switches the primary key to a generated string.  An
//! error aborts the insert.

use std::fmt;

use tracing::{debug, warn};

use crate::{
    ColumnDecls, ColumnSpec, Config, Error, GeneratesNanoIds, Generator, PrimaryKeyConfig, Record,
};

/// Populates identifier columns and configures the primary key before insert.
///
/// Column population and primary key assignment are enabled independently.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use nanoid_columns::{NanoIdHook, PrimaryKeyConfig, Record};
///
/// #[derive(Default)]
/// struct Row(HashMap<String, String>);
///
/// impl Record for Row {
///     fn is_set(&self, attribute: &str) -> bool { self.0.contains_key(attribute) }
///     fn set_attribute(&mut self, attribute: &str, value: String) {
///         self.0.insert(attribute.to_string(), value);
///     }
///     fn key_name(&self) -> &str { "id" }
///     fn configure_primary_key(&mut self, _config: PrimaryKeyConfig) {}
/// }
///
/// let mut row = Row::default();
/// NanoIdHook::new().populate("nanoid").before_insert(&mut row).unwrap();
/// assert_eq!(row.0["nanoid"].len(), 21);
/// ```
#[derive(Clone, Debug)]
pub struct NanoIdHook<'a> {
    columns: Option<ColumnDecls>,
    config: Config<'a>,
    primary_key: bool,
}

impl NanoIdHook<'static> {
    /// Creates a hook that does nothing until columns or the primary key are enabled.
    /// Defaults come from the global configuration.
    pub fn new() -> Self {
        NanoIdHook {
            columns: None,
            config: Config::global_or_default(),
            primary_key: false,
        }
    }

    /// Creates the hook described by a record type's declarations.
    pub fn for_record<T: GeneratesNanoIds>() -> Self {
        let hook = NanoIdHook::new().populate(T::nanoid_columns());
        if T::nanoid_primary_key() {
            hook.primary_key()
        } else {
            hook
        }
    }
}

impl Default for NanoIdHook<'static> {
    fn default() -> Self {
        NanoIdHook::new()
    }
}

impl<'a> NanoIdHook<'a> {
    /// Populates the columns of `columns` that are unset at insert time.
    pub fn populate(mut self, columns: impl Into<ColumnDecls>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    /// Makes the primary key a generated string, assigning one if it is unset.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Replaces the configuration supplying default sizes and alphabets.
    pub fn config<'b>(self, config: Config<'b>) -> NanoIdHook<'b> {
        NanoIdHook {
            columns: self.columns,
            config,
            primary_key: self.primary_key,
        }
    }

    /// Runs the hook against a record about to be inserted.
    ///
    /// The declaration is resolved before anything is assigned, so an invalid
    /// declaration leaves the record untouched.
    pub fn before_insert<R: Record + ?Sized>(&self, record: &mut R) -> Result<(), Error> {
        self.apply(record).map(|_| ())
    }

    /// Runs the hook and returns the specs of the attributes it generated.
    fn apply<R: Record + ?Sized>(&self, record: &mut R) -> Result<Vec<ColumnSpec>, Error> {
        let specs = match &self.columns {
            Some(columns) => columns.resolve_with(&self.config)?,
            None => Vec::new(),
        };

        let mut generated = populate_columns(record, &specs)?;
        if self.primary_key {
            generated.extend(assign_primary_key(record, &self.config));
        }
        Ok(generated)
    }

    /// Runs the hook, then `insert`, regenerating identifiers on conflict.
    ///
    /// `insert` classifies its own failures: on `InsertError::Conflict` every attribute
    /// this hook generated gets a fresh value and the insert is tried again, up to
    /// `max_attempts` inserts in total.  Values that were set before the hook ran are
    /// never regenerated, so a conflict with nothing to regenerate fails immediately.
    pub fn insert_with_retry<R, T, E, F>(
        &self,
        record: &mut R,
        max_attempts: usize,
        mut insert: F,
    ) -> Result<T, RetryError<E>>
    where
        R: Record + ?Sized,
        F: FnMut(&mut R) -> Result<T, InsertError<E>>,
    {
        let generated = self.apply(record).map_err(RetryError::Hook)?;
        let mut attempts = 1;
        loop {
            match insert(&mut *record) {
                Ok(inserted) => return Ok(inserted),
                Err(InsertError::Failed(e)) => return Err(RetryError::Insert(e)),
                Err(InsertError::Conflict(e)) if generated.is_empty() => {
                    return Err(RetryError::Insert(e))
                }
                Err(InsertError::Conflict(e)) if attempts >= max_attempts => {
                    return Err(RetryError::Exhausted { attempts, last: e })
                }
                Err(InsertError::Conflict(_)) => {
                    warn!(attempts, "Identifier conflict on insert, regenerating");
                    for spec in &generated {
                        let value = spec.generator().map_err(RetryError::Hook)?.generate();
                        record.set_attribute(&spec.name, value);
                    }
                    attempts += 1;
                }
            }
        }
    }
}

/// Generates a value for every column in `specs` that `record` leaves unset.
///
/// The check happens per entry, so when a name appears twice the first entry supplies
/// the value.  Returns the specs that were used.
pub fn populate_columns<R: Record + ?Sized>(
    record: &mut R,
    specs: &[ColumnSpec],
) -> Result<Vec<ColumnSpec>, Error> {
    let mut generated = Vec::new();
    for spec in specs {
        if record.is_set(&spec.name) {
            continue;
        }
        let value = spec.generator()?.generate();
        record.set_attribute(&spec.name, value);
        debug!(column = %spec.name, size = spec.size, "Generated identifier");
        generated.push(spec.clone());
    }
    Ok(generated)
}

/// Switches the primary key to a generated string and fills it if unset.
///
/// Returns the spec used when a key was generated.
pub fn assign_primary_key<R: Record + ?Sized>(
    record: &mut R,
    config: &Config,
) -> Option<ColumnSpec> {
    record.configure_primary_key(PrimaryKeyConfig::GENERATED_STRING);
    let key_name = record.key_name().to_string();
    if record.is_set(&key_name) {
        return None;
    }
    let value = Generator::new(config).generate();
    record.set_attribute(&key_name, value);
    debug!(column = %key_name, "Generated primary key");
    Some(ColumnSpec {
        name: key_name,
        size: config.size,
        alphabet: config.alphabet.to_string(),
    })
}

/// Runs the hook declared by the record's own type.
pub fn before_insert<T: Record + GeneratesNanoIds>(record: &mut T) -> Result<(), Error> {
    NanoIdHook::for_record::<T>().before_insert(record)
}

/// Failure reported by an insert closure passed to `insert_with_retry`.
#[derive(Debug, PartialEq)]
pub enum InsertError<E> {
    /// A uniqueness constraint rejected the record.
    Conflict(E),
    Failed(E),
}

/// Error returned by `insert_with_retry`.
#[derive(Debug, PartialEq)]
pub enum RetryError<E> {
    Hook(Error),
    Insert(E),
    Exhausted { attempts: usize, last: E },
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RetryError::Hook(e) => write!(f, "Generating identifiers failed: {}", e),
            RetryError::Insert(e) => write!(f, "Insert failed: {}", e),
            RetryError::Exhausted { attempts, last } => {
                write!(f, "Insert conflicted {} times, last error: {}", attempts, last)
            }
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryError<E> {}
