use std::fmt;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;

static GLOBAL_CONFIG: Lazy<Mutex<Option<Config>>> = Lazy::new(|| Mutex::new(None));

/// The URL-safe alphabet used when no other alphabet is configured.
pub const DEFAULT_ALPHABET: &str =
    "_-0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The number of symbols in an identifier when no other size is configured.
pub const DEFAULT_SIZE: usize = 21;

/// Default size and alphabet for generated identifiers.
#[derive(Clone, Debug, PartialEq)]
pub struct Config<'a> {
    pub(crate) alphabet: &'a str,
    pub(crate) size: usize,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    EmptyAlphabet,
    InvalidSize,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::EmptyAlphabet => write!(f, "Alphabet must not be empty"),
            ConfigError::InvalidSize => write!(f, "Size must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for Config<'_> {
    fn default() -> Self {
        Config::new()
    }
}

impl<'a> Config<'a> {
    /// Creates a new configuration with the default settings.
    /// - `size` defaults to 21, which with the 64 symbol default alphabet gives 126 random
    ///   bits, comparable to a random UUID.
    /// - `alphabet` defaults to `A-Za-z0-9_-`, safe to use unescaped in URLs.
    pub fn new() -> Self {
        Config {
            alphabet: DEFAULT_ALPHABET,
            size: DEFAULT_SIZE,
        }
    }

    /// Sets the number of symbols in generated identifiers.
    /// The value must be at least 1.
    pub fn size(mut self, size: usize) -> Result<Self, ConfigError> {
        if size == 0 {
            Err(ConfigError::InvalidSize)
        } else {
            self.size = size;
            Ok(self)
        }
    }

    /// Sets the symbols identifiers are drawn from.
    /// The value must not be empty.  Repeated characters are allowed but make those
    /// characters proportionally more likely.
    pub fn alphabet(mut self, alphabet: &'a str) -> Result<Self, ConfigError> {
        if alphabet.is_empty() {
            Err(ConfigError::EmptyAlphabet)
        } else {
            self.alphabet = alphabet;
            Ok(self)
        }
    }

    pub fn get_size(&self) -> usize {
        self.size
    }

    pub fn get_alphabet(&self) -> &'a str {
        self.alphabet
    }

    /// Sets the global configuration.  Column declarations resolved without an explicit
    /// configuration take their defaults from here.
    pub fn set_global(config: Config<'static>) {
        let mut global_config = GLOBAL_CONFIG.lock().unwrap_or_else(PoisonError::into_inner);
        *global_config = Some(config);
    }

    /// Accesses the global configuration, if set.
    pub fn global() -> Option<Config<'static>> {
        GLOBAL_CONFIG
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The global configuration, or the built-in defaults when none was set.
    pub fn global_or_default() -> Config<'static> {
        Config::global().unwrap_or_default()
    }
}
