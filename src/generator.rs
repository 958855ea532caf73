use std::fmt;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::Config;

/// Error returned for invalid generation, declaration or identifier input.
#[derive(Debug, PartialEq)]
pub enum Error {
    EmptyAlphabet,
    EmptyColumnName,
    InvalidCharacter(char),
    InvalidLength { received: usize, expected: usize },
    InvalidSize { column: Option<String> },
    NoIdentifierColumns,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::EmptyAlphabet => {
                write!(f, "Alphabet must not be empty")
            }
            Error::EmptyColumnName => {
                write!(f, "Column name must not be empty")
            }
            Error::InvalidCharacter(c) => {
                write!(f, "Character {:?} is not in the alphabet", c)
            }
            Error::InvalidLength { received, expected } => {
                write!(f, "Length was {}, expected {}", received, expected)
            }
            Error::InvalidSize { column: None } => {
                write!(f, "Size must be at least 1")
            }
            Error::InvalidSize {
                column: Some(column),
            } => {
                write!(f, "Size of column {} must be at least 1", column)
            }
            Error::NoIdentifierColumns => {
                write!(f, "No identifier columns declared")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Prepared identifier generator.
///
/// Holds the alphabet split into characters and the index distribution, so that
/// generating many identifiers with the same settings validates them only once.
#[derive(Clone, Debug)]
pub struct Generator {
    alphabet: Vec<char>,
    distribution: Uniform<usize>,
    size: usize,
}

impl Generator {
    /// Creates a generator with the size and alphabet of `config`.
    ///
    /// # Examples
    ///
    /// ```
    /// use nanoid_columns::{Config, Generator};
    ///
    /// let generator = Generator::new(&Config::new().size(8).unwrap());
    /// assert_eq!(generator.generate().len(), 8);
    /// ```
    pub fn new(config: &Config) -> Generator {
        // A `Config` can only hold a non-empty alphabet and a positive size.
        let alphabet: Vec<char> = config.alphabet.chars().collect();
        Generator {
            distribution: Uniform::new(0, alphabet.len()),
            alphabet,
            size: config.size,
        }
    }

    /// Creates a generator from an explicit size and alphabet.
    ///
    /// Fails with `Error::InvalidSize` for a zero size and `Error::EmptyAlphabet`
    /// for an empty alphabet.
    pub fn with_size_and_alphabet(size: usize, alphabet: &str) -> Result<Generator, Error> {
        if size == 0 {
            return Err(Error::InvalidSize { column: None });
        }
        if alphabet.is_empty() {
            return Err(Error::EmptyAlphabet);
        }
        let alphabet: Vec<char> = alphabet.chars().collect();
        Ok(Generator {
            distribution: Uniform::new(0, alphabet.len()),
            alphabet,
            size,
        })
    }

    /// Generates a new identifier using the thread-local CSPRNG.
    pub fn generate(&self) -> String {
        self.generate_with(&mut rand::thread_rng())
    }

    /// Generates a new identifier drawing from `rng`.
    ///
    /// Every symbol is picked independently and uniformly from the alphabet.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        (0..self.size)
            .map(|_| self.alphabet[self.distribution.sample(&mut *rng)])
            .collect()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Checks that `id` could have been produced by this generator.
    pub fn validate(&self, id: &str) -> Result<(), Error> {
        let received = id.chars().count();
        if received != self.size {
            return Err(Error::InvalidLength {
                received,
                expected: self.size,
            });
        }
        match id.chars().find(|c| !self.alphabet.contains(c)) {
            Some(c) => Err(Error::InvalidCharacter(c)),
            None => Ok(()),
        }
    }
}

/// Generates an identifier of `size` symbols drawn from `alphabet`.
///
/// The random source is `rand::thread_rng()`, a ChaCha based CSPRNG seeded from the
/// operating system, with one instance per thread.
///
/// # Examples
///
/// ```
/// use nanoid_columns::{generate, DEFAULT_ALPHABET, DEFAULT_SIZE};
///
/// let id = generate(DEFAULT_SIZE, DEFAULT_ALPHABET).unwrap();
/// assert_eq!(id.len(), 21);
///
/// let pin = generate(6, "0123456789").unwrap();
/// assert!(pin.chars().all(|c| c.is_ascii_digit()));
/// ```
pub fn generate(size: usize, alphabet: &str) -> Result<String, Error> {
    Ok(Generator::with_size_and_alphabet(size, alphabet)?.generate())
}

/// Like `generate`, drawing from the given random source.
pub fn generate_with<R: Rng + ?Sized>(
    rng: &mut R,
    size: usize,
    alphabet: &str,
) -> Result<String, Error> {
    Ok(Generator::with_size_and_alphabet(size, alphabet)?.generate_with(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_ALPHABET, DEFAULT_SIZE};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_length_and_membership() {
        let test_cases = [
            (1, "a"),
            (1, DEFAULT_ALPHABET),
            (21, DEFAULT_ALPHABET),
            (10, "0123456789"),
            (64, "AB"),
            (7, "äöü€"),
        ];

        for (size, alphabet) in test_cases {
            let id = generate(size, alphabet).unwrap();
            assert_eq!(id.chars().count(), size, "Wrong length for {:?}", alphabet);
            assert!(id.chars().all(|c| alphabet.contains(c)), "Foreign char in {}", id);
        }
    }

    #[test]
    fn test_single_symbol_alphabet() {
        assert_eq!(generate(5, "x").unwrap(), "xxxxx");
    }

    #[test]
    fn test_duplicate_symbols_are_allowed() {
        let id = generate(32, "aab").unwrap();
        assert!(id.chars().all(|c| c == 'a' || c == 'b'));
    }

    #[test]
    fn test_invalid_arguments() {
        assert_eq!(generate(0, DEFAULT_ALPHABET), Err(Error::InvalidSize { column: None }));
        assert_eq!(generate(21, ""), Err(Error::EmptyAlphabet));
        assert_eq!(
            Generator::with_size_and_alphabet(0, "").unwrap_err(),
            Error::InvalidSize { column: None }
        );
    }

    #[test]
    fn test_injected_rng() {
        let generator = Generator::new(&Config::new());
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let id = generator.generate_with(&mut rng);
            assert_eq!(generator.validate(&id), Ok(()));
        }

        // The same seed replays the same sequence.
        let first = generate_with(&mut StdRng::seed_from_u64(42), 21, DEFAULT_ALPHABET).unwrap();
        let second = generate_with(&mut StdRng::seed_from_u64(42), 21, DEFAULT_ALPHABET).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_validate() {
        let generator = Generator::with_size_and_alphabet(4, "abc").unwrap();
        assert_eq!(generator.validate("abca"), Ok(()));
        assert_eq!(
            generator.validate("abc"),
            Err(Error::InvalidLength {
                received: 3,
                expected: 4
            })
        );
        assert_eq!(generator.validate("abcd"), Err(Error::InvalidCharacter('d')));
    }

    #[test]
    fn test_no_collisions_and_uniform_distribution() {
        let generator = Generator::new(&Config::new());
        let mut seen = HashSet::new();
        let mut counts: HashMap<char, u64> = HashMap::new();
        let runs = 10_000;

        for _ in 0..runs {
            let id = generator.generate();
            assert_eq!(id.len(), DEFAULT_SIZE);
            for c in id.chars() {
                *counts.entry(c).or_insert(0) += 1;
            }
            assert!(seen.insert(id.clone()), "Duplicate identifier: {}", id);
        }

        // Chi-square goodness of fit against the uniform distribution.  With 63 degrees
        // of freedom the 99.999th percentile is about 123.
        let symbols = DEFAULT_ALPHABET.chars().count();
        let expected = (runs * DEFAULT_SIZE) as f64 / symbols as f64;
        let chi_square: f64 = DEFAULT_ALPHABET
            .chars()
            .map(|c| {
                let observed = *counts.get(&c).unwrap_or(&0) as f64;
                (observed - expected).powi(2) / expected
            })
            .sum();
        assert_eq!(counts.len(), symbols);
        assert!(chi_square < 130.0, "Chi-square too large: {}", chi_square);
    }
}
