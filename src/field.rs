use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use diesel::deserialize::{self, FromSql, Queryable};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Generator, DEFAULT_ALPHABET, DEFAULT_SIZE};

/// Describes the identifiers of one kind of object.
pub trait IdKind: fmt::Debug {
    fn size() -> usize {
        DEFAULT_SIZE
    }

    fn alphabet() -> &'static str {
        DEFAULT_ALPHABET
    }
}

/// A generic type-safe identifier field (a wrapped `String`).
///
/// Every value has the size and alphabet of its kind `T`: parsing, deserializing with
/// Serde and loading from the database all reject strings of the wrong length or with
/// foreign characters.
///
/// Traits are also provided for Diesel compatibility with Postgres `Text` fields.
///
/// # Examples
///
/// ```
/// use nanoid_columns;
/// use serde_json;
///
/// #[derive(Debug)]
/// pub struct InviteCodeKind;
/// impl nanoid_columns::IdKind for InviteCodeKind {
///     fn size() -> usize { 8 }
///     fn alphabet() -> &'static str { "0123456789ABCDEFGHJKMNPQRSTVWXYZ" }
/// }
///
/// type InviteCode = nanoid_columns::NanoId<InviteCodeKind>;
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Invite {
///     pub code: InviteCode,
/// }
///
/// let invite = Invite { code: InviteCode::generate().unwrap() };
/// assert_eq!(invite.code.as_str().len(), 8);
///
/// let json = serde_json::to_string(&invite).unwrap();
/// let parsed: Invite = serde_json::from_str(&json).unwrap();
/// assert_eq!(parsed.code, invite.code);
///
/// assert!(serde_json::from_str::<Invite>(r#"{"code":"lowercase"}"#).is_err());
/// ```
#[derive(AsExpression, Debug)]
#[diesel(sql_type = Text)]
pub struct NanoId<T: IdKind> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T: IdKind> NanoId<T> {
    fn generator() -> Result<Generator, Error> {
        Generator::with_size_and_alphabet(T::size(), T::alphabet())
    }

    /// Generates a new identifier of kind `T`.
    ///
    /// Fails only if `T` declares a zero size or an empty alphabet.
    pub fn generate() -> Result<Self, Error> {
        let value = Self::generator()?.generate();
        Ok(NanoId {
            value,
            _marker: PhantomData,
        })
    }

    /// Checks that `value` is a valid identifier of kind `T`.
    pub fn parse(value: &str) -> Result<Self, Error> {
        Self::generator()?.validate(value)?;
        Ok(NanoId {
            value: value.to_string(),
            _marker: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T: IdKind> Clone for NanoId<T> {
    fn clone(&self) -> Self {
        NanoId {
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: IdKind> PartialEq for NanoId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: IdKind> Eq for NanoId<T> {}

impl<T: IdKind> Hash for NanoId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdKind> AsRef<str> for NanoId<T> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<T: IdKind> From<NanoId<T>> for String {
    /// Returns the raw string value.
    fn from(id: NanoId<T>) -> Self {
        id.value
    }
}

impl<T: IdKind> fmt::Display for NanoId<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T: IdKind> FromStr for NanoId<T> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NanoId::parse(s)
    }
}

impl<T: IdKind> Serialize for NanoId<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T: IdKind> Deserialize<'de> for NanoId<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        NanoId::parse(&value).map_err(serde::de::Error::custom)
    }
}

impl<T: IdKind> ToSql<Text, Pg> for NanoId<T> {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        <str as ToSql<Text, Pg>>::to_sql(self.value.as_str(), out)
    }
}

impl<T: IdKind> FromSql<Text, Pg> for NanoId<T> {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let value = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        Ok(NanoId::parse(&value)?)
    }
}

impl<T> Queryable<Text, Pg> for NanoId<T>
where
    T: IdKind,
{
    type Row = <String as Queryable<Text, Pg>>::Row;

    fn build(row: Self::Row) -> deserialize::Result<Self> {
        let value = <String as Queryable<Text, Pg>>::build(row)?;
        Ok(NanoId::parse(&value)?)
    }
}
