//! Looking up records by identifier, as done when binding a route parameter.

use std::fmt;

use tracing::debug;

use crate::{ColumnSpec, Error, GeneratesNanoIds};

/// A lookup of records whose `column` holds one of `values`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NanoIdQuery {
    pub column: String,
    pub values: Vec<String>,
}

impl NanoIdQuery {
    /// Builds a query against the identifier columns in `specs`.
    ///
    /// `field` selects the column when it names one of `specs`, otherwise the first
    /// column is used.  Fails with `Error::NoIdentifierColumns` for an empty `specs`.
    pub fn for_columns<I, V>(
        specs: &[ColumnSpec],
        values: I,
        field: Option<&str>,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let column = select_column(specs, field).ok_or(Error::NoIdentifierColumns)?;
        Ok(NanoIdQuery {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Whether the query compares against a single value rather than a set.
    pub fn is_single(&self) -> bool {
        self.values.len() == 1
    }
}

/// Picks the column a lookup should use.
pub fn select_column<'a>(specs: &'a [ColumnSpec], field: Option<&str>) -> Option<&'a str> {
    let requested = field.and_then(|name| specs.iter().find(|spec| spec.name == name));
    requested
        .or_else(|| specs.first())
        .map(|spec| spec.name.as_str())
}

/// Builds a query for records of type `T`.
///
/// # Examples
///
/// ```
/// use nanoid_columns::{where_nanoid, ColumnDecls, GeneratesNanoIds};
///
/// struct Post;
///
/// impl GeneratesNanoIds for Post {
///     fn nanoid_columns() -> ColumnDecls {
///         ColumnDecls::from("nanoid").with("share_code")
///     }
/// }
///
/// let query = where_nanoid::<Post, _, _>(["V1StGXR8_Z5jdHi6B-myT"], Some("share_code")).unwrap();
/// assert_eq!(query.column, "share_code");
///
/// let query = where_nanoid::<Post, _, _>(["a", "b"], Some("title")).unwrap();
/// assert_eq!(query.column, "nanoid");
/// assert_eq!(query.values, ["a", "b"]);
/// ```
pub fn where_nanoid<T, I, V>(values: I, field: Option<&str>) -> Result<NanoIdQuery, Error>
where
    T: GeneratesNanoIds,
    I: IntoIterator<Item = V>,
    V: Into<String>,
{
    let specs = T::nanoid_columns().resolve()?;
    NanoIdQuery::for_columns(&specs, values, field)
}

/// The column holding the route key of `T`.
pub fn route_key_name<T: GeneratesNanoIds>() -> &'static str {
    T::nanoid_column()
}

/// Read access to stored records, provided by the persistence layer.
pub trait Finder {
    type Record;
    type Error;

    /// Returns the first record matching `query`, if any.
    fn find_first(&self, query: &NanoIdQuery) -> Result<Option<Self::Record>, Self::Error>;

    /// Returns every record matching `query`.
    fn find_all(&self, query: &NanoIdQuery) -> Result<Vec<Self::Record>, Self::Error>;
}

/// Error returned when binding a route value to a record.
#[derive(Debug, PartialEq)]
pub enum BindingError<E> {
    Declaration(Error),
    NotFound { column: String, value: String },
    Finder(E),
}

impl<E: fmt::Display> fmt::Display for BindingError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BindingError::Declaration(e) => write!(f, "Invalid identifier declaration: {}", e),
            BindingError::NotFound { column, value } => {
                write!(f, "No record with {} = {}", column, value)
            }
            BindingError::Finder(e) => write!(f, "Lookup failed: {}", e),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for BindingError<E> {}

impl<E> From<Error> for BindingError<E> {
    fn from(e: Error) -> Self {
        BindingError::Declaration(e)
    }
}

impl<E> BindingError<E> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BindingError::NotFound { .. })
    }
}

/// Resolves a route value to the record of type `T` it identifies.
///
/// `field` is the column named in the route, if any.  It is used only when it is one of
/// `T`'s identifier columns.
pub fn resolve_route_binding<T, F>(
    finder: &F,
    value: &str,
    field: Option<&str>,
) -> Result<F::Record, BindingError<F::Error>>
where
    T: GeneratesNanoIds,
    F: Finder + ?Sized,
{
    let query = where_nanoid::<T, _, _>([value], field)?;
    debug!(column = %query.column, "Binding route value");
    match finder.find_first(&query).map_err(BindingError::Finder)? {
        Some(record) => Ok(record),
        None => Err(BindingError::NotFound {
            column: query.column,
            value: value.to_string(),
        }),
    }
}

/// Finds every record of type `T` whose identifier is one of `values`.
pub fn find_by_nanoids<T, F, I, V>(
    finder: &F,
    values: I,
    field: Option<&str>,
) -> Result<Vec<F::Record>, BindingError<F::Error>>
where
    T: GeneratesNanoIds,
    F: Finder + ?Sized,
    I: IntoIterator<Item = V>,
    V: Into<String>,
{
    let query = where_nanoid::<T, _, _>(values, field)?;
    finder.find_all(&query).map_err(BindingError::Finder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Post, PostTable};
    use crate::{before_insert, ColumnDecls, Config, NanoIdHook};

    struct RouteBoundPost;
    impl GeneratesNanoIds for RouteBoundPost {}

    struct CustomRouteBoundPost;
    impl GeneratesNanoIds for CustomRouteBoundPost {
        fn nanoid_column() -> &'static str {
            "custom_nanoid"
        }
    }

    struct MultipleRouteBoundPost;
    impl GeneratesNanoIds for MultipleRouteBoundPost {
        fn nanoid_columns() -> ColumnDecls {
            ColumnDecls::from("nanoid").with("custom_nanoid")
        }
    }

    struct Undeclared;
    impl GeneratesNanoIds for Undeclared {
        fn nanoid_columns() -> ColumnDecls {
            ColumnDecls::new()
        }
    }

    impl Finder for PostTable {
        type Record = Post;
        type Error = String;

        fn find_first(&self, query: &NanoIdQuery) -> Result<Option<Post>, String> {
            Ok(self.matching(query).into_iter().next())
        }

        fn find_all(&self, query: &NanoIdQuery) -> Result<Vec<Post>, String> {
            Ok(self.matching(query))
        }
    }

    struct BrokenTable;

    impl Finder for BrokenTable {
        type Record = Post;
        type Error = &'static str;

        fn find_first(&self, _query: &NanoIdQuery) -> Result<Option<Post>, &'static str> {
            Err("connection refused")
        }

        fn find_all(&self, _query: &NanoIdQuery) -> Result<Vec<Post>, &'static str> {
            Err("connection refused")
        }
    }

    fn table() -> PostTable {
        let mut rows = Vec::new();
        for title in ["first", "second"] {
            let mut post = Post::new().with("title", title);
            NanoIdHook::new()
                .populate(ColumnDecls::from("nanoid").with("custom_nanoid"))
                .config(Config::new())
                .before_insert(&mut post)
                .unwrap();
            rows.push(post);
        }
        PostTable {
            rows,
            ..PostTable::default()
        }
    }

    #[test]
    fn test_binds_to_default_column() {
        let table = table();
        let nanoid = table.rows[1].get("nanoid").unwrap().to_string();

        let post = resolve_route_binding::<RouteBoundPost, _>(&table, &nanoid, None).unwrap();
        assert_eq!(post.get("title"), Some("second"));
        assert_eq!(route_key_name::<RouteBoundPost>(), "nanoid");
    }

    #[test]
    fn test_fails_on_value_from_other_column() {
        let table = table();
        let custom = table.rows[0].get("custom_nanoid").unwrap().to_string();

        let err = resolve_route_binding::<RouteBoundPost, _>(&table, &custom, None).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err,
            BindingError::NotFound {
                column: "nanoid".to_string(),
                value: custom
            }
        );
    }

    #[test]
    fn test_binds_to_custom_column() {
        let table = table();
        let custom = table.rows[0].get("custom_nanoid").unwrap().to_string();
        let nanoid = table.rows[0].get("nanoid").unwrap().to_string();

        let post =
            resolve_route_binding::<CustomRouteBoundPost, _>(&table, &custom, None).unwrap();
        assert_eq!(post.get("title"), Some("first"));
        assert_eq!(route_key_name::<CustomRouteBoundPost>(), "custom_nanoid");

        let err =
            resolve_route_binding::<CustomRouteBoundPost, _>(&table, &nanoid, None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_binds_to_requested_declared_column() {
        let table = table();
        let custom = table.rows[1].get("custom_nanoid").unwrap().to_string();
        let nanoid = table.rows[1].get("nanoid").unwrap().to_string();

        let post = resolve_route_binding::<MultipleRouteBoundPost, _>(
            &table,
            &custom,
            Some("custom_nanoid"),
        )
        .unwrap();
        assert_eq!(post.get("title"), Some("second"));

        let err = resolve_route_binding::<MultipleRouteBoundPost, _>(
            &table,
            &nanoid,
            Some("custom_nanoid"),
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_undeclared_field_uses_first_column() {
        let table = table();
        let nanoid = table.rows[0].get("nanoid").unwrap().to_string();

        let post =
            resolve_route_binding::<MultipleRouteBoundPost, _>(&table, &nanoid, Some("title"))
                .unwrap();
        assert_eq!(post.get("title"), Some("first"));
        assert_eq!(table.queries.borrow()[0].column, "nanoid");
    }

    #[test]
    fn test_find_many() {
        let table = table();
        let values: Vec<String> = table
            .rows
            .iter()
            .map(|post| post.get("nanoid").unwrap().to_string())
            .collect();

        let posts = find_by_nanoids::<RouteBoundPost, _, _, _>(&table, values, None).unwrap();
        assert_eq!(posts.len(), 2);
        assert!(!table.queries.borrow()[0].is_single());

        let posts =
            find_by_nanoids::<RouteBoundPost, _, _, _>(&table, ["missing"], None).unwrap();
        assert!(posts.is_empty());
    }

    #[test]
    fn test_errors() {
        let table = table();
        assert_eq!(
            resolve_route_binding::<Undeclared, _>(&table, "x", None).unwrap_err(),
            BindingError::Declaration(Error::NoIdentifierColumns)
        );
        assert_eq!(
            resolve_route_binding::<RouteBoundPost, _>(&BrokenTable, "x", None).unwrap_err(),
            BindingError::Finder("connection refused")
        );
        assert_eq!(
            BindingError::<String>::NotFound {
                column: "nanoid".to_string(),
                value: "x".to_string()
            }
            .to_string(),
            "No record with nanoid = x"
        );
    }

    #[test]
    fn test_records_created_by_type_hook_are_found() {
        let mut post = Post::new();
        before_insert(&mut post).unwrap();
        let nanoid = post.get("nanoid").unwrap().to_string();
        let table = PostTable {
            rows: vec![post],
            ..PostTable::default()
        };

        let query = where_nanoid::<Post, _, _>([nanoid.as_str()], None).unwrap();
        assert!(query.is_single());
        assert!(table.find_first(&query).unwrap().is_some());
    }

    #[test]
    fn test_select_column() {
        let specs = ColumnDecls::from("a")
            .with("b")
            .resolve_with(&Config::new())
            .unwrap();
        assert_eq!(select_column(&specs, None), Some("a"));
        assert_eq!(select_column(&specs, Some("b")), Some("b"));
        assert_eq!(select_column(&specs, Some("c")), Some("a"));
        assert_eq!(select_column(&[], Some("a")), None);
    }
}
