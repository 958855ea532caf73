use std::cell::RefCell;
use std::collections::HashMap;

use crate::{GeneratesNanoIds, NanoIdQuery, PrimaryKeyConfig, Record};

/// In-memory record with string attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Post {
    pub attributes: HashMap<String, String>,
    pub key_name: String,
    pub primary_key: Option<PrimaryKeyConfig>,
}

impl Post {
    pub fn new() -> Self {
        Post {
            key_name: "id".to_string(),
            ..Post::default()
        }
    }

    pub fn with(mut self, attribute: &str, value: &str) -> Self {
        self.attributes
            .insert(attribute.to_string(), value.to_string());
        self
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.attributes.get(attribute).map(String::as_str)
    }
}

impl Record for Post {
    fn is_set(&self, attribute: &str) -> bool {
        self.attributes.contains_key(attribute)
    }

    fn set_attribute(&mut self, attribute: &str, value: String) {
        self.attributes.insert(attribute.to_string(), value);
    }

    fn key_name(&self) -> &str {
        &self.key_name
    }

    fn configure_primary_key(&mut self, config: PrimaryKeyConfig) {
        self.primary_key = Some(config);
    }
}

impl GeneratesNanoIds for Post {}

/// Table of posts answering identifier queries.
#[derive(Debug, Default)]
pub struct PostTable {
    pub rows: Vec<Post>,
    pub queries: RefCell<Vec<NanoIdQuery>>,
}

impl PostTable {
    pub fn matching(&self, query: &NanoIdQuery) -> Vec<Post> {
        self.queries.borrow_mut().push(query.clone());
        self.rows
            .iter()
            .filter(|post| {
                post.get(&query.column)
                    .map_or(false, |value| query.values.iter().any(|v| v == value))
            })
            .cloned()
            .collect()
    }
}
