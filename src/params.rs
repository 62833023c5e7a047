//! Multi-valued request parameters.
//!
//! `Query<HashMap<String, String>>` keeps a single value per name, but a
//! client may send `?sort=a,ASC&sort=b,DESC`, so the raw query string is
//! decoded here instead.

use std::collections::HashMap;

/// Insertion-ordered `name -> values` mapping decoded from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl RequestParams {
    pub fn new() -> Self {
        RequestParams::default()
    }

    /// Decodes an `application/x-www-form-urlencoded` query string.
    /// A name without `=` (`?sort`) is recorded with an empty value.
    pub fn from_query(query: &str) -> Self {
        let mut params = RequestParams::new();
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.add(name, value);
        }
        params
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.index.get(&name) {
            Some(&position) => self.entries[position].1.push(value),
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, vec![value]));
            }
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    /// All values for `name` in the order they were added; empty if absent.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.index
            .get(name)
            .map(|&position| self.entries[position].1.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}
