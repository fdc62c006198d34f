//! Data source seam: field columns and categorical dictionaries.
//!
//! Channels only read from a source: the column kind and values (to derive a domain) and
//! the code-to-value lookup of dictionary-encoded fields (to evaluate expressions).
//! [`MemorySource`] is a simple in-memory implementation.
use std::collections::HashMap;

/// A single field column.
pub trait Column {
    /// `true` for dictionary-encoded (categorical) columns.
    fn is_categorical(&self) -> bool;

    /// Column values; codes for categorical columns.
    fn values(&self) -> Vec<f64>;
}

/// Code-to-value lookup of a categorical field.
pub trait Dictionary {
    fn get(&self, code: usize) -> Option<f64>;
}

/// Tabular data backing the channels.
pub trait DataSource {
    /// `false` while the underlying table is checked out or not loaded yet.
    fn is_available(&self) -> bool {
        true
    }

    fn column(&self, field: &str) -> Option<&dyn Column>;

    fn dictionary(&self, field: &str) -> Option<&dyn Dictionary>;
}

/// Column storage for [`MemorySource`].
#[derive(Clone, Debug, PartialEq)]
pub enum MemoryColumn {
    Continuous(Vec<f64>),
    Categorical {
        codes: Vec<u32>,
        dictionary: Vec<f64>,
    },
}

impl Column for MemoryColumn {
    fn is_categorical(&self) -> bool {
        matches!(self, MemoryColumn::Categorical { .. })
    }

    fn values(&self) -> Vec<f64> {
        match self {
            MemoryColumn::Continuous(values) => values.clone(),
            MemoryColumn::Categorical { codes, .. } => {
                codes.iter().map(|&c| f64::from(c)).collect()
            }
        }
    }
}

impl Dictionary for Vec<f64> {
    fn get(&self, code: usize) -> Option<f64> {
        self.as_slice().get(code).copied()
    }
}

/// In-memory [`DataSource`] keyed by field name.
#[derive(Clone, Debug)]
pub struct MemorySource {
    columns: HashMap<String, MemoryColumn>,
    available: bool,
}

impl MemorySource {
    /// Creates a new, empty, available source.
    pub fn new() -> Self {
        Self {
            columns: HashMap::new(),
            available: true,
        }
    }

    /// Add (or replace) a continuous column.
    pub fn with_continuous(mut self, field: impl Into<String>, values: Vec<f64>) -> Self {
        self.insert(field, MemoryColumn::Continuous(values));
        self
    }

    /// Add (or replace) a categorical column with its dictionary.
    pub fn with_categorical(
        mut self,
        field: impl Into<String>,
        codes: Vec<u32>,
        dictionary: Vec<f64>,
    ) -> Self {
        self.insert(field, MemoryColumn::Categorical { codes, dictionary });
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, column: MemoryColumn) {
        self.columns.insert(field.into(), column);
    }

    /// Mark the source as (un)available.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for MemorySource {
    fn is_available(&self) -> bool {
        self.available
    }

    fn column(&self, field: &str) -> Option<&dyn Column> {
        self.columns.get(field).map(|c| c as &dyn Column)
    }

    fn dictionary(&self, field: &str) -> Option<&dyn Dictionary> {
        match self.columns.get(field) {
            Some(MemoryColumn::Categorical { dictionary, .. }) => {
                Some(dictionary as &dyn Dictionary)
            }
            _ => None,
        }
    }
}

/// `[min, max]` of the non-NaN values (infinities included), or `None` when there are none.
pub fn extent(values: &[f64]) -> Option<[f64; 2]> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some([v, v]),
            Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
        })
}
