//! Row records and field projection

use serde_json::{Map, Value};

/// A single row as produced by a row source
///
/// Keys keep the order the source emitted them in.
pub type Record = Map<String, Value>;

/// Restricts which fields of a record are exported
///
/// An unrestricted filter passes records through untouched. A restricted
/// filter keeps only the listed fields, in their original record order; the
/// list order defines the CSV column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    fields: Option<Vec<String>>,
}

impl FieldFilter {
    /// A filter that keeps every field
    pub fn all() -> Self {
        Self { fields: None }
    }

    /// A filter that keeps only the given fields
    pub fn only<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: Some(fields.into_iter().map(Into::into).collect()),
        }
    }

    /// Parses a comma-separated field list such as `id,name,created_at`
    ///
    /// # Examples
    ///
    /// ```
    /// use tabledump::domain::record::FieldFilter;
    ///
    /// let filter = FieldFilter::parse("id, name");
    /// assert_eq!(filter.fields(), Some(&["id".to_string(), "name".to_string()][..]));
    /// ```
    pub fn parse(list: &str) -> Self {
        Self::only(
            list.split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        )
    }

    /// The selected field names, if restricted
    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    /// Whether this filter drops anything
    pub fn is_restricted(&self) -> bool {
        self.fields.is_some()
    }

    /// Drops every field not named by this filter
    pub fn project(&self, record: Record) -> Record {
        match &self.fields {
            None => record,
            Some(fields) => record
                .into_iter()
                .filter(|(key, _)| fields.iter().any(|f| f == key))
                .collect(),
        }
    }
}
