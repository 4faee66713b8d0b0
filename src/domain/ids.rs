//! Database and table identifiers
//!
//! Newtype wrappers for the names that flow from the row source into output
//! paths, plus the user-facing [`Selection`] syntax (`db` or `db.table`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn validate_path_component(kind: &str, name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("{kind} name cannot be empty"));
    }
    if name == "." || name == ".." {
        return Err(format!("{kind} name cannot be '{name}'"));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(format!(
            "{kind} name '{name}' contains a path separator or NUL byte"
        ));
    }
    Ok(())
}

/// Database name newtype wrapper
///
/// A database name is used verbatim as an output directory, so it must be a
/// single path component.
///
/// # Examples
///
/// ```
/// use tabledump::domain::ids::DatabaseName;
/// use std::str::FromStr;
///
/// let db = DatabaseName::from_str("inventory").unwrap();
/// assert_eq!(db.as_str(), "inventory");
/// assert!(DatabaseName::from_str("../etc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DatabaseName(String);

impl DatabaseName {
    /// Creates a new DatabaseName
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        validate_path_component("Database", &name)?;
        Ok(Self(name))
    }

    /// Returns the database name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DatabaseName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DatabaseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Table name newtype wrapper
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableName(String);

impl TableName {
    /// Creates a new TableName
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        validate_path_component("Table", &name)?;
        Ok(Self(name))
    }

    /// Returns the table name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TableName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One (database, table) pair to export
///
/// Ordering is by database then table, so a `BTreeSet<ExportTarget>` groups
/// tables of the same database together.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExportTarget {
    /// Database (schema) holding the table
    pub db: DatabaseName,

    /// Table name
    pub table: TableName,
}

impl ExportTarget {
    /// Creates a new export target
    pub fn new(db: DatabaseName, table: TableName) -> Self {
        Self { db, table }
    }

    /// Builds a target from raw names
    pub fn from_names(db: &str, table: &str) -> Result<Self, String> {
        Ok(Self::new(DatabaseName::new(db)?, TableName::new(table)?))
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.db, self.table)
    }
}

/// A user selection of what to export
///
/// Parsed from `db` or `db.table`; only ASCII letters, digits, `_` and a
/// single `.` separator are accepted.
///
/// # Examples
///
/// ```
/// use tabledump::domain::ids::Selection;
/// use std::str::FromStr;
///
/// assert!(matches!(Selection::from_str("test"), Ok(Selection::Database(_))));
/// assert!(matches!(Selection::from_str("test.users"), Ok(Selection::Table(_))));
/// assert!(Selection::from_str("a.b.c").is_err());
/// assert!(Selection::from_str("bad-name").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection {
    /// Every table of a database
    Database(DatabaseName),

    /// A single table
    Table(ExportTarget),
}

impl Selection {
    /// The database this selection refers to
    pub fn database(&self) -> &DatabaseName {
        match self {
            Selection::Database(db) => db,
            Selection::Table(target) => &target.db,
        }
    }
}

impl FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty()
            || !s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
        {
            return Err(format!("Invalid 'db' or 'db.table' name: {s}"));
        }

        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [db] => Ok(Selection::Database(DatabaseName::new(*db)?)),
            [db, table] => Ok(Selection::Table(ExportTarget::from_names(db, table)?)),
            _ => Err(format!("Invalid 'db' or 'db.table' format: {s}")),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Database(db) => write!(f, "{db}"),
            Selection::Table(target) => write!(f, "{target}"),
        }
    }
}
