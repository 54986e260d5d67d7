//! Table schema type definitions
//!
//! Supported column types:
//! - int: 64-bit signed integer
//! - float: 64-bit floating point
//! - string: UTF-8 string
//! - bool: Boolean
//! - binary: raw bytes
//! - timestamp: UTC instant
//! - date: calendar date without time

use serde::{Deserialize, Serialize};

/// Scalar column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Float,
    String,
    Bool,
    Binary,
    Timestamp,
    Date,
}

impl ColumnType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::String => "string",
            ColumnType::Bool => "bool",
            ColumnType::Binary => "binary",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Date => "date",
        }
    }

    /// Whether less-than / greater-than are defined on this type
    pub fn is_ordered(&self) -> bool {
        !matches!(self, ColumnType::Bool | ColumnType::Binary)
    }

    /// Whether this is an int or float column
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Int | ColumnType::Float)
    }
}

/// Half-open numeric range `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside the range
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    /// Numeric range limit, ints and floats only
    pub numeric_limit: Option<NumericRange>,
    /// Maximum characters for strings, maximum digits for ints
    pub char_limit: Option<usize>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            numeric_limit: None,
            char_limit: None,
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Float)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::String)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Bool)
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Binary)
    }

    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Timestamp)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Date)
    }

    /// Restrict values to `[min, max)`
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.numeric_limit = Some(NumericRange::new(min, max));
        self
    }

    /// Restrict length to `limit` characters (or digits)
    pub fn max_chars(mut self, limit: usize) -> Self {
        self.char_limit = Some(limit);
        self
    }
}

/// Name and type of one column, as embedded in table files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// Complete table schema
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Create a schema and check its structure.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Result<Self, String> {
        let schema = Self {
            name: name.into(),
            columns,
        };
        schema.validate_structure()?;
        Ok(schema)
    }

    /// Returns the table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in declaration order
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Returns the column names in declaration order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Looks up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns whether the schema declares `name`
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// The primary identifier column (always the first)
    pub fn id_column(&self) -> &ColumnDef {
        &self.columns[0]
    }

    /// Name/type pairs for embedding in table files
    pub fn column_specs(&self) -> Vec<ColumnSpec> {
        self.columns
            .iter()
            .map(|c| ColumnSpec {
                name: c.name.clone(),
                column_type: c.column_type,
            })
            .collect()
    }

    /// Validates the schema structure itself (not a record)
    fn validate_structure(&self) -> Result<(), String> {
        let first = self
            .columns
            .first()
            .ok_or_else(|| format!("table '{}' declares no columns", self.name))?;

        if first.column_type != ColumnType::Int {
            return Err(format!(
                "identifier column '{}' of table '{}' must be int, not {}",
                first.name,
                self.name,
                first.column_type.type_name()
            ));
        }

        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == column.name) {
                return Err(format!(
                    "column '{}' declared twice in table '{}'",
                    column.name, self.name
                ));
            }
            if column.numeric_limit.is_some() && !column.column_type.is_numeric() {
                return Err(format!(
                    "column '{}' has a numeric limit but is {}",
                    column.name,
                    column.column_type.type_name()
                ));
            }
            if column.char_limit.is_some()
                && !matches!(column.column_type, ColumnType::String | ColumnType::Int)
            {
                return Err(format!(
                    "column '{}' has a character limit but is {}",
                    column.name,
                    column.column_type.type_name()
                ));
            }
        }

        Ok(())
    }
}
