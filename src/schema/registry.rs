//! Schema registry holding the fixed table definitions
//!
//! The registry is built once at startup and handed by reference to the
//! record store and the domain services. It has no mutation API.

use std::collections::HashMap;

use super::types::{ColumnDef, TableSchema};
use crate::errors::{StoreError, StoreResult};

pub const MEMBERS: &str = "members";
pub const PROVIDERS: &str = "providers";
pub const PROVIDER_DIRECTORY: &str = "provider_directory";
pub const SERVICE_LOG: &str = "service_log";

/// Lowest generated identifier (10 digits)
pub const FIRST_ID: i64 = 1_000_000_000;
/// Highest representable identifier (10 nines)
pub const MAX_ID: i64 = 9_999_999_999;

/// Immutable lookup of table name to schema
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, TableSchema>,
}

impl SchemaRegistry {
    /// Builds a registry from explicit schemas.
    pub fn from_schemas(schemas: impl IntoIterator<Item = TableSchema>) -> StoreResult<Self> {
        let mut map = HashMap::new();
        for schema in schemas {
            let name = schema.name().to_string();
            if map.insert(name.clone(), schema).is_some() {
                return Err(StoreError::schema_mismatch(format!(
                    "table '{}' registered twice",
                    name
                )));
            }
        }
        Ok(Self { schemas: map })
    }

    /// The four ChocAn tables.
    pub fn standard() -> StoreResult<Self> {
        let id_range = (FIRST_ID as f64, (MAX_ID + 1) as f64);

        let members = TableSchema::new(
            MEMBERS,
            vec![
                ColumnDef::int("member_id").range(id_range.0, id_range.1),
                ColumnDef::string("name").max_chars(25),
                ColumnDef::string("address").max_chars(25),
                ColumnDef::string("city").max_chars(14),
                ColumnDef::string("state").max_chars(2),
                ColumnDef::int("zipcode").range(0.0, 100_000.0).max_chars(5),
                ColumnDef::bool("suspended"),
            ],
        );

        // type: 0 = manager, 1 = provider
        let providers = TableSchema::new(
            PROVIDERS,
            vec![
                ColumnDef::int("provider_id").range(id_range.0, id_range.1),
                ColumnDef::int("type").range(0.0, 2.0),
                ColumnDef::string("name").max_chars(25),
                ColumnDef::string("address").max_chars(25),
                ColumnDef::string("city").max_chars(14),
                ColumnDef::string("state").max_chars(2),
                ColumnDef::int("zipcode").range(0.0, 100_000.0).max_chars(5),
                ColumnDef::binary("password_hash"),
            ],
        );

        let provider_directory = TableSchema::new(
            PROVIDER_DIRECTORY,
            vec![
                ColumnDef::int("service_id").range(0.0, 1_000_000.0),
                ColumnDef::string("service_name").max_chars(20),
                ColumnDef::int("price_dollars").range(0.0, 1_000.0),
                ColumnDef::int("price_cents").range(0.0, 100.0),
            ],
        );

        let service_log = TableSchema::new(
            SERVICE_LOG,
            vec![
                ColumnDef::int("entry_id").range(id_range.0, id_range.1),
                ColumnDef::timestamp("entry_datetime_utc"),
                ColumnDef::date("service_date"),
                ColumnDef::int("member_id"),
                ColumnDef::int("provider_id"),
                ColumnDef::int("service_id").range(0.0, 1_000_000.0),
                ColumnDef::string("comments").max_chars(100),
            ],
        );

        let schemas = [members, providers, provider_directory, service_log]
            .into_iter()
            .collect::<Result<Vec<_>, String>>()
            .map_err(StoreError::schema_mismatch)?;

        Self::from_schemas(schemas)
    }

    /// Looks up a table schema by name.
    pub fn get(&self, table: &str) -> StoreResult<&TableSchema> {
        self.schemas
            .get(table)
            .ok_or_else(|| StoreError::schema_mismatch(format!("unknown table '{}'", table)))
    }

    /// Returns all registered table names, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn members(&self) -> StoreResult<&TableSchema> {
        self.get(MEMBERS)
    }

    pub fn providers(&self) -> StoreResult<&TableSchema> {
        self.get(PROVIDERS)
    }

    pub fn provider_directory(&self) -> StoreResult<&TableSchema> {
        self.get(PROVIDER_DIRECTORY)
    }

    pub fn service_log(&self) -> StoreResult<&TableSchema> {
        self.get(SERVICE_LOG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreErrorCode;
    use crate::schema::ColumnType;

    #[test]
    fn test_standard_tables() {
        let registry = SchemaRegistry::standard().unwrap();
        assert_eq!(
            registry.table_names(),
            vec![MEMBERS, PROVIDER_DIRECTORY, PROVIDERS, SERVICE_LOG]
        );
    }

    #[test]
    fn test_identifier_columns_are_int() {
        let registry = SchemaRegistry::standard().unwrap();
        for name in registry.table_names() {
            let schema = registry.get(name).unwrap();
            assert_eq!(schema.id_column().column_type, ColumnType::Int);
        }
    }

    #[test]
    fn test_member_limits() {
        let registry = SchemaRegistry::standard().unwrap();
        let members = registry.members().unwrap();
        assert_eq!(members.column("name").unwrap().char_limit, Some(25));
        assert_eq!(members.column("state").unwrap().char_limit, Some(2));
        let id = members.id_column().numeric_limit.unwrap();
        assert!(id.contains(FIRST_ID as f64));
        assert!(id.contains(MAX_ID as f64));
        assert!(!id.contains((MAX_ID + 1) as f64));
    }

    #[test]
    fn test_unknown_table() {
        let registry = SchemaRegistry::standard().unwrap();
        let err = registry.get("nope").unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::SchemaMismatch);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let schema = TableSchema::new("t", vec![ColumnDef::int("ID")]).unwrap();
        let result = SchemaRegistry::from_schemas(vec![schema.clone(), schema]);
        assert!(result.is_err());
    }
}
