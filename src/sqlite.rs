use std::time::Duration;

use rusqlite::{params, Connection, Result};
use serde::Deserialize;

/// Schema definition for the SQLite database
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub tables: Vec<TableDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }
    pub fn add_table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }

    /// DDL for every table followed by its indexes, in declaration order.
    /// All statements are idempotent.
    pub fn statements(&self) -> Vec<String> {
        let mut out = Vec::new();
        for table in &self.tables {
            out.push(table.create_statement());
            out.extend(
                table
                    .indexes
                    .iter()
                    .map(|index| index.create_statement(&table.name)),
            );
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub indexes: Vec<IndexDefinition>,
}

impl TableDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }
    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }
    pub fn with_index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn create_statement(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(ColumnDefinition::to_sql).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.name,
            columns.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            constraints: Vec::new(),
        }
    }
    pub fn with_constraint(mut self, constraint: ColumnConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.data_type.as_sql());
        for constraint in &self.constraints {
            sql.push(' ');
            sql.push_str(constraint.as_sql());
        }
        sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataType {
    Integer,
    Text,
}

impl DataType {
    pub const fn as_sql(self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnConstraint {
    PrimaryKey,
    /// Only valid after `PrimaryKey` on an `INTEGER` column. Keeps rowids
    /// from ever being handed out twice, even after deletes.
    AutoIncrement,
    NotNull,
}

impl ColumnConstraint {
    pub const fn as_sql(self) -> &'static str {
        match self {
            ColumnConstraint::PrimaryKey => "PRIMARY KEY",
            ColumnConstraint::AutoIncrement => "AUTOINCREMENT",
            ColumnConstraint::NotNull => "NOT NULL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl IndexDefinition {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: false,
        }
    }

    pub fn create_statement(&self, table: &str) -> String {
        format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
            if self.unique { "UNIQUE " } else { "" },
            self.name,
            table,
            self.columns.join(", ")
        )
    }
}

/// Table holding one row per tracked parcel.
pub const PARCEL_TABLE: &str = "parcel";

/// The `parcel` table and its client lookup index.
pub fn parcel_schema() -> Schema {
    use ColumnConstraint::*;

    Schema::new().add_table(
        TableDefinition::new(PARCEL_TABLE)
            .with_column(
                ColumnDefinition::new("number", DataType::Integer)
                    .with_constraint(PrimaryKey)
                    .with_constraint(AutoIncrement),
            )
            .with_column(ColumnDefinition::new("client", DataType::Integer).with_constraint(NotNull))
            .with_column(ColumnDefinition::new("status", DataType::Text).with_constraint(NotNull))
            .with_column(ColumnDefinition::new("address", DataType::Text).with_constraint(NotNull))
            .with_column(ColumnDefinition::new("created_at", DataType::Text).with_constraint(NotNull))
            .with_index(IndexDefinition::new("idx_parcel_client", &["client"])),
    )
}

/// Apply `schema` to `conn`. Safe to run on every startup.
pub fn initialize_schema(conn: &Connection, schema: &Schema) -> Result<()> {
    for sql in schema.statements() {
        tracing::debug!(%sql, "applying schema statement");
        conn.execute(sql.as_str(), params![])?;
    }
    Ok(())
}

/// Path that opens a private in-memory database instead of a file.
pub const IN_MEMORY: &str = ":memory:";

/// SQLite connection configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SqliteConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// How long a statement waits on a lock held by another connection
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_db_path() -> String {
    "tracker.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl SqliteConfig {
    /// Create a new SQLite config for the given path
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path == IN_MEMORY
    }

    /// Open a connection according to this config.
    pub fn open(&self) -> Result<Connection> {
        tracing::info!(path = %self.db_path, "opening sqlite database");
        let conn = if self.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&self.db_path)?
        };
        conn.busy_timeout(Duration::from_millis(self.busy_timeout_ms))?;
        Ok(conn)
    }
}
