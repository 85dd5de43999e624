//! SQL type descriptors, the discovered table schema, and its renderings.
//!
//! [`SqlType`] is the closed set of column types the classifier can produce.
//! [`TableSchema`] keeps columns in header order and renders itself as a
//! `CREATE TABLE` statement, JSON, or YAML.

use std::{fmt, str::FromStr};

use anyhow::{Result, anyhow, bail, ensure};
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Decimal { precision: u32, scale: u32 },
    String,
}

impl SqlType {
    pub fn decimal(precision: u32, scale: u32) -> Result<Self> {
        ensure!(
            scale <= precision,
            "Decimal scale ({scale}) cannot exceed precision ({precision})"
        );
        Ok(SqlType::Decimal { precision, scale })
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, SqlType::String)
    }

    pub fn signature(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::TinyInt => f.write_str("tinyint"),
            SqlType::SmallInt => f.write_str("smallint"),
            SqlType::Int => f.write_str("int"),
            SqlType::BigInt => f.write_str("bigint"),
            SqlType::Decimal { precision, scale } => write!(f, "decimal({precision}, {scale})"),
            SqlType::String => f.write_str("string"),
        }
    }
}

impl FromStr for SqlType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "tinyint" => Ok(SqlType::TinyInt),
            "smallint" => Ok(SqlType::SmallInt),
            "int" | "integer" => Ok(SqlType::Int),
            "bigint" => Ok(SqlType::BigInt),
            "string" => Ok(SqlType::String),
            other if other.starts_with("decimal") => parse_decimal_signature(other),
            other => Err(anyhow!("Unknown SQL type '{other}'")),
        }
    }
}

fn parse_decimal_signature(value: &str) -> Result<SqlType> {
    let inner = value
        .strip_prefix("decimal")
        .map(str::trim)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| anyhow!("Decimal type '{value}' must use the form decimal(P, S)"))?;
    let (precision_raw, scale_raw) = inner
        .split_once(',')
        .ok_or_else(|| anyhow!("Decimal type '{value}' must specify precision and scale"))?;
    let precision = precision_raw
        .trim()
        .parse::<u32>()
        .map_err(|err| anyhow!("Invalid decimal precision '{}': {err}", precision_raw.trim()))?;
    let scale = scale_raw
        .trim()
        .parse::<u32>()
        .map_err(|err| anyhow!("Invalid decimal scale '{}': {err}", scale_raw.trim()))?;
    SqlType::decimal(precision, scale)
}

impl Serialize for SqlType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.signature())
    }
}

impl<'de> Deserialize<'de> for SqlType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        SqlType::from_str(&token).map_err(|err| de::Error::custom(err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: SqlType,
}

/// Column types of one table, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(table_name: impl Into<String>, columns: Vec<ColumnSchema>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_type(&self, name: &str) -> Option<SqlType> {
        self.column_index(name).map(|idx| self.columns[idx].sql_type)
    }

    /// Renders the schema as a `CREATE TABLE` statement, one tab-indented
    /// line per column.
    pub fn to_create_table(&self) -> Result<String> {
        if self.columns.is_empty() {
            bail!("Table '{}' has no columns to describe", self.table_name);
        }
        let body = self
            .columns
            .iter()
            .map(|column| format!("\t{} {}", quote_identifier(&column.name), column.sql_type))
            .join(",\n");
        Ok(format!(
            "CREATE TABLE {} (\n{body}\n);",
            quote_identifier(&self.table_name)
        ))
    }
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn to_json(schemas: &[TableSchema]) -> Result<String> {
    Ok(serde_json::to_string_pretty(schemas)?)
}

pub fn to_yaml(schemas: &[TableSchema]) -> Result<String> {
    Ok(serde_yaml::to_string(schemas)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> TableSchema {
        TableSchema::new(
            "orders",
            vec![
                ColumnSchema {
                    name: "id".to_string(),
                    sql_type: SqlType::Int,
                },
                ColumnSchema {
                    name: "amount".to_string(),
                    sql_type: SqlType::Decimal {
                        precision: 7,
                        scale: 2,
                    },
                },
                ColumnSchema {
                    name: "status".to_string(),
                    sql_type: SqlType::String,
                },
            ],
        )
    }

    #[test]
    fn display_matches_sql_spelling() {
        assert_eq!(SqlType::TinyInt.to_string(), "tinyint");
        assert_eq!(SqlType::SmallInt.to_string(), "smallint");
        assert_eq!(SqlType::Int.to_string(), "int");
        assert_eq!(SqlType::BigInt.to_string(), "bigint");
        assert_eq!(
            SqlType::Decimal {
                precision: 3,
                scale: 2
            }
            .to_string(),
            "decimal(3, 2)"
        );
        assert_eq!(SqlType::String.to_string(), "string");
    }

    #[test]
    fn from_str_accepts_rendered_signatures() {
        assert_eq!(
            SqlType::from_str("decimal(5, 4)").expect("parse decimal"),
            SqlType::Decimal {
                precision: 5,
                scale: 4
            }
        );
        assert_eq!(
            SqlType::from_str("DECIMAL(10,0)").expect("parse upper decimal"),
            SqlType::Decimal {
                precision: 10,
                scale: 0
            }
        );
        assert_eq!(SqlType::from_str(" BigInt ").expect("bigint"), SqlType::BigInt);
    }

    #[test]
    fn decimal_scale_cannot_exceed_precision() {
        let err = SqlType::from_str("decimal(2, 3)").unwrap_err();
        assert!(err.to_string().contains("cannot exceed precision"));
        assert!(SqlType::from_str("decimal(4)").is_err());
        assert!(SqlType::from_str("float").is_err());
    }

    #[test]
    fn create_table_lists_columns_in_order() {
        let ddl = sample_schema().to_create_table().expect("render ddl");
        assert_eq!(
            ddl,
            "CREATE TABLE \"orders\" (\n\t\"id\" int,\n\t\"amount\" decimal(7, 2),\n\t\"status\" string\n);"
        );
    }

    #[test]
    fn create_table_escapes_embedded_quotes() {
        let schema = TableSchema::new(
            "t",
            vec![ColumnSchema {
                name: "say \"hi\"".to_string(),
                sql_type: SqlType::TinyInt,
            }],
        );
        let ddl = schema.to_create_table().expect("render ddl");
        assert!(ddl.contains("\t\"say \"\"hi\"\"\" tinyint"));
    }

    #[test]
    fn create_table_rejects_empty_schema() {
        let schema = TableSchema::new("empty", Vec::new());
        let err = schema.to_create_table().unwrap_err();
        assert!(err.to_string().contains("no columns"));
    }

    #[test]
    fn json_round_trips_type_signatures() {
        let schemas = vec![sample_schema()];
        let json = to_json(&schemas).expect("json");
        assert!(json.contains("\"decimal(7, 2)\""));
        let parsed: Vec<TableSchema> = serde_json::from_str(&json).expect("parse json");
        assert_eq!(parsed, schemas);
    }

    #[test]
    fn yaml_uses_type_key() {
        let yaml = to_yaml(&[sample_schema()]).expect("yaml");
        assert!(yaml.contains("table_name: orders"));
        assert!(yaml.contains("type: string"));
    }

    #[test]
    fn column_lookup_by_name() {
        let schema = sample_schema();
        assert_eq!(schema.column_index("amount"), Some(1));
        assert_eq!(schema.column_type("status"), Some(SqlType::String));
        assert_eq!(schema.column_type("missing"), None);
    }
}
