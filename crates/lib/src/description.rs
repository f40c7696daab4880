//! # Description Synthesizer
//!
//! Renders a table's structure as the single sentence that gets embedded.
//!
//! Embeddings are a function of this exact string. Changing the template makes
//! previously stored vectors incomparable with new ones, so any change here must be
//! followed by a full re-index.

use crate::types::{ColumnDescriptor, TableDescriptor};

/// Renders one column as `name (TYPE)` or `name (TYPE NOT NULL)`.
pub fn describe_column(column: &ColumnDescriptor) -> String {
    if column.not_null {
        format!("{} ({} NOT NULL)", column.name, column.data_type)
    } else {
        format!("{} ({})", column.name, column.data_type)
    }
}

/// Builds the description for a table, e.g.
/// `Table: employees. Columns: id (INTEGER NOT NULL), name (TEXT)`.
pub fn describe(table_name: &str, columns: &[ColumnDescriptor]) -> String {
    let column_list = columns
        .iter()
        .map(describe_column)
        .collect::<Vec<_>>()
        .join(", ");
    format!("Table: {table_name}. Columns: {column_list}")
}

pub fn describe_table(table: &TableDescriptor) -> String {
    describe(&table.table_name, &table.columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, data_type: &str, not_null: bool) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            data_type: data_type.to_string(),
            not_null,
        }
    }

    #[test]
    fn renders_nullability_per_column() {
        let columns = vec![
            column("id", "INTEGER", true),
            column("name", "TEXT", false),
            column("salary", "REAL", false),
        ];
        assert_eq!(
            describe("employees", &columns),
            "Table: employees. Columns: id (INTEGER NOT NULL), name (TEXT), salary (REAL)"
        );
    }

    #[test]
    fn is_deterministic() {
        let table = TableDescriptor {
            table_name: "departments".to_string(),
            columns: vec![column("id", "INTEGER", true), column("budget", "REAL", false)],
        };
        assert_eq!(describe_table(&table), describe_table(&table.clone()));
    }
}
