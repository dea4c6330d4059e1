//! Rendering of tables and pivots for the CLI.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Display;
use std::io::{self, Write};

use crate::table::Table;
use crate::view::PivotTable;

/// One JSON object per row, keyed by column name.
pub fn table_records<K: Serialize>(table: &Table<K>) -> serde_json::Result<Vec<Value>> {
    let ids = table.dimension_ids();
    table
        .rows()
        .iter()
        .map(|row| -> serde_json::Result<Value> {
            let mut record = Map::with_capacity(ids.len() + 2);
            for (id, key) in ids.iter().zip(&row.keys) {
                record.insert(id.to_string(), serde_json::to_value(key)?);
            }
            record.insert("status".to_string(), serde_json::to_value(table.status_of(row))?);
            record.insert(
                "observation".to_string(),
                serde_json::to_value(table.value_of(row))?,
            );
            Ok(Value::Object(record))
        })
        .collect()
}

/// Tab-separated table with a header line.
pub fn write_table_tsv<K: Display, W: Write>(out: &mut W, table: &Table<K>) -> io::Result<()> {
    writeln!(out, "{}", table.columns().join("\t"))?;
    for row in table.rows() {
        for key in &row.keys {
            write!(out, "{}\t", key)?;
        }
        writeln!(out, "{}\t{}", table.status_of(row), table.value_of(row))?;
    }
    Ok(())
}

/// Tab-separated pivot: header `geo\t<time>...`, one line per geo code.
pub fn write_pivot_tsv<W: Write>(out: &mut W, pivot: &PivotTable) -> io::Result<()> {
    write!(out, "{}", pivot.row_dimension)?;
    for column in &pivot.columns {
        write!(out, "\t{}", column)?;
    }
    writeln!(out)?;
    for (geo, cells) in pivot.rows.iter().zip(&pivot.cells) {
        write!(out, "{}", geo)?;
        for cell in cells {
            write!(out, "\t{}", cell)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
