//! JSON Lines rendering of query results.

use std::io::Write;

use anyhow::Result;
use serde_json::{Map, Value};
use tracker::Issue;

/// Writes each issue's flattened record as one JSON object per line.
pub fn write_records<W: Write>(issues: &[Issue], out: &mut W) -> Result<()> {
    for issue in issues {
        serde_json::to_writer(&mut *out, &issue.to_record())?;
        writeln!(out)?;
    }
    Ok(())
}

/// Writes, per issue, an object mapping each path to its looked-up value
/// (`null` when absent).
pub fn write_paths<W: Write>(issues: &[Issue], paths: &[String], out: &mut W) -> Result<()> {
    for issue in issues {
        let mut row = Map::new();
        for path in paths {
            let value = match issue.get(path) {
                Some(v) => serde_json::to_value(v)?,
                None => Value::Null,
            };
            row.insert(path.clone(), value);
        }
        serde_json::to_writer(&mut *out, &row)?;
        writeln!(out)?;
    }
    Ok(())
}
