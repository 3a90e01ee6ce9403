pub mod table;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use thiserror::Error;

pub use table::{Column, ColumnData, Table, format_number};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("missing column: {0}")]
    MissingColumn(String),
    #[error("column is not numeric: {0}")]
    NonNumericColumn(String),
    #[error("duplicate row identifier: {0}")]
    DuplicateRowId(String),
    #[error("column {column} has {found} values, table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}

const MISSING_TOKENS: &[&str] = &["", "NA", "NaN", "nan", "null"];

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, TableError> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Comma for `.csv` / `.csv.gz`, tab otherwise.
pub fn delimiter_for(path: &Path) -> char {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    if name.ends_with(".csv") { ',' } else { '\t' }
}

/// Loads a delimited table. Row identity comes from `id_column`, or the first
/// column when none is named.
pub fn load_table(path: &Path, id_column: Option<&str>) -> Result<Table, TableError> {
    let reader = open_maybe_gz(path)?;
    let table = parse_table(reader, delimiter_for(path), id_column)?;
    tracing::debug!(
        path = %path.display(),
        rows = table.n_rows(),
        columns = table.columns.len(),
        "loaded table"
    );
    Ok(table)
}

pub fn parse_table<R: BufRead>(
    mut reader: R,
    delim: char,
    id_column: Option<&str>,
) -> Result<Table, TableError> {
    let mut buf = String::new();
    let read = reader.read_line(&mut buf)?;
    if read == 0 {
        return Err(TableError::Parse("table is empty".to_string()));
    }
    let header: Vec<String> = buf
        .trim_end_matches(['\n', '\r'])
        .split(delim)
        .map(|s| s.trim().to_string())
        .collect();
    let id_idx = match id_column {
        Some(name) => header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))?,
        None => 0,
    };

    let mut row_ids = Vec::new();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); header.len()];
    let mut line_no = 1usize;
    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(delim).collect();
        if fields.len() != header.len() {
            return Err(TableError::Parse(format!(
                "line {line_no} has {} fields, header has {}",
                fields.len(),
                header.len()
            )));
        }
        for (idx, field) in fields.iter().enumerate() {
            if idx == id_idx {
                row_ids.push(field.trim().to_string());
            } else {
                cells[idx].push(field.trim().to_string());
            }
        }
    }

    let mut table = Table::new(&header[id_idx], row_ids)?;
    for (idx, name) in header.iter().enumerate() {
        if idx == id_idx {
            continue;
        }
        table.push_column(name, infer_column(&cells[idx]))?;
    }
    Ok(table)
}

fn infer_column(raw: &[String]) -> ColumnData {
    let mut numeric = Vec::with_capacity(raw.len());
    for cell in raw {
        if MISSING_TOKENS.contains(&cell.as_str()) {
            numeric.push(None);
            continue;
        }
        match cell.parse::<f64>() {
            Ok(v) => numeric.push(Some(v)),
            Err(_) => {
                return ColumnData::Text(
                    raw.iter()
                        .map(|c| {
                            if MISSING_TOKENS.contains(&c.as_str()) {
                                None
                            } else {
                                Some(c.clone())
                            }
                        })
                        .collect(),
                );
            }
        }
    }
    ColumnData::Numeric(numeric)
}

pub fn write_table(path: &Path, table: &Table) -> Result<(), TableError> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    write!(out, "{}", table.id_column)?;
    for col in &table.columns {
        write!(out, "\t{}", col.name)?;
    }
    writeln!(out)?;
    for (row, id) in table.row_ids.iter().enumerate() {
        write!(out, "{id}")?;
        for col in &table.columns {
            let cell = match &col.data {
                ColumnData::Numeric(v) => v[row].map(|x| format!("{x}")),
                ColumnData::Text(v) => v[row].clone(),
            };
            write!(out, "\t{}", cell.as_deref().unwrap_or("NA"))?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
