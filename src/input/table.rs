use serde::Serialize;

use crate::input::TableError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// NaN counts as missing in numeric columns.
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Numeric(v) => v.get(row).is_none_or(|c| c.is_none_or(f64::is_nan)),
            ColumnData::Text(v) => v.get(row).is_none_or(|c| c.is_none()),
        }
    }

    /// Cell rendered as a category label; numeric cells use shortest float formatting.
    pub fn label(&self, row: usize) -> Option<String> {
        match self {
            ColumnData::Numeric(v) => v
                .get(row)
                .copied()
                .flatten()
                .filter(|x| !x.is_nan())
                .map(format_number),
            ColumnData::Text(v) => v.get(row).cloned().flatten(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Rows are samples keyed by `row_ids`; columns keep their file order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub id_column: String,
    pub row_ids: Vec<String>,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(id_column: &str, row_ids: Vec<String>) -> Result<Self, TableError> {
        let mut seen = std::collections::HashSet::with_capacity(row_ids.len());
        for id in &row_ids {
            if !seen.insert(id.as_str()) {
                return Err(TableError::DuplicateRowId(id.clone()));
            }
        }
        Ok(Self {
            id_column: id_column.to_string(),
            row_ids,
            columns: Vec::new(),
        })
    }

    pub fn n_rows(&self) -> usize {
        self.row_ids.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Result<&Column, TableError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>], TableError> {
        match &self.column(name)?.data {
            ColumnData::Numeric(v) => Ok(v),
            ColumnData::Text(_) => Err(TableError::NonNumericColumn(name.to_string())),
        }
    }

    pub fn non_missing_count(&self, name: &str) -> Result<usize, TableError> {
        let col = self.column(name)?;
        Ok((0..col.data.len())
            .filter(|&row| !col.data.is_missing(row))
            .count())
    }

    pub fn push_column(&mut self, name: &str, data: ColumnData) -> Result<(), TableError> {
        self.check_len(name, data.len())?;
        if self.columns.iter().any(|c| c.name == name) {
            return Err(TableError::Parse(format!("duplicate column name: {name}")));
        }
        self.columns.push(Column {
            name: name.to_string(),
            data,
        });
        Ok(())
    }

    /// Replaces a same-named column in place, or appends a new one.
    pub fn set_numeric(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<(), TableError> {
        self.check_len(name, values.len())?;
        if let Some(col) = self.columns.iter_mut().find(|c| c.name == name) {
            col.data = ColumnData::Numeric(values);
        } else {
            self.columns.push(Column {
                name: name.to_string(),
                data: ColumnData::Numeric(values),
            });
        }
        Ok(())
    }

    fn check_len(&self, name: &str, len: usize) -> Result<(), TableError> {
        if len != self.n_rows() {
            return Err(TableError::LengthMismatch {
                column: name.to_string(),
                expected: self.n_rows(),
                found: len,
            });
        }
        Ok(())
    }
}

pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/table.rs"]
mod tests;
