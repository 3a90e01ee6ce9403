use crate::input::{ColumnData, Table, TableError};

pub const TMB_COLUMN: &str = "TMB";
pub const MEGABASE: f64 = 1_000_000.0;

/// Values above one megabase are taken as base pairs; anything else is
/// already in megabases. Zero and negative sizes are passed through.
pub fn capture_size_mb(capture_size: f64) -> f64 {
    if capture_size > MEGABASE {
        capture_size / MEGABASE
    } else {
        capture_size
    }
}

/// Appends (or overwrites) the `TMB` column: row-wise mutation count sum
/// divided by the capture size in megabases.
///
/// Every column other than `TMB` is summed, so the table must hold only gene
/// count columns. A missing count makes that sample's burden missing. The
/// caller's table is mutated and handed back.
pub fn compute_tmb(table: &mut Table, capture_size: f64) -> Result<&mut Table, TableError> {
    let mb = capture_size_mb(capture_size);
    let mut totals: Vec<Option<f64>> = vec![Some(0.0); table.n_rows()];

    for col in table.columns.iter().filter(|c| c.name != TMB_COLUMN) {
        let values = match &col.data {
            ColumnData::Numeric(v) => v,
            ColumnData::Text(_) => return Err(TableError::NonNumericColumn(col.name.clone())),
        };
        for (total, value) in totals.iter_mut().zip(values) {
            *total = match (*total, *value) {
                (Some(t), Some(v)) => Some(t + v),
                _ => None,
            };
        }
    }

    let tmb = totals.into_iter().map(|t| t.map(|t| t / mb)).collect();
    table.set_numeric(TMB_COLUMN, tmb)?;
    tracing::debug!(
        samples = table.n_rows(),
        capture_mb = mb,
        "computed tumor mutational burden"
    );
    Ok(table)
}

#[cfg(test)]
#[path = "../../tests/src_inline/metric/tmb.rs"]
mod tests;
