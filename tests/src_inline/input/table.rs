use super::*;

fn two_rows() -> Table {
    Table::new("id", vec!["a".to_string(), "b".to_string()]).unwrap()
}

#[test]
fn test_set_numeric_appends_then_overwrites_in_place() {
    let mut t = two_rows();
    t.push_column("X", ColumnData::Numeric(vec![Some(1.0), Some(2.0)]))
        .unwrap();
    t.set_numeric("TMB", vec![Some(1.0), None]).unwrap();
    t.push_column("Y", ColumnData::Numeric(vec![None, None]))
        .unwrap();
    t.set_numeric("TMB", vec![Some(5.0), Some(6.0)]).unwrap();
    assert_eq!(t.column_names(), vec!["X", "TMB", "Y"]);
    assert_eq!(t.numeric("TMB").unwrap(), &[Some(5.0), Some(6.0)]);
}

#[test]
fn test_length_mismatch() {
    let mut t = two_rows();
    let err = t.set_numeric("TMB", vec![Some(1.0)]).unwrap_err();
    assert!(matches!(
        err,
        TableError::LengthMismatch {
            expected: 2,
            found: 1,
            ..
        }
    ));
}

#[test]
fn test_missing_column_lookup() {
    let t = two_rows();
    assert!(matches!(t.column("TMB"), Err(TableError::MissingColumn(_))));
}

#[test]
fn test_labels() {
    let col = ColumnData::Numeric(vec![Some(1.0), Some(2.5), None]);
    assert_eq!(col.label(0).as_deref(), Some("1"));
    assert_eq!(col.label(1).as_deref(), Some("2.5"));
    assert_eq!(col.label(2), None);
    assert!(col.is_missing(2));
}

#[test]
fn test_nan_cells_are_missing() {
    let col = ColumnData::Numeric(vec![Some(f64::NAN), Some(f64::INFINITY)]);
    assert!(col.is_missing(0));
    assert!(!col.is_missing(1));
    assert_eq!(col.label(0), None);
}
