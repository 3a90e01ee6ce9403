use super::*;

fn counts(rows: &[(&str, [f64; 3])]) -> Table {
    let mut t = Table::new("sample", rows.iter().map(|r| r.0.to_string()).collect()).unwrap();
    for (g, name) in ["A", "B", "C"].iter().enumerate() {
        t.push_column(
            name,
            ColumnData::Numeric(rows.iter().map(|r| Some(r.1[g])).collect()),
        )
        .unwrap();
    }
    t
}

#[test]
fn test_two_megabase_capture_in_base_pairs() {
    let mut t = counts(&[("s1", [3.0, 4.0, 5.0]), ("s2", [1.0, 0.0, 2.0])]);
    compute_tmb(&mut t, 2_000_000.0).unwrap();
    assert_eq!(t.numeric(TMB_COLUMN).unwrap(), &[Some(6.0), Some(1.5)]);
}

#[test]
fn test_capture_already_in_megabases() {
    let mut bp = counts(&[("s1", [3.0, 4.0, 5.0]), ("s2", [1.0, 0.0, 2.0])]);
    let mut mb = bp.clone();
    compute_tmb(&mut bp, 30_000_000.0).unwrap();
    compute_tmb(&mut mb, 30.0).unwrap();
    assert_eq!(bp.numeric(TMB_COLUMN).unwrap(), mb.numeric(TMB_COLUMN).unwrap());
    assert_eq!(mb.numeric(TMB_COLUMN).unwrap(), &[Some(0.4), Some(0.1)]);
}

#[test]
fn test_exactly_one_megabase_is_not_rescaled() {
    assert_eq!(capture_size_mb(1_000_000.0), 1_000_000.0);
    assert_eq!(capture_size_mb(1_000_001.0), 1.000001);
    assert_eq!(capture_size_mb(38.0), 38.0);
}

#[test]
fn test_second_call_overwrites_without_accumulating() {
    let mut t = counts(&[("s1", [3.0, 4.0, 5.0]), ("s2", [1.0, 0.0, 2.0])]);
    compute_tmb(&mut t, 2.0).unwrap();
    let first = t.numeric(TMB_COLUMN).unwrap().to_vec();
    compute_tmb(&mut t, 2.0).unwrap();
    assert_eq!(t.numeric(TMB_COLUMN).unwrap(), first.as_slice());
    assert_eq!(t.column_names(), vec!["A", "B", "C", "TMB"]);
}

#[test]
fn test_returns_same_table() {
    let mut t = counts(&[("s1", [1.0, 1.0, 1.0])]);
    let ptr: *const Table = &t;
    let out = compute_tmb(&mut t, 3.0).unwrap();
    assert!(std::ptr::eq(ptr, out));
}

#[test]
fn test_missing_count_propagates() {
    let mut t = counts(&[("s1", [1.0, 1.0, 1.0]), ("s2", [2.0, 2.0, 2.0])]);
    t.set_numeric("B", vec![None, Some(2.0)]).unwrap();
    compute_tmb(&mut t, 1.0).unwrap();
    assert_eq!(t.numeric(TMB_COLUMN).unwrap(), &[None, Some(6.0)]);
}

#[test]
fn test_text_column_is_an_error() {
    let mut t = counts(&[("s1", [1.0, 1.0, 1.0])]);
    t.push_column("group", ColumnData::Text(vec![Some("x".to_string())]))
        .unwrap();
    let err = compute_tmb(&mut t, 1.0).unwrap_err();
    assert!(matches!(err, TableError::NonNumericColumn(c) if c == "group"));
}

#[test]
fn test_zero_capture_size_is_not_validated() {
    let mut t = counts(&[("s1", [1.0, 0.0, 0.0]), ("s2", [0.0, 0.0, 0.0])]);
    compute_tmb(&mut t, 0.0).unwrap();
    let tmb = t.numeric(TMB_COLUMN).unwrap();
    assert_eq!(tmb[0], Some(f64::INFINITY));
    assert!(tmb[1].unwrap().is_nan());
}
