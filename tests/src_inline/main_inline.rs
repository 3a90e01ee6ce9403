use super::*;

#[test]
fn test_parse_tmb_command() {
    let cli = Cli::try_parse_from([
        "kira-tmbplot",
        "tmb",
        "--input",
        "counts.tsv",
        "--capture-size",
        "38000000",
    ])
    .unwrap();
    match cli.command {
        Command::Tmb(args) => {
            assert_eq!(args.capture_size, 38_000_000.0);
            assert!(args.out.is_none());
        }
        other => panic!("unexpected command {other:?}"),
    }
    assert_eq!(cli.log_level, "info");
}

#[test]
fn test_distribution_defaults_match_config_defaults() {
    let cli = Cli::try_parse_from(["kira-tmbplot", "distribution", "--input", "t.tsv"]).unwrap();
    let Command::Distribution(args) = cli.command else {
        panic!("expected distribution");
    };
    let cfg = args.config().unwrap();
    let defaults = DistributionConfig::default();
    assert_eq!(cfg.column, defaults.column);
    assert_eq!(cfg.bins, defaults.bins);
    assert_eq!(cfg.color, defaults.color);
    assert_eq!(cfg.alpha, defaults.alpha);
    assert_eq!(cfg.title_size, defaults.title_size);
    assert!(cfg.grid);
    assert!(cfg.title.is_none());
    assert!(cfg.save_path.is_none());
}

#[test]
fn test_compare_group_order_and_palette() {
    let cli = Cli::try_parse_from([
        "kira-tmbplot",
        "--log-level",
        "debug",
        "compare",
        "--input",
        "a.tsv",
        "--input2",
        "b.tsv",
        "--column",
        "TMB",
        "--group-order",
        "wt,mut",
        "--palette0",
        "wt=red,mut=#000000",
        "--log-transform",
        "--save",
        "out/fig",
    ])
    .unwrap();
    assert_eq!(cli.log_level, "debug");
    let Command::Compare(args) = cli.command else {
        panic!("expected compare");
    };
    let cfg = args.config().unwrap();
    assert_eq!(
        cfg.group_order,
        Some(vec!["wt".to_string(), "mut".to_string()])
    );
    assert!(cfg.log_transform);
    assert_eq!(cfg.palette0.as_ref().unwrap().len(), 2);
    assert!(cfg.palette1.is_none());
    assert_eq!(cfg.save_path, Some(PathBuf::from("out/fig")));
    assert_eq!(cfg.group_column, "group");
}

#[test]
fn test_bad_colour_is_reported() {
    let cli = Cli::try_parse_from([
        "kira-tmbplot",
        "distribution",
        "--input",
        "t.tsv",
        "--color",
        "nope",
    ])
    .unwrap();
    let Command::Distribution(args) = cli.command else {
        panic!("expected distribution");
    };
    assert!(matches!(args.config(), Err(RenderError::Color(_))));
}

#[test]
fn test_compare_requires_column() {
    assert!(Cli::try_parse_from(["kira-tmbplot", "compare", "--input", "a.tsv"]).is_err());
}

#[test]
fn test_compare_font_sizes_default_and_override() {
    let cli = Cli::try_parse_from([
        "kira-tmbplot",
        "compare",
        "--input",
        "a.tsv",
        "--column",
        "TMB",
        "--title-size",
        "16",
        "--yticks-size",
        "10",
    ])
    .unwrap();
    let Command::Compare(args) = cli.command else {
        panic!("expected compare");
    };
    let cfg = args.config().unwrap();
    let defaults = ComparisonConfig::new("TMB");
    assert_eq!(cfg.title_size, 16.0);
    assert_eq!(cfg.yticks_size, 10.0);
    assert_eq!(cfg.ylabel_size, defaults.ylabel_size);
    assert_eq!(cfg.xticks_size, defaults.xticks_size);
    assert_eq!(cfg.annotation_size, defaults.annotation_size);
}
