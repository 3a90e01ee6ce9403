use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use kira_tmbplot::input::{TableError, load_table, write_table};
use kira_tmbplot::metric::compute_tmb;
use kira_tmbplot::render::colors::{parse_color, parse_palette};
use kira_tmbplot::render::comparison::{ComparisonConfig, plot_group_comparison};
use kira_tmbplot::render::distribution::{DistributionConfig, plot_distribution};
use kira_tmbplot::render::{FigureStyle, FigureViewer, HeadlessViewer, RenderError, SystemViewer};
use kira_tmbplot::report::json::write_summary_json;
use kira_tmbplot::report::text::{
    render_comparison_text, render_distribution_text, render_tmb_text,
};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Parser)]
#[command(name = "kira-tmbplot", version, about)]
struct Cli {
    /// Log level when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Append a TMB column to a sample-by-gene count table.
    Tmb(TmbArgs),
    /// Histogram of one column.
    Distribution(DistributionArgs),
    /// Boxplots of one or two cohorts by group.
    Compare(CompareArgs),
}

#[derive(Debug, Args)]
struct TmbArgs {
    #[arg(long)]
    input: PathBuf,
    /// Capture size in base pairs, or megabases when at most 1,000,000.
    #[arg(long)]
    capture_size: f64,
    #[arg(long)]
    id_column: Option<String>,
    /// Output TSV; the TMB table is printed when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct FigureArgs {
    /// Output path without extension; writes .tiff and .png.
    #[arg(long)]
    save: Option<PathBuf>,
    /// Open the titled figure in the system image viewer.
    #[arg(long)]
    show: bool,
    /// Write a JSON summary of what was plotted.
    #[arg(long)]
    summary: Option<PathBuf>,
    #[arg(long, default_value = "serif")]
    font_family: String,
    #[arg(long, default_value_t = 300)]
    dpi: u32,
}

impl FigureArgs {
    fn style(&self) -> FigureStyle {
        FigureStyle {
            font_family: self.font_family.clone(),
            dpi: self.dpi,
            ..FigureStyle::default()
        }
    }

    fn viewer(&self) -> Box<dyn FigureViewer> {
        if self.show {
            Box::new(SystemViewer::default())
        } else {
            Box::new(HeadlessViewer)
        }
    }
}

#[derive(Debug, Args)]
struct DistributionArgs {
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    id_column: Option<String>,
    #[arg(long, default_value = "TMB")]
    column: String,
    #[arg(long, default_value_t = 30)]
    bins: usize,
    #[arg(long, default_value = "steelblue")]
    color: String,
    #[arg(long, default_value_t = 0.6)]
    alpha: f64,
    #[arg(long, default_value = "Frequency")]
    ylabel: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long, default_value_t = 22.0)]
    title_size: f64,
    #[arg(long, default_value_t = 20.0)]
    xlabel_size: f64,
    #[arg(long, default_value_t = 20.0)]
    ylabel_size: f64,
    #[arg(long, default_value_t = 18.0)]
    xticks_size: f64,
    #[arg(long, default_value_t = 18.0)]
    yticks_size: f64,
    #[arg(long)]
    no_grid: bool,
    #[command(flatten)]
    figure: FigureArgs,
}

impl DistributionArgs {
    fn config(&self) -> Result<DistributionConfig, RenderError> {
        Ok(DistributionConfig {
            column: self.column.clone(),
            bins: self.bins,
            color: parse_color(&self.color)?,
            alpha: self.alpha,
            ylabel: self.ylabel.clone(),
            title: self.title.clone(),
            title_size: self.title_size,
            xlabel_size: self.xlabel_size,
            ylabel_size: self.ylabel_size,
            xticks_size: self.xticks_size,
            yticks_size: self.yticks_size,
            grid: !self.no_grid,
            save_path: self.figure.save.clone(),
            ..DistributionConfig::default()
        })
    }
}

#[derive(Debug, Args)]
struct CompareArgs {
    #[arg(long)]
    input: PathBuf,
    /// Second cohort, drawn as a side-by-side panel.
    #[arg(long)]
    input2: Option<PathBuf>,
    #[arg(long)]
    id_column: Option<String>,
    #[arg(long)]
    column: String,
    #[arg(long, default_value = "group")]
    group_column: String,
    /// Comma-separated display order; the first two are tested.
    #[arg(long, value_delimiter = ',')]
    group_order: Option<Vec<String>>,
    #[arg(long)]
    log_transform: bool,
    #[arg(long, default_value = "Value")]
    ylabel: String,
    #[arg(long, default_value = "Group 1")]
    title0: String,
    #[arg(long, default_value = "Group 2")]
    title1: String,
    /// `label=colour,...` for the first panel.
    #[arg(long)]
    palette0: Option<String>,
    #[arg(long)]
    palette1: Option<String>,
    #[arg(long, default_value_t = 22.0)]
    title_size: f64,
    #[arg(long, default_value_t = 20.0)]
    ylabel_size: f64,
    #[arg(long, default_value_t = 18.0)]
    xticks_size: f64,
    #[arg(long, default_value_t = 18.0)]
    yticks_size: f64,
    #[arg(long, default_value_t = 12.0)]
    annotation_size: f64,
    #[arg(long, default_value_t = 6.0)]
    width: f64,
    #[arg(long, default_value_t = 4.0)]
    height: f64,
    #[command(flatten)]
    figure: FigureArgs,
}

impl CompareArgs {
    fn config(&self) -> Result<ComparisonConfig, RenderError> {
        let mut cfg = ComparisonConfig::new(&self.column);
        cfg.group_column = self.group_column.clone();
        cfg.group_order = self.group_order.clone();
        cfg.log_transform = self.log_transform;
        cfg.ylabel = self.ylabel.clone();
        cfg.title0 = self.title0.clone();
        cfg.title1 = self.title1.clone();
        cfg.palette0 = self.palette0.as_deref().map(parse_palette).transpose()?;
        cfg.palette1 = self.palette1.as_deref().map(parse_palette).transpose()?;
        cfg.title_size = self.title_size;
        cfg.ylabel_size = self.ylabel_size;
        cfg.xticks_size = self.xticks_size;
        cfg.yticks_size = self.yticks_size;
        cfg.annotation_size = self.annotation_size;
        cfg.figsize = (self.width, self.height);
        cfg.save_path = self.figure.save.clone();
        Ok(cfg)
    }
}

fn main() {
    let cli = Cli::parse();
    kira_tmbplot::logging::init_logging(&cli.log_level);
    if let Err(err) = run(cli.command) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Tmb(args) => run_tmb(&args),
        Command::Distribution(args) => run_distribution(&args),
        Command::Compare(args) => run_compare(&args),
    }
}

fn run_tmb(args: &TmbArgs) -> Result<(), CliError> {
    let mut table = load_table(&args.input, args.id_column.as_deref())?;
    let table = compute_tmb(&mut table, args.capture_size)?;
    match &args.out {
        Some(out) => {
            write_table(out, table)?;
            tracing::info!(path = %out.display(), samples = table.n_rows(), "wrote TMB table");
        }
        None => print!("{}", render_tmb_text(table)),
    }
    Ok(())
}

fn run_distribution(args: &DistributionArgs) -> Result<(), CliError> {
    let table = load_table(&args.input, args.id_column.as_deref())?;
    let cfg = args.config()?;
    let mut viewer = args.figure.viewer();
    let outcome = plot_distribution(&table, &cfg, &args.figure.style(), viewer.as_mut())?;
    print!("{}", render_distribution_text(&outcome));
    if let Some(path) = &args.figure.summary {
        write_summary_json(path, "distribution", &outcome)?;
    }
    Ok(())
}

fn run_compare(args: &CompareArgs) -> Result<(), CliError> {
    let cohort0 = load_table(&args.input, args.id_column.as_deref())?;
    let cohort1 = args
        .input2
        .as_deref()
        .map(|p| load_table(p, args.id_column.as_deref()))
        .transpose()?;
    let cfg = args.config()?;
    let mut viewer = args.figure.viewer();
    let outcome = plot_group_comparison(
        &cohort0,
        cohort1.as_ref(),
        &cfg,
        &args.figure.style(),
        viewer.as_mut(),
    )?;
    print!("{}", render_comparison_text(&outcome));
    if let Some(path) = &args.figure.summary {
        write_summary_json(path, "compare", &outcome)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
