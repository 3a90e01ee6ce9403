pub mod input;
pub mod logging;
pub mod metric;
pub mod render;
pub mod report;
pub mod stats;

pub use input::{Table, TableError, load_table, write_table};
pub use metric::compute_tmb;
pub use render::comparison::{ComparisonConfig, ComparisonOutcome, plot_group_comparison};
pub use render::distribution::{DistributionConfig, DistributionOutcome, plot_distribution};
pub use render::{FigureStyle, FigureViewer, HeadlessViewer, RenderError, SystemViewer};
