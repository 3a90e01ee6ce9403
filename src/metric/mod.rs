pub mod tmb;

pub use tmb::{MEGABASE, TMB_COLUMN, capture_size_mb, compute_tmb};
