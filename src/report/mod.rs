pub mod json;
pub mod text;

pub const TOOL_NAME: &str = "kira-tmbplot";

pub fn format_f64_4(v: f64) -> String {
    format!("{:.4}", v)
}

/// Scientific notation below 1e-3, fixed otherwise.
pub fn format_p_value(p: f64) -> String {
    if p < 1e-3 {
        format!("{:.2e}", p)
    } else {
        format!("{:.4}", p)
    }
}
