use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::report::TOOL_NAME;

#[derive(Debug, Serialize)]
pub struct Summary<'a, T: Serialize> {
    pub tool: &'static str,
    pub version: &'static str,
    pub command: &'a str,
    pub result: &'a T,
}

pub fn render_summary_json<T: Serialize>(command: &str, result: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Summary {
        tool: TOOL_NAME,
        version: env!("CARGO_PKG_VERSION"),
        command,
        result,
    })
}

pub fn write_summary_json<T: Serialize>(
    path: &Path,
    command: &str,
    result: &T,
) -> std::io::Result<()> {
    let json = render_summary_json(command, result).map_err(std::io::Error::other)?;
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(json.as_bytes())?;
    out.write_all(b"\n")?;
    out.flush()
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/json.rs"]
mod tests;
