use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::render::{RenderError, RenderedFigure, export};

/// Receives the titled figure after rendering; the figure is released when
/// the render call returns.
pub trait FigureViewer {
    fn show(&mut self, figure: &RenderedFigure) -> Result<(), RenderError>;
}

/// Logs the figure and discards it. Used for batch runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessViewer;

impl FigureViewer for HeadlessViewer {
    fn show(&mut self, figure: &RenderedFigure) -> Result<(), RenderError> {
        tracing::debug!(
            width = figure.width,
            height = figure.height,
            "figure rendered without a display"
        );
        Ok(())
    }
}

static PREVIEW_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Writes a preview PNG to `preview_dir` and hands it to the platform's
/// default image viewer.
///
/// The opener returns before the viewer has read the file, so previews are
/// kept on disk by default and belong to the user. With `keep_previews`
/// unset, every preview this viewer wrote is removed when it is dropped.
#[derive(Debug)]
pub struct SystemViewer {
    pub preview_dir: PathBuf,
    /// Run the platform opener after writing the preview.
    pub launch: bool,
    pub keep_previews: bool,
    previews: Vec<PathBuf>,
}

impl Default for SystemViewer {
    fn default() -> Self {
        Self {
            preview_dir: std::env::temp_dir(),
            launch: true,
            keep_previews: true,
            previews: Vec::new(),
        }
    }
}

impl SystemViewer {
    fn opener() -> Command {
        if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]);
            cmd
        } else {
            Command::new("xdg-open")
        }
    }

    /// Preview files written so far, oldest first.
    pub fn previews(&self) -> &[PathBuf] {
        &self.previews
    }
}

impl FigureViewer for SystemViewer {
    fn show(&mut self, figure: &RenderedFigure) -> Result<(), RenderError> {
        let id = PREVIEW_COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = self.preview_dir.join(format!(
            "kira_tmbplot_preview_{}_{}.png",
            std::process::id(),
            id
        ));
        export::write_png(&path, figure)?;
        self.previews.push(path.clone());
        if !self.launch {
            tracing::debug!(path = %path.display(), "preview written");
            return Ok(());
        }
        // `status` reaps the opener; the viewer it starts runs detached.
        match Self::opener().arg(&path).status() {
            Ok(status) if status.success() => {
                tracing::info!(path = %path.display(), "opened figure preview")
            }
            Ok(status) => tracing::warn!(
                path = %path.display(),
                status = %status,
                "image viewer exited with an error"
            ),
            Err(err) => tracing::warn!(
                path = %path.display(),
                error = %err,
                "no image viewer available; preview left on disk"
            ),
        }
        Ok(())
    }
}

impl Drop for SystemViewer {
    fn drop(&mut self) {
        if self.keep_previews {
            return;
        }
        for path in self.previews.drain(..) {
            if let Err(err) = std::fs::remove_file(&path) {
                tracing::debug!(path = %path.display(), error = %err, "preview not removed");
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/render/viewer.rs"]
mod tests;
