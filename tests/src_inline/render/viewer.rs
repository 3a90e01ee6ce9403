use std::fs;
use std::sync::atomic::AtomicUsize;

use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_tmbplot_viewer_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn white(width: u32, height: u32) -> RenderedFigure {
    let mut fig = RenderedFigure::blank(width, height, 300);
    fig.pixels.iter_mut().for_each(|p| *p = 255);
    fig
}

#[test]
fn test_previews_removed_on_drop_when_not_kept() {
    let dir = make_temp_dir();
    let mut viewer = SystemViewer::default();
    viewer.preview_dir = dir.clone();
    viewer.launch = false;
    viewer.keep_previews = false;
    viewer.show(&white(3, 2)).unwrap();
    viewer.show(&white(2, 2)).unwrap();
    let previews = viewer.previews().to_vec();
    assert_eq!(previews.len(), 2);
    assert!(previews.iter().all(|p| p.exists() && p.starts_with(&dir)));

    drop(viewer);
    assert!(previews.iter().all(|p| !p.exists()));
}

#[test]
fn test_previews_kept_by_default() {
    let dir = make_temp_dir();
    let mut viewer = SystemViewer::default();
    viewer.preview_dir = dir;
    viewer.launch = false;
    viewer.show(&white(2, 2)).unwrap();
    let previews = viewer.previews().to_vec();
    drop(viewer);
    assert!(previews[0].exists());
    fs::remove_file(&previews[0]).unwrap();
}
