use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_tmbplot_export_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn gradient() -> RenderedFigure {
    let mut fig = RenderedFigure::blank(4, 3, 300);
    for (i, px) in fig.pixels.iter_mut().enumerate() {
        *px = (i * 7 % 256) as u8;
    }
    fig
}

#[test]
fn test_png_has_dpi_and_pixels() {
    let dir = make_temp_dir();
    let path = dir.join("fig.png");
    let fig = gradient();
    write_png(&path, &fig).unwrap();

    let decoder = png::Decoder::new(File::open(&path).unwrap());
    let mut reader = decoder.read_info().unwrap();
    let dims = reader.info().pixel_dims.unwrap();
    assert_eq!(dims.unit, png::Unit::Meter);
    assert_eq!(dims.xppu, 11811);
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).unwrap();
    assert_eq!((frame.width, frame.height), (4, 3));
    assert_eq!(&buf[..frame.buffer_size()], fig.pixels.as_slice());
}

#[test]
fn test_tiff_is_lzw_with_resolution() {
    let dir = make_temp_dir();
    let path = dir.join("fig.tiff");
    let fig = gradient();
    write_tiff_lzw(&path, &fig).unwrap();

    let mut decoder = Decoder::new(File::open(&path).unwrap()).unwrap();
    assert_eq!(decoder.dimensions().unwrap(), (4, 3));
    assert_eq!(decoder.get_tag_u32(Tag::Compression).unwrap(), 5);
    assert_eq!(decoder.get_tag_u32(Tag::ResolutionUnit).unwrap(), 2);
    match decoder.read_image().unwrap() {
        DecodingResult::U8(data) => assert_eq!(data, fig.pixels),
        _ => panic!("expected 8-bit samples"),
    }
}
