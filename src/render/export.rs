use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiff::encoder::compression::Lzw;
use tiff::encoder::{Rational, TiffEncoder, colortype};
use tiff::tags::ResolutionUnit;

use crate::render::{RenderError, RenderedFigure};

const INCH_PER_METER: f64 = 39.370_078_740_157_48;

pub fn write_png(path: &Path, figure: &RenderedFigure) -> Result<(), RenderError> {
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), figure.width, figure.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let ppm = (figure.dpi as f64 * INCH_PER_METER).round() as u32;
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&figure.pixels)?;
    writer.finish()?;
    Ok(())
}

/// RGB TIFF, LZW-compressed, with the figure DPI in the resolution tags.
pub fn write_tiff_lzw(path: &Path, figure: &RenderedFigure) -> Result<(), RenderError> {
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;
    let mut image = encoder.new_image_with_compression::<colortype::RGB8, _>(
        figure.width,
        figure.height,
        Lzw,
    )?;
    let dpi = Rational {
        n: figure.dpi,
        d: 1,
    };
    image.resolution(ResolutionUnit::Inch, dpi);
    image.write_data(&figure.pixels)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/render/export.rs"]
mod tests;
