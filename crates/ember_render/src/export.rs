//! Image export.
//!
//! The two exporters deliberately disagree on row order: the pixmap
//! writer emits the frame bottom row first, the PNG writer top row first.
//! Downstream tooling depends on both orientations, so the split is part
//! of the format contract. Pixels pass through [`tonemap`] on the way
//! out; the buffer itself is never modified.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::frame::FrameBuffer;
use crate::tonemap::tonemap;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Write a portable pixmap, `P3` (ASCII) or `P6` (binary), frame bottom
/// row first.
pub fn write_pbm(
    path: impl AsRef<Path>,
    frame: &FrameBuffer,
    inv_gamma: f32,
    binary: bool,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let width = frame.width();
    let height = frame.height();

    let mut file = BufWriter::new(File::create(path)?);
    let magic = if binary { "P6" } else { "P3" };
    writeln!(file, "{magic}\n{width} {height}\n255")?;

    for y in (0..height).rev() {
        for x in 0..width {
            let [r, g, b] = tonemap(frame.get(x, y), inv_gamma);
            if binary {
                file.write_all(&[r, g, b])?;
            } else {
                write!(file, "{r} {g} {b} ")?;
            }
        }
        if !binary {
            writeln!(file)?;
        }
    }
    file.flush()?;
    log::info!("Saved \"{}\" ({width}x{height}, {magic})", path.display());
    Ok(())
}

/// Write a PNG through the `image` crate, frame top row first.
pub fn write_png(
    path: impl AsRef<Path>,
    frame: &FrameBuffer,
    inv_gamma: f32,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let width = frame.width();
    let height = frame.height();

    let mut bytes = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        for x in 0..width {
            bytes.extend_from_slice(&tonemap(frame.get(x, y), inv_gamma));
        }
    }

    image::save_buffer(path, &bytes, width, height, image::ColorType::Rgb8)?;
    log::info!("Saved \"{}\" ({width}x{height}, PNG)", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::RgbColor;

    fn two_row_frame() -> FrameBuffer {
        // Row 0 red, row 1 green; 10.0 tonemaps to byte 253 at unit gamma.
        let mut frame = FrameBuffer::new(2, 2);
        for x in 0..2 {
            frame.set(x, 0, RgbColor::new(10.0, 0.0, 0.0));
            frame.set(x, 1, RgbColor::new(0.0, 10.0, 0.0));
        }
        frame
    }

    #[test]
    fn test_ascii_pbm_rows_are_reversed() {
        let frame = two_row_frame();
        let path = std::env::temp_dir().join("ember_export_test_ascii.ppm");
        write_pbm(&path, &frame, 1.0, false).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("P3"));
        assert_eq!(lines.next(), Some("2 2"));
        assert_eq!(lines.next(), Some("255"));
        // Pixmap rows run bottom to top: frame row 1 (green) comes first.
        let first_row = lines.next().unwrap();
        let second_row = lines.next().unwrap();
        assert!(first_row.starts_with("0 253 0"), "got {first_row:?}");
        assert!(second_row.starts_with("253 0 0"), "got {second_row:?}");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_binary_pbm_header_and_payload_size() {
        let frame = two_row_frame();
        let path = std::env::temp_dir().join("ember_export_test_binary.ppm");
        write_pbm(&path, &frame, 1.0, true).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let header = b"P6\n2 2\n255\n";
        assert!(bytes.starts_with(header));
        assert_eq!(bytes.len(), header.len() + 2 * 2 * 3);
        // First payload pixel is frame row 1: green.
        assert_eq!(&bytes[header.len()..header.len() + 3], &[0, 253, 0]);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_png_rows_run_top_to_bottom() {
        let frame = two_row_frame();
        let path = std::env::temp_dir().join("ember_export_test.png");
        write_png(&path, &frame, 1.0).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (2, 2));
        // PNG keeps frame row order: row 0 (red) first.
        assert_eq!(img.get_pixel(0, 0).0, [253, 0, 0]);
        assert_eq!(img.get_pixel(0, 1).0, [0, 253, 0]);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_pixmap_and_png_row_orders_are_reversed() {
        let frame = two_row_frame();
        let ppm_path = std::env::temp_dir().join("ember_export_test_pair.ppm");
        let png_path = std::env::temp_dir().join("ember_export_test_pair.png");
        write_pbm(&ppm_path, &frame, 1.0, false).unwrap();
        write_png(&png_path, &frame, 1.0).unwrap();

        let ppm_first_pixel: Vec<u8> = std::fs::read_to_string(&ppm_path)
            .unwrap()
            .split_whitespace()
            .skip(4) // magic, width, height, maxval
            .take(3)
            .map(|v| v.parse().unwrap())
            .collect();
        let png_first_pixel = image::open(&png_path).unwrap().to_rgb8().get_pixel(0, 0).0;

        // Same buffer, opposite first rows.
        assert_eq!(ppm_first_pixel, [0, 253, 0]);
        assert_eq!(png_first_pixel, [253, 0, 0]);
        std::fs::remove_file(&ppm_path).unwrap();
        std::fs::remove_file(&png_path).unwrap();
    }
}
