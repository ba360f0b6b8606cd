//! The shared frame buffer.
//!
//! A flat `width * height` grid of linear RGB pixels. During a render the
//! buffer has concurrent writers, but they are coordinated without locks:
//! the scheduler's static strided partition guarantees that no two workers
//! ever hold tiles with overlapping pixels in the same pass, and every
//! write goes through a `TileWriter` that is confined to its tile
//! rectangle. Readers (progress previews, exporters) may observe a pixel
//! that is mid-accumulation for the current sample pass; that value is a
//! legitimate in-progress approximation, not torn memory, because a pixel
//! only ever has one writer.

use std::cell::UnsafeCell;

use ember_core::RgbColor;

use crate::tile::Tile;

pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Box<[UnsafeCell<RgbColor>]>,
}

// Concurrent access is restricted to disjoint tiles; see module docs.
unsafe impl Sync for FrameBuffer {}

impl FrameBuffer {
    /// Allocate a zeroed buffer.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0, "frame width must be positive");
        assert!(height > 0, "frame height must be positive");
        let pixels = (0..width as usize * height as usize)
            .map(|_| UnsafeCell::new(RgbColor::BLACK))
            .collect();
        Self { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn num_pixels(&self) -> usize {
        self.pixels.len()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    /// Read a pixel. During a render this may return a value that is still
    /// being refined by the owning worker.
    pub fn get(&self, x: u32, y: u32) -> RgbColor {
        let slot = &self.pixels[self.index(x, y)];
        unsafe { *slot.get() }
    }

    /// Write a pixel through exclusive access (no render in flight).
    pub fn set(&mut self, x: u32, y: u32, color: RgbColor) {
        let index = self.index(x, y);
        *self.pixels[index].get_mut() = color;
    }

    /// Zero every pixel. Resets are always explicit; neither construction
    /// nor a render start clears the buffer behind the caller's back.
    pub fn reset(&mut self) {
        for slot in self.pixels.iter_mut() {
            *slot.get_mut() = RgbColor::BLACK;
        }
    }

    /// Store a pixel from a worker thread.
    ///
    /// # Safety
    ///
    /// The caller must be the only writer of `(x, y)` for the duration of
    /// the render, which `TileWriter` guarantees by construction under the
    /// scheduler's disjoint-tile partition.
    pub(crate) unsafe fn store(&self, x: u32, y: u32, color: RgbColor) {
        let slot = &self.pixels[self.index(x, y)];
        *slot.get() = color;
    }
}

/// Write access to one tile of the frame buffer.
///
/// Handed to a tracer per (tile, sample pass); every access is checked
/// against the tile rectangle, so a tracer cannot touch pixels outside the
/// region the scheduler assigned to it.
pub struct TileWriter<'a> {
    frame: &'a FrameBuffer,
    tile: Tile,
}

impl<'a> TileWriter<'a> {
    pub(crate) fn new(frame: &'a FrameBuffer, tile: Tile) -> Self {
        debug_assert!(tile.x + tile.width <= frame.width());
        debug_assert!(tile.y + tile.height <= frame.height());
        Self { frame, tile }
    }

    pub fn tile(&self) -> Tile {
        self.tile
    }

    /// Current value of a pixel inside the tile (frame coordinates).
    pub fn get(&self, x: u32, y: u32) -> RgbColor {
        assert!(self.tile.contains(x, y), "pixel ({x}, {y}) outside tile {:?}", self.tile);
        self.frame.get(x, y)
    }

    /// Store a pixel inside the tile (frame coordinates).
    pub fn set(&mut self, x: u32, y: u32, color: RgbColor) {
        assert!(self.tile.contains(x, y), "pixel ({x}, {y}) outside tile {:?}", self.tile);
        unsafe { self.frame.store(x, y, color) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let frame = FrameBuffer::new(4, 3);
        assert_eq!(frame.num_pixels(), 12);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(frame.get(x, y), RgbColor::BLACK);
            }
        }
    }

    #[test]
    fn test_set_get_reset() {
        let mut frame = FrameBuffer::new(2, 2);
        frame.set(1, 0, RgbColor::WHITE);
        assert_eq!(frame.get(1, 0), RgbColor::WHITE);
        frame.reset();
        assert_eq!(frame.get(1, 0), RgbColor::BLACK);
    }

    #[test]
    fn test_tile_writer_confined() {
        let frame = FrameBuffer::new(8, 8);
        let tile = Tile { x: 2, y: 2, width: 2, height: 2 };
        let mut writer = TileWriter::new(&frame, tile);
        writer.set(3, 3, RgbColor::WHITE);
        assert_eq!(frame.get(3, 3), RgbColor::WHITE);
    }

    #[test]
    #[should_panic(expected = "outside tile")]
    fn test_tile_writer_rejects_outside_pixel() {
        let frame = FrameBuffer::new(8, 8);
        let tile = Tile { x: 0, y: 0, width: 2, height: 2 };
        let mut writer = TileWriter::new(&frame, tile);
        writer.set(5, 5, RgbColor::WHITE);
    }
}
