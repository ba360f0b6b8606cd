//! Tile and sample scheduling.
//!
//! `TileWalk` is the pure per-worker schedule: given a thread id and the
//! frame/tile geometry, it enumerates (tile, sample pass) pairs with no
//! shared state. The partition is a static stride over the tile grid —
//! worker `t` owns tile indices `t, t + num_threads, t + 2 * num_threads,
//! ...` within every sample pass — so distinct workers can never claim
//! overlapping pixels in the same pass and the frame buffer needs no
//! locking.

/// A rectangular sub-region of the frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Tile {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// One step of a worker's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStep {
    /// Render this tile for this sample pass.
    Tile { tile: Tile, sample: u32 },
    /// The worker has covered every tile of every pass; terminal.
    Finished,
}

/// Per-worker tile/sample cursor.
#[derive(Debug, Clone)]
pub struct TileWalk {
    thread_id: u32,
    num_threads: u32,
    width: u32,
    height: u32,
    tile_size: u32,
    max_samples: u32,
    num_columns: u32,
    num_rows: u32,
    iteration: u32,
    sample: u32,
    finished: bool,
}

impl TileWalk {
    pub fn new(
        thread_id: u32,
        num_threads: u32,
        width: u32,
        height: u32,
        tile_size: u32,
        max_samples: u32,
    ) -> Self {
        assert!(num_threads >= 1, "need at least one worker");
        assert!(thread_id < num_threads, "thread id out of range");
        assert!(tile_size >= 1, "tile size must be positive");
        assert!(width >= 1 && height >= 1, "frame dimensions must be positive");
        assert!(max_samples >= 1, "need at least one sample pass");

        // The +1 keeps a partial trailing column/row in the grid; for
        // exact-multiple dimensions it also admits an extra rank of empty
        // tiles, which clip to zero size below.
        let num_columns = width / tile_size + 1;
        let num_rows = height / tile_size + 1;

        Self {
            thread_id,
            num_threads,
            width,
            height,
            tile_size,
            max_samples,
            num_columns,
            num_rows,
            iteration: 0,
            sample: 0,
            finished: false,
        }
    }

    /// Advance to the worker's next tile.
    pub fn step(&mut self) -> WalkStep {
        if self.finished {
            return WalkStep::Finished;
        }

        loop {
            let index = self.iteration * self.num_threads + self.thread_id;
            let column = index % self.num_columns;
            let row = index / self.num_columns;

            if row >= self.num_rows {
                // Full grid covered for this sample; start the next pass.
                // The strict `>` admits max_samples + 1 passes; kept as the
                // original scheduler behaved.
                self.iteration = 0;
                self.sample += 1;
                if self.sample > self.max_samples {
                    self.finished = true;
                    return WalkStep::Finished;
                }
                continue;
            }

            let x = column * self.tile_size;
            let y = row * self.tile_size;
            let tile = Tile {
                x,
                y,
                width: self.tile_size.min(self.width - x),
                height: self.tile_size.min(self.height - y),
            };
            self.iteration += 1;
            return WalkStep::Tile { tile, sample: self.sample };
        }
    }

    /// Fraction of this worker's schedule completed, in `[0, 1]`.
    ///
    /// Monotonically non-decreasing across `step` calls; exactly `1.0`
    /// once the walk is finished.
    pub fn progress(&self) -> f32 {
        if self.finished {
            return 1.0;
        }
        let tiles_per_pass = (self.num_columns * self.num_rows) as f32;
        // The extra terminal pass would push this past 1.0; clamp it.
        ((self.sample as f32 + self.iteration as f32 / tiles_per_pass) / self.max_samples as f32)
            .min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collect every non-empty tile a worker yields for sample pass 0.
    fn pass_tiles(walk: &mut TileWalk) -> Vec<Tile> {
        let mut tiles = Vec::new();
        loop {
            match walk.step() {
                WalkStep::Tile { tile, sample: 0 } => {
                    if !tile.is_empty() {
                        tiles.push(tile);
                    }
                }
                _ => break,
            }
        }
        tiles
    }

    #[test]
    fn test_partition_covers_frame_without_overlap() {
        for &(width, height, tile_size, num_threads) in &[
            (64u32, 48u32, 16u32, 1u32),
            (64, 48, 16, 3),
            (100, 75, 16, 4),
            (33, 17, 8, 5),
            (16, 16, 16, 2),
            (5, 5, 16, 2), // single tile smaller than tile_size
        ] {
            let mut claims = vec![0u8; (width * height) as usize];
            for t in 0..num_threads {
                let mut walk = TileWalk::new(t, num_threads, width, height, tile_size, 1);
                for tile in pass_tiles(&mut walk) {
                    for y in tile.y..tile.y + tile.height {
                        for x in tile.x..tile.x + tile.width {
                            claims[(y * width + x) as usize] += 1;
                        }
                    }
                }
            }
            assert!(
                claims.iter().all(|&c| c == 1),
                "partition broken for {width}x{height} tile={tile_size} threads={num_threads}"
            );
        }
    }

    #[test]
    fn test_stripes_are_disjoint_across_workers() {
        let num_threads = 4;
        let mut seen = std::collections::HashSet::new();
        for t in 0..num_threads {
            let mut walk = TileWalk::new(t, num_threads, 128, 96, 16, 1);
            for tile in pass_tiles(&mut walk) {
                assert!(seen.insert((tile.x, tile.y)), "tile {tile:?} claimed twice");
            }
        }
    }

    #[test]
    fn test_terminal_pass_count_off_by_one() {
        // A worker sweeps the grid max_samples + 1 times before finishing.
        let max_samples = 2;
        let mut walk = TileWalk::new(0, 1, 32, 32, 16, max_samples);
        let mut passes_seen = std::collections::HashSet::new();
        loop {
            match walk.step() {
                WalkStep::Tile { sample, .. } => {
                    passes_seen.insert(sample);
                }
                WalkStep::Finished => break,
            }
        }
        assert_eq!(passes_seen.len() as u32, max_samples + 1);
        assert_eq!(walk.step(), WalkStep::Finished, "Finished is terminal");
    }

    #[test]
    fn test_progress_monotonic_and_complete() {
        let mut walk = TileWalk::new(1, 3, 50, 40, 16, 4);
        let mut last = walk.progress();
        assert!(last >= 0.0);
        loop {
            let step = walk.step();
            let progress = walk.progress();
            assert!(
                progress >= last,
                "progress went backwards: {last} -> {progress}"
            );
            assert!(progress <= 1.0, "progress overshot: {progress}");
            last = progress;
            if step == WalkStep::Finished {
                break;
            }
        }
        assert_eq!(walk.progress(), 1.0);
    }

    #[test]
    #[should_panic(expected = "at least one sample pass")]
    fn test_zero_sample_passes_rejected() {
        TileWalk::new(0, 1, 32, 32, 16, 0);
    }

    #[test]
    fn test_tiles_clipped_to_frame() {
        let mut walk = TileWalk::new(0, 1, 100, 70, 16, 1);
        loop {
            match walk.step() {
                WalkStep::Tile { tile, .. } => {
                    assert!(tile.x + tile.width <= 100);
                    assert!(tile.y + tile.height <= 70);
                }
                WalkStep::Finished => break,
            }
        }
    }
}
