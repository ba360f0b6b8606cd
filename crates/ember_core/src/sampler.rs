//! Antialiasing / Monte Carlo sampling patterns.
//!
//! A `Sampler` pregenerates its point set on the unit square at construction
//! time; render code then walks the set through an explicit `SampleState`
//! held by the caller, so the same sampler can be shared read-only between
//! the view plane, material channels, and lights.

use glam::Vec2;
use rand::Rng;

/// The closed set of sampling patterns understood by the project format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplerKind {
    Regular,
    PureRandom,
    Jittered,
    MultiJittered,
    NRooks,
    Hammersley,
    Halton,
}

impl SamplerKind {
    /// Type tag as written in project files.
    pub fn as_str(self) -> &'static str {
        match self {
            SamplerKind::Regular => "regular",
            SamplerKind::PureRandom => "pure_random",
            SamplerKind::Jittered => "jittered",
            SamplerKind::MultiJittered => "multi_jittered",
            SamplerKind::NRooks => "nrooks",
            SamplerKind::Hammersley => "hammersley",
            SamplerKind::Halton => "halton",
        }
    }

    pub fn from_str(tag: &str) -> Option<Self> {
        match tag {
            "regular" => Some(SamplerKind::Regular),
            "pure_random" => Some(SamplerKind::PureRandom),
            "jittered" => Some(SamplerKind::Jittered),
            "multi_jittered" => Some(SamplerKind::MultiJittered),
            "nrooks" => Some(SamplerKind::NRooks),
            "hammersley" => Some(SamplerKind::Hammersley),
            "halton" => Some(SamplerKind::Halton),
            _ => None,
        }
    }
}

/// Per-caller cursor into a sampler's point set.
///
/// Samplers are shared between consumers, so each consumer threads its own
/// cursor explicitly instead of the sampler keeping hidden state.
#[derive(Clone, Copy, Debug, Default)]
pub struct SampleState {
    pub jump: usize,
    pub count: usize,
}

/// A 2D point-pattern generator.
#[derive(Clone, Debug)]
pub struct Sampler {
    kind: SamplerKind,
    num_samples: u32,
    points: Vec<Vec2>,
}

impl Sampler {
    pub fn new(kind: SamplerKind, num_samples: u32) -> Self {
        assert!(num_samples >= 1, "a sampler needs at least one sample");

        let mut rng = rand::thread_rng();
        let points = match kind {
            SamplerKind::Regular => regular(num_samples),
            SamplerKind::PureRandom => pure_random(num_samples, &mut rng),
            SamplerKind::Jittered => jittered(num_samples, &mut rng),
            SamplerKind::MultiJittered => multi_jittered(num_samples, &mut rng),
            SamplerKind::NRooks => nrooks(num_samples, &mut rng),
            SamplerKind::Hammersley => hammersley(num_samples),
            SamplerKind::Halton => halton(num_samples),
        };

        Self { kind, num_samples, points }
    }

    pub fn kind(&self) -> SamplerKind {
        self.kind
    }

    pub fn num_samples(&self) -> u32 {
        self.num_samples
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Next point on the unit square, advancing the caller's state.
    pub fn sample_unit_square(&self, state: &mut SampleState) -> Vec2 {
        let index = (state.jump + state.count) % self.points.len();
        state.count += 1;
        if state.count % self.points.len() == 0 {
            state.jump = state.jump.wrapping_add(self.points.len() / 2 + 1);
        }
        self.points[index]
    }
}

fn grid_side(num_samples: u32) -> u32 {
    (num_samples as f32).sqrt().floor().max(1.0) as u32
}

fn regular(num_samples: u32) -> Vec<Vec2> {
    let n = grid_side(num_samples);
    let mut points = Vec::with_capacity((n * n) as usize);
    for y in 0..n {
        for x in 0..n {
            points.push(Vec2::new(
                (x as f32 + 0.5) / n as f32,
                (y as f32 + 0.5) / n as f32,
            ));
        }
    }
    points
}

fn pure_random(num_samples: u32, rng: &mut impl Rng) -> Vec<Vec2> {
    (0..num_samples)
        .map(|_| Vec2::new(rng.gen::<f32>(), rng.gen::<f32>()))
        .collect()
}

fn jittered(num_samples: u32, rng: &mut impl Rng) -> Vec<Vec2> {
    let n = grid_side(num_samples);
    let mut points = Vec::with_capacity((n * n) as usize);
    for y in 0..n {
        for x in 0..n {
            points.push(Vec2::new(
                (x as f32 + rng.gen::<f32>()) / n as f32,
                (y as f32 + rng.gen::<f32>()) / n as f32,
            ));
        }
    }
    points
}

fn multi_jittered(num_samples: u32, rng: &mut impl Rng) -> Vec<Vec2> {
    // Jittered on the coarse n x n grid, with each point jittered again
    // inside an n x n sub-grid of its cell. The sub-cell indices are a
    // fresh permutation of 0..n per cell row (x) and per cell column (y),
    // which keeps the n-rooks projection property while every point stays
    // inside its own 1/n cell.
    let n = grid_side(num_samples) as usize;
    let cell = 1.0 / n as f32;
    let subcell = cell / n as f32;

    let mut points = vec![Vec2::ZERO; n * n];
    for row in 0..n {
        let mut x_sub: Vec<usize> = (0..n).collect();
        shuffle(&mut x_sub, rng);
        for col in 0..n {
            points[row * n + col].x =
                col as f32 * cell + (x_sub[col] as f32 + rng.gen::<f32>()) * subcell;
        }
    }
    for col in 0..n {
        let mut y_sub: Vec<usize> = (0..n).collect();
        shuffle(&mut y_sub, rng);
        for row in 0..n {
            points[row * n + col].y =
                row as f32 * cell + (y_sub[row] as f32 + rng.gen::<f32>()) * subcell;
        }
    }
    points
}

fn nrooks(num_samples: u32, rng: &mut impl Rng) -> Vec<Vec2> {
    let n = num_samples as usize;
    let mut points: Vec<Vec2> = (0..n)
        .map(|i| {
            Vec2::new(
                (i as f32 + rng.gen::<f32>()) / n as f32,
                (i as f32 + rng.gen::<f32>()) / n as f32,
            )
        })
        .collect();

    // Shuffle each coordinate independently off the diagonal.
    for i in (1..n).rev() {
        let target = rng.gen_range(0..=i);
        let x = points[i].x;
        points[i].x = points[target].x;
        points[target].x = x;

        let target = rng.gen_range(0..=i);
        let y = points[i].y;
        points[i].y = points[target].y;
        points[target].y = y;
    }
    points
}

fn hammersley(num_samples: u32) -> Vec<Vec2> {
    let n = num_samples;
    (0..n)
        .map(|i| Vec2::new(i as f32 / n as f32, radical_inverse(i, 2)))
        .collect()
}

fn halton(num_samples: u32) -> Vec<Vec2> {
    // Skip index 0 so the first point is not the square's corner.
    (1..=num_samples)
        .map(|i| Vec2::new(radical_inverse(i, 2), radical_inverse(i, 3)))
        .collect()
}

fn radical_inverse(mut index: u32, base: u32) -> f32 {
    let inv_base = 1.0 / base as f32;
    let mut inv_digit = inv_base;
    let mut result = 0.0;
    while index > 0 {
        result += (index % base) as f32 * inv_digit;
        index /= base;
        inv_digit *= inv_base;
    }
    result
}

fn shuffle(values: &mut [usize], rng: &mut impl Rng) {
    for i in (1..values.len()).rev() {
        values.swap(i, rng.gen_range(0..=i));
    }
}
