//! # Density Field
//!
//! Turns noise settings into per-cell solidity.
//!
//! ## Signals
//!
//! - **Ground**: a 2D fractal sum per column, rescaled into an elevation
//!   threshold. A cell is ground-solid (`+1`) when the threshold exceeds the
//!   vertical gradient at its height, otherwise `-1`.
//! - **Caves**: two independent ridged multifractals. Each is open (`1`)
//!   where its signal exceeds the vertical gradient, otherwise closed (`0`).
//!
//! ## Combination
//!
//! ```text
//! final = ground_solid * flip(open_one * open_two)     flip(v) = v > 0 ? 0 : 1
//! solid = final >= 1
//! ```
//!
//! Both caves must open to carve through ground. All sampling happens in
//! world-absolute coordinates so the field is seamless across chunks.

use crate::coord::{ChunkCoord, CHUNK_HEIGHT};
use crate::noise::{GradientNoise, SimplexNoise, WorldSeed};
use crate::settings::{NoiseSettings, RidgedNoiseSettings, MAX_OCTAVES};

/// Sub-seed purpose for the ground permutation table.
const GROUND_STREAM: u64 = 0x6772_6f75_6e64;

/// Selects one of the two cave fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaveField {
    /// `cave_one` settings.
    One,
    /// `cave_two` settings.
    Two,
}

/// Every signal involved in one cell's solidity verdict.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensitySample {
    /// Column elevation threshold.
    pub elevation: f64,
    /// `+1` below the ground surface, `-1` above.
    pub ground_solid: i32,
    /// Open (`1`) or closed (`0`) verdict per cave field.
    ///
    /// Fields that cannot affect the verdict are not evaluated and read `0`.
    pub cave_open: [i32; 2],
    /// Combined verdict.
    pub solid: bool,
}

/// `0` for positive input, `1` otherwise.
#[inline]
#[must_use]
pub const fn flip(value: i32) -> i32 {
    if value > 0 {
        0
    } else {
        1
    }
}

/// Combines the three sign signals into a solidity verdict.
#[inline]
#[must_use]
pub const fn combine(ground_solid: i32, open_one: i32, open_two: i32) -> bool {
    ground_solid * flip(open_one * open_two) >= 1
}

/// One cave field with its spectral weights cached.
struct RidgedField {
    settings: RidgedNoiseSettings,
    weights: [f64; MAX_OCTAVES],
}

impl RidgedField {
    fn new(settings: &RidgedNoiseSettings) -> Self {
        Self {
            weights: settings.spectral_weights(),
            settings: settings.clone(),
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn signal(&self, world: [f64; 3], y: i32) -> f64 {
        let s = &self.settings;
        if y > s.high_cutoff || y < s.low_cutoff {
            return 0.0;
        }

        let seed = f64::from(s.seed);
        let mut nx = (world[0] + seed) * s.frequency;
        let mut ny = (world[1] + seed) * s.frequency;
        let mut nz = (world[2] + seed) * s.frequency;

        let mut total = 0.0;
        let mut weight = 1.0;
        for (i, spectral) in self.weights.iter().enumerate().take(s.octave_count()) {
            let octave = i as f64;
            let noise = GradientNoise::sample(
                octave + nx / s.smoothness,
                octave + ny / s.smoothness,
                octave + nz / s.smoothness,
                s.seed.wrapping_add(i as i32),
                s.quality,
            );

            let mut signal = s.offset - noise.abs();
            signal *= signal;
            signal *= weight;

            weight = (signal * s.gain).clamp(0.0, 1.0);
            total += signal * spectral;

            nx *= s.lacunarity;
            ny *= s.lacunarity;
            nz *= s.lacunarity;
        }

        let value = (total * 1.25 - 1.0) * s.amplitude + s.height_offset;
        if value > 0.0 {
            value
        } else {
            1.0
        }
    }
}

/// Solidity oracle for one generation pass.
///
/// Built from a settings snapshot; spectral weights and the vertical
/// gradient are computed once here and reused for every cell.
pub struct DensityField {
    settings: NoiseSettings,
    ground: SimplexNoise,
    caves: [RidgedField; 2],
    gradient: [f64; CHUNK_HEIGHT],
}

impl DensityField {
    /// Builds a field from settings, clamping them into legal ranges first.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(settings: &NoiseSettings) -> Self {
        let settings = settings.sanitized();

        // 0..H mapped linearly onto 0..H
        let mut gradient = [0.0; CHUNK_HEIGHT];
        let height = CHUNK_HEIGHT as f64;
        for (y, value) in gradient.iter_mut().enumerate() {
            *value = height * (y as f64 / height);
        }

        Self {
            ground: SimplexNoise::new(WorldSeed::from_signed(settings.seed).derive(GROUND_STREAM)),
            caves: [
                RidgedField::new(&settings.cave_one),
                RidgedField::new(&settings.cave_two),
            ],
            gradient,
            settings,
        }
    }

    /// The sanitized settings this field samples with.
    #[must_use]
    pub fn settings(&self) -> &NoiseSettings {
        &self.settings
    }

    /// Vertical gradient value at a height.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn gradient(&self, y: usize) -> f64 {
        self.gradient.get(y).copied().unwrap_or(y as f64)
    }

    /// Elevation threshold of the column at local `(x, z)` in `coord`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn ground_elevation(&self, coord: ChunkCoord, x: i32, z: i32) -> f64 {
        let s = &self.settings;
        let seed = f64::from(s.seed);
        let wx = world_axis(coord.world_x()) + f64::from(x) + seed;
        let wz = world_axis(coord.world_z()) + f64::from(z) + seed;

        let mut sum = 0.0;
        for i in 0..s.octaves.saturating_sub(1) {
            let octave = f64::from(i);
            let frequency = 2.0_f64.powi(i as i32);
            sum += self.ground.sample(
                octave + wx * frequency / s.smoothness,
                octave + wz * frequency / s.smoothness,
            ) * s.roughness.powi(i as i32);
        }

        let value = ((sum / 2.1) + 1.2) * s.amplitude + f64::from(s.ground_height);
        if value > 0.0 {
            value
        } else {
            1.0
        }
    }

    /// Raw ridged signal of one cave field at a local cell.
    #[must_use]
    pub fn cave_signal(&self, field: CaveField, coord: ChunkCoord, x: i32, y: i32, z: i32) -> f64 {
        let world = [
            world_axis(coord.world_x()) + f64::from(x),
            f64::from(y),
            world_axis(coord.world_z()) + f64::from(z),
        ];
        let index = match field {
            CaveField::One => 0,
            CaveField::Two => 1,
        };
        self.caves[index].signal(world, y)
    }

    /// `+1` if `elevation` exceeds the gradient at `y`, else `-1`.
    #[inline]
    #[must_use]
    pub fn ground_solid(&self, elevation: f64, y: usize) -> i32 {
        if elevation > self.gradient(y) {
            1
        } else {
            -1
        }
    }

    /// `1` if a cave `signal` exceeds the gradient at `y`, else `0`.
    #[inline]
    #[must_use]
    pub fn cave_open(&self, signal: f64, y: usize) -> i32 {
        i32::from(signal > self.gradient(y))
    }

    /// Full evaluation of one cell given its column elevation.
    ///
    /// Cave fields are skipped above ground, where they cannot change the
    /// verdict.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn sample_with_elevation(
        &self,
        coord: ChunkCoord,
        elevation: f64,
        x: i32,
        y: usize,
        z: i32,
    ) -> DensitySample {
        let ground_solid = self.ground_solid(elevation, y);
        let mut cave_open = [0, 0];
        if ground_solid > 0 {
            let cy = y as i32;
            cave_open[0] = self.cave_open(self.cave_signal(CaveField::One, coord, x, cy, z), y);
            if cave_open[0] > 0 {
                cave_open[1] = self.cave_open(self.cave_signal(CaveField::Two, coord, x, cy, z), y);
            }
        }

        DensitySample {
            elevation,
            ground_solid,
            cave_open,
            solid: combine(ground_solid, cave_open[0], cave_open[1]),
        }
    }

    /// Full evaluation of one cell.
    #[must_use]
    pub fn sample(&self, coord: ChunkCoord, x: i32, y: usize, z: i32) -> DensitySample {
        let elevation = self.ground_elevation(coord, x, z);
        self.sample_with_elevation(coord, elevation, x, y, z)
    }
}

/// Block coordinate as a sample position. Exact below 2^53.
#[inline]
#[allow(clippy::cast_precision_loss)]
fn world_axis(block: i64) -> f64 {
    block as f64
}
