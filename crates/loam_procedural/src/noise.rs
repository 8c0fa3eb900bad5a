//! # Coherent Noise
//!
//! Deterministic noise sources behind the density field.
//!
//! - `SimplexNoise`: 2D simplex noise for the ground height signal
//! - `GradientNoise`: 3D lattice gradient noise for the ridged cave fields,
//!   seeded per sample and with selectable interpolation quality
//!
//! ## Determinism Guarantee
//!
//! Given the same seed, both sources produce **exactly** the same values
//! on any platform, any time. Nothing here reads global state.

use serde::{Deserialize, Serialize};

/// Root of every random stream in a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Wraps a raw seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Seed from the signed value used in terrain settings.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn from_signed(seed: i32) -> Self {
        Self(seed as u32 as u64)
    }

    /// Raw seed.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose (e.g., ground noise).
    ///
    /// Streams derived with distinct purposes do not correlate.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        // multiply, then fold the high half down
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0xDEAD_BEEF_CAFE_BABE)
    }
}

/// Shuffled byte lattice shared by all corners of a [`SimplexNoise`].
struct Lattice {
    perm: [u8; 512],
}

impl Lattice {
    /// Eight compass directions, then the four axes again.
    const DIRECTIONS: [(f64, f64); 12] = [
        (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (-1.0, 1.0),
        (-1.0, 0.0), (-1.0, -1.0), (0.0, -1.0), (1.0, -1.0),
        (1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0),
    ];

    #[allow(clippy::cast_possible_truncation)]
    fn shuffled(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];
        let mut state = seed.value() | 1;
        let mut order: [u8; 256] = std::array::from_fn(|i| i as u8);
        for i in (1..order.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            order.swap(i, (state % (i as u64 + 1)) as usize);
        }
        perm[..256].copy_from_slice(&order);
        perm[256..].copy_from_slice(&order);
        Self { perm }
    }

    /// Direction for lattice point `(i, j)`, both already wrapped to 0..256.
    #[inline]
    fn direction(&self, i: usize, j: usize) -> (f64, f64) {
        let hash = self.perm[i + usize::from(self.perm[j])];
        Self::DIRECTIONS[usize::from(hash) % Self::DIRECTIONS.len()]
    }
}

/// 2D Simplex noise generator.
///
/// Smooth, seeded and bounded to [-1, 1].
///
/// ```rust,ignore
/// let noise = SimplexNoise::new(WorldSeed::new(42));
/// assert!(noise.sample(100.5, 200.3).abs() <= 1.0);
/// ```
pub struct SimplexNoise {
    lattice: Lattice,
}

impl SimplexNoise {
    /// `(sqrt(3) - 1) / 2`
    const SKEW: f64 = 0.366_025_403_784_439;
    /// `(3 - sqrt(3)) / 6`
    const UNSKEW: f64 = 0.211_324_865_405_187;
    /// Brings the summed corner falloffs back to [-1, 1].
    const SCALE: f64 = 70.0;

    /// Builds the lattice for a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            lattice: Lattice::shuffled(seed),
        }
    }

    /// Samples the field at `(x, y)`.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let stretch = (x + y) * Self::SKEW;
        let cell_x = fast_floor(x + stretch);
        let cell_y = fast_floor(y + stretch);
        let squash = f64::from(cell_x.wrapping_add(cell_y)) * Self::UNSKEW;
        let dx = x - f64::from(cell_x) + squash;
        let dy = y - f64::from(cell_y) + squash;

        // Middle corner depends on which half of the rhombus we are in.
        let middle = if dx > dy { (1, 0) } else { (0, 1) };
        let base_x = (cell_x & 255) as usize;
        let base_y = (cell_y & 255) as usize;

        let sum: f64 = [(0, 0), middle, (1, 1)]
            .into_iter()
            .map(|(ox, oy): (usize, usize)| {
                let steps = (ox + oy) as f64;
                let cx = dx - ox as f64 + steps * Self::UNSKEW;
                let cy = dy - oy as f64 + steps * Self::UNSKEW;
                let falloff = 0.5 - cx * cx - cy * cy;
                if falloff <= 0.0 {
                    return 0.0;
                }
                let (gx, gy) = self.lattice.direction(base_x + ox, base_y + oy);
                falloff.powi(4) * (cx * gx + cy * gy)
            })
            .sum();

        Self::SCALE * sum
    }
}

/// Interpolation used between lattice points of [`GradientNoise`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseQuality {
    /// Linear blend. Visible creases along lattice planes.
    Fast,
    /// Cubic s-curve.
    #[default]
    Standard,
    /// Quintic s-curve, continuous second derivative.
    Best,
}

impl NoiseQuality {
    /// Maps a lattice fraction in [0, 1] onto the interpolation weight.
    #[inline]
    #[must_use]
    pub fn ease(self, t: f64) -> f64 {
        match self {
            Self::Fast => t,
            Self::Standard => t * t * (3.0 - 2.0 * t),
            Self::Best => t * t * t * (t * (t * 6.0 - 15.0) + 10.0),
        }
    }
}

/// 3D lattice gradient noise.
///
/// Stateless: the seed is mixed into the lattice hash on every sample, so
/// two cave fields with different seeds never correlate. Output magnitude
/// is bounded by 2 and is zero on every integer lattice point.
#[derive(Clone, Copy, Debug, Default)]
pub struct GradientNoise;

impl GradientNoise {
    const X_GEN: i32 = 1619;
    const Y_GEN: i32 = 31337;
    const Z_GEN: i32 = 6971;
    const SEED_GEN: i32 = 1013;
    const SHIFT: u32 = 8;

    /// Cube edge midpoints.
    const GRADIENTS: [[f64; 3]; 12] = [
        [1.0, 1.0, 0.0], [-1.0, 1.0, 0.0], [1.0, -1.0, 0.0], [-1.0, -1.0, 0.0],
        [1.0, 0.0, 1.0], [-1.0, 0.0, 1.0], [1.0, 0.0, -1.0], [-1.0, 0.0, -1.0],
        [0.0, 1.0, 1.0], [0.0, -1.0, 1.0], [0.0, 1.0, -1.0], [0.0, -1.0, -1.0],
    ];

    /// Samples the noise at a point.
    #[must_use]
    pub fn sample(x: f64, y: f64, z: f64, seed: i32, quality: NoiseQuality) -> f64 {
        let x0 = fast_floor(x);
        let y0 = fast_floor(y);
        let z0 = fast_floor(z);
        let x1 = x0.wrapping_add(1);
        let y1 = y0.wrapping_add(1);
        let z1 = z0.wrapping_add(1);

        let xs = quality.ease(x - f64::from(x0));
        let ys = quality.ease(y - f64::from(y0));
        let zs = quality.ease(z - f64::from(z0));

        let corner = |ix: i32, iy: i32, iz: i32| Self::lattice(x, y, z, ix, iy, iz, seed);

        let a = lerp(corner(x0, y0, z0), corner(x1, y0, z0), xs);
        let b = lerp(corner(x0, y1, z0), corner(x1, y1, z0), xs);
        let near = lerp(a, b, ys);

        let a = lerp(corner(x0, y0, z1), corner(x1, y0, z1), xs);
        let b = lerp(corner(x0, y1, z1), corner(x1, y1, z1), xs);
        let far = lerp(a, b, ys);

        lerp(near, far, zs)
    }

    /// Dot product of a lattice point's gradient with the offset to `(x, y, z)`.
    #[inline]
    #[allow(clippy::cast_sign_loss)]
    fn lattice(x: f64, y: f64, z: f64, ix: i32, iy: i32, iz: i32, seed: i32) -> f64 {
        let mut hash = Self::X_GEN
            .wrapping_mul(ix)
            .wrapping_add(Self::Y_GEN.wrapping_mul(iy))
            .wrapping_add(Self::Z_GEN.wrapping_mul(iz))
            .wrapping_add(Self::SEED_GEN.wrapping_mul(seed));
        hash ^= hash >> Self::SHIFT;
        let g = Self::GRADIENTS[(hash & 0xff) as usize % 12];

        g[0] * (x - f64::from(ix)) + g[1] * (y - f64::from(iy)) + g[2] * (z - f64::from(iz))
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Floor without the NaN and infinity handling of `f64::floor`.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) {
        xi - 1
    } else {
        xi
    }
}
