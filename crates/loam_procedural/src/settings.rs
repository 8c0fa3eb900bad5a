//! # Terrain Settings
//!
//! Parameter bundles for the density field, loaded from the `[terrain]`
//! table of a world config.
//!
//! Settings are plain data. [`NoiseSettings::sanitized`] clamps every field
//! into its legal range so that degenerate input (zero smoothness, NaN gain,
//! absurd octave counts) yields odd-looking terrain rather than a panic.

use serde::{Deserialize, Serialize};

use crate::noise::NoiseQuality;

/// Upper bound on octaves for any noise field.
pub const MAX_OCTAVES: usize = 16;

/// Ground height-field parameters plus the two cave fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    /// Offset added to world coordinates before sampling.
    pub seed: i32,
    /// Base terrain height added to the rescaled noise.
    pub ground_height: i32,
    /// Height multiplier for the rescaled noise.
    pub amplitude: f64,
    /// Detail. Octaves `0..octaves-1` are summed.
    pub octaves: u32,
    /// Horizontal stretch; larger is smoother.
    pub smoothness: f64,
    /// Per-octave amplitude factor.
    pub roughness: f64,
    /// Tree density in percent per candidate column. Zero disables trees.
    pub tree_frequency: u32,
    /// First cave field.
    pub cave_one: RidgedNoiseSettings,
    /// Second cave field. Both must open for a cave to carve.
    pub cave_two: RidgedNoiseSettings,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            ground_height: 40,
            amplitude: 30.0,
            octaves: 5,
            smoothness: 200.0,
            roughness: 0.5,
            tree_frequency: 0,
            cave_one: RidgedNoiseSettings {
                seed: 1,
                ..RidgedNoiseSettings::default()
            },
            cave_two: RidgedNoiseSettings {
                seed: 2,
                smoothness: 60.0,
                ..RidgedNoiseSettings::default()
            },
        }
    }
}

impl NoiseSettings {
    /// Perfectly flat terrain whose topmost solid layer is `height`, no caves.
    ///
    /// Handy for tests and benchmarks where noise would get in the way.
    #[must_use]
    pub fn flat(height: i32) -> Self {
        Self {
            ground_height: height - 1,
            amplitude: 1.0,
            octaves: 1,
            cave_one: RidgedNoiseSettings::closed(),
            cave_two: RidgedNoiseSettings::closed(),
            ..Self::default()
        }
    }

    /// Returns a copy with every field clamped into its legal range.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            seed: self.seed,
            ground_height: self.ground_height.clamp(-255, 255),
            amplitude: clamp_finite(self.amplitude, 1.0, 200.0, 1.0),
            octaves: self.octaves.clamp(1, MAX_OCTAVES as u32),
            smoothness: clamp_finite(self.smoothness, 1.0, 3000.0, 1.0),
            roughness: clamp_finite(self.roughness, 0.0, 2.0, 1.0),
            tree_frequency: self.tree_frequency.min(100),
            cave_one: self.cave_one.sanitized(),
            cave_two: self.cave_two.sanitized(),
        }
    }
}

/// Ridged multifractal parameters for one cave field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidgedNoiseSettings {
    /// Lattice seed and coordinate offset.
    pub seed: i32,
    /// Number of octaves, at most [`MAX_OCTAVES`].
    pub octaves: u32,
    /// Base frequency applied to world coordinates.
    pub frequency: f64,
    /// Divisor applied to coordinates inside each octave.
    pub smoothness: f64,
    /// Spectral weight falloff, `weight[i] = lacunarity^(-i * exponent)`.
    pub exponent: f64,
    /// Feedback from one octave's signal into the next octave's weight.
    pub gain: f64,
    /// Ridge height; the signal is `offset - |noise|`.
    pub offset: f64,
    /// Output multiplier.
    pub amplitude: f64,
    /// Added to the output after scaling.
    pub height_offset: f64,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Lattice interpolation quality.
    pub quality: NoiseQuality,
    /// Below this height the field is closed.
    pub low_cutoff: i32,
    /// Above this height the field is closed.
    pub high_cutoff: i32,
}

impl Default for RidgedNoiseSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 4,
            frequency: 1.0,
            smoothness: 40.0,
            exponent: 1.0,
            gain: 2.0,
            offset: 1.0,
            amplitude: 60.0,
            height_offset: 0.0,
            lacunarity: 2.0,
            quality: NoiseQuality::Standard,
            low_cutoff: 4,
            high_cutoff: 128,
        }
    }
}

impl RidgedNoiseSettings {
    /// A field that never opens above the bedrock floor.
    #[must_use]
    pub fn closed() -> Self {
        Self {
            low_cutoff: 0,
            high_cutoff: 0,
            ..Self::default()
        }
    }

    /// Number of octaves actually evaluated.
    #[inline]
    #[must_use]
    pub fn octave_count(&self) -> usize {
        (self.octaves as usize).clamp(1, MAX_OCTAVES)
    }

    /// Per-octave spectral weights.
    ///
    /// `weights[i] = f^-exponent` where `f` starts at 1 and is multiplied by
    /// `lacunarity` each octave.
    #[must_use]
    pub fn spectral_weights(&self) -> [f64; MAX_OCTAVES] {
        let mut weights = [0.0; MAX_OCTAVES];
        let mut frequency = 1.0_f64;
        for weight in &mut weights {
            *weight = frequency.powf(-self.exponent);
            frequency *= self.lacunarity;
        }
        weights
    }

    /// Returns a copy with every field clamped into its legal range.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            seed: self.seed,
            octaves: self.octaves.clamp(1, MAX_OCTAVES as u32),
            frequency: clamp_finite(self.frequency, 0.1, 100.0, 1.0),
            smoothness: clamp_finite(self.smoothness, 1.0, 3000.0, 1.0),
            exponent: clamp_finite(self.exponent, 0.1, 3.0, 1.0),
            gain: clamp_finite(self.gain, 0.1, 10.0, 2.0),
            offset: clamp_finite(self.offset, 0.0, 10.0, 1.0),
            amplitude: clamp_finite(self.amplitude, 0.1, 200.0, 2.0),
            height_offset: clamp_finite(self.height_offset, -255.0, 255.0, 0.0),
            lacunarity: clamp_finite(self.lacunarity, 0.1, 4.0, 2.0),
            quality: self.quality,
            low_cutoff: self.low_cutoff.clamp(0, 256),
            high_cutoff: self.high_cutoff.clamp(0, 256),
        }
    }
}

/// Clamps `value` into `[min, max]`, replacing NaN and infinities by `fallback`.
#[inline]
fn clamp_finite(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectral_weights() {
        let settings = RidgedNoiseSettings {
            exponent: 1.0,
            lacunarity: 2.0,
            ..RidgedNoiseSettings::default()
        };
        let weights = settings.spectral_weights();
        assert!((weights[0] - 1.0).abs() < 1e-12);
        assert!((weights[1] - 0.5).abs() < 1e-12);
        assert!((weights[3] - 0.125).abs() < 1e-12);
        assert!(weights.iter().all(|w| w.is_finite() && *w > 0.0));
    }

    #[test]
    fn test_weights_follow_parameters() {
        let a = RidgedNoiseSettings::default().spectral_weights();
        let b = RidgedNoiseSettings {
            exponent: 2.0,
            ..RidgedNoiseSettings::default()
        }
        .spectral_weights();
        assert!((b[1] - 0.25).abs() < 1e-12);
        assert_ne!(a, b);
    }

    #[test]
    fn test_sanitize_clamps_degenerate_values() {
        let settings = NoiseSettings {
            amplitude: f64::NAN,
            octaves: 0,
            smoothness: 0.0,
            roughness: -3.0,
            tree_frequency: 1000,
            cave_one: RidgedNoiseSettings {
                octaves: 99,
                lacunarity: 0.0,
                gain: f64::INFINITY,
                high_cutoff: 9000,
                ..RidgedNoiseSettings::default()
            },
            ..NoiseSettings::default()
        }
        .sanitized();

        assert!((settings.amplitude - 1.0).abs() < f64::EPSILON);
        assert_eq!(settings.octaves, 1);
        assert!((settings.smoothness - 1.0).abs() < f64::EPSILON);
        assert!(settings.roughness.abs() < f64::EPSILON);
        assert_eq!(settings.tree_frequency, 100);
        assert_eq!(settings.cave_one.octave_count(), MAX_OCTAVES);
        assert!((settings.cave_one.lacunarity - 0.1).abs() < f64::EPSILON);
        assert!((settings.cave_one.gain - 2.0).abs() < f64::EPSILON);
        assert_eq!(settings.cave_one.high_cutoff, 256);
    }

    #[test]
    fn test_sanitize_keeps_defaults() {
        let defaults = NoiseSettings::default();
        assert_eq!(defaults.sanitized(), defaults);
    }

    #[test]
    fn test_settings_from_toml() {
        let text = r#"
            seed = 77
            ground_height = 12
            octaves = 3

            [cave_one]
            seed = 5
            quality = "best"
            high_cutoff = 64
        "#;
        let settings: NoiseSettings = toml::from_str(text).unwrap();
        assert_eq!(settings.seed, 77);
        assert_eq!(settings.ground_height, 12);
        assert_eq!(settings.octaves, 3);
        assert_eq!(settings.cave_one.quality, NoiseQuality::Best);
        assert_eq!(settings.cave_one.high_cutoff, 64);
        assert_eq!(settings.cave_two, NoiseSettings::default().cave_two);
    }
}
