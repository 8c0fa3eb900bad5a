//! # World Configuration
//!
//! Everything a world needs at startup, loadable from one TOML file:
//!
//! ```toml
//! [streaming]
//! window_size = 9
//! worker_threads = 0
//!
//! [terrain]
//! seed = 1234
//! ground_height = 40
//!
//! [terrain.cave_one]
//! smoothness = 40.0
//!
//! [atlas]
//! texture_size = [256, 256]
//! tile_size = [16, 16]
//! ```
//!
//! Every table and field is optional; missing values take their defaults.

use std::path::Path;

use serde::Deserialize;

use loam_meshing::AtlasConfig;
use loam_procedural::NoiseSettings;

use crate::error::{StreamingError, StreamingResult};

/// Streaming and worker-pool tuning.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Side length of the streaming window in chunks (odd, > 1).
    pub window_size: usize,
    /// Number of background workers. 0 picks one per available core.
    pub worker_threads: usize,
    /// Cap on requests turned into chunks per tick. 0 means unbounded.
    pub max_instantiations_per_tick: usize,
    /// Cap on completions applied per tick. 0 means unbounded.
    pub max_completions_per_tick: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            window_size: 9,
            worker_threads: 0,
            max_instantiations_per_tick: 0,
            max_completions_per_tick: 0,
        }
    }
}

impl StreamingConfig {
    /// Production config: large window, per-tick budgets to keep frames even.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            window_size: 15,
            worker_threads: 0,
            max_instantiations_per_tick: 32,
            max_completions_per_tick: 16,
        }
    }

    /// Testing config: small window, two workers, no budgets.
    #[must_use]
    pub const fn testing() -> Self {
        Self {
            window_size: 3,
            worker_threads: 2,
            max_instantiations_per_tick: 0,
            max_completions_per_tick: 0,
        }
    }

    /// Worker count with `0` resolved against the machine.
    #[must_use]
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }
        std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
    }

    /// Checks the window size.
    ///
    /// # Errors
    ///
    /// Returns [`StreamingError::InvalidWindowSize`] for even sizes and sizes
    /// below 3.
    pub fn validate(&self) -> StreamingResult<()> {
        if self.window_size < 3 || self.window_size % 2 == 0 {
            return Err(StreamingError::InvalidWindowSize {
                size: self.window_size,
            });
        }
        Ok(())
    }
}

/// Complete world configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Window and worker tuning.
    pub streaming: StreamingConfig,
    /// Terrain generation parameters.
    pub terrain: NoiseSettings,
    /// Texture atlas table.
    pub atlas: AtlasConfig,
}

impl WorldConfig {
    /// Parses a world config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`StreamingError::Config`] on malformed TOML and
    /// [`StreamingError::InvalidWindowSize`] on a bad window.
    pub fn from_toml_str(text: &str) -> StreamingResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.streaming.validate()?;
        Ok(config)
    }

    /// Reads and parses a world config file.
    ///
    /// # Errors
    ///
    /// Returns [`StreamingError::Io`] when the file cannot be read, otherwise
    /// see [`WorldConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> StreamingResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(
            path = %path.display(),
            window = config.streaming.window_size,
            seed = config.terrain.seed,
            "world config loaded"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for config in [
            StreamingConfig::default(),
            StreamingConfig::production(),
            StreamingConfig::testing(),
        ] {
            assert!(config.validate().is_ok());
        }
        assert_eq!(StreamingConfig::testing().resolved_worker_threads(), 2);
        assert!(StreamingConfig::default().resolved_worker_threads() >= 1);
    }

    #[test]
    fn test_rejects_bad_window() {
        for size in [0, 1, 2, 8] {
            let config = StreamingConfig {
                window_size: size,
                ..StreamingConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(StreamingError::InvalidWindowSize { size: s }) if s == size
            ));
        }
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = WorldConfig::from_toml_str("").unwrap();
        assert_eq!(config, WorldConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = WorldConfig::from_toml_str(
            r"
            [streaming]
            window_size = 5

            [terrain]
            seed = 77
            ground_height = 12

            [terrain.cave_two]
            smoothness = 10.0
            ",
        )
        .unwrap();
        assert_eq!(config.streaming.window_size, 5);
        assert_eq!(config.streaming.worker_threads, 0);
        assert_eq!(config.terrain.seed, 77);
        assert_eq!(config.terrain.ground_height, 12);
        assert!((config.terrain.cave_two.smoothness - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.atlas, AtlasConfig::default());
    }

    #[test]
    fn test_toml_errors() {
        assert!(matches!(
            WorldConfig::from_toml_str("[streaming]\nwindow_size = 4"),
            Err(StreamingError::InvalidWindowSize { size: 4 })
        ));
        assert!(matches!(
            WorldConfig::from_toml_str("streaming = 3"),
            Err(StreamingError::Config(_))
        ));
        assert!(matches!(
            WorldConfig::load("/definitely/not/here.toml"),
            Err(StreamingError::Io(_))
        ));
    }
}
