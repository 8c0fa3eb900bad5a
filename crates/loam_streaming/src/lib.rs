//! # LOAM Streaming
//!
//! Keeps a window of generated, meshed chunks around a moving observer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐ request  ┌────────────────────┐  Job   ┌──────────┐
//! │ StreamingWindow  │─────────▶│ GenerationPipeline │───────▶│ Workers  │
//! │  (N x N slots)   │◀─────────│  (main loop tick)  │◀───────│ (pool)   │
//! └──────────────────┘ placement└─────────┬──────────┘Complet.└────┬─────┘
//!                                         │                        │
//!                                         ▼                        │
//!                               ┌────────────────────┐   snapshots │
//!                               │   ChunkRegistry    │◀────────────┘
//!                               └────────────────────┘
//! ```
//!
//! ## Threading Rules
//!
//! - `tick` runs on one cooperative main loop and never blocks
//! - Workers read `Arc` grid snapshots and never touch surfaces
//! - Grids are replaced whole; edits copy on write
//!
//! ## Modules
//!
//! - `registry`: chunk handles, published grids, point queries
//! - `pipeline`: request/job/completion flow and the neighbour refresh loop
//! - `window`: the sliding N x N slot grid
//! - `world`: everything above behind one facade

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod job;
pub mod pipeline;
pub mod registry;
pub mod surface;
pub mod window;
pub mod worker;
pub mod world;

pub use config::{StreamingConfig, WorldConfig};
pub use error::{StreamingError, StreamingResult};
pub use job::{Completion, Job, JobContext, JobKind};
pub use pipeline::{GenerationPipeline, PipelineStats, Placement, PlacementHandler, TickReport};
pub use registry::{ChunkId, ChunkRecord, ChunkRegistry};
pub use surface::{ChunkSurfaces, HeadlessSurfaces, SurfaceState};
pub use window::{StreamingWindow, WindowShift};
pub use worker::WorkerPool;
pub use world::{World, WorldTick};
