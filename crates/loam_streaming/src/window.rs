//! # Streaming Window
//!
//! An N×N ring of chunk slots centred on the observer's chunk.
//!
//! Slot `(x, z)` holds the chunk at `center + (x - N/2, z - N/2)`. When the
//! observer crosses into another chunk the slots shift in place by the
//! chunk delta: chunks that fall off the trailing edge are destroyed, the
//! rest move over, and the slots uncovered on the leading edge request new
//! chunks.
//!
//! ```text
//!  delta = (+1, 0)
//!
//!  before        after
//!  A B C         B C .      A evicted, "." requested
//!  D E F   ──▶   E F .
//!  G H I         H I .
//! ```

use std::sync::Arc;

use loam_procedural::{ChunkCoord, NoiseSettings};

use crate::error::{StreamingError, StreamingResult};
use crate::pipeline::{GenerationPipeline, Placement, PlacementHandler};
use crate::registry::ChunkId;
use crate::surface::ChunkSurfaces;

/// What one window update changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowShift {
    /// Chunk delta of the centre.
    pub delta: (i32, i32),
    /// Chunks destroyed because they left the window.
    pub evicted: usize,
    /// New coordinates requested.
    pub requested: usize,
}

/// Fixed-size grid of chunk slots that follows the observer.
#[derive(Debug)]
pub struct StreamingWindow {
    size: usize,
    center: Option<ChunkCoord>,
    slots: Vec<Option<ChunkId>>,
    settings: Arc<NoiseSettings>,
}

impl StreamingWindow {
    /// Creates an empty window of `size × size` slots.
    ///
    /// # Errors
    ///
    /// Returns [`StreamingError::InvalidWindowSize`] unless `size` is odd
    /// and greater than 1.
    pub fn new(size: usize, settings: Arc<NoiseSettings>) -> StreamingResult<Self> {
        if size < 3 || size % 2 == 0 {
            return Err(StreamingError::InvalidWindowSize { size });
        }
        Ok(Self {
            size,
            center: None,
            slots: vec![None; size * size],
            settings,
        })
    }

    /// Side length in chunks.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Centre chunk, once initialized.
    #[must_use]
    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    /// Settings used for every request.
    #[must_use]
    pub fn settings(&self) -> &Arc<NoiseSettings> {
        &self.settings
    }

    /// Chunk in slot `(x, z)`.
    #[must_use]
    pub fn slot(&self, x: usize, z: usize) -> Option<ChunkId> {
        if x >= self.size || z >= self.size {
            return None;
        }
        self.slots[self.index(x, z)]
    }

    /// Number of filled slots.
    #[must_use]
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Every chunk held by the window.
    pub fn chunks(&self) -> impl Iterator<Item = ChunkId> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// Coordinate covered by slot `(x, z)` around `center`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn slot_coord(&self, center: ChunkCoord, x: usize, z: usize) -> ChunkCoord {
        let half = self.half();
        center.offset(x as i32 - half, z as i32 - half)
    }

    /// Slot covering `coord`, if the window reaches it.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn slot_of(&self, coord: ChunkCoord) -> Option<(usize, usize)> {
        let center = self.center?;
        let (dx, dz) = center.delta_to(coord);
        let (x, z) = (dx.saturating_add(self.half()), dz.saturating_add(self.half()));
        let range = 0..self.side();
        (range.contains(&x) && range.contains(&z)).then_some((x as usize, z as usize))
    }

    /// Centres the window on a world position and requests every empty slot.
    ///
    /// Chunks already held keep their slot when the new window still covers
    /// them; the rest are destroyed.
    pub fn initialize(
        &mut self,
        world_x: f32,
        world_z: f32,
        pipeline: &mut GenerationPipeline,
        surfaces: &mut dyn ChunkSurfaces,
    ) -> usize {
        let center = ChunkCoord::from_world_pos(world_x, world_z);
        let held: Vec<ChunkId> = self.slots.iter_mut().filter_map(Option::take).collect();
        self.center = Some(center);

        let mut leaving = Vec::new();
        for id in held {
            match self.slot_of(id.coord) {
                Some((x, z)) if pipeline.registry().is_current(id) => {
                    let index = self.index(x, z);
                    self.slots[index] = Some(id);
                }
                _ => leaving.push(id),
            }
        }
        let evicted = pipeline.destroy_many(&leaving, surfaces);

        // Nearest rings first
        let mut order: Vec<(usize, usize)> = (0..self.size)
            .flat_map(|x| (0..self.size).map(move |z| (x, z)))
            .collect();
        let half = self.size / 2;
        order.sort_by_key(|&(x, z)| (x.abs_diff(half).max(z.abs_diff(half)), x, z));

        let mut requested = 0;
        for (x, z) in order {
            if self.slots[self.index(x, z)].is_some() {
                continue;
            }
            let coord = self.slot_coord(center, x, z);
            if !pipeline.is_requested(coord) && pipeline.request(coord, Arc::clone(&self.settings)) {
                requested += 1;
            }
        }

        tracing::info!(%center, size = self.size, requested, evicted, "streaming window initialized");
        requested
    }

    /// Follows the observer to a new world position.
    ///
    /// Does nothing while the observer stays inside the centre chunk. Any
    /// delta is handled, including jumps further than the window is wide.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn update(
        &mut self,
        world_x: f32,
        world_z: f32,
        pipeline: &mut GenerationPipeline,
        surfaces: &mut dyn ChunkSurfaces,
    ) -> WindowShift {
        let target = ChunkCoord::from_world_pos(world_x, world_z);
        let Some(center) = self.center else {
            let requested = self.initialize(world_x, world_z, pipeline, surfaces);
            return WindowShift {
                requested,
                ..WindowShift::default()
            };
        };
        if target == center {
            return WindowShift::default();
        }

        let (dx, dz) = center.delta_to(target);
        let n = self.side();
        let mut shift = WindowShift {
            delta: (dx, dz),
            ..WindowShift::default()
        };

        // Evict everything that has no destination
        let mut leaving = Vec::new();
        for x in 0..n {
            for z in 0..n {
                if x < dx || z < dz || x >= n.saturating_add(dx) || z >= n.saturating_add(dz) {
                    let index = self.index(x as usize, z as usize);
                    leaving.extend(self.slots[index].take());
                }
            }
        }
        shift.evicted = pipeline.destroy_many(&leaving, surfaces);

        // Shift towards the trailing edge, reading each source before it is
        // overwritten
        self.center = Some(target);
        for x in traversal(n, dx) {
            for z in traversal(n, dz) {
                let dst = self.index(x as usize, z as usize);
                let (sx, sz) = (x.saturating_add(dx), z.saturating_add(dz));
                if (0..n).contains(&sx) && (0..n).contains(&sz) {
                    let src = self.index(sx as usize, sz as usize);
                    self.slots[dst] = self.slots[src];
                    continue;
                }

                self.slots[dst] = None;
                let coord = self.slot_coord(target, x as usize, z as usize);
                if !pipeline.is_requested(coord)
                    && pipeline.request(coord, Arc::clone(&self.settings))
                {
                    shift.requested += 1;
                }
            }
        }

        tracing::debug!(
            from = %center,
            to = %target,
            evicted = shift.evicted,
            requested = shift.requested,
            "streaming window shifted"
        );
        shift
    }

    /// Empties every slot, destroying its chunk.
    pub fn clear(&mut self, pipeline: &mut GenerationPipeline, surfaces: &mut dyn ChunkSurfaces) {
        let held: Vec<ChunkId> = self.slots.iter_mut().filter_map(Option::take).collect();
        pipeline.destroy_many(&held, surfaces);
        self.center = None;
    }

    #[inline]
    fn index(&self, x: usize, z: usize) -> usize {
        x * self.size + z
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn side(&self) -> i32 {
        self.size as i32
    }

    fn half(&self) -> i32 {
        self.side() / 2
    }
}

impl PlacementHandler for StreamingWindow {
    /// Claims the slot for a new chunk if the slot is still waiting for it.
    fn on_instantiated(&mut self, coord: ChunkCoord, id: ChunkId) -> Placement {
        let Some((x, z)) = self.slot_of(coord) else {
            return Placement::Discard;
        };
        let index = self.index(x, z);
        if self.slots[index].is_some() {
            return Placement::Discard;
        }
        self.slots[index] = Some(id);
        Placement::Show
    }
}

/// Slot indices in the order that keeps an in-place shift by `delta` from
/// reading a slot it already overwrote.
fn traversal(n: i32, delta: i32) -> Box<dyn Iterator<Item = i32>> {
    if delta >= 0 {
        Box::new(0..n)
    } else {
        Box::new((0..n).rev())
    }
}
