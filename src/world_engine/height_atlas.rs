use std::sync::{Arc, RwLock};

use log::info;
use nalgebra as na;
use na::Vector2;

use super::chunk::{Chunk, WorldDimensions};
use super::chunk_manager::ChunkInstance;
use crate::error::WorldError;
use crate::ray_engine::{ChunkContext, HeightSampler};


// Immutable copy of every chunk's samples in one row-major buffer.
// The buffer is (side_length * chunk_resolution) samples wide and chunk (cx, cz)
// owns the tile starting at (cx * chunk_resolution, cz * chunk_resolution).
#[derive(Clone, Debug)]
pub struct HeightAtlas
{
    side_length : usize,
    chunk_resolution : usize,
    chunk_dimensions : WorldDimensions,
    samples : Vec<f32>,
    chunk_bounds : Vec<ChunkContext>,
    version : u64,
}

impl HeightAtlas
{
    // Every grid cell needs exactly one chunk of the atlas resolution
    pub fn from_chunks(
        side_length : usize,
        chunk_resolution : usize,
        chunk_dimensions : WorldDimensions,
        chunks : &[Chunk],
        version : u64)
        -> Result<HeightAtlas, WorldError>
    {
        if chunks.len() != side_length * side_length
        {
            return Err(WorldError::ChunkCountMismatch { expected : side_length * side_length, actual : chunks.len() });
        }

        let width = side_length * chunk_resolution;
        let mut samples = vec![0.0 ; width * width];
        let mut chunk_bounds = vec![ChunkContext { min_y : 0.0, max_y : 0.0 } ; chunks.len()];

        for chunk in chunks
        {
            let grid = chunk.grid_position();

            if grid.x < 0 || grid.y < 0 || grid.x as usize >= side_length || grid.y as usize >= side_length
            {
                return Err(WorldError::ChunkOutOfRange { cx : grid.x, cz : grid.y, side_length });
            }
            if chunk.resolution() != chunk_resolution
            {
                return Err(WorldError::ResolutionMismatch { expected : chunk_resolution, actual : chunk.resolution() });
            }

            let (tile_x, tile_z) = (grid.x as usize * chunk_resolution, grid.y as usize * chunk_resolution);

            for (z, row) in chunk.heights().chunks(chunk_resolution).enumerate()
            {
                let start = (tile_z + z) * width + tile_x;
                samples[start..start + chunk_resolution].copy_from_slice(row);
            }

            chunk_bounds[grid.y as usize * side_length + grid.x as usize] =
                ChunkContext { min_y : chunk.min_y(), max_y : chunk.max_y() };
        }

        Ok(HeightAtlas { side_length, chunk_resolution, chunk_dimensions, samples, chunk_bounds, version })
    }

    fn chunk_index(&self, cx : i32, cz : i32)
        -> Result<usize, WorldError>
    {
        let side = self.side_length;

        if cx < 0 || cz < 0 || cx as usize >= side || cz as usize >= side
        {
            return Err(WorldError::ChunkOutOfRange { cx, cz, side_length : side });
        }

        Ok(cz as usize * side + cx as usize)
    }

    pub fn version(&self)
        -> u64
    {
        self.version
    }

    pub fn side_length(&self)
        -> usize
    {
        self.side_length
    }

    pub fn chunk_resolution(&self)
        -> usize
    {
        self.chunk_resolution
    }

    pub fn chunk_dimensions(&self)
        -> WorldDimensions
    {
        self.chunk_dimensions
    }

    // samples per atlas side
    pub fn width(&self)
        -> usize
    {
        self.side_length * self.chunk_resolution
    }

    pub fn samples(&self)
        -> &[f32]
    {
        &self.samples
    }

    pub fn sample(&self, px : usize, pz : usize)
        -> Option<f32>
    {
        let width = self.width();

        if px >= width || pz >= width
        {
            return None;
        }

        Some(self.samples[pz * width + px])
    }

    pub fn chunk_context(&self, cx : i32, cz : i32)
        -> Result<ChunkContext, WorldError>
    {
        Ok(self.chunk_bounds[self.chunk_index(cx, cz)?])
    }

    pub fn chunk_tile(&self, cx : i32, cz : i32)
        -> Result<ChunkTile<'_>, WorldError>
    {
        self.chunk_index(cx, cz)?;

        Ok(ChunkTile
        {
            atlas : self,
            tile_x : cx as usize * self.chunk_resolution,
            tile_z : cz as usize * self.chunk_resolution,
        })
    }

    // Chunk-local uv to uv across the whole atlas
    pub fn local_to_atlas_uv(&self, local_uv : Vector2<f32>, cx : i32, cz : i32)
        -> Vector2<f32>
    {
        (local_uv + Vector2::new(cx as f32, cz as f32)) / self.side_length as f32
    }

    // Lowest and highest sample over all chunks
    pub fn height_range(&self)
        -> (f32, f32)
    {
        self.chunk_bounds.iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), b| (lo.min(b.min_y), hi.max(b.max_y)))
    }

    pub fn instance_records(&self)
        -> Vec<ChunkInstance>
    {
        self.chunk_bounds.iter()
        .enumerate()
        .map(|(index, b)| ChunkInstance
        {
            grid_x : (index % self.side_length) as f32,
            min_y : b.min_y,
            grid_z : (index / self.side_length) as f32,
            bounding_height : b.max_y - b.min_y + 1.0,
        })
        .collect()
    }
}


// One chunk's tile of the atlas. Sample i sits at i / (N - 1),
// so a lookup rounds to the nearest sample.
#[derive(Clone, Copy, Debug)]
pub struct ChunkTile<'a>
{
    atlas : &'a HeightAtlas,
    tile_x : usize,
    tile_z : usize,
}

impl<'a> HeightSampler for ChunkTile<'a>
{
    fn height(&self, u : f32, v : f32)
        -> f32
    {
        let res = self.atlas.chunk_resolution;
        let cell = |t : f32| ((t.max(0.0).min(1.0) * (res - 1) as f32).round() as usize).min(res - 1);

        let width = self.atlas.width();

        self.atlas.samples[(self.tile_z + cell(v)) * width + self.tile_x + cell(u)]
    }
}


// Shared slot for the current atlas. Readers take an Arc to a snapshot and keep it
// for as long as they trace; publishing swaps in a new Arc and never touches
// a snapshot that is already handed out.
pub struct AtlasHandle
{
    current : RwLock<Arc<HeightAtlas>>,
}

impl AtlasHandle
{
    pub fn new(atlas : HeightAtlas)
        -> AtlasHandle
    {
        info!("publishing height atlas version {}", atlas.version());

        AtlasHandle { current : RwLock::new(Arc::new(atlas)) }
    }

    pub fn snapshot(&self)
        -> Arc<HeightAtlas>
    {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());

        Arc::clone(&guard)
    }

    // Returns the snapshot that was replaced
    pub fn publish(&self, atlas : HeightAtlas)
        -> Arc<HeightAtlas>
    {
        info!("publishing height atlas version {}", atlas.version());

        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());

        std::mem::replace(&mut *guard, Arc::new(atlas))
    }
}
