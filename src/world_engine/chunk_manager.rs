use log::{debug, info};
use nalgebra as na;

use super::TerrainField;
use super::chunk::{Chunk, WorldDimensions};
use super::height_atlas::HeightAtlas;
use crate::config::WorldConfig;
use crate::error::WorldError;


// Per-chunk record handed to a renderer to place and scale a bounding volume
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkInstance
{
    pub grid_x : f32,
    pub min_y : f32,
    pub grid_z : f32,
    pub bounding_height : f32,
}

impl ChunkInstance
{
    pub fn to_array(&self)
        -> [f32 ; 4]
    {
        [self.grid_x, self.min_y, self.grid_z, self.bounding_height]
    }
}


// Owns a fixed square grid of chunks and fills them from a terrain field.
// Chunks are stored row-major, z * side_length + x, and all of them
// exist from construction on.
pub struct ChunkManager
{
    side_length : usize,
    chunk_world_size : u32,
    chunk_resolution : usize,
    chunks : Vec<Chunk>,
    terrain_field : Box<dyn TerrainField>,
}

impl ChunkManager
{
    pub fn new(
        side_length : usize,
        chunk_world_size : u32,
        chunk_height : f32,
        chunk_resolution : usize,
        terrain_field : Box<dyn TerrainField>)
        -> Result<ChunkManager, WorldError>
    {
        if side_length == 0
        {
            return Err(WorldError::EmptyGrid);
        }

        let size = chunk_world_size as f32;
        let dims = WorldDimensions::new(size, size, chunk_height);

        let chunks = (0..side_length * side_length)
            .map(|index|
            {
                let grid_position = na::Point2::new((index % side_length) as i32, (index / side_length) as i32);
                Chunk::new(grid_position, dims, chunk_resolution)
            })
            .collect::<Result<Vec<Chunk>, WorldError>>()?;

        Ok(ChunkManager { side_length, chunk_world_size, chunk_resolution, chunks, terrain_field })
    }

    pub fn from_config(config : &WorldConfig, terrain_field : Box<dyn TerrainField>)
        -> Result<ChunkManager, WorldError>
    {
        ChunkManager::new(
            config.side_length,
            config.chunk_world_size,
            config.chunk_height,
            config.chunk_resolution,
            terrain_field)
    }

    // Samples the terrain field chosen at construction into every chunk
    pub fn populate(&mut self)
        -> Result<(), WorldError>
    {
        let field = &*self.terrain_field;

        ChunkManager::populate_chunks(&mut self.chunks, field)
    }

    // Refills every chunk from another field
    pub fn populate_with(&mut self, field : &dyn TerrainField)
        -> Result<(), WorldError>
    {
        ChunkManager::populate_chunks(&mut self.chunks, field)
    }

    fn populate_chunks(chunks : &mut [Chunk], field : &dyn TerrainField)
        -> Result<(), WorldError>
    {
        info!("populating {} chunks", chunks.len());

        for chunk in chunks.iter_mut()
        {
            ChunkManager::populate_chunk(chunk, field)?;

            debug!(
                "chunk ({}, {}) spans y {} .. {}",
                chunk.grid_position().x, chunk.grid_position().y, chunk.min_y(), chunk.max_y());
        }

        let (min_y, max_y) = chunks.iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), c| (lo.min(c.min_y()), hi.max(c.max_y())));

        info!("terrain populated, heights span {} .. {}", min_y, max_y);

        Ok(())
    }

    // One sweep per chunk: each sample is written and folded into the bounds together
    fn populate_chunk(chunk : &mut Chunk, field : &dyn TerrainField)
        -> Result<(), WorldError>
    {
        chunk.reset_bounds();

        let resolution = chunk.resolution();

        for z in 0..resolution
        {
        for x in 0..resolution
        {
            let world_pos = chunk.sample_world_position(x, z);

            chunk.set_height(x, z, field.terrain_height(world_pos.x, world_pos.y))?;
        }}

        Ok(())
    }

    pub fn chunk_index(&self, cx : i32, cz : i32)
        -> Result<usize, WorldError>
    {
        let side = self.side_length;

        if cx < 0 || cz < 0 || cx as usize >= side || cz as usize >= side
        {
            return Err(WorldError::ChunkOutOfRange { cx, cz, side_length : side });
        }

        Ok(cz as usize * side + cx as usize)
    }

    pub fn chunk_coords(&self, index : usize)
        -> Result<(i32, i32), WorldError>
    {
        let coords = ((index % self.side_length) as i32, (index / self.side_length) as i32);

        if index >= self.chunks.len()
        {
            return Err(WorldError::ChunkOutOfRange { cx : coords.0, cz : coords.1, side_length : self.side_length });
        }

        Ok(coords)
    }

    pub fn chunk(&self, cx : i32, cz : i32)
        -> Result<&Chunk, WorldError>
    {
        Ok(&self.chunks[self.chunk_index(cx, cz)?])
    }

    pub fn min_y(&self, cx : i32, cz : i32)
        -> Result<f32, WorldError>
    {
        Ok(self.chunk(cx, cz)?.min_y())
    }

    pub fn max_y(&self, cx : i32, cz : i32)
        -> Result<f32, WorldError>
    {
        Ok(self.chunk(cx, cz)?.max_y())
    }

    pub fn bounding_height(&self, cx : i32, cz : i32)
        -> Result<f32, WorldError>
    {
        Ok(self.chunk(cx, cz)?.bounding_height())
    }

    // Read-only view; writes only go through populate so the bounds stay in sync
    pub fn height_data(&self, cx : i32, cz : i32)
        -> Result<&[f32], WorldError>
    {
        Ok(self.chunk(cx, cz)?.heights())
    }

    pub fn chunks(&self)
        -> &[Chunk]
    {
        &self.chunks
    }

    pub fn side_length(&self)
        -> usize
    {
        self.side_length
    }

    pub fn chunk_world_size(&self)
        -> u32
    {
        self.chunk_world_size
    }

    pub fn chunk_resolution(&self)
        -> usize
    {
        self.chunk_resolution
    }

    pub fn chunk_dimensions(&self)
        -> WorldDimensions
    {
        self.chunks[0].world_dimensions()
    }

    pub fn terrain_field(&self)
        -> &dyn TerrainField
    {
        &*self.terrain_field
    }

    pub fn instance_records(&self)
        -> Vec<ChunkInstance>
    {
        self.chunks.iter()
        .map(|c| ChunkInstance
        {
            grid_x : c.grid_position().x as f32,
            min_y : c.min_y(),
            grid_z : c.grid_position().y as f32,
            bounding_height : c.bounding_height(),
        })
        .collect()
    }

    // Copies the current heights into an immutable snapshot
    pub fn publish_atlas(&self, version : u64)
        -> Result<HeightAtlas, WorldError>
    {
        HeightAtlas::from_chunks(
            self.side_length,
            self.chunk_resolution,
            self.chunk_dimensions(),
            &self.chunks,
            version)
    }
}
