use nalgebra as na;
use na::{Point2, Vector2};

use crate::error::WorldError;


// Extents of one chunk in world units
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldDimensions
{
    pub width : f32,
    pub depth : f32,
    pub height : f32,
}

impl WorldDimensions
{
    pub fn new(width : f32, depth : f32, height : f32)
        -> WorldDimensions
    {
        WorldDimensions { width, depth, height }
    }

    pub fn footprint(&self)
        -> Vector2<f32>
    {
        Vector2::new(self.width, self.depth)
    }
}


// A square column of terrain: resolution^2 height samples (row-major, z * N + x)
// along with the running vertical bounds of everything written so far.
// Until the first write the bounds hold the empty sentinel (+inf, -inf).
#[derive(Clone, Debug)]
pub struct Chunk
{
    grid_position : Point2<i32>,
    world_dimensions : WorldDimensions,
    resolution : usize,
    heights : Vec<f32>,
    min_y : f32,
    max_y : f32,
}

impl Chunk
{
    pub fn new(grid_position : Point2<i32>, world_dimensions : WorldDimensions, resolution : usize)
        -> Result<Chunk, WorldError>
    {
        if resolution < 2
        {
            return Err(WorldError::InvalidResolution(resolution));
        }

        Ok(Chunk
        {
            grid_position,
            world_dimensions,
            resolution,
            heights : vec![0.0 ; resolution * resolution],
            min_y : f32::INFINITY,
            max_y : f32::NEG_INFINITY,
        })
    }

    // Builds a chunk around existing samples, computing bounds in the same pass
    pub fn from_heights(
        grid_position : Point2<i32>,
        world_dimensions : WorldDimensions,
        resolution : usize,
        heights : Vec<f32>)
        -> Result<Chunk, WorldError>
    {
        let mut chunk = Chunk::new(grid_position, world_dimensions, resolution)?;

        if heights.len() != chunk.heights.len()
        {
            return Err(WorldError::HeightLengthMismatch { expected : chunk.heights.len(), actual : heights.len() });
        }

        for &h in &heights
        {
            chunk.include_in_bounds(h);
        }
        chunk.heights = heights;

        Ok(chunk)
    }

    fn sample_index(&self, x : usize, z : usize)
        -> Result<usize, WorldError>
    {
        if x >= self.resolution || z >= self.resolution
        {
            return Err(WorldError::SampleOutOfRange { x, z, resolution : self.resolution });
        }

        Ok(z * self.resolution + x)
    }

    // Back to the empty sentinel, ahead of rewriting every sample
    pub(super) fn reset_bounds(&mut self)
    {
        self.min_y = f32::INFINITY;
        self.max_y = f32::NEG_INFINITY;
    }

    fn include_in_bounds(&mut self, height : f32)
    {
        self.min_y = self.min_y.min(height);
        self.max_y = self.max_y.max(height);
    }

    // Writes one sample. Bounds only ever widen, so overwriting
    // an extreme value leaves them conservative rather than tight.
    pub fn set_height(&mut self, x : usize, z : usize, height : f32)
        -> Result<(), WorldError>
    {
        let index = self.sample_index(x, z)?;

        self.heights[index] = height;
        self.include_in_bounds(height);

        Ok(())
    }

    pub fn height(&self, x : usize, z : usize)
        -> Result<f32, WorldError>
    {
        Ok(self.heights[self.sample_index(x, z)?])
    }

    pub fn heights(&self)
        -> &[f32]
    {
        &self.heights
    }

    pub fn is_empty(&self)
        -> bool
    {
        self.min_y > self.max_y
    }

    pub fn min_y(&self)
        -> f32
    {
        self.min_y
    }

    pub fn max_y(&self)
        -> f32
    {
        self.max_y
    }

    // vertical extent of the chunk's bounding volume
    pub fn bounding_height(&self)
        -> f32
    {
        self.max_y - self.min_y + 1.0
    }

    pub fn resolution(&self)
        -> usize
    {
        self.resolution
    }

    pub fn grid_position(&self)
        -> Point2<i32>
    {
        self.grid_position
    }

    pub fn world_dimensions(&self)
        -> WorldDimensions
    {
        self.world_dimensions
    }

    // (x, z) corner of the chunk nearest the world origin
    pub fn world_min(&self)
        -> Vector2<f32>
    {
        self.grid_position.coords.map(|c| c as f32).component_mul(&self.world_dimensions.footprint())
    }

    pub fn world_max(&self)
        -> Vector2<f32>
    {
        self.grid_position.coords.map(|c| (c + 1) as f32).component_mul(&self.world_dimensions.footprint())
    }

    // World (x, z) of a sample. The first and last samples sit on the chunk edges,
    // so neighbouring chunks share their border samples.
    pub fn sample_world_position(&self, x : usize, z : usize)
        -> Vector2<f32>
    {
        let last = (self.resolution - 1) as f32;
        let local = Vector2::new(x as f32 / last, z as f32 / last);

        self.world_min() + local.component_mul(&self.world_dimensions.footprint())
    }
}
