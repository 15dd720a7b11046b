pub mod noise_field;

pub mod sdf_field;

pub mod simplex_field;

pub mod chunk;

pub mod chunk_manager;

pub mod height_atlas;


use crate::config::{GeneratorKind, TracerConfig};

use noise_field::NoiseField;
use sdf_field::SdfTerrainField;
use simplex_field::SimplexTerrainField;


// Anything that can answer "how high is the terrain here".
// Chunk population only ever goes through this one method,
// so generators are interchangeable at ChunkManager construction.
pub trait TerrainField : Send + Sync
{
    fn terrain_height(&self, world_x : f32, world_z : f32)
        -> f32;
}

impl<F> TerrainField for F
where
    F : Fn(f32, f32) -> f32 + Send + Sync
{
    fn terrain_height(&self, world_x : f32, world_z : f32)
        -> f32
    {
        self(world_x, world_z)
    }
}


pub fn terrain_field_for(config : &TracerConfig)
    -> Box<dyn TerrainField>
{
    match config.world.generator
    {
        GeneratorKind::Noise => Box::new(NoiseField::new()),
        GeneratorKind::Sdf => Box::new(SdfTerrainField::from_config(&config.sdf)),
        GeneratorKind::Simplex => Box::new(SimplexTerrainField::with_seed(config.world.simplex_seed)),
    }
}
