pub mod ray_marcher;

pub mod world_tracer;

pub mod camera;


use nalgebra as na;
use na::{Point3, Vector3};


#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray
{
    pub origin : Point3<f32>,
    // any length; traversal normalizes it
    pub direction : Vector3<f32>,
}

impl Ray
{
    pub fn new(origin : Point3<f32>, direction : Vector3<f32>)
        -> Ray
    {
        Ray { origin, direction }
    }

    pub fn at(&self, t : f32)
        -> Point3<f32>
    {
        self.origin + self.direction * t
    }
}


// Outcome of one traversal. A miss is a normal answer, not an error;
// position is only meaningful when found is set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit
{
    pub found : bool,
    pub position : Point3<f32>,
    pub step_count : u32,
}

impl Hit
{
    pub fn miss(step_count : u32)
        -> Hit
    {
        Hit { found : false, position : Point3::origin(), step_count }
    }

    pub fn at(position : Point3<f32>, step_count : u32)
        -> Hit
    {
        Hit { found : true, position, step_count }
    }
}


// Vertical bounds of the chunk being traversed
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkContext
{
    pub min_y : f32,
    pub max_y : f32,
}


// Nearest-sample height lookup over one chunk, u and v in [0, 1]
pub trait HeightSampler
{
    fn height(&self, u : f32, v : f32)
        -> f32;
}

impl<F> HeightSampler for F
where
    F : Fn(f32, f32) -> f32
{
    fn height(&self, u : f32, v : f32)
        -> f32
    {
        self(u, v)
    }
}
