use nalgebra as na;
use na::{Point3, Vector3};

use super::{ChunkContext, HeightSampler, Hit, Ray};
use crate::config::MarchConfig;

pub const DEFAULT_VOXEL_RESOLUTION : u32 = 32;
pub const DEFAULT_MIN_STEP_BUDGET : u32 = 64;
pub const DEFAULT_EPSILON : f32 = 1e-4;

const AXIS_X : usize = 0;
const AXIS_Y : usize = 1;
const AXIS_Z : usize = 2;


// Walks a ray through one chunk's voxel grid a cell boundary at a time (3D DDA)
// and stops at the first cell whose height sample lies above the ray.
//
// Coordinates are chunk-local: x and z in [0, 1] span the chunk, y is in world
// units and a voxel is 1 / voxel_resolution tall. The ray may start above
// max_y and descend into the chunk; leaving through the sides or dropping
// below min_y ends the walk, and the step budget bounds it in every case.
#[derive(Clone, Debug, PartialEq)]
pub struct RayMarcher
{
    voxel_resolution : u32,
    direction_epsilon : f32,
    surface_epsilon : f32,
    min_step_budget : u32,
}

impl Default for RayMarcher
{
    fn default()
        -> RayMarcher
    {
        RayMarcher::new(DEFAULT_VOXEL_RESOLUTION)
    }
}

impl RayMarcher
{
    pub fn new(voxel_resolution : u32)
        -> RayMarcher
    {
        RayMarcher
        {
            voxel_resolution : voxel_resolution.max(1),
            direction_epsilon : DEFAULT_EPSILON,
            surface_epsilon : DEFAULT_EPSILON,
            min_step_budget : DEFAULT_MIN_STEP_BUDGET,
        }
    }

    pub fn from_config(config : &MarchConfig)
        -> RayMarcher
    {
        RayMarcher
        {
            voxel_resolution : config.voxel_resolution.max(1),
            direction_epsilon : config.direction_epsilon.abs().max(f32::MIN_POSITIVE),
            surface_epsilon : config.surface_epsilon,
            min_step_budget : config.min_step_budget,
        }
    }

    pub fn voxel_resolution(&self)
        -> u32
    {
        self.voxel_resolution
    }

    // Taller chunks get proportionally more steps: max(min, max_y * R + min)
    pub fn step_budget(&self, max_y : f32)
        -> u32
    {
        let min_budget = self.min_step_budget as f32;
        let scaled = max_y * self.voxel_resolution as f32 + min_budget;

        // NaN falls back to the minimum, `as` saturates the rest
        scaled.max(min_budget) as u32
    }

    // Keeps every component at least epsilon away from zero, preserving its sign
    pub fn clamp_direction(&self, direction : Vector3<f32>)
        -> Vector3<f32>
    {
        let eps = self.direction_epsilon;

        direction.map(|c| if c.abs() < eps { eps.copysign(c) } else { c })
    }

    pub fn march<S>(&self, ray : &Ray, context : &ChunkContext, sampler : &S)
        -> Hit
    where
        S : HeightSampler + ?Sized
    {
        let res = self.voxel_resolution as f32;
        let cell_size = 1.0 / res;

        let dir = self.clamp_direction(ray.direction).normalize();
        let origin = ray.origin.coords;

        let mut cell = (origin * res).map(f32::floor);
        let mut step = Vector3::<f32>::zeros();
        let mut t_delta = Vector3::<f32>::zeros();
        let mut t_max = Vector3::<f32>::zeros();

        for axis in 0..3
        {
            let d = dir[axis];
            t_delta[axis] = 1.0 / (d.abs() * res);

            if d > 0.0
            {
                step[axis] = 1.0;
                t_max[axis] = ((cell[axis] + 1.0) * cell_size - origin[axis]) / d;
            }
            else
            {
                step[axis] = -1.0;

                // sitting exactly on a boundary while heading down means
                // the ray is entering the cell below, a full cell from its far side
                let dist = origin[axis] - cell[axis] * cell_size;
                if dist <= 0.0
                {
                    cell[axis] -= 1.0;
                    t_max[axis] = t_delta[axis];
                }
                else
                {
                    t_max[axis] = dist / -d;
                }
            }
        }

        let budget = self.step_budget(context.max_y);
        let mut t = 0.0;

        for iteration in 0..budget
        {
            let pos = origin + dir * t;

            if pos.x < 0.0 || pos.x > 1.0 || pos.z < 0.0 || pos.z > 1.0 || pos.y < context.min_y
            {
                return Hit::miss(iteration);
            }

            let u = ((cell.x + 0.5) * cell_size).max(0.0).min(1.0);
            let v = ((cell.z + 0.5) * cell_size).max(0.0).min(1.0);

            if sampler.height(u, v) > pos.y + self.surface_epsilon
            {
                return Hit::at(Point3::from(pos), iteration);
            }

            let axis = next_axis(&t_max);

            t = t_max[axis];
            t_max[axis] += t_delta[axis];
            cell[axis] += step[axis];
        }

        Hit::miss(budget)
    }
}

// Axis whose boundary is nearest. Ties go to X, then Z, then Y.
fn next_axis(t_max : &Vector3<f32>)
    -> usize
{
    if t_max[AXIS_X] <= t_max[AXIS_Z] && t_max[AXIS_X] <= t_max[AXIS_Y]
    {
        AXIS_X
    }
    else if t_max[AXIS_Z] <= t_max[AXIS_Y]
    {
        AXIS_Z
    }
    else
    {
        AXIS_Y
    }
}
