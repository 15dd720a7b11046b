use nalgebra as na;
use na::{Point3, Vector3};

use super::{ChunkContext, HeightSampler, Ray, ray_marcher::RayMarcher};
use crate::world_engine::height_atlas::HeightAtlas;


// Nearest terrain hit for a world-space ray, position in world units
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldHit
{
    pub found : bool,
    pub position : Point3<f32>,
    pub chunk : (i32, i32),
    pub distance : f32,
    // voxel steps taken across every chunk visited
    pub step_count : u32,
}

impl WorldHit
{
    fn miss(step_count : u32)
        -> WorldHit
    {
        WorldHit { found : false, position : Point3::origin(), chunk : (0, 0), distance : f32::INFINITY, step_count }
    }
}


// Runs the per-chunk marcher along a world ray. Chunks whose bounding box the ray
// crosses are visited in entry order; they only touch at their faces, so the first
// one that reports a hit holds the nearest hit.
#[derive(Clone, Debug, Default)]
pub struct WorldTracer
{
    marcher : RayMarcher,
}

impl WorldTracer
{
    pub fn new(marcher : RayMarcher)
        -> WorldTracer
    {
        WorldTracer { marcher }
    }

    pub fn marcher(&self)
        -> &RayMarcher
    {
        &self.marcher
    }

    // The marcher only sees a hit once the ray is below the surface, so the floor
    // drops two voxels under the lowest sample to let the lowest cells be hit.
    fn padded(&self, context : ChunkContext)
        -> ChunkContext
    {
        let voxel = 1.0 / self.marcher.voxel_resolution() as f32;

        ChunkContext { min_y : context.min_y - 2.0 * voxel, max_y : context.max_y }
    }

    pub fn trace(&self, atlas : &HeightAtlas, ray : &Ray)
        -> WorldHit
    {
        let direction = match ray.direction.try_normalize(f32::EPSILON)
        {
            Some(d) => d,
            None => return WorldHit::miss(0),
        };
        let ray = Ray::new(ray.origin, direction);

        let dims = atlas.chunk_dimensions();
        let side = atlas.side_length() as i32;

        let mut candidates = Vec::new();

        for cz in 0..side {
        for cx in 0..side {

            let context = match atlas.chunk_context(cx, cz)
            {
                Ok(c) => self.padded(c),
                Err(_) => continue,
            };

            let box_min = Vector3::new(cx as f32 * dims.width, context.min_y, cz as f32 * dims.depth);
            let box_max = Vector3::new((cx + 1) as f32 * dims.width, context.max_y, (cz + 1) as f32 * dims.depth);

            if let Some(t_entry) = ray_aabb_entry(&ray, box_min, box_max)
            {
                candidates.push((t_entry, cx, cz));
            }
        }}

        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut total_steps = 0;

        for (t_entry, cx, cz) in candidates
        {
            let (context, tile) = match (atlas.chunk_context(cx, cz), atlas.chunk_tile(cx, cz))
            {
                (Ok(context), Ok(tile)) => (self.padded(context), tile),
                _ => continue,
            };

            let corner = Vector3::new(cx as f32 * dims.width, 0.0, cz as f32 * dims.depth);
            let entry = ray.at(t_entry);

            // y is measured up from the padded floor, so the step budget
            // follows the chunk's vertical span and not its altitude
            let floor = context.min_y;
            let local_context = ChunkContext { min_y : 0.0, max_y : context.max_y - floor };
            let local_tile = |u : f32, v : f32| tile.height(u, v) - floor;

            let local_origin = Point3::new(
                ((entry.x - corner.x) / dims.width).max(0.0).min(1.0),
                (entry.y - floor).max(0.0),
                ((entry.z - corner.z) / dims.depth).max(0.0).min(1.0));
            let local_direction = Vector3::new(direction.x / dims.width, direction.y, direction.z / dims.depth);

            let hit = self.marcher.march(&Ray::new(local_origin, local_direction), &local_context, &local_tile);
            total_steps += hit.step_count;

            if hit.found
            {
                let position = Point3::new(
                    corner.x + hit.position.x * dims.width,
                    hit.position.y + floor,
                    corner.z + hit.position.z * dims.depth);

                return WorldHit
                {
                    found : true,
                    position,
                    chunk : (cx, cz),
                    distance : (position - ray.origin).norm(),
                    step_count : total_steps,
                };
            }
        }

        WorldHit::miss(total_steps)
    }
}

// Slab test. Returns the parameter where the ray enters the box,
// zero when it starts inside, None when it misses or the box is behind it.
pub fn ray_aabb_entry(ray : &Ray, box_min : Vector3<f32>, box_max : Vector3<f32>)
    -> Option<f32>
{
    let mut t_min = 0.0f32;
    let mut t_max = f32::INFINITY;

    for i in 0..3
    {
        let o = ray.origin[i];
        let d = ray.direction[i];

        if d.abs() < 1e-8
        {
            if o < box_min[i] || o > box_max[i]
            {
                return None;
            }
        }
        else
        {
            let inv_d = 1.0 / d;
            let mut t1 = (box_min[i] - o) * inv_d;
            let mut t2 = (box_max[i] - o) * inv_d;

            if t1 > t2
            {
                std::mem::swap(&mut t1, &mut t2);
            }

            t_min = t_min.max(t1);
            t_max = t_max.min(t2);

            if t_min > t_max
            {
                return None;
            }
        }
    }

    Some(t_min)
}
