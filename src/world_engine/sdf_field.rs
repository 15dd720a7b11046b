use nalgebra as na;
use na::{Matrix3, Vector3};

use super::TerrainField;
use crate::config::SdfConfig;

pub const MAX_OCTAVES : usize = 11;
pub const SCALE_DECAY : f32 = 0.415;
// half the diagonal of a unit cell; no sphere of a later octave can reach farther
pub const EARLY_EXIT_FACTOR : f32 = 0.866;
pub const SMOOTHING_FACTOR : f32 = 0.3;
pub const MAX_SPHERE_RADIUS : f32 = 0.7;
const WARP_STRENGTH : f32 = -4.33;

const CUBE_CORNERS : [[f32 ; 3] ; 8] = [
    [0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0, 1.0],
    [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0],
];


// Rotation with a 2x scale, applied to the sample point once per octave
pub fn octave_transform()
    -> Matrix3<f32>
{
    Matrix3::new(
         0.00,  1.60,  1.20,
        -1.60,  0.72, -0.96,
        -1.20, -0.96,  1.28,
    )
}

pub fn smooth_min(a : f32, b : f32, k : f32)
    -> f32
{
    let h = (k - (a - b).abs()).max(0.0);
    a.min(b) - h * h * 0.25 / k
}

pub fn smooth_max(a : f32, b : f32, k : f32)
    -> f32
{
    let h = (k - (a - b).abs()).max(0.0);
    a.max(b) + h * h * 0.25 / k
}

fn fract(v : f32)
    -> f32
{
    v - v.floor()
}

// Hashed radius of the sphere sitting on a lattice vertex, in [0, 0.7)
pub fn sphere_radius(lattice_vertex : Vector3<f32>)
    -> f32
{
    let q = (lattice_vertex * 0.3183099 + Vector3::new(0.11, 0.17, 0.13)).map(fract) * 17.0;
    let w = fract(q.x * q.y * q.z * (q.x + q.y + q.z));

    MAX_SPHERE_RADIUS * w * w
}

// Distance from a point inside the unit cell to the sphere on one of its corners
pub fn sphere_distance(lattice_origin : Vector3<f32>, frac_point : Vector3<f32>, corner_offset : Vector3<f32>)
    -> f32
{
    let radius = sphere_radius(lattice_origin + corner_offset);

    (frac_point - corner_offset).norm() - radius
}

// Union of the eight corner spheres around p
pub fn base_shape(p : Vector3<f32>)
    -> f32
{
    let origin = p.map(f32::floor);
    let frac_point = p - origin;

    CUBE_CORNERS.iter()
    .map(|c| sphere_distance(origin, frac_point, Vector3::new(c[0], c[1], c[2])))
    .fold(f32::INFINITY, f32::min)
}

// Layers ever smaller sphere lattices onto an existing distance.
// Returns (min_distance, accumulated_distortion).
pub fn fractal_field(p : Vector3<f32>, lod_threshold : f32, current_min_distance : f32)
    -> (f32, f32)
{
    let transform = octave_transform();

    let mut point = p;
    let mut min_distance = current_min_distance;
    let mut distortion = 0.0;
    let mut scale = 1.0;

    for _ in 0..MAX_OCTAVES
    {
        if min_distance > scale * EARLY_EXIT_FACTOR
        {
            break;
        }
        if scale < lod_threshold
        {
            break;
        }

        let k = SMOOTHING_FACTOR * scale;

        let layer = smooth_max(scale * base_shape(point), min_distance - 0.1 * scale, k);
        min_distance = smooth_min(layer, min_distance, k);

        point = transform * point;
        scale *= SCALE_DECAY;

        distortion += min_distance;
        point.z += WARP_STRENGTH * distortion * scale;
    }

    (min_distance, distortion)
}


// Rocky terrain carved out of a ground plane by the fractal sphere field.
// Heights come from the first order distance estimate at the ground plane:
// a negative distance means rock, and the surface sits about that far above.
#[derive(Clone, Debug, PartialEq)]
pub struct SdfTerrainField
{
    pub frequency : f32,
    pub ground_level : f32,
    pub vertical_scale : f32,
    pub lod_threshold : f32,
}

impl SdfTerrainField
{
    pub fn from_config(config : &SdfConfig)
        -> SdfTerrainField
    {
        SdfTerrainField
        {
            frequency : config.frequency,
            ground_level : config.ground_level,
            vertical_scale : config.vertical_scale,
            lod_threshold : config.lod_threshold,
        }
    }

    // Signed distance to the terrain at a point in field space,
    // the plane y = ground_level roughened by the sphere octaves.
    pub fn density(&self, p : Vector3<f32>)
        -> f32
    {
        fractal_field(p, self.lod_threshold, p.y - self.ground_level).0
    }
}

impl Default for SdfTerrainField
{
    fn default()
        -> SdfTerrainField
    {
        SdfTerrainField::from_config(&SdfConfig::default())
    }
}

impl TerrainField for SdfTerrainField
{
    fn terrain_height(&self, world_x : f32, world_z : f32)
        -> f32
    {
        let p = Vector3::new(world_x * self.frequency, self.ground_level, world_z * self.frequency);

        self.ground_level - self.density(p) * self.vertical_scale
    }
}


#[cfg(test)]
mod tests
{
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::SmallRng;

    #[test]
    fn smooth_blends_match_hard_limits_when_far_apart()
    {
        assert_eq!(smooth_min(1.0, 5.0, 0.3), 1.0);
        assert_eq!(smooth_max(1.0, 5.0, 0.3), 5.0);
    }

    #[test]
    fn smooth_blends_round_off_close_values()
    {
        // h = 0.3, so the correction is 0.09 * 0.25 / 0.3 = 0.075
        assert!((smooth_min(2.0, 2.0, 0.3) - 1.925).abs() < 1e-6);
        assert!((smooth_max(2.0, 2.0, 0.3) - 2.075).abs() < 1e-6);
        assert!(smooth_min(0.4, 0.5, 0.3) < 0.4);
        assert!(smooth_max(0.4, 0.5, 0.3) > 0.5);
    }

    #[test]
    fn sphere_radius_is_bounded_and_deterministic()
    {
        let mut rng = SmallRng::seed_from_u64(3);

        for _ in 0..500
        {
            let v = Vector3::new(
                rng.gen_range(-100, 100) as f32,
                rng.gen_range(-100, 100) as f32,
                rng.gen_range(-100, 100) as f32);
            let r = sphere_radius(v);

            assert!(r >= 0.0 && r < MAX_SPHERE_RADIUS);
            assert_eq!(r, sphere_radius(v));
        }
    }

    #[test]
    fn sphere_distance_measures_from_the_corner()
    {
        let origin = Vector3::new(2.0, 0.0, -1.0);
        let corner = Vector3::new(1.0, 0.0, 0.0);
        let radius = sphere_radius(origin + corner);

        let d = sphere_distance(origin, Vector3::new(0.0, 0.0, 0.0), corner);

        assert!((d - (1.0 - radius)).abs() < 1e-6);
    }

    #[test]
    fn base_shape_is_the_nearest_corner_sphere()
    {
        let p = Vector3::new(4.25, 1.5, -2.75);
        let origin = p.map(f32::floor);
        let frac_point = p - origin;

        let expected = CUBE_CORNERS.iter()
            .map(|c| sphere_distance(origin, frac_point, Vector3::new(c[0], c[1], c[2])))
            .fold(f32::INFINITY, f32::min);

        assert_eq!(base_shape(p), expected);
    }

    #[test]
    fn distant_points_exit_before_any_octave()
    {
        // already farther than anything the first octave can add
        let (distance, distortion) = fractal_field(Vector3::new(0.3, 0.0, 0.7), 0.0, 10.0);

        assert_eq!(distance, 10.0);
        assert_eq!(distortion, 0.0);
    }

    #[test]
    fn lod_threshold_above_one_skips_all_octaves()
    {
        let (distance, distortion) = fractal_field(Vector3::new(0.3, 0.0, 0.7), 2.0, -0.25);

        assert_eq!(distance, -0.25);
        assert_eq!(distortion, 0.0);
    }

    #[test]
    fn finer_lod_never_raises_the_distance()
    {
        let mut rng = SmallRng::seed_from_u64(5);

        for _ in 0..200
        {
            let p = Vector3::new(
                rng.gen_range(-50.0f32, 50.0),
                rng.gen_range(-2.0f32, 2.0),
                rng.gen_range(-50.0f32, 50.0));

            // a threshold of 0.5 admits just the first two octaves (scales 1 and 0.415)
            let fine = fractal_field(p, 0.0001, 0.0);
            let coarse = fractal_field(p, 0.5, 0.0);

            assert!(fine.0.is_finite() && coarse.0.is_finite());
            assert!(fine.0 <= coarse.0 + 1e-6);
        }
    }

    #[test]
    fn terrain_heights_are_finite_everywhere()
    {
        let field = SdfTerrainField::default();
        let mut rng = SmallRng::seed_from_u64(21);

        for _ in 0..500
        {
            let h = field.terrain_height(rng.gen_range(-300.0f32, 300.0), rng.gen_range(-300.0f32, 300.0));

            assert!(h.is_finite());
        }
    }

    #[test]
    fn sdf_carving_only_raises_the_ground()
    {
        // the fractal layers can only pull the distance below the plane's own
        let field = SdfTerrainField::default();

        for i in 0..50
        {
            let h = field.terrain_height(i as f32 * 1.7, i as f32 * -0.9);

            assert!(h >= field.ground_level - 1e-4, "height {} below ground", h);
        }
    }
}
