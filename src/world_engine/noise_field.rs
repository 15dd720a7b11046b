use nalgebra as na;
use na::Vector2;

use super::TerrainField;

pub const OCTAVES : u32 = 8;
pub const BASE_AMPLITUDE : f32 = 1.6;
pub const AMPLITUDE_DECAY : f32 = 0.4;
pub const FREQUENCY_GROWTH : f32 = 2.0;

// Sum of the geometric amplitude series, 1.6 / (1 - 0.4).
// No fbm result can exceed it in magnitude.
pub const FBM_BOUND : f32 = BASE_AMPLITUDE / (1.0 - AMPLITUDE_DECAY);

// world coordinates are shrunk by this before the fbm lookup
pub const TERRAIN_SCALE : f32 = 0.5;


// Deterministic 2D gradient noise summed into fractal brownian motion.
// Holds no state: the lattice hash alone decides every value.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoiseField;

impl NoiseField
{
    pub fn new()
        -> NoiseField
    {
        NoiseField
    }

    // Pseudo-random gradient in [-1, 1]^2 for an integer lattice point.
    pub fn gradient_hash(lattice : Vector2<f32>)
        -> Vector2<f32>
    {
        let hash = |kx : f64, ky : f64|
        {
            let s = (lattice.x as f64 * kx + lattice.y as f64 * ky).sin() * 43758.5453123;
            (-1.0 + 2.0 * (s - s.floor())) as f32
        };

        Vector2::new(hash(127.1, 311.7), hash(269.5, 183.3))
    }

    fn unit_gradient(lattice : Vector2<f32>)
        -> Vector2<f32>
    {
        NoiseField::gradient_hash(lattice)
            .try_normalize(0.0)
            .unwrap_or_else(Vector2::x)
    }

    // C2 continuous fade, t^3 (t (6t - 15) + 10)
    pub fn quintic_fade(t : f32)
        -> f32
    {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    // Gradient noise remapped into roughly [0, 1]
    pub fn perlin(&self, point : Vector2<f32>)
        -> f32
    {
        let cell = point.map(f32::floor);
        let local = point - cell;

        let corner = |dx : f32, dy : f32|
        {
            let gradient = NoiseField::unit_gradient(cell + Vector2::new(dx, dy));
            gradient.dot(&(local - Vector2::new(dx, dy)))
        };

        let n00 = corner(0.0, 0.0);
        let n10 = corner(1.0, 0.0);
        let n01 = corner(0.0, 1.0);
        let n11 = corner(1.0, 1.0);

        let u = local.map(NoiseField::quintic_fade);

        let nx0 = n00 + (n10 - n00) * u.x;
        let nx1 = n01 + (n11 - n01) * u.x;
        let nxy = nx0 + (nx1 - nx0) * u.y;

        nxy * 0.5 + 0.5
    }

    pub fn fbm(&self, point : Vector2<f32>)
        -> f32
    {
        let mut value = 0.0;
        let mut amplitude = BASE_AMPLITUDE;
        let mut frequency = 1.0;

        for _ in 0..OCTAVES
        {
            value += self.perlin(point * frequency) * amplitude;

            amplitude *= AMPLITUDE_DECAY;
            frequency *= FREQUENCY_GROWTH;
        }

        value
    }
}

impl TerrainField for NoiseField
{
    fn terrain_height(&self, world_x : f32, world_z : f32)
        -> f32
    {
        self.fbm(Vector2::new(world_x * TERRAIN_SCALE, world_z * TERRAIN_SCALE))
    }
}


#[cfg(test)]
mod tests
{
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::SmallRng;

    #[test]
    fn repeated_evaluation_is_identical()
    {
        let field = NoiseField::new();
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..200
        {
            let p = Vector2::new(rng.gen_range(-500.0f32, 500.0), rng.gen_range(-500.0f32, 500.0));

            assert_eq!(field.perlin(p).to_bits(), field.perlin(p).to_bits());
            assert_eq!(field.fbm(p).to_bits(), NoiseField::new().fbm(p).to_bits());
        }
    }

    #[test]
    fn gradients_depend_only_on_the_lattice_point()
    {
        let a = NoiseField::gradient_hash(Vector2::new(3.0, -4.0));
        let b = NoiseField::gradient_hash(Vector2::new(3.0, -4.0));
        let c = NoiseField::gradient_hash(Vector2::new(4.0, -4.0));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.x.abs() <= 1.0 && a.y.abs() <= 1.0);
    }

    #[test]
    fn perlin_is_half_on_lattice_points()
    {
        let field = NoiseField::new();

        // every corner offset is zero there, so the dot products vanish
        for &(x, y) in &[(0.0, 0.0), (5.0, -2.0), (-17.0, 33.0)]
        {
            assert!((field.perlin(Vector2::new(x, y)) - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn fbm_stays_within_the_amplitude_series()
    {
        let field = NoiseField::new();
        let mut rng = SmallRng::seed_from_u64(11);

        assert!((FBM_BOUND - 2.6666667).abs() < 1e-4);

        for _ in 0..2000
        {
            let p = Vector2::new(rng.gen_range(-1000.0f32, 1000.0), rng.gen_range(-1000.0f32, 1000.0));
            let value = field.fbm(p);

            assert!(value.is_finite());
            assert!(value >= -FBM_BOUND && value <= FBM_BOUND, "fbm {} out of range", value);
        }
    }

    #[test]
    fn fade_curve_hits_its_endpoints()
    {
        assert_eq!(NoiseField::quintic_fade(0.0), 0.0);
        assert_eq!(NoiseField::quintic_fade(1.0), 1.0);
        assert!((NoiseField::quintic_fade(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn terrain_height_samples_half_scale_fbm()
    {
        let field = NoiseField::new();

        assert_eq!(field.terrain_height(6.0, -3.0), field.fbm(Vector2::new(3.0, -1.5)));
    }
}
