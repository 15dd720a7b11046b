use noise::{NoiseFn, Seedable, SuperSimplex};

use super::TerrainField;

pub const DEFAULT_FREQUENCY : f64 = 0.05;
pub const DEFAULT_AMPLITUDE : f64 = 1.2;


// Exposes any 2D noise function from the noise crate as a terrain field.
// The raw output in [-1, 1] is lifted to sit above zero like the fbm heights.
pub struct SimplexTerrainField<N = SuperSimplex>
{
    noise_gen : N,
    frequency : f64,
    amplitude : f64,
}

impl SimplexTerrainField<SuperSimplex>
{
    pub fn with_seed(seed : u32)
        -> SimplexTerrainField<SuperSimplex>
    {
        SimplexTerrainField::from_noise(SuperSimplex::new().set_seed(seed), DEFAULT_FREQUENCY, DEFAULT_AMPLITUDE)
    }
}

impl<N> SimplexTerrainField<N>
where
    N : NoiseFn<[f64 ; 2]>
{
    pub fn from_noise(noise_gen : N, frequency : f64, amplitude : f64)
        -> SimplexTerrainField<N>
    {
        SimplexTerrainField { noise_gen, frequency, amplitude }
    }
}

impl<N> TerrainField for SimplexTerrainField<N>
where
    N : NoiseFn<[f64 ; 2]> + Send + Sync
{
    fn terrain_height(&self, world_x : f32, world_z : f32)
        -> f32
    {
        let noise_input = [world_x as f64 * self.frequency, world_z as f64 * self.frequency];

        ((self.noise_gen.get(noise_input) + 1.0) * self.amplitude) as f32
    }
}


#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn same_seed_same_terrain()
    {
        let a = SimplexTerrainField::with_seed(42);
        let b = SimplexTerrainField::with_seed(42);

        for i in 0..64
        {
            let (x, z) = (i as f32 * 3.1, i as f32 * -1.7);
            assert_eq!(a.terrain_height(x, z), b.terrain_height(x, z));
        }
    }

    #[test]
    fn seeds_change_the_terrain()
    {
        let a = SimplexTerrainField::with_seed(1);
        let b = SimplexTerrainField::with_seed(2);

        let differing = (0..256)
            .map(|i| (i as f32 * 0.77, (i * 7 % 31) as f32))
            .filter(|&(x, z)| a.terrain_height(x, z) != b.terrain_height(x, z))
            .count();

        assert!(differing > 0);
        assert!(a.terrain_height(10.5, -4.25).is_finite());
    }
}
