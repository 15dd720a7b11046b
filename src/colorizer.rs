use nalgebra as na;
use na::{Point3, Vector3};

use crate::world_engine::TerrainField;

const PI2 : f32 = 6.28318;
const GAMMA : f32 = 2.2;

pub const SHADOW_TINT : [f32 ; 3] = [0.10, 0.12, 0.18];

// (stop, colour) pairs, lowest first
const HEIGHT_BANDS : [(f32, [f32 ; 3]) ; 6] =
[
    (0.00, [0.05, 0.15, 0.35]), // deep water
    (0.30, [0.76, 0.70, 0.50]), // sand
    (0.50, [0.25, 0.55, 0.20]), // grass
    (0.65, [0.13, 0.37, 0.15]), // forest
    (0.80, [0.45, 0.42, 0.40]), // rock
    (1.00, [0.95, 0.95, 0.97]), // snow
];


fn rgb(c : [f32 ; 3])
    -> Vector3<f32>
{
    Vector3::new(c[0], c[1], c[2])
}

fn lerp(a : Vector3<f32>, b : Vector3<f32>, t : f32)
    -> Vector3<f32>
{
    a * (1.0 - t) + b * t
}

// Fixed shading normal used when normals are not computed from the field
pub fn approximate_normal()
    -> Vector3<f32>
{
    Vector3::new(0.3, 1.0, 0.2).normalize()
}

// Terrain colour for a height normalized to [0, 1]
pub fn height_color(h : f32)
    -> Vector3<f32>
{
    let h = if h.is_nan() { 0.0 } else { h.max(0.0).min(1.0) };

    for pair in HEIGHT_BANDS.windows(2)
    {
        let (lo, lo_color) = pair[0];
        let (hi, hi_color) = pair[1];

        if h <= hi
        {
            let t = (h - lo) / (hi - lo);
            return lerp(rgb(lo_color), rgb(hi_color), t);
        }
    }

    rgb(HEIGHT_BANDS[HEIGHT_BANDS.len() - 1].1)
}

pub fn shade(base : Vector3<f32>, light_dir : Vector3<f32>, normal : Vector3<f32>)
    -> Vector3<f32>
{
    let light = light_dir.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::y);
    let diffuse = normal.dot(&light).max(0.0).min(1.0);

    lerp(rgb(SHADOW_TINT), base, diffuse)
}

// Diagnostic palette, bias is usually step_count / budget
pub fn step_count_cost_color(bias : f32)
    -> Vector3<f32>
{
    let offset = Vector3::new(0.938, 0.328, 0.718);
    let amplitude = Vector3::new(0.902, 0.4235, 0.1843);
    let frequency = Vector3::new(0.7098, 0.7098, 0.0824);
    let phase = Vector3::new(2.538, 2.478, 0.168);

    let angle = (frequency * bias + phase) * PI2;

    offset + amplitude.component_mul(&angle.map(f32::cos))
}

pub fn to_linear(color : Vector3<f32>)
    -> Vector3<f32>
{
    color.map(|c| c.max(0.0).powf(GAMMA))
}

pub fn to_srgb(color : Vector3<f32>)
    -> Vector3<f32>
{
    color.map(|c| c.max(0.0).powf(1.0 / GAMMA))
}

// Central difference over the field, the offset grows with hit distance t
pub fn terrain_normal(field : &dyn TerrainField, point : Point3<f32>, t : f32)
    -> Vector3<f32>
{
    let eps = (0.001 * t).max(1e-4);

    let h1 = field.terrain_height(point.x - eps, point.z);
    let h2 = field.terrain_height(point.x + eps, point.z);
    let h3 = field.terrain_height(point.x, point.z - eps);
    let h4 = field.terrain_height(point.x, point.z + eps);

    Vector3::new(h1 - h2, 2.0 * eps, h3 - h4)
    .try_normalize(f32::EPSILON)
    .unwrap_or_else(Vector3::y)
}

// [0, 1] colour to 8 bit channels
pub fn to_rgb8(color : Vector3<f32>)
    -> [u8 ; 3]
{
    let channel = |c : f32| (c.max(0.0).min(1.0) * 255.0).round() as u8;

    [channel(color.x), channel(color.y), channel(color.z)]
}


#[cfg(test)]
mod tests
{
    use super::*;

    fn close(a : Vector3<f32>, b : Vector3<f32>)
        -> bool
    {
        (a - b).amax() < 1e-5
    }

    #[test]
    fn stops_are_returned_exactly()
    {
        for &(stop, color) in HEIGHT_BANDS.iter()
        {
            assert_eq!(height_color(stop), rgb(color), "stop {}", stop);
        }
    }

    #[test]
    fn bands_interpolate_linearly()
    {
        let mid_sand_grass = height_color(0.40);
        let expected = (rgb([0.76, 0.70, 0.50]) + rgb([0.25, 0.55, 0.20])) * 0.5;

        assert!(close(mid_sand_grass, expected));

        let quarter = height_color(0.85);
        let expected = lerp(rgb([0.45, 0.42, 0.40]), rgb([0.95, 0.95, 0.97]), 0.25);

        assert!(close(quarter, expected));
    }

    #[test]
    fn heights_outside_unit_range_clamp()
    {
        assert_eq!(height_color(-3.0), height_color(0.0));
        assert_eq!(height_color(7.5), height_color(1.0));
        assert_eq!(height_color(f32::NAN), height_color(0.0));
    }

    #[test]
    fn shade_runs_from_shadow_to_base()
    {
        let base = Vector3::new(0.8, 0.6, 0.4);
        let up = Vector3::y();

        assert!(close(shade(base, up, up), base));
        assert!(close(shade(base, -up, up), rgb(SHADOW_TINT)));

        let half = shade(base, Vector3::new(1.0, 1.0, 0.0) * 3.0, Vector3::x());
        let t = std::f32::consts::FRAC_1_SQRT_2;
        assert!(close(half, lerp(rgb(SHADOW_TINT), base, t)));
    }

    #[test]
    fn approximate_normal_is_unit_and_upward()
    {
        let n = approximate_normal();

        assert!((n.norm() - 1.0).abs() < 1e-6);
        assert!(n.y > n.x && n.y > n.z);
    }

    #[test]
    fn cost_palette_matches_cosine_formula()
    {
        let c = step_count_cost_color(0.0);

        assert!((c.x - (0.938 + 0.902 * (PI2 * 2.538).cos())).abs() < 1e-5);
        assert!((c.z - (0.718 + 0.1843 * (PI2 * 0.168).cos())).abs() < 1e-5);
        assert_ne!(step_count_cost_color(0.0), step_count_cost_color(1.0));
    }

    #[test]
    fn gamma_conversions_invert_each_other()
    {
        let color = Vector3::new(0.2, 0.5, 0.9);

        assert!(close(to_srgb(to_linear(color)), color));
        assert_eq!(to_linear(Vector3::new(1.0, 0.0, 1.0)), Vector3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn flat_field_normal_points_up()
    {
        let flat = |_x : f32, _z : f32| 2.0f32;

        assert!(close(terrain_normal(&flat, Point3::new(3.0, 2.0, 1.0), 10.0), Vector3::y()));

        // a slope rising along +x tilts the normal toward -x
        let slope = |x : f32, _z : f32| x;
        let n = terrain_normal(&slope, Point3::new(0.0, 0.0, 0.0), 5.0);
        assert!(n.x < 0.0 && n.y > 0.0);
        assert!((n - Vector3::new(-1.0, 1.0, 0.0).normalize()).norm() < 1e-4);
    }

    #[test]
    fn channels_round_and_clamp()
    {
        assert_eq!(to_rgb8(Vector3::new(1.2, 0.5, -0.1)), [255, 128, 0]);
    }
}
