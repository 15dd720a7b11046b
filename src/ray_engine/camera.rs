use nalgebra as na;
use na::{Matrix3, Point3, Vector3};

use super::Ray;


// Pinhole camera built from a look-at basis with roll
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera
{
    pub origin : Point3<f32>,
    right : Vector3<f32>,
    up : Vector3<f32>,
    forward : Vector3<f32>,
    tan_half_fov : f32,
}

impl Camera
{
    // fov is the vertical field of view in degrees
    pub fn look_at(origin : Point3<f32>, target : Point3<f32>, roll : f32, fov : f32)
        -> Camera
    {
        let basis = look_at_basis(origin, target, roll);

        Camera
        {
            origin,
            right : basis.column(0).into_owned(),
            up : basis.column(1).into_owned(),
            forward : basis.column(2).into_owned(),
            tan_half_fov : (fov.to_radians() / 2.0).tan(),
        }
    }

    pub fn forward(&self)
        -> Vector3<f32>
    {
        self.forward
    }

    // Ray through the centre of pixel (px, py); row 0 is the top of the image
    pub fn ray_for_pixel(&self, px : u32, py : u32, width : u32, height : u32)
        -> Ray
    {
        let aspect_ratio = width as f32 / height.max(1) as f32;

        let ndc_x = (2.0 * (px as f32 + 0.5) / width.max(1) as f32 - 1.0) * aspect_ratio;
        let ndc_y = 1.0 - 2.0 * (py as f32 + 0.5) / height.max(1) as f32;

        let direction =
            self.right * (ndc_x * self.tan_half_fov)
            + self.up * (ndc_y * self.tan_half_fov)
            + self.forward;

        Ray::new(self.origin, direction.normalize())
    }
}

// Columns are (right, up, forward)
pub fn look_at_basis(origin : Point3<f32>, target : Point3<f32>, roll : f32)
    -> Matrix3<f32>
{
    let roll_up = Vector3::new(roll.sin(), roll.cos(), 0.0);

    let forward = (target - origin).try_normalize(f32::EPSILON).unwrap_or_else(Vector3::z);
    let right = forward.cross(&roll_up).try_normalize(f32::EPSILON).unwrap_or_else(Vector3::x);
    let up = right.cross(&forward).normalize();

    Matrix3::from_columns(&[right, up, forward])
}


#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn basis_is_orthonormal()
    {
        let basis = look_at_basis(Point3::new(1.0, 5.0, -2.0), Point3::new(10.0, 0.0, 7.0), 0.3);

        let product = basis.transpose() * basis;

        assert!((product - Matrix3::identity()).amax() < 1e-5);
    }

    #[test]
    fn centre_pixel_looks_at_target()
    {
        let camera = Camera::look_at(Point3::new(0.0, 4.0, 0.0), Point3::new(8.0, 0.0, 8.0), 0.0, 60.0);

        // odd dimensions put a pixel centre exactly on the optical axis
        let ray = camera.ray_for_pixel(50, 50, 101, 101);
        let expected = (Point3::new(8.0, 0.0, 8.0) - Point3::new(0.0, 4.0, 0.0)).normalize();

        assert!((ray.direction - expected).norm() < 1e-5);
        assert_eq!(ray.origin, camera.origin);
    }

    #[test]
    fn top_rows_look_higher_than_bottom_rows()
    {
        let camera = Camera::look_at(Point3::new(0.0, 4.0, 0.0), Point3::new(0.0, 4.0, 10.0), 0.0, 60.0);

        let top = camera.ray_for_pixel(10, 0, 20, 20);
        let bottom = camera.ray_for_pixel(10, 19, 20, 20);

        assert!(top.direction.y > 0.0);
        assert!(bottom.direction.y < 0.0);
    }

    #[test]
    fn degenerate_target_still_yields_unit_rays()
    {
        let camera = Camera::look_at(Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 1.0), 0.0, 45.0);
        let ray = camera.ray_for_pixel(0, 0, 4, 4);

        assert!((ray.direction.norm() - 1.0).abs() < 1e-5);
    }
}
