use std::time::Instant;

use image::RgbImage;
use log::info;
use nalgebra as na;
use na::{Point3, Vector3};
use rayon::prelude::*;

use crate::colorizer;
use crate::config::{RenderMode, TracerConfig};
use crate::error::AppError;
use crate::ray_engine::{camera::Camera, ray_marcher::RayMarcher, world_tracer::WorldTracer};
use crate::world_engine::{self, TerrainField};
use crate::world_engine::chunk_manager::ChunkManager;
use crate::world_engine::height_atlas::{AtlasHandle, HeightAtlas};


// Generate the world, publish it, trace one frame and write it to disk
pub fn run(config : &TracerConfig)
    -> Result<(), AppError>
{
    let generation_start = Instant::now();

    let mut manager = ChunkManager::from_config(&config.world, world_engine::terrain_field_for(config))?;
    manager.populate()?;

    info!("generation ms: {}", generation_start.elapsed().as_secs_f32() * 1000.0);

    let handle = AtlasHandle::new(manager.publish_atlas(1)?);
    let atlas = handle.snapshot();

    let render_start = Instant::now();
    let frame = render_frame(config, &atlas, manager.terrain_field());

    info!(
        "rendered {}x{} frame, ms: {}",
        frame.width(), frame.height(), render_start.elapsed().as_secs_f32() * 1000.0);

    frame.save(&config.render.output_path)?;
    info!("wrote {}", config.render.output_path);

    Ok(())
}

fn point(a : [f32 ; 3])
    -> Point3<f32>
{
    Point3::new(a[0], a[1], a[2])
}

fn vector(a : [f32 ; 3])
    -> Vector3<f32>
{
    Vector3::new(a[0], a[1], a[2])
}

// Traces every pixel against one atlas snapshot, rows in parallel
pub fn render_frame(config : &TracerConfig, atlas : &HeightAtlas, field : &dyn TerrainField)
    -> RgbImage
{
    let render = &config.render;
    let (width, height) = (render.width.max(1), render.height.max(1));

    let camera = Camera::look_at(
        point(render.camera_origin),
        point(render.camera_target),
        render.camera_roll,
        render.fov);

    let tracer = WorldTracer::new(RayMarcher::from_config(&config.march));

    let (lowest, highest) = atlas.height_range();
    let span = (highest - lowest).max(f32::EPSILON);
    let cost_scale = tracer.marcher().step_budget(highest - lowest) as f32;

    let light = vector(render.light_direction);
    let sky = vector(render.sky_color);

    let mut frame = RgbImage::new(width, height);

    frame.par_chunks_mut(width as usize * 3)
    .enumerate()
    .for_each(|(py, row)|
    {
        for (px, pixel) in row.chunks_mut(3).enumerate()
        {
            let ray = camera.ray_for_pixel(px as u32, py as u32, width, height);
            let hit = tracer.trace(atlas, &ray);

            let color = match render.mode
            {
                RenderMode::StepCost => colorizer::step_count_cost_color(hit.step_count as f32 / cost_scale),
                RenderMode::Shaded if hit.found =>
                {
                    let normal = if render.computed_normals
                    {
                        colorizer::terrain_normal(field, hit.position, hit.distance)
                    }
                    else
                    {
                        colorizer::approximate_normal()
                    };

                    let base = colorizer::height_color((hit.position.y - lowest) / span);
                    colorizer::shade(base, light, normal)
                },
                RenderMode::Shaded => sky,
            };

            pixel.copy_from_slice(&colorizer::to_rgb8(color));
        }
    });

    frame
}
