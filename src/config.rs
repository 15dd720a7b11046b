use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// Every section falls back to its defaults, so a config file
// only has to name the values it changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig
{
    pub world : WorldConfig,
    pub sdf : SdfConfig,
    pub march : MarchConfig,
    pub render : RenderConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind
{
    Noise,
    Sdf,
    Simplex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig
{
    // chunks per side of the square grid
    pub side_length : usize,
    // world units per chunk side
    pub chunk_world_size : u32,
    pub chunk_height : f32,
    // height samples per chunk side
    pub chunk_resolution : usize,
    pub generator : GeneratorKind,
    pub simplex_seed : u32,
}

impl Default for WorldConfig
{
    fn default()
        -> WorldConfig
    {
        WorldConfig
        {
            side_length : 4,
            chunk_world_size : 16,
            chunk_height : 16.0,
            chunk_resolution : 32,
            generator : GeneratorKind::Noise,
            simplex_seed : 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdfConfig
{
    pub frequency : f32,
    pub ground_level : f32,
    pub vertical_scale : f32,
    pub lod_threshold : f32,
}

impl Default for SdfConfig
{
    fn default()
        -> SdfConfig
    {
        SdfConfig
        {
            frequency : 0.25,
            ground_level : 1.0,
            vertical_scale : 2.0,
            lod_threshold : 0.002,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarchConfig
{
    // voxel cells per chunk side
    pub voxel_resolution : u32,
    pub direction_epsilon : f32,
    pub surface_epsilon : f32,
    pub min_step_budget : u32,
}

impl Default for MarchConfig
{
    fn default()
        -> MarchConfig
    {
        MarchConfig
        {
            voxel_resolution : 32,
            direction_epsilon : 1e-4,
            surface_epsilon : 1e-4,
            min_step_budget : 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode
{
    Shaded,
    StepCost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig
{
    pub width : u32,
    pub height : u32,
    pub output_path : String,
    pub camera_origin : [f32 ; 3],
    pub camera_target : [f32 ; 3],
    pub camera_roll : f32,
    // vertical field of view in degrees
    pub fov : f32,
    pub light_direction : [f32 ; 3],
    pub sky_color : [f32 ; 3],
    pub mode : RenderMode,
    pub computed_normals : bool,
}

impl Default for RenderConfig
{
    fn default()
        -> RenderConfig
    {
        RenderConfig
        {
            width : 640,
            height : 360,
            output_path : String::from("terrain.png"),
            camera_origin : [-6.0, 9.0, -6.0],
            camera_target : [32.0, 0.0, 32.0],
            camera_roll : 0.0,
            fov : 60.0,
            light_direction : [0.4, 0.8, 0.3],
            sky_color : [0.55, 0.70, 0.90],
            mode : RenderMode::Shaded,
            computed_normals : false,
        }
    }
}

impl TracerConfig
{
    pub fn load_from_file<P : AsRef<Path>>(path : P)
        -> Result<TracerConfig, ConfigError>
    {
        let contents = fs::read_to_string(path)?;

        TracerConfig::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents : &str)
        -> Result<TracerConfig, ConfigError>
    {
        Ok(toml::from_str(contents)?)
    }
}
