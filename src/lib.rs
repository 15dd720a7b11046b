pub mod config;
pub mod error;

pub mod world_engine;
pub mod ray_engine;

pub mod colorizer;
pub mod app_loop;
