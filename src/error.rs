use thiserror::Error;

// Failures of the chunk data model.
// Noise evaluation and ray marching are total and have no error type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorldError
{
    #[error("chunk ({cx}, {cz}) is out of range for a {side_length}x{side_length} grid")]
    ChunkOutOfRange { cx : i32, cz : i32, side_length : usize },

    #[error("sample ({x}, {z}) is out of range for a chunk of resolution {resolution}")]
    SampleOutOfRange { x : usize, z : usize, resolution : usize },

    #[error("height array has {actual} samples, expected {expected}")]
    HeightLengthMismatch { expected : usize, actual : usize },

    #[error("chunk resolution must be at least 2, got {0}")]
    InvalidResolution(usize),

    #[error("chunk has resolution {actual}, expected {expected}")]
    ResolutionMismatch { expected : usize, actual : usize },

    #[error("atlas needs {expected} chunks, got {actual}")]
    ChunkCountMismatch { expected : usize, actual : usize },

    #[error("chunk grid must have a nonzero side length")]
    EmptyGrid,
}

#[derive(Debug, Error)]
pub enum ConfigError
{
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum AppError
{
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    World(#[from] WorldError),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}
