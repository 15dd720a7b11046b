use log::warn;

use heightfield_tracer::app_loop;
use heightfield_tracer::config::TracerConfig;
use heightfield_tracer::error::AppError;

fn main()
    -> Result<(), AppError>
{
    env_logger::init();

    let config = match std::env::args().nth(1)
    {
        Some(path) => TracerConfig::load_from_file(&path).unwrap_or_else(|err|
        {
            warn!("could not load {}: {}, using defaults", path, err);
            TracerConfig::default()
        }),
        None => TracerConfig::default(),
    };

    app_loop::run(&config)
}
