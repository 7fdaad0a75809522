use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glyphfield::app::{self, HostConfig, BACKGROUND};
use glyphfield::{FieldConfig, LinkStrategy, Motion};

#[derive(Parser)]
#[command(name = "glyphfield")]
#[command(about = "Animated glyph particle background", long_about = None)]
struct Cli {
    /// Number of particles
    #[arg(short, long, default_value_t = glyphfield::DEFAULT_PARTICLE_COUNT)]
    count: usize,

    /// Window (or snapshot) width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window (or snapshot) height in pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Seed for a reproducible field
    #[arg(long)]
    seed: Option<u64>,

    /// Cap particle speed after pointer pushes
    #[arg(long)]
    max_speed: Option<f32>,

    /// Scale motion by elapsed time (60 Hz reference) instead of one step per frame
    #[arg(long)]
    time_scaled: bool,

    /// Use the spatial grid for links above this many particles
    #[arg(long)]
    grid_above: Option<usize>,

    /// Render headless and write the final frame to this PNG
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Frames to simulate before writing the snapshot
    #[arg(long, default_value_t = 120)]
    frames: u32,
}

impl Cli {
    fn field_config(&self) -> FieldConfig {
        let mut config = FieldConfig::new().with_particle_count(self.count);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(max_speed) = self.max_speed {
            config = config.with_max_speed(max_speed);
        }
        if self.time_scaled {
            config = config.with_motion(Motion::TimeScaled { reference_hz: 60.0 });
        }
        if let Some(threshold) = self.grid_above {
            config = config.with_links(LinkStrategy::Auto { threshold });
        }
        config
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = cli.field_config();

    let result = match &cli.snapshot {
        Some(path) => app::render_snapshot(cli.width, cli.height, cli.frames, BACKGROUND, config, path).map(|_| ()),
        None => app::run(HostConfig {
            width: cli.width,
            height: cli.height,
            field: config,
            ..Default::default()
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
