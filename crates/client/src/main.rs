mod app;
mod config;
mod input;
mod tui;

use std::fs::File;
use std::time::Duration;

use clap::Parser;
use cubed::{DEFAULT_PORT, GameClient, TcpTransport};

use config::ClientConfig;

#[derive(Parser)]
#[command(name = "cubed")]
#[command(about = "Cubed multiplayer client")]
struct Args {
    #[arg(
        short,
        long,
        help = "Server address to prefill (e.g., 127.0.0.1:27015)"
    )]
    server: Option<String>,

    #[arg(long, help = "Frames per second to update and draw at")]
    fps: Option<u32>,

    #[arg(long, value_name = "SECS", help = "Seconds to wait for a connection")]
    connect_timeout: Option<f64>,

    #[arg(long, value_name = "SECS", help = "Seconds before a silent peer is dropped")]
    peer_timeout: Option<f64>,

    #[arg(long, help = "Player speed in units per second")]
    speed: Option<f32>,

    #[arg(long, help = "Velocity decay rate per second")]
    damping: Option<f32>,

    #[arg(long, help = "Write logs to this file instead of stderr")]
    log_file: Option<String>,
}

impl Args {
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = ClientConfig::default();

        if let Some(fps) = self.fps {
            anyhow::ensure!(fps > 0, "--fps must be positive");
            config.frame_rate = fps;
        }
        if let Some(secs) = self.connect_timeout {
            config.session.connect_timeout = Duration::try_from_secs_f64(secs)?;
        }
        if let Some(secs) = self.peer_timeout {
            config.session.peer_timeout = Duration::try_from_secs_f64(secs)?;
        }
        if let Some(speed) = self.speed {
            anyhow::ensure!(
                speed.is_finite() && speed >= 0.0,
                "--speed must be a non-negative number"
            );
            config.motion.speed = speed;
        }
        if let Some(damping) = self.damping {
            anyhow::ensure!(
                damping.is_finite() && damping >= 0.0,
                "--damping must be a non-negative number"
            );
            config.motion.damping_rate = damping;
        }

        Ok(config)
    }
}

/// Logs go to `log_file` only. The terminal UI owns stderr while running,
/// so without a file nothing is logged, even with RUST_LOG set.
fn logger(log_file: Option<File>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    match log_file {
        Some(file) => {
            builder.filter_level(log::LevelFilter::Info);
            builder.parse_default_env();
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }

    builder
}

fn init_logging(path: Option<&str>) -> anyhow::Result<()> {
    let file = path.map(File::create).transpose()?;
    logger(file).init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = args.client_config()?;
    let address = args
        .server
        .clone()
        .unwrap_or_else(|| format!("127.0.0.1:{}", DEFAULT_PORT));

    let transport = TcpTransport::new()?;
    let client = GameClient::new(transport, config.session.clone(), config.motion.clone())
        .with_server_address(address);

    let mut app = app::App::new(client, config)?;
    let result = app.run();
    app.restore_terminal()?;
    result
}
