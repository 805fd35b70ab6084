use vj_detect::{
    camera::Camera,
    cli::{dialog, report, ConfirmationDialog, HighGuiPrompt, HighGuiWindow},
    common::{paths, Config},
    core::{Detector, Session},
};

use clap::Parser;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "vj-detect")]
#[command(about = "Live face, eye and mouth detection with Haar cascades")]
struct Cli {
    /// Configuration file (defaults to vj-detect.toml next to the executable)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Camera index, /dev/video<N>
    #[arg(short, long)]
    device: Option<u32>,

    /// List video capture devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Verbose debug logging
    #[arg(long)]
    dev: bool,
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.dev);

    // Failures are reported here and the process still exits normally.
    if let Err(e) = run(cli) {
        report::fatal(&format!("{:#}", e));
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.list_devices {
        let devices = Camera::list_devices()?;
        println!("{}", report::device_listing(&devices));
        return Ok(());
    }

    let exe_dir = paths::executable_dir()?;
    let mut config = Config::load(cli.config.as_deref(), &exe_dir)?;
    if let Some(index) = cli.device {
        config.camera.device_index = index;
    }

    let cascades = config.cascades.resolve(&exe_dir);
    tracing::info!("Icon: {}", cascades.icon.display());

    let camera = Camera::open(&config.camera)?;
    tracing::info!("Camera /dev/video{} ready", camera.index());
    let mut detector = Detector::load(&cascades, config.detection)
        .context("Failed to load cascade classifiers")?;

    let icon = dialog::load_icon_or_warn(&cascades.icon);
    let window = HighGuiWindow::open(&config.display.window_title)?;
    let dialog = ConfirmationDialog::new(HighGuiPrompt::new(icon));

    let mut session = Session::new(camera, window, dialog, config.display.key_wait());
    let summary = session.run(&mut detector)?;

    tracing::info!(
        "Closed after {} frames ({} exit request(s))",
        summary.frames, summary.exit_requests
    );
    Ok(())
}

fn setup_logging(dev_mode: bool) {
    if dev_mode {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }
}
