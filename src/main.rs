// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use scanner::app::AppModel;
use scanner::i18n;
use std::path::PathBuf;
use std::time::Duration;

mod cli;

#[derive(Parser)]
#[command(name = "scanner")]
#[command(about = "QR code scanner for the COSMIC desktop")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. "info", "scanner=debug")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List,

    /// Decode QR codes in an image file
    Decode {
        /// Image to decode (PNG, JPEG, ...)
        image: PathBuf,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan from a camera until a code is read
    Scan {
        /// Camera index to use (from 'scanner list')
        #[arg(short, long, default_value = "0")]
        camera: usize,

        /// Give up after this many seconds
        #[arg(short, long, default_value = "30")]
        timeout: u64,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logging is configured once here and nowhere else.
    // RUST_LOG wins over --log-level, e.g. RUST_LOG=scanner=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(true)
        .with_level(true)
        .init();

    match cli.command {
        Some(Commands::List) => cli::list_cameras()?,
        Some(Commands::Decode { image, json }) => cli::decode_image(&image, json)?,
        Some(Commands::Scan {
            camera,
            timeout,
            json,
        }) => cli::scan_camera(camera, Duration::from_secs(timeout), json)?,
        None => run_gui()?,
    }

    Ok(())
}

fn run_gui() -> Result<(), Box<dyn std::error::Error>> {
    // Get the system's preferred languages.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();

    // Enable localizations to be applied.
    i18n::init(&requested_languages);

    // Settings for configuring the application window and iced runtime.
    let settings = cosmic::app::Settings::default().size_limits(
        cosmic::iced::Limits::NONE
            .min_width(360.0)
            .min_height(480.0),
    );

    // Starts the application's event loop with `()` as the application's flags.
    cosmic::app::run::<AppModel>(settings, ())?;

    Ok(())
}
