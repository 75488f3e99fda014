// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::env;
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand};
use tracing::info;

use padbank::browser::FsLister;
use padbank::config::Settings;
use padbank::controller::{self, keyboard};
use padbank::samples::Engine;
use padbank::soundboard::{self, Soundboard};
use padbank::{audio, util, wav};

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A soundboard with hot-swappable pad samples."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start will start the soundboard.
    Start {
        /// The path to the soundboard config.
        config_path: String,
    },
    /// Lists the available audio output devices.
    Devices {},
    /// Decodes the given sample files and reports their format.
    Verify {
        /// The files to check.
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Prints the default configuration to stdout.
    Config {},
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(util::log_filter(env::var("RUST_LOG").ok().as_deref()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start { config_path } => {
            let settings = Settings::deserialize(&PathBuf::from(&config_path))?;
            let frame_tick = settings.frame_tick()?;

            let driver = audio::get_driver(settings.audio())?;
            let mut engine = Engine::new(driver);
            engine.load_startup(&settings.pad_files());

            let mut board = Soundboard::new(
                engine,
                Box::new(FsLister),
                &settings.browse_root(),
                settings.visible_rows(),
            );

            let (events_tx, events_rx) = crossbeam_channel::bounded(16);
            let input: Arc<dyn controller::Driver> = Arc::new(keyboard::Driver::new());
            // The keyboard thread blocks on stdin, so it is left to exit with the process.
            let _input_thread = input.monitor_events(events_tx);

            soundboard::run(&mut board, &events_rx, frame_tick, io::stdout())?;
            board.shutdown();
            info!("Soundboard stopped.");
        }
        Commands::Devices {} => {
            let devices = audio::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Verify { files } => {
            let mut failed = 0;
            for file in files.iter() {
                match wav::decode_file(&PathBuf::from(file)) {
                    Ok(decoded) => println!(
                        "{}: {} channel(s), {} Hz, {} frames",
                        file,
                        decoded.layout().count(),
                        decoded.sample_rate(),
                        decoded.frames()
                    ),
                    Err(e) => {
                        println!("{}: {}", file, e);
                        failed += 1;
                    }
                }
            }

            if failed > 0 {
                return Err(format!("{} of {} files failed to decode", failed, files.len()).into());
            }
        }
        Commands::Config {} => {
            print!("{}", Settings::default_yaml()?);
        }
    }

    Ok(())
}
