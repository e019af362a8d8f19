mod app;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use tracing_subscriber::EnvFilter;

use app::{MemoryAppPlugin, RuntimeConfig};

#[derive(Debug, Default)]
struct CliArgs {
    config: Option<PathBuf>,
    save: Option<PathBuf>,
    data: Option<PathBuf>,
}

fn parse_args() -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut args = env::args().skip(1);
    while let Some(flag) = args.next() {
        let slot = match flag.as_str() {
            "--config" => &mut parsed.config,
            "--save" => &mut parsed.save,
            "--data" => &mut parsed.data,
            other => bail!("unknown argument '{other}' (expected --config, --save or --data)"),
        };
        let Some(value) = args.next() else {
            bail!("{flag} needs a path");
        };
        *slot = Some(PathBuf::from(value));
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let mut config = match &args.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    if let Some(save) = args.save {
        config.save_path = save;
    }
    if args.data.is_some() {
        config.data_dir = args.data;
    }
    tracing::info!(?config, "starting memory ascension");

    let frame = Duration::from_secs_f64(config.frame_seconds());
    let exit = App::new()
        .insert_resource(config)
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(frame)))
        .add_plugins(StatesPlugin)
        .add_plugins(MemoryAppPlugin)
        .run();

    if let AppExit::Error(code) = exit {
        bail!("exited with error code {code}");
    }
    Ok(())
}
