use clap::Parser;
use phonedial::config;
use phonedial::gui::app::AppModel;
use phonedial::sys::runtime;
use relm4::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "phonedial", version, about, long_about = None)]
struct Cli {
    /// Read the configuration from this file instead of the default location
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Write the default configuration file (if missing), print its path and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => config::get_config_path()?,
    };

    if cli.write_default_config {
        let path = config::write_default_config(&config_path)?;
        println!("{}", path.display());
        return Ok(());
    }

    let config = config::load_or_setup(&config_path);

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx, config_path.clone());

    // GTK must not see our own flags
    let app = RelmApp::new("org.rotary.phonedial").with_args(Vec::new());

    app.run::<AppModel>((config, config_path, rx));
    Ok(())
}
