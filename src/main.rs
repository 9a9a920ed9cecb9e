use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pacman_term::app::App;
use pacman_term::audio::Audio;
use pacman_term::config::{write_default, GameConfig};
use pacman_term::game::Game;
use pacman_term::input::Bindings;
use pacman_term::logging::setup_logging;
use pacman_term::persistence::{FileStore, SessionStore};
use pacman_term::render::{Renderer, TerminalGuard};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Level configuration file to use instead of the default one
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the default configuration to config/config.yml and exit
    #[arg(long)]
    write_config: bool,
    /// Start muted
    #[arg(long)]
    mute: bool,
    /// Start at the named level instead of the saved one
    #[arg(long)]
    level: Option<String>,
    /// Seed for pursuer randomness and spawn placement
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.write_config {
        let path = write_default(&PathBuf::from(".")).context("writing the default configuration")?;
        println!("Default configuration written to {}", path.display());
        return Ok(());
    }

    setup_logging();

    let config = GameConfig::load(cli.config.as_deref()).context("loading the level configuration")?;
    let store = FileStore::from_env();
    let mut record = store.load_or_default();

    if let Some(level) = cli.level {
        if config.level_index(&level).is_none() {
            anyhow::bail!("unknown level {level:?}");
        }
        record.level_name = level;
    }
    if cli.mute {
        record.mute = true;
    }

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let game = Game::new(config, record, rng);
    info!(level = game.level_index(), "Game created");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building the runtime")?;

    // Opened before the terminal is taken over, since audio backends may complain on stderr
    let audio = Audio::open();
    let guard = TerminalGuard::enter().context("preparing the terminal")?;
    let mut app = App::new(game, audio, store).with_renderer(Renderer::new());
    if let Err(e) = app.spawn_input(Bindings::default()) {
        warn!(error = %e, "Could not start the input thread");
        drop(guard);
        return Err(e).context("starting the input thread");
    }

    let result = runtime.block_on(app.run());
    // Pending timer tasks are not waited for
    runtime.shutdown_timeout(Duration::from_millis(200));
    drop(guard);
    result.context("running the game")
}
