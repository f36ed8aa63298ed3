//! The simulator binary (`spec.md` §6, "Simulator CLI"): parses `--sim` and
//! friends, sets up logging the way the rest of this crate's ambient stack
//! does, and hands off to [`commander_chess_engine::sim::run`].

use clap::Parser;
use flexi_logger::{AdaptiveFormat, Logger, WriteMode};

use commander_chess_engine::sim::{self, SimOptions};

fn main() -> anyhow::Result<()> {
    let options = SimOptions::parse();
    let _logger = Logger::try_with_env_or_str("info")?
        .write_mode(WriteMode::BufferAndFlush)
        .log_to_stderr()
        .adaptive_format_for_stderr(match cfg!(debug_assertions) {
            true => AdaptiveFormat::WithThread,
            _ => AdaptiveFormat::Default,
        })
        .start()?;

    if !options.sim {
        log::warn!("cc-sim only implements the --sim self-play mode; running it anyway");
    }

    log::info!("running {} self-play game(s) at seed {}", options.games, options.seed);
    sim::run(&options);
    Ok(())
}
