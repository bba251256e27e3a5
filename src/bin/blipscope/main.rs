//! blipscope - band-limited chiptune player with a terminal scope
//!
//! Run with: cargo run --bin blipscope

mod app;
mod tune;
mod ui;

use app::BlipScope;
use tune::Tune;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    BlipScope::new()
        .frame_rate(60)
        .bass_freq(Some(16))
        .tune(Tune::demo())
        .run()
}
