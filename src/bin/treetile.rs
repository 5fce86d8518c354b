use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use treetile_wm::common::config::TreeLayoutSettings;
use treetile_wm::common::log;
use treetile_wm::layout_engine::script::{ScriptRunner, parse_script};
use treetile_wm::sys::geometry::Rectangle;

/// Replays a script of layout operations and prints the resulting layouts.
#[derive(Parser)]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Width of the layout area in pixels.
    #[arg(long, default_value_t = 1920)]
    width: i32,

    /// Height of the layout area in pixels.
    #[arg(long, default_value_t = 1080)]
    height: i32,

    /// Script with one step per line.
    script: PathBuf,
}

fn main() {
    let opt = Cli::parse();
    log::init_logging();

    if let Err(e) = run(&opt) {
        eprintln!("treetile: {e:#}");
        process::exit(1);
    }
}

fn run(opt: &Cli) -> anyhow::Result<()> {
    let settings = match &opt.config {
        Some(path) => TreeLayoutSettings::load(path)?,
        None => TreeLayoutSettings::load_default()?,
    };
    if opt.width <= 0 || opt.height <= 0 {
        anyhow::bail!("layout area must be positive, got {}x{}", opt.width, opt.height);
    }

    let text = std::fs::read_to_string(&opt.script)
        .with_context(|| format!("reading {}", opt.script.display()))?;
    let steps = parse_script(&text).with_context(|| format!("parsing {}", opt.script.display()))?;

    let mut runner = ScriptRunner::new(settings, Rectangle::new(0, 0, opt.width, opt.height));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    runner.run(&steps, &mut out)?;
    out.flush()?;
    Ok(())
}
