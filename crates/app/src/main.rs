use std::{
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use venetian_core::{
    Flap, FlapContent, LightingRenderer, SchedulerEvent, ShadeRenderer, TextRenderer, Venetian,
    VenetianConfig,
};

fn main() -> venetian_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            flaps,
            frames,
            frame_ms,
            width,
            simulate,
            no_lighting,
        } => run(RunOptions {
            config: config.as_deref(),
            flaps: flaps.as_deref(),
            frames,
            frame: Duration::from_millis(frame_ms),
            width,
            simulate,
            lighting: !no_lighting,
        }),
        Commands::Defaults => print_defaults(),
    }
}

struct RunOptions<'a> {
    config: Option<&'a Path>,
    flaps: Option<&'a Path>,
    frames: u64,
    frame: Duration,
    width: usize,
    simulate: bool,
    lighting: bool,
}

fn run(options: RunOptions<'_>) -> venetian_core::Result<()> {
    let config = match options.config {
        Some(path) => VenetianConfig::load(path)?,
        None => VenetianConfig::default(),
    };
    let flaps = match options.flaps {
        Some(path) => load_flaps(path)?,
        None => demo_flaps(config.stripes),
    };
    tracing::info!(
        stripes = config.stripes,
        flaps = flaps.len(),
        transform_ms = config.animation_duration().as_millis() as u64,
        simulate = options.simulate,
        "starting display"
    );

    let lighting: Option<Box<dyn LightingRenderer>> = if options.lighting {
        Some(Box::new(ShadeRenderer::new()))
    } else {
        None
    };
    let mut widget = Venetian::new(config, lighting)?;
    for flap in flaps {
        widget.register_flap(flap)?;
    }

    let mut renderer = TextRenderer::new(options.width);
    print_frame(&mut renderer, &widget);
    widget.advance();

    let started = Instant::now();
    let mut now = Duration::ZERO;
    for _ in 0..options.frames {
        now += options.frame;
        if !options.simulate {
            let target = started + now;
            let wait = target.saturating_duration_since(Instant::now());
            thread::sleep(wait);
        }

        for event in widget.tick(now) {
            if let SchedulerEvent::Advanced { angle } = event {
                tracing::info!(angle, "flipped to next flap");
            }
        }
        print_frame(&mut renderer, &widget);
    }

    widget.teardown();
    Ok(())
}

fn print_frame(renderer: &mut TextRenderer, widget: &Venetian) {
    if let Some(lines) = renderer.draw(widget.stripes()) {
        println!("t={:>6}ms", widget.now().as_millis());
        for line in lines {
            println!("{line}");
        }
    }
}

fn load_flaps(path: &Path) -> venetian_core::Result<Vec<Flap>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn demo_flaps(stripes: usize) -> Vec<Flap> {
    ["Departures", "Arrivals", "Delayed"]
        .iter()
        .map(|title| {
            (0..stripes)
                .map(|i| FlapContent::new(format!("<span>{title} {}</span>", i + 1)))
                .collect()
        })
        .collect()
}

fn print_defaults() -> venetian_core::Result<()> {
    let json = serde_json::to_string_pretty(&VenetianConfig::default())?;
    println!("{json}");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Split-flap display in the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Flip through flaps, printing the visible stripes whenever they change.
    Run {
        /// JSON configuration file. Defaults apply when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// JSON file holding an array of flaps, each an array of
        /// `{"html": ..., "styles": {...}}` entries or `null`.
        #[arg(short, long)]
        flaps: Option<PathBuf>,
        /// Number of frames to run before tearing the widget down.
        #[arg(long, default_value_t = 600)]
        frames: u64,
        /// Frame length in milliseconds.
        #[arg(long, default_value_t = 34)]
        frame_ms: u64,
        /// Width of the text column per stripe.
        #[arg(long, default_value_t = 24)]
        width: usize,
        /// Step a virtual clock instead of sleeping.
        #[arg(long)]
        simulate: bool,
        /// Run without the shading overlay.
        #[arg(long)]
        no_lighting: bool,
    },
    /// Print the default configuration as JSON.
    Defaults,
}
