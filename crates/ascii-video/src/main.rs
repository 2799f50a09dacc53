//! # ascii-video
//!
//! Serves ASCII renditions of videos to terminal HTTP clients, one frame at a
//! time, so `curl localhost:8081` plays an animation in the terminal.
//!
//! Subcommands:
//! - `serve`: run the HTTP server (default)
//! - `build`: pre-render videos or image sequences into frame directories
//! - `play`: render a source and play it in this terminal
//! - `list`: show the animations found under the asset root

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ascii_video::{AppState, Server};
use ascii_video_core::{ServerConfig, StreamParams, StrategyKind};
use ascii_video_render::{FramePipeline, RenderStrategy};
use ascii_video_store::{
    build_folder, discover, load_live, load_precomputed, precomputed::list_frame_files,
    AnimationRegistry, BuildJob, DEFAULT_TIERS,
};
use ascii_video_stream::StreamSession;

#[derive(Parser, Debug)]
#[command(name = "ascii-video", version, about)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Render a video, image folder, or folder of videos into frame files
    Build(BuildArgs),
    /// Play a source or frame directory in this terminal
    Play(PlayArgs),
    /// List animations under the asset root
    List(ListArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    bind: Option<String>,
    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,
    /// Asset root holding one directory per animation
    #[arg(long)]
    root: Option<PathBuf>,
    /// Load every animation before accepting connections
    #[arg(long)]
    preload: bool,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Video file, directory of images, or (with --all) a folder of videos
    input: PathBuf,
    /// Animation name (defaults to the input's file stem)
    #[arg(long)]
    name: Option<String>,
    /// Asset root to write into
    #[arg(long)]
    root: Option<PathBuf>,
    /// Grid height in rows, repeatable for several tiers
    #[arg(long = "height")]
    heights: Vec<u16>,
    /// Write every standard tier (30, 50, 75, 100 rows)
    #[arg(long)]
    all_tiers: bool,
    /// Treat the input as a folder and build every video in it
    #[arg(long)]
    all: bool,
    /// Mapping strategy: color, monochrome, or filled
    #[arg(long)]
    strategy: Option<StrategyKind>,
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Video file, image folder, or frame directory
    input: PathBuf,
    /// Mapping strategy: color, monochrome, or filled
    #[arg(long)]
    strategy: Option<StrategyKind>,
    /// Grid height in rows
    #[arg(long)]
    height: Option<u16>,
    /// Seconds between frames
    #[arg(long)]
    interval: Option<f64>,
    /// Show every Nth frame
    #[arg(long)]
    stride: Option<i64>,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Asset root to scan
    #[arg(long)]
    root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    match cli.cmd.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(config, args).await,
        Command::Build(args) => build(&config, args),
        Command::Play(args) => play(&config, args).await,
        Command::List(args) => list(&config, args),
    }
}

fn load_config(path: Option<&Path>) -> Result<ServerConfig> {
    match path {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(ServerConfig::default()),
    }
}

fn live_pipeline(config: &ServerConfig, kind: StrategyKind, height: u16) -> FramePipeline {
    FramePipeline::new(
        height,
        RenderStrategy::from_kind(kind, config.render.color_mode),
    )
}

async fn serve(mut config: ServerConfig, args: ServeArgs) -> Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(root) = args.root {
        config.assets.root = root;
    }
    config.assets.preload |= args.preload;
    config.validate().context("invalid configuration")?;

    tracing::info!("ascii-video v{} starting", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(AnimationRegistry::from_settings(&config.assets));
    let pipeline = live_pipeline(&config, config.render.strategy, config.render.height);
    {
        let registry = Arc::clone(&registry);
        let sources = config.assets.live_sources.clone();
        let tint = config.render.tint_live;
        let preload = config.assets.preload;
        tokio::task::spawn_blocking(move || {
            let live = registry.register_live_sources(&sources, &pipeline, tint);
            if live > 0 {
                tracing::info!("Registered {} live sources", live);
            }
            if preload {
                registry.preload();
            }
            tracing::info!("{} animations in memory", registry.loaded_count());
        })
        .await
        .context("asset loading panicked")?;
    }

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let names = registry.names();
    let state = AppState::new(registry, &config);
    let server = Server::bind(addr.as_str(), state)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = server.local_addr()?;

    print_banner(&local.to_string(), &config.server.default_animation, &names);

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn print_banner(addr: &str, default_animation: &str, names: &[String]) {
    tracing::info!(addr, animations = ?names, "Ready");
    println!("🐦 ASCII video server listening on http://{addr}");
    println!("   curl {addr}                       # {default_animation}");
    println!("   curl {addr}/<name>?interval=0.05&stride=2");
    if names.is_empty() {
        println!("   No animations found yet; run `ascii-video build <video>` first.");
    } else {
        println!("   Animations: {}", names.join(", "));
    }
}

fn build(config: &ServerConfig, args: BuildArgs) -> Result<()> {
    let root = args.root.unwrap_or_else(|| config.assets.root.clone());
    let kind = args.strategy.unwrap_or(config.render.strategy);
    let strategy = RenderStrategy::from_kind(kind, config.render.color_mode);
    let heights: Vec<u16> = if args.all_tiers {
        DEFAULT_TIERS.to_vec()
    } else if args.heights.is_empty() {
        vec![config.render.height]
    } else {
        args.heights
    };

    if args.all {
        let results = build_folder(&args.input, &root, &heights, strategy)
            .with_context(|| format!("failed to scan {}", args.input.display()))?;
        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        for (name, result) in &results {
            match result {
                Ok(report) => println!("✔ {name}: {} frames", report.frames),
                Err(e) => println!("✘ {name}: {e}"),
            }
        }
        if failed > 0 {
            bail!("{failed} of {} builds failed", results.len());
        }
        return Ok(());
    }

    let name = match args.name {
        Some(name) => name,
        None => args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .context("cannot derive an animation name from the input; pass --name")?,
    };

    let report = BuildJob::new(name.as_str(), &args.input, &root)
        .with_heights(&heights)
        .with_strategy(strategy)
        .run()
        .with_context(|| format!("failed to build '{name}'"))?;

    println!(
        "✔ {}: {} frames ({} skipped)",
        report.name, report.frames, report.skipped
    );
    for (height, dir) in &report.outputs {
        println!("   {height} rows -> {}", dir.display());
    }
    Ok(())
}

async fn play(config: &ServerConfig, args: PlayArgs) -> Result<()> {
    let defaults = config.stream_defaults();
    let params = StreamParams::new(
        args.interval.unwrap_or(defaults.interval()),
        args.stride.unwrap_or(defaults.stride().get() as i64),
    );

    let name = args
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("animation")
        .to_string();

    let is_frame_dir = args.input.is_dir()
        && list_frame_files(&args.input)
            .map(|files| !files.is_empty())
            .unwrap_or(false);

    let animation = if is_frame_dir {
        load_precomputed(&args.input, &name, config.assets.tint_precomputed)
    } else {
        if !args.input.exists() {
            bail!("{} does not exist", args.input.display());
        }
        let pipeline = live_pipeline(
            config,
            args.strategy.unwrap_or(config.render.strategy),
            args.height.unwrap_or(config.render.height),
        );
        let input = args.input.clone();
        let tint = config.render.tint_live;
        tokio::task::spawn_blocking(move || load_live(&name, &input, &pipeline, tint))
            .await
            .context("rendering panicked")?
    };

    let report = StreamSession::new(Arc::new(animation), params)
        .run(tokio::io::stdout(), async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    tracing::debug!(frames = report.frames_sent, loops = report.loops, "Playback ended");
    Ok(())
}

fn list(config: &ServerConfig, args: ListArgs) -> Result<()> {
    let root = args.root.unwrap_or_else(|| config.assets.root.clone());
    let names = discover(&root).with_context(|| format!("failed to scan {}", root.display()))?;
    if names.is_empty() {
        println!("No animations under {}", root.display());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}
