use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "toonreel", version)]
struct Cli {
    /// Log asset resolution and other debug detail.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an episode to MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render 2-3 pacing/music variants in parallel (requires `ffmpeg` on PATH).
    Variants(VariantsArgs),
    /// Render one composited scene frame as a PNG.
    Frame(FrameArgs),
    /// Validate a script and print its frame counts.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct FormatArgs {
    /// Output format preset.
    #[arg(long, default_value = "widescreen")]
    format: String,

    /// Custom render config JSON, replacing `--format`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Asset library root.
    #[arg(long)]
    assets: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    output: FormatArgs,

    /// Library-relative music track, replacing the catalog's selection.
    #[arg(long)]
    music: Option<String>,

    /// Keep music at full level under dialogue.
    #[arg(long)]
    no_ducking: bool,
}

#[derive(Parser, Debug)]
struct VariantsArgs {
    /// Input script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Asset library root.
    #[arg(long)]
    assets: PathBuf,

    /// Directory receiving one MP4 per variant.
    #[arg(long)]
    out_dir: PathBuf,

    /// Number of variants (2 or 3).
    #[arg(long, default_value_t = 3)]
    count: usize,

    #[command(flatten)]
    output: FormatArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Asset library root.
    #[arg(long)]
    assets: PathBuf,

    /// Scene index (0-based).
    #[arg(long, default_value_t = 0)]
    scene: usize,

    /// Frame index within the scene (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    output: FormatArgs,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Variants(args) => cmd_variants(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_script_json(path: &Path) -> anyhow::Result<toonreel::Script> {
    let f = File::open(path).with_context(|| format!("open script '{}'", path.display()))?;
    let r = BufReader::new(f);
    let script: toonreel::Script =
        serde_json::from_reader(r).with_context(|| "parse script JSON")?;
    Ok(script)
}

fn render_config(args: &FormatArgs) -> anyhow::Result<toonreel::RenderConfig> {
    let config = match &args.config {
        Some(path) => {
            let f = File::open(path)
                .with_context(|| format!("open render config '{}'", path.display()))?;
            serde_json::from_reader(BufReader::new(f))
                .with_context(|| "parse render config JSON")?
        }
        None => toonreel::RenderConfig::preset(&args.format)?,
    };
    Ok(config)
}

fn compose_opts(fps: u32) -> anyhow::Result<toonreel::ComposeOpts> {
    Ok(toonreel::ComposeOpts {
        fps: toonreel::Fps::new(fps, 1)?,
        ..toonreel::ComposeOpts::default()
    })
}

fn print_warnings(warnings: &[toonreel::RenderWarning]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!("{} warning(s):", warnings.len());
    for w in warnings {
        eprintln!("  - {w}");
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let script = read_script_json(&args.script)?;
    let library = toonreel::AssetLibrary::open(&args.assets)?;
    let config = render_config(&args.output)?;

    let mut opts = compose_opts(args.output.fps)?;
    opts.music = args.music;
    opts.levels.ducking = !args.no_ducking;

    let composer = toonreel::EpisodeComposer::new(&library, config, opts)?;
    let output = composer.compose(&script, &args.out)?;

    print_warnings(&output.warnings);
    eprintln!(
        "wrote {} ({} frames, {:.0} ms audio)",
        output.path.display(),
        output.frames,
        output.audio_ms
    );
    Ok(())
}

fn cmd_variants(args: VariantsArgs) -> anyhow::Result<()> {
    let script = read_script_json(&args.script)?;
    let library = toonreel::AssetLibrary::open(&args.assets)?;
    let config = render_config(&args.output)?;
    let opts = compose_opts(args.output.fps)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let variants =
        toonreel::render_variants(&script, &library, &config, &opts, &args.out_dir, args.count)?;

    for v in &variants {
        eprintln!(
            "v{} {:<8} {}: {}",
            v.number,
            v.preset.name(),
            v.output.path.display(),
            v.preset.description()
        );
        print_warnings(&v.output.warnings);
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let script = read_script_json(&args.script)?;
    let library = toonreel::AssetLibrary::open(&args.assets)?;
    let config = render_config(&args.output)?;
    let opts = compose_opts(args.output.fps)?;

    let composer = toonreel::EpisodeComposer::new(&library, config, opts)?;
    let (frame, warnings) = composer.render_scene_frame(&script, args.scene, args.frame)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    frame
        .to_rgba_image()
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    print_warnings(&warnings);
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let script = read_script_json(&args.script)?;
    let fps = toonreel::Fps::new(args.fps, 1)?;
    script.validate(fps)?;

    println!("{} \"{}\"", script.episode_id, script.title);
    for (i, scene) in script.scenes.iter().enumerate() {
        println!(
            "  scene {}: {:<16} {:>6.2}s {:>6} frames, {} line(s)",
            i + 1,
            scene.background,
            scene.duration_seconds,
            scene.frame_count(fps),
            scene.dialogue.len()
        );
    }
    println!("  total: {} frames", script.scene_frames(fps));
    Ok(())
}
