use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gifbanner::{
    BackgroundMode, BannerConfig, BannerGenerator, Effect, FontSelection, InMemorySink,
    RenderSettings,
};

#[derive(Parser, Debug)]
#[command(name = "gifbanner", version, about = "Render text into a looping GIF banner")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the animated GIF.
    Render(RenderArgs),
    /// Render one frame of the sequence as a PNG.
    Frame(FrameArgs),
    /// List the font rotation and the face each family resolves to.
    Fonts(ConfigArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Generator config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed particle seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Do not load system fonts.
    #[arg(long, default_value_t = false)]
    no_system_fonts: bool,
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Banner text (1 to 50 characters).
    #[arg(long)]
    text: Option<String>,

    /// Font family, or `random` for the full rotation.
    #[arg(long)]
    font: Option<String>,

    /// Frame delay in milliseconds (clamped to 50..=1000).
    #[arg(long)]
    delay: Option<u32>,

    /// Text color, `#rrggbb`.
    #[arg(long)]
    color: Option<String>,

    /// Background color, `#rrggbb`.
    #[arg(long)]
    bg: Option<String>,

    /// solid, gradient or transparent.
    #[arg(long)]
    background: Option<BackgroundMode>,

    /// none, glow, neon, matrix, retro or sparkle.
    #[arg(long)]
    effect: Option<Effect>,

    /// Settings JSON; flags given on the command line win.
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    request: RequestArgs,

    #[command(flatten)]
    config: ConfigArgs,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    request: RequestArgs,

    #[command(flatten)]
    config: ConfigArgs,

    /// Position in the font sequence (0-based).
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Fonts(args) => cmd_fonts(args),
    }
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<BannerConfig> {
    let mut cfg = match &args.config {
        Some(path) => BannerConfig::from_json_file(path)?,
        None => BannerConfig::default(),
    }
    .with_env_overrides();

    cfg.fonts.dirs.extend(args.font_dirs.iter().cloned());
    if args.no_system_fonts {
        cfg.fonts.system_fonts = false;
    }
    if args.seed.is_some() {
        cfg.seed = args.seed;
    }
    Ok(cfg)
}

fn load_settings(args: &RequestArgs, cfg: &BannerConfig) -> anyhow::Result<RenderSettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read settings '{}'", path.display()))?;
            RenderSettings::from_json_str(&json)?
        }
        None => RenderSettings::default().with_delay_ms(cfg.default_delay_ms),
    };

    if let Some(text) = &args.text {
        settings.text = text.clone();
    }
    if let Some(font) = &args.font {
        settings.font = FontSelection::from(font.as_str());
    }
    if let Some(delay) = args.delay {
        settings.delay_ms = delay;
    }
    if let Some(color) = &args.color {
        settings.text_color = color.clone();
    }
    if let Some(bg) = &args.bg {
        settings.background_color = bg.clone();
    }
    if let Some(mode) = args.background {
        settings.background_mode = mode;
    }
    if let Some(effect) = args.effect {
        settings.effect = effect;
    }
    Ok(settings)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let settings = load_settings(&args.request, &cfg)?;
    let generator = BannerGenerator::new(cfg)?;

    let result = generator
        .generate(&settings)
        .map_err(|e| anyhow::anyhow!("{}: {e}", e.user_message()))?;
    result.write_to(&args.out)?;

    println!(
        "wrote {} ({}, {} frames)",
        args.out.display(),
        result.human_size(),
        result.frame_count
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let settings = load_settings(&args.request, &cfg)?;
    let generator = BannerGenerator::new(cfg)?;

    let mut validated = settings.validate()?;
    let family = {
        let families = validated.font.families(&generator.config().font_rotation);
        families
            .get(args.index)
            .map(|f| f.to_string())
            .with_context(|| {
                format!(
                    "frame index {} is out of range (sequence has {} frames)",
                    args.index,
                    families.len()
                )
            })?
    };
    validated.font = FontSelection::Named(family.clone());

    let mut sink = InMemorySink::new();
    let ticket = generator.try_begin()?;
    generator.render_frames(&ticket, &validated, &mut sink)?;
    drop(ticket);

    let (_, frame) = sink
        .frames()
        .first()
        .context("renderer produced no frame")?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.straight_rgba(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    println!("wrote {} ({family})", args.out.display());
    Ok(())
}

fn cmd_fonts(args: ConfigArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    let generator = BannerGenerator::new(cfg)?;
    for (requested, face) in generator.resolve_rotation()? {
        if face.exact {
            println!("{requested}");
        } else {
            println!("{requested} -> {} (fallback)", face.family);
        }
    }
    Ok(())
}
