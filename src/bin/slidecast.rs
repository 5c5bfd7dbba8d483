use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use slidecast::logging::init_logging;
use slidecast::slide::composer::save_png;
use slidecast::store::fs::FsContentStore;
use slidecast::{
    ContentStore as _, Orchestrator, PipelineConfig, Services, Slide, SlideComposer, TitleAnimator,
};

#[derive(Parser, Debug)]
#[command(name = "slidecast", version)]
struct Cli {
    /// Pipeline config JSON. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and publish the lecture video of a topic (requires `ffmpeg` on PATH).
    Generate(GenerateArgs),
    /// Render the animated title as MP4, or its resting frame as PNG.
    Title(TitleArgs),
    /// Compose a single slide image as PNG.
    Slide(SlideArgs),
    /// Print a published topic and optionally extract its video.
    Show(ShowArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Topic key; also the title text.
    #[arg(long)]
    topic: String,

    /// JSON array of `{ "content": ..., "image_description": ... }`.
    #[arg(long)]
    slides: PathBuf,

    /// Also copy the published video here.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct TitleArgs {
    /// Title text.
    #[arg(long)]
    text: String,

    /// Output path. A `.png` extension writes the resting frame only.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SlideArgs {
    /// Narration text drawn on the slide.
    #[arg(long)]
    content: String,

    /// Illustration image file.
    #[arg(long)]
    illustration: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ShowArgs {
    /// Topic key.
    #[arg(long)]
    topic: String,

    /// Write the published video here.
    #[arg(long)]
    extract: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    init_logging(&cfg.logging);
    match cli.cmd {
        Command::Generate(args) => cmd_generate(cfg, args),
        Command::Title(args) => cmd_title(&cfg, args),
        Command::Slide(args) => cmd_slide(&cfg, args),
        Command::Show(args) => cmd_show(cfg, args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(p) => Ok(PipelineConfig::from_path(p)?),
        None => {
            let cfg = PipelineConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }
}

fn create_parent(out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_generate(cfg: PipelineConfig, args: GenerateArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.slides)
        .with_context(|| format!("read slides '{}'", args.slides.display()))?;
    let slides: Vec<Slide> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse slides '{}'", args.slides.display()))?;

    let services = Services::from_config(&cfg)?;
    let orchestrator = Orchestrator::new(cfg, services)?;
    let report = orchestrator.run(&args.topic, &slides)?;

    if let Some(out) = &args.out {
        create_parent(out)?;
        let video = orchestrator.store().get_blob(&report.video_blob_id)?;
        std::fs::write(out, video).with_context(|| format!("write '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }
    eprintln!(
        "published '{}' as blob {} ({:.2}s, {} segments, {} notes)",
        report.topic,
        report.video_blob_id,
        report.final_video.duration_secs,
        report.segments.len(),
        report.notes.len()
    );
    Ok(())
}

fn cmd_title(cfg: &PipelineConfig, args: TitleArgs) -> anyhow::Result<()> {
    create_parent(&args.out)?;
    let mut animator = TitleAnimator::new(&cfg.title, cfg.fps()?);
    let is_png = args
        .out
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    if is_png {
        let frame = animator.render_resting(&args.text)?;
        save_png(&frame, &args.out)?;
    } else {
        animator.animate_to_file(&args.text, &args.out)?;
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_slide(cfg: &PipelineConfig, args: SlideArgs) -> anyhow::Result<()> {
    create_parent(&args.out)?;
    let mut composer = SlideComposer::new(&cfg.slide);
    let image = composer.compose(&args.content, args.illustration.as_deref(), &args.out)?;
    eprintln!(
        "wrote {} ({}x{}, illustration: {:?})",
        image.path.display(),
        image.width,
        image.height,
        image.illustration
    );
    Ok(())
}

fn cmd_show(cfg: PipelineConfig, args: ShowArgs) -> anyhow::Result<()> {
    let store = FsContentStore::open(&cfg.store.root)?;
    let record = store
        .find(&args.topic)?
        .with_context(|| format!("topic '{}' not found", args.topic))?;
    println!("{}", serde_json::to_string_pretty(&record)?);

    if let Some(out) = &args.extract {
        let id = record
            .video_blob_id
            .as_deref()
            .with_context(|| format!("topic '{}' has no published video", args.topic))?;
        create_parent(out)?;
        let bytes = store.get_blob(id)?;
        std::fs::write(out, bytes).with_context(|| format!("write '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}
