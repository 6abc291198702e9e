use std::{
    fs::File,
    io::{BufReader, Read as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use render_text::{FontHandle, RenderRequest, Rgb, TextBitmap};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "render-text", version)]
struct Cli {
    /// Log pipeline steps to stderr at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one or more strings to `<out-dir>/<index>.png`.
    Render(RenderArgs),
    /// Render every string in a JSON request to `<out-dir>/<index>.png`.
    Batch(BatchArgs),
    /// Encode a raw RGBA8888 buffer as PNG.
    Save(SaveArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Font file (TTF/OTF).
    #[arg(long)]
    font: PathBuf,

    /// Font size in pixels.
    #[arg(long, default_value_t = 32)]
    size: u32,

    /// Fill color, `r,g,b` or `#rrggbb`.
    #[arg(long, default_value = "255,255,255")]
    fill: Rgb,

    /// Outline color, `r,g,b` or `#rrggbb`.
    #[arg(long, default_value = "0,0,0")]
    outline: Rgb,

    /// Outline thickness in pixels.
    #[arg(long, default_value_t = 2.0)]
    thickness: f32,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// Print the resolved font family name and SHA-256 of the font bytes.
    #[arg(long)]
    dump_font: bool,

    /// Strings to render.
    #[arg(required = true)]
    texts: Vec<String>,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Input request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// Print the resolved font family name and SHA-256 of the font bytes.
    #[arg(long)]
    dump_font: bool,
}

#[derive(Parser, Debug)]
struct SaveArgs {
    /// Raw RGBA8888 input, tightly packed.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Width in pixels.
    #[arg(long)]
    width: u32,

    /// Height in pixels.
    #[arg(long)]
    height: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Batch(args) => cmd_batch(args),
        Command::Save(args) => cmd_save(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn read_request_json(path: &Path) -> anyhow::Result<RenderRequest> {
    let f = File::open(path).with_context(|| format!("open request '{}'", path.display()))?;
    let r = BufReader::new(f);
    let req: RenderRequest =
        serde_json::from_reader(r).with_context(|| "parse render request JSON")?;
    Ok(req)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let req = RenderRequest {
        font_path: args.font,
        size_px: args.size,
        texts: args.texts,
        fill: args.fill,
        outline: args.outline,
        thickness: args.thickness,
    };
    run_request(&req, &args.out_dir, args.dump_font)
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let req = read_request_json(&args.in_path)?;
    run_request(&req, &args.out_dir, args.dump_font)
}

fn run_request(req: &RenderRequest, out_dir: &Path, dump_font: bool) -> anyhow::Result<()> {
    if dump_font {
        dump_font_diagnostics(&req.font_path, req.size_px)?;
    }

    let bitmaps = req
        .render()
        .with_context(|| format!("render with font '{}'", req.font_path.display()))?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;
    for (i, bitmap) in bitmaps.iter().enumerate() {
        let out = out_dir.join(format!("{i}.png"));
        render_text::save_png(&out, bitmap)
            .with_context(|| format!("write png '{}'", out.display()))?;
        eprintln!("wrote {} ({}x{})", out.display(), bitmap.w, bitmap.h);
    }
    Ok(())
}

fn cmd_save(args: SaveArgs) -> anyhow::Result<()> {
    let mut data = Vec::new();
    File::open(&args.in_path)
        .and_then(|mut f| f.read_to_end(&mut data))
        .with_context(|| format!("read raw pixels '{}'", args.in_path.display()))?;

    let bitmap = TextBitmap {
        w: args.width,
        h: args.height,
        data,
    };

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    render_text::save_png(&args.out, &bitmap)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn dump_font_diagnostics(path: &Path, size_px: u32) -> anyhow::Result<()> {
    let font = FontHandle::open(path, size_px)
        .with_context(|| format!("load font '{}'", path.display()))?;
    eprintln!("font diagnostics:");
    eprintln!("  path:    {}", path.display());
    eprintln!("  family:  {}", font.family_name());
    eprintln!("  sha256:  {}", sha256_hex(font.font_bytes()));
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
