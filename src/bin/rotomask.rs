use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "rotomask", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the mask of a snapshot at one frame as a grayscale PNG.
    Render(RenderArgs),
    /// Print the item tree of a snapshot.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input snapshot JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame to render.
    #[arg(long, allow_negative_numbers = true)]
    frame: i32,

    /// Mipmap level; level L renders at 1/2^L scale.
    #[arg(long, default_value_t = 0)]
    mip: u32,

    /// Full-resolution area as `x,y,w,h`. Defaults to the bounds of every renderable shape.
    #[arg(long, value_parser = parse_viewport)]
    viewport: Option<rotomask::Viewport>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input snapshot JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn parse_viewport(s: &str) -> Result<rotomask::Viewport, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, w, h] = parts.as_slice() else {
        return Err(format!("expected x,y,w,h, got '{s}'"));
    };
    let int = |v: &str| v.parse::<i32>().map_err(|e| format!("'{v}': {e}"));
    let size = |v: &str| v.parse::<u32>().map_err(|e| format!("'{v}': {e}"));
    rotomask::Viewport::new(int(x)?, int(y)?, size(w)?, size(h)?).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Info(args) => cmd_info(args),
    }
}

fn load_context(path: &std::path::Path) -> anyhow::Result<rotomask::RotoContext> {
    let snapshot = rotomask::ContextSnapshot::from_path(path)?;
    let ctx = rotomask::RotoContext::from_config(rotomask::RenderConfig::from_env())?;
    ctx.load_snapshot(&snapshot, &rotomask::NoTracks)
        .with_context(|| format!("restore snapshot '{}'", path.display()))?;
    Ok(ctx)
}

fn shape_bounds(ctx: &rotomask::RotoContext, frame: rotomask::Frame) -> Option<rotomask::Rect> {
    ctx.read(|state| {
        state
            .renderable_shapes(frame)
            .into_iter()
            .filter_map(|shape| shape.bounding_box_at_time(frame))
            .reduce(|a, b| a.union(b))
    })
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let ctx = load_context(&args.in_path)?;
    let frame = rotomask::Frame(args.frame);

    let viewport = match args.viewport {
        Some(v) => v,
        None => {
            let bounds = shape_bounds(&ctx, frame)
                .context("no renderable shape at this frame; pass --viewport")?
                .expand();
            rotomask::Viewport::new(
                bounds.x0 as i32,
                bounds.y0 as i32,
                bounds.width().max(1.0) as u32,
                bounds.height().max(1.0) as u32,
            )?
        }
    };

    let mask = ctx.get_or_render_mask(frame, args.mip, viewport)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    mask.save_png(&args.out)?;

    eprintln!(
        "wrote {} ({}x{})",
        args.out.display(),
        mask.width(),
        mask.height()
    );
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let ctx = load_context(&args.in_path)?;
    ctx.read(|state| {
        for (id, item) in state.tree().iter() {
            let depth = std::iter::successors(item.parent(), |p| {
                state.tree().get(*p).and_then(rotomask::Item::parent)
            })
            .count();
            let indent = "  ".repeat(depth);
            let mut flags = Vec::new();
            if item.is_locked() {
                flags.push("locked");
            }
            if !item.is_globally_activated() {
                flags.push("hidden");
            }
            match item.as_shape() {
                Some(shape) => println!(
                    "{indent}{id} {} (bezier, {} points, {}, {} keyframes) {}",
                    item.name(),
                    shape.len(),
                    if shape.is_finished() { "closed" } else { "open" },
                    shape.keyframe_times().len(),
                    flags.join(" ")
                ),
                None => println!("{indent}{id} {} (layer) {}", item.name(), flags.join(" ")),
            }
        }
        for (base, n) in state.item_counters() {
            println!("counter {base}: {n}");
        }
    });
    Ok(())
}
