use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use zoomcrop::cache::CacheStats;
use zoomcrop::config::{self, ImagingConfig};
use zoomcrop::imaging::{
    ImportantPart, ResizeJob, ResizeMode, ResizeOutcome, ResizeRequest, RustBackend, Zoom,
    get_dimensions, resize_image, resolve,
};
use zoomcrop::output;
use zoomcrop::types::Dimensions;

/// Geometry flags shared by `resize` and `plan`.
#[derive(clap::Args, Clone)]
struct GeometryArgs {
    /// Target width in pixels (0 or absent: derived from the height)
    #[arg(long, short = 'W')]
    width: Option<u32>,

    /// Target height in pixels (0 or absent: derived from the width)
    #[arg(long, short = 'H')]
    height: Option<u32>,

    /// proportional, box, crop, or a legacy anchor such as left_top
    #[arg(long, default_value = "crop")]
    mode: ResizeMode,

    /// Zoom into the important part, in percent (0-100)
    #[arg(long, default_value_t = 0)]
    zoom: i64,

    /// Important part as x,y,width,height in source pixels
    #[arg(long)]
    important: Option<ImportantPart>,
}

impl GeometryArgs {
    fn job(&self) -> ResizeJob {
        ResizeJob {
            width: self.width,
            height: self.height,
            mode: self.mode,
            zoom: Zoom::from_percent(self.zoom),
            important_part: self.important,
            target: None,
            force: false,
        }
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "zoomcrop")]
#[command(about = "Important-part aware image resizing")]
#[command(long_about = "\
Important-part aware image resizing

Resizes GIF, JPEG and PNG images to a target size while keeping a chosen
rectangle of the source (the important part) in view. The zoom factor moves
the framing between the whole image (0) and the important part alone (100).

Modes:
  crop           Fill the target exactly, cropping what does not fit (default)
  box            Fit inside the target, never exceeding either side
  proportional   Keep the aspect ratio, the longer side wins
  left_top ...   Legacy crop anchors (left|center|right)_(top|center|bottom)

Results are cached under the configured cache_dir, keyed on the request and
the source modification time.

Run 'zoomcrop gen-config' to generate a documented zoomcrop.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./zoomcrop.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log resolver and encoder decisions (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize one or more images
    Resize {
        /// Source images
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        geometry: GeometryArgs,

        /// Also copy the result to this path (single input only)
        #[arg(long)]
        target: Option<PathBuf>,

        /// Rewrite the target even when it is newer than the source
        #[arg(long)]
        force: bool,
    },
    /// Print the resolved geometry without touching pixels
    Plan {
        /// Source image to identify
        #[arg(required_unless_present = "size", conflicts_with = "size")]
        input: Option<PathBuf>,

        /// Source size as WIDTHxHEIGHT instead of an image
        #[arg(long, value_parser = parse_size)]
        size: Option<Dimensions>,

        #[command(flatten)]
        geometry: GeometryArgs,

        /// Human-readable summary instead of JSON
        #[arg(long)]
        explain: bool,
    },
    /// Print a stock zoomcrop.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Resize {
            inputs,
            geometry,
            target,
            force,
        } => {
            if target.is_some() && inputs.len() > 1 {
                return Err("--target requires a single input".into());
            }
            let config = load_config(cli.config.as_deref())?;
            let job = ResizeJob {
                target,
                force,
                ..geometry.job()
            };
            run_resize(&inputs, &job, &config)?;
        }
        Command::Plan {
            input,
            size,
            geometry,
            explain,
        } => {
            let source = match (size, input) {
                (Some(dims), _) => dims,
                (None, Some(path)) => get_dimensions(&RustBackend::new(), &path)?,
                (None, None) => return Err("either an input or --size is required".into()),
            };
            let request: ResizeRequest = geometry.job().request(source);
            request.validate()?;
            let result = resolve(&request);
            if explain {
                output::print_plan(&request, &result);
            } else {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Resize all inputs in parallel, then report in input order.
fn run_resize(
    inputs: &[PathBuf],
    job: &ResizeJob,
    config: &ImagingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = RustBackend::new();
    let results: Vec<_> = inputs
        .par_iter()
        .map(|input| resize_image(&backend, input, job, config, None))
        .collect();

    let mut stats = CacheStats::default();
    let mut failed = 0;
    for (i, (input, result)) in inputs.iter().zip(&results).enumerate() {
        output::print_resize_result(i + 1, input, job.width, job.height, result);
        match result {
            Ok(ResizeOutcome::Unchanged(_)) => stats.unchanged(),
            Ok(ResizeOutcome::Cached(_)) => stats.hit(),
            Ok(ResizeOutcome::Intercepted(_)) => stats.intercepted(),
            Ok(ResizeOutcome::Written(_)) => stats.miss(),
            Err(_) => failed += 1,
        }
    }
    println!("Cache: {}", stats);

    if failed > 0 {
        return Err(format!("{failed} of {} inputs failed", inputs.len()).into());
    }
    Ok(())
}

/// Explicit `--config` must exist; otherwise `./zoomcrop.toml` is optional.
fn load_config(path: Option<&Path>) -> Result<ImagingConfig, config::ConfigError> {
    match path {
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(".")),
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "zoomcrop=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse `WIDTHxHEIGHT`.
fn parse_size(s: &str) -> Result<Dimensions, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size {s:?}: expected WIDTHxHEIGHT"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid size {s:?}: {e}"))
    };
    Ok(Dimensions::new(parse(w)?, parse(h)?))
}
