use clap::{Parser, Subcommand};
use image_reformer::config::{self, ReformerConfig};
use image_reformer::content::rewrite_content;
use image_reformer::naming::media_type_for;
use image_reformer::rewrite::Reformer;
use image_reformer::sizing::{CropSpec, QueryStringBuilder, map_crop, resolve};
use image_reformer::synthesize::synthesize;
use image_reformer::types::{Attachment, AttachmentMeta, ImageDescriptor, SizeMap, SizeRequest};
use image_reformer::{output, registry::SizeRegistry};
use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared flags for commands that read one metadata file.
#[derive(clap::Args, Clone)]
struct MetaArgs {
    /// Attachment metadata JSON (`width`, `height`, `file`, `sizes`)
    meta: PathBuf,

    /// Media type of the original [default: from the file extension]
    #[arg(long)]
    mime: Option<String>,
}

#[derive(Parser)]
#[command(name = "image-reformer")]
#[command(about = "Rewrite CMS image URLs for an image CDN and synthesize virtual sizes")]
#[command(long_about = "\
Rewrite CMS image URLs for an image CDN and synthesize virtual sizes

The CMS keeps asking for intermediate image sizes. Instead of rendering them
to disk, every size is served by a transformation backend: URLs are moved to
the CDN host and carry the target box and crop gravity as parameters, and
attachment metadata lists the sizes as if the files existed.

Configuration is read from reformer.toml in --config-dir (optional).
Run 'image-reformer gen-config' to generate a documented reformer.toml.

Set RUST_LOG=debug to see fallbacks and skipped sizes on stderr.")]
#[command(version)]
struct Cli {
    /// Directory holding reformer.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Synthesize the virtual size catalog of one attachment
    Synthesize {
        #[command(flatten)]
        meta: MetaArgs,

        /// Print the expanded metadata as JSON
        #[arg(long)]
        json: bool,
    },
    /// Synthesize catalogs for every metadata JSON file under a directory
    Catalog {
        dir: PathBuf,

        /// Write the expanded metadata back into each file
        #[arg(long)]
        write: bool,
    },
    /// Resolve a target box against an original size
    Resolve {
        /// Original size, e.g. 1600x1200
        #[arg(long, value_parser = parse_dims)]
        orig: (u32, u32),

        /// Target box; 0 leaves an axis unconstrained, e.g. 400x0
        #[arg(long, value_parser = parse_dims)]
        dest: (u32, u32),

        /// none, hard, or <horizontal>,<vertical> (e.g. left,top)
        #[arg(long, default_value = "none")]
        crop: CropSpec,
    },
    /// Print the backend URL for one size of an attachment
    Src {
        #[command(flatten)]
        meta: MetaArgs,

        /// Public URL of the original upload
        #[arg(long)]
        url: String,

        /// Registered size name or a WxH box (300x200, 300x, x200)
        #[arg(long)]
        size: SizeRequest,

        /// Attachment id, checked against skip_ids
        #[arg(long, default_value_t = 0)]
        id: u64,
    },
    /// Rewrite <img> tags of an HTML file ('-' reads stdin)
    Content { input: PathBuf },
    /// List registered sizes
    Sizes,
    /// Print a stock reformer.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), BoxError> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Synthesize { meta, json } => {
            let reformer = load_reformer(&cli.config_dir)?;
            let (image, mut record) = read_meta(&meta.meta, meta.mime.as_deref())?;
            let sizes = synthesize(&image, reformer.registry());
            if json {
                record.sizes = sizes;
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                output::print_size_map(&image, &sizes);
            }
        }
        Command::Catalog { dir, write } => {
            let config = config::load_config(&cli.config_dir)?;
            init_thread_pool(&config.processing);
            let registry = SizeRegistry::from_config(&config.sizes);
            catalog(&dir, &registry, write)?;
        }
        Command::Resolve { orig, dest, crop } => {
            let resolved = resolve(orig.0, orig.1, dest.0, dest.1, &crop);
            output::print_resolution(orig, dest, &crop, &resolved, &map_crop(&crop));
        }
        Command::Src {
            meta,
            url,
            size,
            id,
        } => {
            let reformer = load_reformer(&cli.config_dir)?;
            let (image, record) = read_meta(&meta.meta, meta.mime.as_deref())?;
            let attachment = Attachment {
                id,
                url,
                mime_type: image.media_type,
                meta: record,
            };
            println!("{}", reformer.rewrite_src(&attachment, &size));
        }
        Command::Content { input } => {
            let reformer = load_reformer(&cli.config_dir)?;
            let html = if input.as_os_str() == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                std::fs::read_to_string(&input)?
            };
            print!("{}", rewrite_content(&reformer, &html));
        }
        Command::Sizes => {
            let reformer = load_reformer(&cli.config_dir)?;
            output::print_registry(reformer.registry(), &reformer.sizes_to_generate());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so command output on stdout stays clean. Defaults to `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_reformer(config_dir: &Path) -> Result<Reformer<QueryStringBuilder>, config::ConfigError> {
    let config: ReformerConfig = config::load_config(config_dir)?;
    Ok(Reformer::new(config, QueryStringBuilder))
}

/// Read a metadata file and describe its original.
fn read_meta(path: &Path, mime: Option<&str>) -> Result<(ImageDescriptor, AttachmentMeta), BoxError> {
    let content = std::fs::read_to_string(path)?;
    let meta: AttachmentMeta = serde_json::from_str(&content)?;
    let media_type = mime.unwrap_or_else(|| media_type_for(&meta.file));
    Ok((ImageDescriptor::from_meta(&meta, media_type), meta))
}

/// Synthesize every `*.json` metadata file under `dir` in parallel.
fn catalog(dir: &Path, registry: &SizeRegistry, write: bool) -> Result<(), BoxError> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")))
        .collect();
    files.sort();

    let results: Vec<(PathBuf, Result<(ImageDescriptor, SizeMap), BoxError>)> = files
        .into_par_iter()
        .map(|path| {
            let result = catalog_one(&path, registry, write);
            (path, result)
        })
        .collect();

    let (mut cataloged, mut total_sizes, mut failed) = (0, 0, 0);
    for (path, result) in &results {
        let source = path.strip_prefix(dir).unwrap_or(path);
        match result {
            Ok((image, sizes)) => {
                for line in output::format_catalog_entry(source, image, sizes.len()) {
                    println!("{}", line);
                }
                cataloged += 1;
                total_sizes += sizes.len();
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "cannot catalog metadata file");
                failed += 1;
            }
        }
    }
    for line in output::format_catalog_summary(cataloged, total_sizes, failed) {
        println!("{}", line);
    }
    Ok(())
}

fn catalog_one(
    path: &Path,
    registry: &SizeRegistry,
    write: bool,
) -> Result<(ImageDescriptor, SizeMap), BoxError> {
    let (image, mut meta) = read_meta(path, None)?;
    let sizes = synthesize(&image, registry);
    if write {
        meta.sizes = sizes.clone();
        std::fs::write(path, serde_json::to_string_pretty(&meta)?)?;
    }
    Ok((image, sizes))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Parse `WxH`; either side may be 0.
fn parse_dims(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let axis = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid dimension '{v}' in '{s}'"))
    };
    Ok((axis(w)?, axis(h)?))
}
