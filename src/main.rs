use anyhow::{Context, Result};
use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand};
use iconvsct::interop::{Method, MethodEntry, MethodRegistry};
use iconvsct::strip::{self, DirectoryTiles, TileSource};
use iconvsct::symbols::RandomGuids;
use iconvsct::synthesis::{self, OutputPaths};
use iconvsct::{Catalog, SynthesisConfig};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "iconvsct")]
#[command(about = "Generate icon enums, command symbols, bitmap strips and button tables")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate source registry and resource documents from an icon catalog
    Generate {
        /// Catalog JSON file, or a directory of <collection>/<icon>.svg
        #[arg(short, long, default_value = "./icons.json")]
        catalog: PathBuf,

        /// Output directory for generated files
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Directory the bitmap strip paths resolve against [default: <output>/Resources]
        #[arg(short, long)]
        resources: Option<PathBuf>,

        /// Directory of rasterized tiles, <collection>/<icon>.png
        #[arg(short, long)]
        tiles: Option<PathBuf>,

        /// Icons per bitmap strip and symbol scope
        #[arg(long, default_value_t = iconvsct::config::DEFAULT_CAPACITY,
              value_parser = clap::value_parser!(u16).range(1..).map(usize::from))]
        capacity: usize,
    },

    /// Run a registered `Class.Method` entry point
    Invoke {
        /// Method key, e.g. Catalog.Count
        method: String,
    },

    /// List registered entry points
    List,
}

const DEFAULT_CATALOG: &str = "./icons.json";

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    match cli.command {
        Commands::Generate {
            catalog,
            output,
            resources,
            tiles,
            capacity,
        } => {
            generate(&catalog, &output, resources, tiles.as_deref(), capacity)?;
        }
        Commands::Invoke { method } => {
            std::process::exit(methods()?.run(&[method]));
        }
        Commands::List => {
            for info in methods()?.listing() {
                let title = info.title.as_deref().unwrap_or("");
                match info.icon {
                    Some(icon) => println!(
                        "{:<20} {:<40} {}#{}",
                        info.key, title, icon.collection, icon.raw_value
                    ),
                    None => println!("{:<20} {}", info.key, title),
                }
            }
        }
    }

    Ok(())
}

fn methods() -> Result<MethodRegistry> {
    Ok(MethodRegistry::from_entries([
        (
            "Catalog.Count",
            MethodEntry::new(Method::Unit(count_icons)).titled("Print the number of icons"),
        ),
        (
            "Catalog.Invalid",
            MethodEntry::new(Method::Int(count_invalid))
                .titled("Exit with the number of icons flagged invalid"),
        ),
        (
            "Catalog.Validate",
            MethodEntry::new(Method::Unit(validate_catalog))
                .titled("Check identifiers of the default catalog"),
        ),
    ])?)
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    let catalog = if path.is_dir() {
        Catalog::from_directory(path)
    } else {
        Catalog::load(path)
    };
    catalog.with_context(|| format!("Failed to load catalog {}", path.display()))
}

fn generate(
    catalog_path: &Path,
    output: &Path,
    resources: Option<PathBuf>,
    tiles: Option<&Path>,
    capacity: usize,
) -> Result<()> {
    let config = SynthesisConfig::with_capacity(capacity);

    info!("Loading catalog: {}", catalog_path.display());
    let mut catalog = load_catalog(catalog_path)?;
    info!(
        "Found {} icons in {} collections",
        catalog.total_icons(),
        catalog.collections.len()
    );

    let tiles = tiles.map(DirectoryTiles::new);
    if let Some(tiles) = &tiles {
        let flagged = strip::flag_blank_tiles(&mut catalog, tiles, &config);
        info!("{} icons have blank or missing tiles", flagged);
    }
    let dropped = catalog.retain_valid();
    if dropped > 0 {
        info!("Dropped {} invalid icons", dropped);
    }

    let mut paths = OutputPaths::in_dir(output);
    if let Some(resources) = resources {
        paths.resources = resources;
    }

    let written = synthesis::run(
        &catalog,
        &paths,
        &config,
        tiles.as_ref().map(|t| t as &dyn TileSource),
        &mut RandomGuids,
    )
    .with_context(|| format!("Failed to generate into {}", output.display()))?;

    for path in &written {
        println!("Generated: {}", path.display());
    }
    println!("\nDone! {} icons processed.", catalog.total_icons());

    Ok(())
}

fn count_icons() -> Result<()> {
    let catalog = load_catalog(Path::new(DEFAULT_CATALOG))?;
    println!("{}", catalog.total_icons());
    Ok(())
}

/// Exit codes keep only 8 bits, so the count saturates at 255. The exact
/// figure goes to stdout.
fn count_invalid() -> Result<i32> {
    let catalog = load_catalog(Path::new(DEFAULT_CATALOG))?;
    let invalid = catalog
        .collections
        .iter()
        .flat_map(|c| &c.icons)
        .filter(|icon| !icon.valid)
        .count();
    println!("{invalid}");
    Ok(invalid.min(255) as i32)
}

fn validate_catalog() -> Result<()> {
    let config = SynthesisConfig::default();
    let catalog = load_catalog(Path::new(DEFAULT_CATALOG))?;
    catalog.validate_identifiers(config.normalizer)?;
    println!(
        "{} collections, {} icons: all identifiers valid",
        catalog.collections.len(),
        catalog.total_icons()
    );
    Ok(())
}
