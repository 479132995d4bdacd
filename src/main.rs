//! Book-to-archive compiler CLI.

use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;

use clap::Parser;

use h5forge::registry::default_cache_dir;
use h5forge::{
    AiClient, BookDefinition, Compiler, HandlerRegistry, HttpCatalog, LibraryCache,
    LibraryRegistry, MediaLoader,
};

#[derive(Parser)]
#[command(name = "h5forge", version, about = "Compile a book definition into an H5P archive")]
struct Args {
    /// Path to the JSON book definition
    input: PathBuf,

    /// Output archive path
    #[arg(short, long, default_value = "book.h5p")]
    output: PathBuf,

    /// Library cache directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Base directory for relative media paths (defaults to the
    /// definition file's directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Content-type catalog URL
    #[arg(long)]
    catalog_url: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let document = match std::fs::read_to_string(&args.input) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", args.input.display());
            exit(1);
        }
    };
    let definition = match BookDefinition::from_json(&document) {
        Ok(definition) => definition,
        Err(e) => {
            eprintln!("error: invalid book definition: {e}");
            exit(1);
        }
    };

    let catalog = match args.catalog_url {
        Some(url) => HttpCatalog::new(url),
        None => HttpCatalog::from_env(),
    };
    let cache = LibraryCache::new(args.cache_dir.unwrap_or_else(default_cache_dir));
    let registry = Arc::new(LibraryRegistry::new(Box::new(catalog), Some(cache)));

    let base_dir = args.base_dir.unwrap_or_else(|| {
        args.input
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let compiler = Compiler::new(
        registry,
        HandlerRegistry::with_default_handlers(),
        MediaLoader::new(base_dir),
        AiClient::from_env(),
    );

    match compiler.compile_to_file(&definition, &args.output) {
        Ok(()) => println!("{}", args.output.display()),
        Err(e) => {
            eprintln!("error: {e}");
            exit(1);
        }
    }
}
