//! nbs tool
//!
//! Writes files into tables and reads chunks back. The list of tables is kept
//! in a small spec-list file standing in for a manifest.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use nbs::{decode_specs, encode_specs, Config, ContentAddress, Haver, MemTable, TableSet, TableSpec};
use tracing_subscriber::{fmt, EnvFilter};

/// nbs table tool
#[derive(Parser, Debug)]
#[command(name = "nbs-tool")]
#[command(about = "Write and inspect content-addressed chunk tables")]
#[command(version)]
struct Args {
    /// Local table directory
    #[arg(short, long, default_value = "./nbs_data")]
    dir: String,

    /// Remote endpoint (uses the object store instead of --dir)
    #[arg(short, long, requires = "bucket")]
    endpoint: Option<String>,

    /// Remote bucket
    #[arg(short, long)]
    bucket: Option<String>,

    /// File holding the list of table specs
    #[arg(short, long, default_value = "./nbs.specs")]
    specs: PathBuf,

    /// Flush a new table once buffered chunks exceed this many bytes
    #[arg(long)]
    memtable_limit: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store each file as one chunk in a new table
    Put {
        /// Files to store
        files: Vec<PathBuf>,
    },

    /// List tables
    List,

    /// Write a chunk to stdout
    Get {
        /// Chunk address (hex)
        addr: String,
    },

    /// Check whether a chunk is stored
    Has {
        /// Chunk address (hex)
        addr: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,nbs=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> nbs::Result<()> {
    let mut builder = match (&args.endpoint, &args.bucket) {
        (Some(endpoint), Some(bucket)) => Config::builder().remote(endpoint, bucket),
        _ => Config::builder().local_dir(&args.dir),
    };
    if let Some(limit) = args.memtable_limit {
        builder = builder.memtable_size_limit(limit);
    }
    let config = builder.build();

    let specs = read_specs(&args.specs)?;
    let tables = TableSet::from_config(&config)?.union(&specs)?;
    tracing::debug!("opened {} tables, {} chunks", tables.len(), tables.chunk_count());

    match args.command {
        Commands::Put { files } => {
            let mt = MemTable::new();
            let mut updated = tables.clone();
            for file in &files {
                let addr = mt.add(fs::read(file)?);
                println!("{}  {}", addr, file.display());
                updated = updated.flush_if_full(&mt, config.memtable_size_limit)?;
            }
            let updated = updated.prepend(&mt)?;
            if updated.len() == tables.len() {
                tracing::info!("all chunks already stored, no table written");
            }
            write_specs(&args.specs, &updated.to_specs())?;
            updated.close()?;
        }
        Commands::List => {
            for spec in tables.to_specs() {
                println!("{}  {}", spec.name, spec.chunk_count);
            }
            tables.close()?;
        }
        Commands::Get { addr } => {
            let addr: ContentAddress = addr.parse()?;
            let found = tables.get(&addr)?;
            tables.close()?;
            match found {
                Some(data) => std::io::stdout().write_all(&data)?,
                None => {
                    tracing::error!("chunk {} not found", addr);
                    std::process::exit(2);
                }
            }
        }
        Commands::Has { addr } => {
            let addr: ContentAddress = addr.parse()?;
            println!("{}", tables.has(&addr));
            tables.close()?;
        }
    }
    Ok(())
}

fn read_specs(path: &Path) -> nbs::Result<Vec<TableSpec>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    decode_specs(&fs::read(path)?)
}

fn write_specs(path: &Path, specs: &[TableSpec]) -> nbs::Result<()> {
    fs::write(path, encode_specs(specs)?)?;
    Ok(())
}
