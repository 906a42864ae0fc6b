use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use cell_debug::{breakpoint_rows, render_rows, BreakpointSnapshot, DebuggerConfig, HashConfig};

/// Explicit `--snapshot` wins over `[snapshot] path`.
fn snapshot_path(config: &DebuggerConfig, explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    explicit
        .or_else(|| config.snapshot_path.clone())
        .context("no snapshot file given and none configured")
}

/// Command-line overrides applied on top of the configured hash parameters.
fn hash_config(
    config: &DebuggerConfig,
    method: Option<&str>,
    seed: Option<u32>,
) -> cell_debug::Result<HashConfig> {
    HashConfig::parse(
        method.unwrap_or(&config.hash_method),
        seed.unwrap_or(config.hash_seed),
    )
}

fn list(path: &Path) -> anyhow::Result<String> {
    let snapshot = BreakpointSnapshot::load(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    info!(path = %path.display(), buckets = snapshot.breakpoints.len(), "loaded snapshot");
    Ok(render_rows(&breakpoint_rows(&snapshot.breakpoints)))
}

#[derive(Debug, Parser)]
#[command(
    name = "cell-debug",
    about = "Inspect content-addressed breakpoint snapshots"
)]
struct Args {
    /// Directory holding cell-debug.toml.
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the breakpoints of a snapshot, sorted by line per bucket.
    List {
        /// Snapshot file; defaults to `[snapshot] path` from the config.
        #[arg(long, value_name = "FILE")]
        snapshot: Option<PathBuf>,
    },
    /// Print the fingerprint of a file's content.
    Hash {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Override the configured hash method.
        #[arg(long)]
        method: Option<String>,
        /// Override the configured seed.
        #[arg(long)]
        seed: Option<u32>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = DebuggerConfig::load(&args.root);
    match args.command {
        Command::List { snapshot } => {
            let path = snapshot_path(&config, snapshot)?;
            print!("{}", list(&path)?);
        }
        Command::Hash { file, method, seed } => {
            let hash = hash_config(&config, method.as_deref(), seed)?;
            let code = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            println!("{}", hash.hash(&code));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use cell_debug::{BreakpointRecord, BreakpointStore, CodeHasher, HashMethod};

    use super::*;

    #[test]
    fn hash_overrides_replace_configured_values() {
        let config = DebuggerConfig::default();
        let configured = hash_config(&config, None, None).unwrap();
        assert_eq!(configured, HashConfig::default());

        let overridden = hash_config(&config, Some("crc32"), Some(0)).unwrap();
        assert_eq!(overridden.method, HashMethod::Crc32);
        assert_eq!(overridden.hash("print(1)"), "3985680136");

        let seed_only = hash_config(&config, None, Some(0)).unwrap();
        assert_eq!(seed_only.hash("print(1)"), "3626970123");
        assert!(hash_config(&config, Some("md5"), None).is_err());
    }

    #[test]
    fn snapshot_path_prefers_the_command_line() {
        let mut config = DebuggerConfig::default();
        assert!(snapshot_path(&config, None).is_err());

        config.snapshot_path = Some(PathBuf::from("/work/breakpoints.json"));
        assert_eq!(
            snapshot_path(&config, None).unwrap(),
            PathBuf::from("/work/breakpoints.json")
        );
        assert_eq!(
            snapshot_path(&config, Some(PathBuf::from("other.json"))).unwrap(),
            PathBuf::from("other.json")
        );
    }

    #[test]
    fn list_renders_a_saved_snapshot() {
        let store = BreakpointStore::new(CodeHasher::new());
        store.set_hash_parameters("Murmur2", 0).unwrap();
        let code_id = store.hash("print(1)").unwrap();
        store
            .set_breakpoints("print(1)", vec![BreakpointRecord::new(code_id, "Cell [1]", 1)])
            .unwrap();

        let path = std::env::temp_dir()
            .join(format!("cell-debug-list-{}.json", std::process::id()));
        BreakpointSnapshot::capture(&store).save(&path).unwrap();
        let rendered = list(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(rendered, "3626970123\n  [x] Cell [1] : 1\n");
        assert!(list(Path::new("/nonexistent/cell-debug.json")).is_err());
    }
}
