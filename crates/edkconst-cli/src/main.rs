//! edkconst - Look up constants extracted from C SDK headers
//!
//! This tool ingests vendor headers (by default the Emotiv SDK's `edkErrorCode.h`,
//! `edk.h` and `EmoStateDLL.h`) and answers name and value queries against them.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use edkconst_core::{parse_literal, ConstantTable, DEFAULT_SOURCES};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Look up and describe constants extracted from C SDK headers
#[derive(Parser, Debug)]
#[command(name = "edkconst")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    input: InputMode,

    /// Continue with the next header after a parse error instead of aborting
    #[arg(long, global = true)]
    keep_going: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputMode {
    /// Header file to ingest (repeatable; later headers override earlier ones)
    #[arg(short = 'H', long = "header")]
    headers: Vec<PathBuf>,

    /// Directory containing edkErrorCode.h, edk.h and EmoStateDLL.h
    #[arg(short = 'I', long)]
    include_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value of a named constant
    Get {
        /// Constant name, e.g. EDK_OK
        name: String,
    },
    /// Describe a numeric code by every constant that carries it
    Describe {
        /// Value as a decimal, 0x hex or 0-prefixed octal literal
        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Only report members of this enum type
        #[arg(short, long)]
        group: Option<String>,
    },
    /// List constants in insertion order
    List {
        /// Only list members of this enum type
        #[arg(short, long)]
        group: Option<String>,
    },
    /// List the enum types that were found
    Groups,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let sources = resolve_sources(&cli.input);
    let table = load_table(&sources, cli.keep_going)?;
    info!("Loaded {} constants from {} headers", table.len(), sources.len());

    run(&cli.command, &table)
}

/// Expand the input mode into an ordered list of header paths
fn resolve_sources(input: &InputMode) -> Vec<PathBuf> {
    match &input.include_dir {
        Some(dir) => DEFAULT_SOURCES.iter().map(|name| dir.join(name)).collect(),
        None => input.headers.clone(),
    }
}

/// Ingest headers in order, applying the keep-going policy to parse errors
fn load_table(sources: &[PathBuf], keep_going: bool) -> Result<ConstantTable> {
    let mut table = ConstantTable::new();

    for source in sources {
        match table.add(source) {
            Ok(count) => debug!("{}: {} constants", source.display(), count),
            Err(e) if keep_going && e.is_parse_error() => {
                warn!("Stopped parsing {}: {}", source.display(), e);
            }
            Err(e) => {
                return Err(e).with_context(|| header_context(source));
            }
        }
    }

    Ok(table)
}

fn header_context(source: &Path) -> String {
    format!("Failed to load constants from {}", source.display())
}

/// Execute a query against the loaded table
fn run(command: &Command, table: &ConstantTable) -> Result<()> {
    match command {
        Command::Get { name } => {
            let value = table.get(name)?;
            println!("{}", value);
        }
        Command::Describe { value, group } => {
            let code = parse_literal(value)
                .with_context(|| format!("Invalid value: {}", value))?;
            let Some(description) = table.describe(code, group.as_deref()) else {
                bail!("No constant has value {} ({:#x})", code, code);
            };
            println!("{}", description);
        }
        Command::List { group } => {
            for line in list_lines(table, group.as_deref()) {
                println!("{}", line);
            }
        }
        Command::Groups => {
            for group in table.groups() {
                println!("{}", group);
            }
        }
    }

    Ok(())
}

/// Format constants as `NAME = VALUE  "description"` lines
fn list_lines(table: &ConstantTable, group: Option<&str>) -> Vec<String> {
    table
        .iter()
        .filter(|constant| group.map_or(true, |g| constant.description == g))
        .map(|constant| {
            format!(
                "{} = {:#x}  \"{}\"",
                constant.name, constant.value, constant.description
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_headers(dir: &Path) {
        fs::write(
            dir.join("edkErrorCode.h"),
            "//! Operation completed successfully\n#define EDK_OK 0x0000\n",
        )
        .unwrap();
        fs::write(
            dir.join("edk.h"),
            "typedef enum EE_Event_enum {\n  EE_UnknownEvent = 0, EE_EmoStateUpdated\n} EE_Event_enum;\n",
        )
        .unwrap();
        fs::write(dir.join("EmoStateDLL.h"), "#define BROKEN 1 2\n#define NEVER 3\n").unwrap();
    }

    #[test]
    fn test_resolve_sources_include_dir() {
        let input = InputMode {
            headers: Vec::new(),
            include_dir: Some(PathBuf::from("/sdk/include")),
        };
        let sources = resolve_sources(&input);
        assert_eq!(
            sources,
            vec![
                PathBuf::from("/sdk/include/edkErrorCode.h"),
                PathBuf::from("/sdk/include/edk.h"),
                PathBuf::from("/sdk/include/EmoStateDLL.h"),
            ]
        );
    }

    #[test]
    fn test_load_table_aborts_on_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        write_headers(temp_dir.path());
        let input = InputMode {
            headers: Vec::new(),
            include_dir: Some(temp_dir.path().to_path_buf()),
        };

        let err = load_table(&resolve_sources(&input), false).unwrap_err();
        assert!(err.to_string().contains("EmoStateDLL.h"));
    }

    #[test]
    fn test_load_table_keep_going() {
        let temp_dir = TempDir::new().unwrap();
        write_headers(temp_dir.path());
        let input = InputMode {
            headers: Vec::new(),
            include_dir: Some(temp_dir.path().to_path_buf()),
        };

        let table = load_table(&resolve_sources(&input), true).unwrap();
        assert_eq!(table.get("EE_EmoStateUpdated").unwrap(), 1);
        assert!(!table.contains("NEVER"));
    }

    #[test]
    fn test_keep_going_still_fails_on_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = vec![temp_dir.path().join("missing.h")];
        assert!(load_table(&missing, true).is_err());
    }

    #[test]
    fn test_list_lines() {
        let mut table = ConstantTable::new();
        table
            .add_str(
                "t.h",
                "#define A 16\ntypedef enum G {\n  M1, M2\n} G;\n",
            )
            .unwrap();

        assert_eq!(
            list_lines(&table, None),
            vec![
                "A = 0x10  \"No description available\"",
                "M1 = 0x0  \"G\"",
                "M2 = 0x1  \"G\"",
            ]
        );
        assert_eq!(list_lines(&table, Some("G")).len(), 2);
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
