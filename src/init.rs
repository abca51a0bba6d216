use std::io::{self, Write};
use std::path::Path;

use serde::Deserialize;

use crate::app::{App, AppError};
use crate::config::Config;
use crate::domain::lookup::Lookup;

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_BOLD_CYAN: &str = "\x1b[1;36m";
const ANSI_BOLD_GREEN: &str = "\x1b[1;32m";
const ANSI_BOLD_MAGENTA: &str = "\x1b[1;35m";
const ANSI_DIM: &str = "\x1b[2m";

const EMBEDDED_LOOKUPS: &str = include_str!("lookups.toml");

pub(crate) const DEFAULT_CONFIG_TEMPLATE: &str = r#"# machete configuration
locale = "en"

[lookup_cache]
ttl_secs = 3600

[dispatch]
dwc_work_type_key = "DWC"
hhh_work_type_key = "HHH"

[reports]
rockstar_minutes = 720
"#;

#[derive(Debug, Deserialize)]
struct LookupSeed {
    lookups: Vec<Lookup>,
}

/// Reference codes shipped with the binary.
pub fn seed_lookups() -> Result<Vec<Lookup>, toml::de::Error> {
    let seed: LookupSeed = toml::from_str(EMBEDDED_LOOKUPS)?;
    Ok(seed.lookups)
}

/// Creates the database, loads the reference codes and writes a default
/// config file when none exists. Safe to run again on an existing store.
pub(crate) fn init_local_store(
    db_path: &str,
    config_path: &Path,
    user: &str,
) -> Result<(), AppError> {
    print_banner("machete")?;
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if config_path.exists() {
        progress_note(&format!("keeping existing config at {}", config_path.display()))?;
    } else {
        progress(&format!("writing default config to {}", config_path.display()))?;
        std::fs::write(config_path, DEFAULT_CONFIG_TEMPLATE)?;
    }
    let config = Config::load(config_path)?;

    progress(&format!("opening database at {db_path}"))?;
    let app = App::open(db_path, config, user)?;
    progress("loading reference lookups")?;
    let count = app.seed_lookups()?;
    let snapshot = app.refresh_lookups()?;
    progress_ok(&format!(
        "{count} lookups loaded ({} categories resolved)",
        snapshot
            .lookups()
            .iter()
            .map(|lookup| lookup.category.as_str())
            .collect::<std::collections::BTreeSet<_>>()
            .len()
    ))?;
    progress_ok("local store ready")?;
    Ok(())
}

fn progress(message: &str) -> Result<(), AppError> {
    println!("{ANSI_BOLD_CYAN}•{ANSI_RESET} {message}");
    io::stdout().flush()?;
    Ok(())
}

fn progress_ok(message: &str) -> Result<(), AppError> {
    println!("{ANSI_BOLD_GREEN}✓{ANSI_RESET} {message}");
    io::stdout().flush()?;
    Ok(())
}

fn progress_note(message: &str) -> Result<(), AppError> {
    println!("{ANSI_DIM}{message}{ANSI_RESET}");
    io::stdout().flush()?;
    Ok(())
}

fn print_banner(title: &str) -> Result<(), AppError> {
    println!("{ANSI_BOLD_MAGENTA}{title}{ANSI_RESET}");
    println!(
        "{ANSI_DIM}version {}{ANSI_RESET}",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    io::stdout().flush()?;
    Ok(())
}
