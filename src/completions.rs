use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use clap_complete::{generate, Shell};

use crate::app::AppError;

const BIN_NAME: &str = "machete";

pub fn generate_completions(shell: Shell, buf: &mut dyn Write) {
    let mut cmd = crate::cli::styled_command();
    generate(shell, &mut cmd, BIN_NAME, buf);
}

/// Accepts clap's shell names plus `pwsh`, ignoring case.
fn parse_shell(raw: &str) -> Option<Shell> {
    let name = raw.trim().to_ascii_lowercase();
    if name == "pwsh" {
        return Some(Shell::PowerShell);
    }
    <Shell as ValueEnum>::from_str(&name, true).ok()
}

pub fn detect_current_shell() -> Option<Shell> {
    let shell_var = std::env::var("SHELL").ok()?;
    parse_shell(shell_var.rsplit('/').next()?)
}

fn completions_install_path_for_home(shell: Shell, home: &Path) -> Option<PathBuf> {
    let path = match shell {
        Shell::Bash => home
            .join(".local/share/bash-completion/completions")
            .join(BIN_NAME),
        Shell::Zsh => home
            .join(".config/machete/completions")
            .join(format!("{BIN_NAME}.zsh")),
        Shell::Fish => home
            .join(".config/fish/completions")
            .join(format!("{BIN_NAME}.fish")),
        _ => return None,
    };
    Some(path)
}

pub fn install_completions(shell: Shell) -> io::Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?;
    install_completions_in(shell, Path::new(&home))
}

fn install_completions_in(shell: Shell, home: &Path) -> io::Result<PathBuf> {
    let path = completions_install_path_for_home(shell, home).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::Unsupported,
            format!("no install path for {shell}"),
        )
    })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut buf = Vec::new();
    generate_completions(shell, &mut buf);
    std::fs::write(&path, buf)?;
    if shell == Shell::Zsh {
        source_from_zshrc(home, &path)?;
    }
    tracing::info!(shell = %shell, path = %path.display(), "installed completions");
    Ok(path)
}

/// zsh has no drop-in directory we can rely on, so `.zshrc` sources the
/// script. The line is appended once.
fn source_from_zshrc(home: &Path, completions_path: &Path) -> io::Result<()> {
    let zshrc = home.join(".zshrc");
    let source_line = format!("source \"{}\"", completions_path.display());
    match std::fs::read_to_string(&zshrc) {
        Ok(content) if content.contains(&source_line) => return Ok(()),
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&zshrc)?;
    writeln!(file)?;
    writeln!(file, "# {BIN_NAME} shell completions")?;
    writeln!(file, "{source_line}")?;
    Ok(())
}

pub fn run_completions_command(shell_arg: Option<&str>, install: bool) -> Result<(), AppError> {
    let shell = match shell_arg {
        Some(name) => parse_shell(name)
            .ok_or_else(|| AppError::InvalidArgument(format!("unknown shell '{name}'")))?,
        None => detect_current_shell().ok_or_else(|| {
            AppError::InvalidArgument(
                "unable to detect shell from $SHELL; pass a shell name".to_string(),
            )
        })?,
    };

    if install {
        let path = install_completions(shell)?;
        println!("completions installed to {}", path.display());
    } else {
        let mut stdout = io::stdout().lock();
        generate_completions(shell, &mut stdout);
    }
    Ok(())
}
