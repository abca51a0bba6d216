use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, CommandFactory, Parser, Subcommand};

pub use crate::cli_ops::*;

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::BrightMagenta.on_default())
}

pub fn styled_command() -> clap::Command {
    Cli::command()
}

#[derive(Debug, Parser)]
#[command(name = "machete")]
#[command(bin_name = "machete")]
#[command(version)]
#[command(about = "Case management for a worker center: members, dispatch and reporting")]
#[command(styles = cli_styles())]
pub struct Cli {
    #[arg(
        short = 'd',
        long,
        env = "MACHETE_DB_PATH",
        default_value = ".machete/machete.sqlite",
        help = "Path to the SQLite database."
    )]
    pub db: String,

    #[arg(
        short = 'c',
        long,
        env = "MACHETE_CONFIG",
        default_value = crate::config::DEFAULT_CONFIG_PATH,
        help = "Path to the TOML configuration file."
    )]
    pub config: PathBuf,

    #[arg(
        short = 'l',
        long,
        env = "MACHETE_LOCALE",
        help = "Display language for lookup labels (en or es)."
    )]
    pub locale: Option<String>,

    #[arg(
        short = 'u',
        long,
        env = "MACHETE_USER",
        help = "User name stamped on created and updated records."
    )]
    pub user: Option<String>,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        global = true,
        help = "Raise log verbosity (-v info, -vv debug)."
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
#[allow(clippy::large_enum_variant)]
pub enum Commands {
    #[command(about = "Create the database, load reference lookups and write a default config.")]
    Init,
    #[command(about = "Inspect and refresh reference lookups.")]
    Lookup(LookupArgs),
    #[command(about = "Register and manage members.")]
    Worker(WorkerArgs),
    #[command(about = "Register and list employers.")]
    Employer(EmployerArgs),
    #[command(about = "Create and manage work orders.")]
    Order(OrderArgs),
    #[command(about = "Add assignments and dispatch workers to them.")]
    Assign(AssignArgs),
    #[command(about = "Record daily sign-ins and the hiring lottery.")]
    Signin(SigninArgs),
    #[command(about = "Manage classes and their attendance.")]
    Activity(ActivityArgs),
    #[command(about = "Record sanctions, certifications and other member events.")]
    Event(EventArgs),
    #[command(about = "Run dispatch, activity, member and employer reports.")]
    Report(ReportArgs),
    #[command(about = "Run store health diagnostics.")]
    Doctor(DoctorArgs),
    #[command(about = "Run performance harness checks.")]
    Perf(PerfArgs),
    #[command(about = "Generate or install shell completions.")]
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
#[command(about = "Generate or install shell completions.")]
pub struct CompletionsArgs {
    #[arg(help = "Shell name (bash, zsh, fish). Auto-detected if omitted.")]
    pub shell: Option<String>,

    #[arg(short = 'i', long, help = "Install completions to the shell's default location.")]
    pub install: bool,
}

#[derive(Debug, Args)]
pub struct DoctorArgs {
    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PerfArgs {
    #[arg(
        short = 'n',
        long,
        default_value_t = 5,
        help = "Number of timed iterations per measurement."
    )]
    pub iterations: u32,

    #[arg(short = 's', long, help = "Fail when any measurement exceeds its budget.")]
    pub strict: bool,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Lookup commands.")]
pub struct LookupArgs {
    #[command(subcommand)]
    pub command: LookupSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum LookupSubcommands {
    #[command(about = "List lookups, optionally for one category.")]
    List(LookupListArgs),
    #[command(about = "Show one lookup by id.")]
    Show(LookupShowArgs),
    #[command(about = "Resolve an id, key or label to a lookup id.")]
    Resolve(LookupResolveArgs),
    #[command(about = "Reload the embedded reference lookups and drop the cache.")]
    Refresh,
}

#[derive(Debug, Args)]
pub struct LookupListArgs {
    #[arg(short = 'c', long, help = "Category, for example memberstatus or skill.")]
    pub category: Option<String>,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct LookupShowArgs {
    #[arg(help = "Lookup id.")]
    pub id: i64,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct LookupResolveArgs {
    #[arg(help = "Lookup category.")]
    pub category: String,
    #[arg(help = "Numeric id, key, English or Spanish label.")]
    pub value: String,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
