mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{ConfigMerger, DbfixturesConfig, MergedConfig};
use dbfixtures_core::adapters::ShellConnection;
use dbfixtures_core::pipeline::run_collect;
use dbfixtures_store::FixtureStore;
use dbfixtures_types::{CollectSummary, Flavour, ToolInfo, Version};
use dbfixtures_version::{Constraint, matches, sort_versions};
use std::collections::BTreeMap;
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "dbfixtures",
    version,
    about = "Capture and browse MongoDB server responses stored per flavour and version."
)]
struct Cli {
    /// Config file (default: ./dbfixtures.toml when present).
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run admin commands against a live server and store the replies.
    Collect(CollectArgs),
    /// List stored versions, optionally filtered by a version constraint.
    Versions(VersionsArgs),
    /// List stored commands for one flavour and version.
    Commands(CommandsArgs),
    /// Print a stored fixture verbatim.
    Show(ShowArgs),
    /// Check a version against a constraint and print true or false.
    Match(MatchArgs),
    /// List known flavours and their directory names.
    Flavours,
}

#[derive(Debug, Parser)]
struct StoreArgs {
    /// Fixtures root directory (default: ./versions).
    #[arg(long, env = "DBFIXTURES_ROOT")]
    root: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct CollectArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Server connection string (default: mongodb://localhost:27017).
    #[arg(long)]
    uri: Option<String>,

    /// File fixtures under this flavour instead of detecting it.
    #[arg(long)]
    flavour: Option<Flavour>,

    /// Admin command to capture; repeat for several (default: built-in list).
    #[arg(long = "command")]
    commands: Vec<String>,

    /// Shell binary used to reach the server (default: mongosh).
    #[arg(long)]
    mongo_shell: Option<String>,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct VersionsArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Only list this flavour (default: all flavours).
    #[arg(long)]
    flavour: Option<Flavour>,

    /// Version constraint such as ">= 3.4, < 3.6".
    #[arg(long)]
    filter: Option<String>,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct CommandsArgs {
    #[command(flatten)]
    store: StoreArgs,

    #[arg(long)]
    flavour: Flavour,

    /// Server version; a build suffix such as "-1.2" is ignored.
    #[arg(long)]
    version: String,
}

#[derive(Debug, Parser)]
struct ShowArgs {
    #[command(flatten)]
    store: StoreArgs,

    #[arg(long)]
    flavour: Flavour,

    /// Server version; a build suffix such as "-1.2" is ignored.
    #[arg(long)]
    version: String,

    /// Command name the fixture was captured for.
    #[arg(long)]
    command: String,
}

#[derive(Debug, Parser)]
struct MatchArgs {
    version: String,
    constraint: String,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    // stdout carries command output, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();
    match cli.cmd {
        Command::Collect(args) => cmd_collect(config, args),
        Command::Versions(args) => cmd_versions(config, args),
        Command::Commands(args) => cmd_commands(config, args),
        Command::Show(args) => cmd_show(config, args),
        Command::Match(args) => cmd_match(args),
        Command::Flavours => cmd_flavours(),
    }
}

fn load_file_config(path: Option<&Utf8Path>) -> anyhow::Result<DbfixturesConfig> {
    match path {
        Some(path) => config::load_config(path),
        None => {
            config::load_or_default(Utf8Path::new(".")).context("load dbfixtures.toml config")
        }
    }
}

fn open_store(config: Option<&Utf8Path>, args: &StoreArgs) -> anyhow::Result<FixtureStore> {
    let merged =
        ConfigMerger::new(load_file_config(config)?).merge_store_args(args.root.as_deref());
    debug!("fixtures root {}, extension {}", merged.root, merged.extension);
    Ok(store_from(&merged))
}

fn store_from(merged: &MergedConfig) -> FixtureStore {
    FixtureStore::new(merged.root.clone()).with_extension(merged.extension.clone())
}

fn cmd_collect(config: Option<&Utf8Path>, args: CollectArgs) -> anyhow::Result<()> {
    let merged = ConfigMerger::new(load_file_config(config)?).merge_collect_args(
        args.store.root.as_deref(),
        args.uri.as_deref(),
        args.mongo_shell.as_deref(),
        &args.commands,
    );
    debug!(
        "merged config: root={}, uri={}, mongo_shell={}, commands={:?}",
        merged.root, merged.uri, merged.mongo_shell, merged.commands
    );

    let settings = merged.into_collect_settings(args.flavour);
    let store = settings.store();
    let conn =
        ShellConnection::new(settings.uri.clone()).with_program(settings.mongo_shell.clone());

    let summary = run_collect(&settings, &conn, &store, tool_info())
        .with_context(|| format!("collect fixtures from {}", settings.uri))?;

    match args.format {
        OutputFormat::Text => print_summary(&summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    info!(
        "wrote {} fixtures ({} bytes) for {}",
        summary.fixtures.len(),
        summary.total_bytes(),
        summary.identity
    );
    Ok(())
}

fn print_summary(summary: &CollectSummary) {
    println!("{}", summary.identity);
    for fixture in &summary.fixtures {
        println!("  {:<20} {:>10} {}", fixture.command, fixture.bytes, fixture.path);
    }
}

fn cmd_versions(config: Option<&Utf8Path>, args: VersionsArgs) -> anyhow::Result<()> {
    let store = open_store(config, &args.store)?;

    if let Some(filter) = &args.filter
        && let Err(e) = filter.parse::<Constraint>()
    {
        warn!("constraint '{}' does not parse, nothing will match: {}", filter, e);
    }

    let flavours: Vec<Flavour> = match args.flavour {
        Some(flavour) => vec![flavour],
        None => Flavour::ALL.to_vec(),
    };

    let mut listing: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    for flavour in flavours {
        let versions = match &args.filter {
            Some(filter) => store.versions_matching(flavour, filter),
            None => store.versions(flavour),
        }
        .with_context(|| format!("list {} versions under {}", flavour, store.root()))?;

        let mut names: Vec<String> = versions.into_iter().map(Version::into_string).collect();
        sort_versions(&mut names);
        listing.insert(flavour.as_str(), names);
    }

    match args.format {
        OutputFormat::Text => {
            for (flavour, versions) in &listing {
                for version in versions {
                    println!("{flavour}/{version}");
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
    }
    Ok(())
}

fn cmd_commands(config: Option<&Utf8Path>, args: CommandsArgs) -> anyhow::Result<()> {
    let store = open_store(config, &args.store)?;
    let version = Version::from(args.version.as_str());

    let commands = store
        .commands(args.flavour, &version)
        .with_context(|| format!("list commands for {}/{}", args.flavour, version))?;
    if commands.is_empty() {
        anyhow::bail!(
            "no fixtures stored for {}/{} under {}",
            args.flavour,
            version,
            store.root()
        );
    }

    for command in commands {
        println!("{command}");
    }
    Ok(())
}

fn cmd_show(config: Option<&Utf8Path>, args: ShowArgs) -> anyhow::Result<()> {
    let store = open_store(config, &args.store)?;
    let version = Version::from(args.version.as_str());

    let payload = store
        .load(args.flavour, &version, &args.command)
        .with_context(|| format!("load fixture {}/{}/{}", args.flavour, version, args.command))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&payload).context("write fixture to stdout")?;
    stdout.flush().context("flush stdout")?;
    Ok(())
}

fn cmd_match(args: MatchArgs) -> anyhow::Result<()> {
    println!("{}", matches(&args.version, &args.constraint));
    Ok(())
}

fn cmd_flavours() -> anyhow::Result<()> {
    for flavour in Flavour::ALL {
        let kind = if flavour.is_vendor_fork() {
            "vendor fork"
        } else {
            "upstream"
        };
        println!("{:<10} {:<10} {}", flavour.as_str(), flavour.dir_name(), kind);
    }
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "dbfixtures".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
