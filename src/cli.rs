//! Command line front end: one-shot subcommands plus an interactive shell that
//! reuses the same clap syntax against a single long-lived session.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::config::Config;
use crate::core::{AddDataForm, AssumeYes, Confirm, Notice, PromptConfirm, SessionManager, Severity};
use crate::models::{ConfigFile, DataSourceProfile, NewDataSource, RowDetail};

#[derive(Parser, Debug)]
#[command(
    name = "hbase-browser",
    version,
    about = "Browse and edit HBase tables through the data source REST backend"
)]
pub struct Cli {
    /// Base URL of the REST backend.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding the saved data source list.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Answer "yes" to every confirmation prompt.
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Data source (id or name) to browse.
    #[arg(long, short = 'd', global = true)]
    pub datasource: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Environment configuration with command line flags applied on top.
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::from_env()?;
        if let Some(api_url) = &self.api_url {
            config.api_url = api_url.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        Ok(config)
    }

    fn confirmer(&self) -> Box<dyn Confirm> {
        if self.yes {
            Box::new(AssumeYes)
        } else {
            Box::new(PromptConfirm)
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List saved data sources.
    #[command(name = "datasources", alias = "ls")]
    DataSources,
    /// Upload cluster config, connect, and save a new data source.
    #[command(name = "add")]
    Add {
        #[arg(long)]
        name: String,
        /// ZooKeeper quorum, e.g. zk1:2181,zk2:2181
        #[arg(long)]
        quorum: String,
        #[arg(long)]
        core_site: PathBuf,
        #[arg(long)]
        hbase_site: PathBuf,
    },
    /// Check that a cluster is reachable without saving anything.
    #[command(name = "test")]
    Test {
        #[arg(long)]
        quorum: String,
        #[arg(long)]
        core_site: PathBuf,
        #[arg(long)]
        hbase_site: PathBuf,
    },
    /// Connect to a saved data source and browse it.
    #[command(name = "use")]
    Use { datasource: String },
    /// Re-establish the backend connection of a data source.
    #[command(name = "reconnect")]
    Reconnect { datasource: String },
    /// Delete a saved data source.
    #[command(name = "delete")]
    Delete { datasource: String },
    /// List tables of the active data source.
    #[command(name = "tables")]
    Tables,
    /// Select a table and list its first row keys.
    #[command(name = "table")]
    Table { table: String },
    /// List row keys of a table.
    #[command(name = "rows")]
    Rows {
        #[arg(long, short = 't')]
        table: Option<String>,
        /// Maximum number of row keys to fetch.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Look up a row key; a single hit is opened right away.
    #[command(name = "search")]
    Search {
        key: String,
        #[arg(long, short = 't')]
        table: Option<String>,
    },
    /// Show every cell of a row.
    #[command(name = "get")]
    Get {
        row_key: String,
        #[arg(long, short = 't')]
        table: Option<String>,
    },
    /// Delete a whole row.
    #[command(name = "delete-row")]
    DeleteRow {
        row_key: String,
        #[arg(long, short = 't')]
        table: Option<String>,
    },
    /// Write one cell.
    #[command(name = "put")]
    Put {
        #[arg(long, short = 't')]
        table: Option<String>,
        #[arg(long)]
        row_key: String,
        #[arg(long)]
        family: String,
        #[arg(long)]
        column: String,
        #[arg(long)]
        value: String,
    },
    /// Add a column family to a table.
    #[command(name = "add-family")]
    AddFamily {
        family: String,
        #[arg(long, short = 't')]
        table: Option<String>,
    },
    /// Show the current view, data source and table.
    #[command(name = "status")]
    Status,
    /// Start the interactive shell.
    #[command(name = "shell")]
    Shell,
}

/// Parser for one shell input line.
#[derive(Parser, Debug)]
#[command(
    name = "",
    no_binary_name = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

/// Entry point behind `main`.
pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.config()?;
    info!("Using backend {} and data dir {:?}", config.api_url, config.data_dir);
    let mut session = SessionManager::from_config(&config)?;
    let confirm = cli.confirmer();

    match cli.command.clone().unwrap_or(Command::Shell) {
        Command::Shell => run_shell(&mut session, confirm.as_ref(), cli.datasource.as_deref()).await,
        command => {
            let result = dispatch(&mut session, confirm.as_ref(), cli.datasource.as_deref(), command).await;
            let printed_error = print_notices(&session.drain_notices());
            match result {
                Ok(()) => Ok(()),
                // The failure was already shown as a notice
                Err(_) if printed_error => std::process::exit(1),
                Err(e) => Err(e),
            }
        }
    }
}

async fn run_shell(session: &mut SessionManager, confirm: &dyn Confirm, datasource: Option<&str>) -> Result<()> {
    println!("HBase browser shell. Type `--help` for commands, `exit` to quit.");
    if let Some(datasource) = datasource {
        let _ = session.select(datasource).await;
        print_notices(&session.drain_notices());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", prompt(session));
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        let words = match shell_words::split(line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("error: unable to parse input: {}", e);
                continue;
            }
        };
        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                e.print()?;
                continue;
            }
        };
        if command == Command::Shell {
            println!("Already in the shell.");
            continue;
        }

        let result = dispatch(session, confirm, None, command).await;
        let printed_error = print_notices(&session.drain_notices());
        if let Err(e) = result {
            if !printed_error {
                eprintln!("error: {:#}", e);
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn prompt(session: &SessionManager) -> String {
    match (session.active_profile(), session.browser().selected_table()) {
        (Some(profile), Some(table)) => format!("hbase[{}/{}]> ", profile.name, table),
        (Some(profile), None) => format!("hbase[{}]> ", profile.name),
        _ => "hbase> ".to_string(),
    }
}

async fn dispatch(
    session: &mut SessionManager,
    confirm: &dyn Confirm,
    datasource: Option<&str>,
    command: Command,
) -> Result<()> {
    use Command::*;

    match command {
        DataSources => print_profiles(session.profiles(), session.active_profile()),
        Add {
            name,
            quorum,
            core_site,
            hbase_site,
        } => {
            let input = new_data_source(name, quorum, &core_site, &hbase_site).await?;
            let profile = session.create(input).await?;
            println!("Saved data source {} ({})", profile.name, profile.id);
            print_tables(session.browser().tables());
        }
        Test {
            quorum,
            core_site,
            hbase_site,
        } => {
            let input = new_data_source(String::new(), quorum, &core_site, &hbase_site).await?;
            let tables = session.test_connection(input).await?;
            println!("Cluster reachable, {} tables", tables.len());
        }
        Use { datasource } => {
            session.select(&datasource).await?;
            print_tables(session.browser().tables());
        }
        Reconnect { datasource } => {
            session.reconnect(&datasource).await?;
            print_tables(session.browser().tables());
        }
        Delete { datasource } => {
            if !session.delete(&datasource, confirm).await? {
                println!("Cancelled");
            }
        }
        Tables => {
            ensure_active(session, datasource).await?;
            print_tables(session.browser().tables());
        }
        Table { table } => {
            ensure_active(session, datasource).await?;
            session.choose_table(&table).await?;
            print_row_keys(session);
        }
        Rows { table, limit } => {
            ensure_active(session, datasource).await?;
            let table = resolve_table(session, table)?;
            session.list_row_keys_limited(&table, None, limit).await?;
            print_row_keys(session);
        }
        Search { key, table } => {
            ensure_active(session, datasource).await?;
            match table {
                Some(table) => session.list_row_keys(&table, Some(&key)).await?,
                None => session.search(&key).await?,
            };
            print_row_keys(session);
            if let Some(detail) = session.browser().detail() {
                print_detail(detail);
            }
        }
        Get { row_key, table } => {
            ensure_active(session, datasource).await?;
            let table = resolve_table(session, table)?;
            let detail = session.get_row(&table, &row_key).await?;
            print_detail(&detail);
        }
        DeleteRow { row_key, table } => {
            ensure_active(session, datasource).await?;
            let table = resolve_table(session, table)?;
            if !session.delete_row(&table, &row_key, confirm).await? {
                println!("Cancelled");
            }
        }
        Put {
            table,
            row_key,
            family,
            column,
            value,
        } => {
            ensure_active(session, datasource).await?;
            let table = resolve_table(session, table)?;
            let form = AddDataForm {
                table,
                row_key,
                column_family: family,
                column,
                value,
            };
            session.add_row_data(form).await?;
        }
        AddFamily { family, table } => {
            ensure_active(session, datasource).await?;
            session.add_column_family(table.as_deref(), &family).await?;
        }
        Status => print_status(session),
        Shell => bail!("The shell cannot be started from inside a command"),
    }

    Ok(())
}

async fn new_data_source(name: String, quorum: String, core_site: &Path, hbase_site: &Path) -> Result<NewDataSource> {
    let core_site = ConfigFile::from_path(core_site)
        .await
        .with_context(|| format!("Failed to read {:?}", core_site))?;
    let hbase_site = ConfigFile::from_path(hbase_site)
        .await
        .with_context(|| format!("Failed to read {:?}", hbase_site))?;
    Ok(NewDataSource {
        name,
        cluster_quorum: quorum,
        core_site: Some(core_site),
        hbase_site: Some(hbase_site),
    })
}

/// Browsing needs an active data source. A one-shot invocation starts with
/// none, so select the requested one, or the only one saved.
async fn ensure_active(session: &mut SessionManager, datasource: Option<&str>) -> Result<()> {
    if let Some(wanted) = datasource {
        let already = session
            .active_profile()
            .is_some_and(|active| active.id == wanted || active.name == wanted);
        if !already {
            session.select(wanted).await?;
        }
        return Ok(());
    }
    if session.active_profile().is_some() {
        return Ok(());
    }
    match session.profiles() {
        [only] => {
            let id = only.id.clone();
            session.select(&id).await?;
            Ok(())
        }
        [] => Err(anyhow!("No data sources saved yet; add one with `add`")),
        _ => Err(anyhow!("No data source is active; pass --datasource or run `use` first")),
    }
}

fn resolve_table(session: &SessionManager, table: Option<String>) -> Result<String> {
    table
        .or_else(|| session.browser().selected_table().map(str::to_string))
        .ok_or_else(|| anyhow!("Please select a table first (pass --table)"))
}

/// Print and return whether any of them was an error.
fn print_notices(notices: &[Notice]) -> bool {
    let mut printed_error = false;
    for notice in notices {
        match notice.severity {
            Severity::Error => {
                printed_error = true;
                eprintln!("[{}] {}", notice.severity.label(), notice.message);
            }
            _ => println!("[{}] {}", notice.severity.label(), notice.message),
        }
    }
    printed_error
}

fn print_profiles(profiles: &[DataSourceProfile], active: Option<&DataSourceProfile>) {
    if profiles.is_empty() {
        println!("No data sources saved yet.");
        return;
    }
    for profile in profiles {
        let marker = if active.is_some_and(|a| a.id == profile.id) { "*" } else { " " };
        println!("{} {:<24} {:<32} {}", marker, profile.name, profile.cluster_quorum, profile.id);
    }
}

fn print_tables(tables: &[String]) {
    if tables.is_empty() {
        println!("No tables.");
        return;
    }
    for table in tables {
        println!("  {}", table);
    }
}

fn print_row_keys(session: &SessionManager) {
    let browser = session.browser();
    let table = browser.selected_table().unwrap_or("-");
    if browser.search_key().is_empty() {
        println!("{}: {} row keys", table, browser.row_count());
    } else {
        println!("{}: {} row keys matching '{}'", table, browser.row_count(), browser.search_key());
    }
    for row_key in browser.row_keys() {
        let marker = if browser.selected_row_key() == Some(row_key.as_str()) { "*" } else { " " };
        println!("{} {}", marker, row_key);
    }
}

fn print_detail(detail: &RowDetail) {
    println!("Row {} ({} cells)", detail.row_key, detail.cell_count());
    for (family, columns) in &detail.families {
        println!("  {}", family);
        for (column, value) in columns {
            println!("    {}:{} = {}", family, column, value);
        }
    }
}

fn print_status(session: &SessionManager) {
    println!("view: {}", session.view());
    match session.active_profile() {
        Some(profile) => println!("data source: {} ({})", profile.name, profile.cluster_quorum),
        None => println!("data source: -"),
    }
    let browser = session.browser();
    println!("table: {}", browser.selected_table().unwrap_or("-"));
    println!("row keys: {}", browser.row_count());
    println!("row: {}", browser.selected_row_key().unwrap_or("-"));
}
