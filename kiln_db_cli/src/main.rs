mod command;
mod loader;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use command::Command;
use kiln_db_core::engine::{format_load_report, format_result};
use kiln_db_core::{Database, EngineConfig};

#[derive(Parser, Debug)]
#[command(name = "kiln_db", version, about = "Line-oriented shell for the kiln_db engine")]
struct Cli {
    /// Run commands from a file instead of the interactive prompt
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// JSON file with engine settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `warn` or `kiln_db_core=debug`
    #[arg(long, env = "KILN_LOG", default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    install_tracing_subscriber(&cli.log_level)?;

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let mut db = Database::with_config(config);

    match &cli.script {
        Some(path) => run_script(&mut db, path),
        None => run_repl(&mut db),
    }
}

fn install_tracing_subscriber(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).with_context(|| format!("invalid log filter '{level}'"))?;
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow!("cannot install log subscriber: {e}"))
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let config = EngineConfig::from_json_str(&text).with_context(|| format!("malformed config {}", path.display()))?;
    info!(path = %path.display(), ?config, "cli.config.loaded");
    Ok(config)
}

fn run_script(db: &mut Database, path: &Path) -> Result<()> {
    let file = std::fs::File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    for (n, line) in io::BufReader::new(file).lines().enumerate() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() || input.starts_with("--") {
            continue;
        }
        debug!(line = n + 1, "cli.script.command");
        match run_line(db, input) {
            Ok(out) => println!("{out}"),
            Err(err) => println!("line {}: {err:#}", n + 1),
        }
    }
    Ok(())
}

fn run_repl(db: &mut Database) -> Result<()> {
    println!("kiln_db (type 'help' or 'exit')");
    let stdin = io::stdin();
    loop {
        print!("db> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if input.eq_ignore_ascii_case("help") {
            print_help();
            continue;
        }

        match run_line(db, input) {
            Ok(out) => println!("{out}"),
            Err(err) => println!("{err:#}"),
        }
    }
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  create table <json>              -> create a table from a definition");
    println!("  insert <table> <json array>      -> insert one row");
    println!("  load data <table> <csv path>     -> bulk load a headered CSV file");
    println!("  update <table> <json>            -> {{\"set\": {{..}}, \"where\": {{..}}}}");
    println!("  delete <table> [json where]      -> delete matching rows");
    println!("  drop table <table>               -> drop a table");
    println!("  query <json plan>                -> run a plan");
    println!("  tables | describe <table>        -> inspect the catalog");
    println!("  exit|quit                        -> quit");
}

fn run_line(db: &mut Database, input: &str) -> Result<String> {
    match command::parse(input)? {
        Command::CreateTable(def) => {
            let name = db.create_table_json(&def)?;
            Ok(format!("created table {name}"))
        }
        Command::DropTable(table) => {
            db.drop_table(&table)?;
            Ok(format!("dropped table {table}"))
        }
        Command::Insert { table, values } => {
            db.insert(&table, values.as_slice())?;
            Ok(format!("inserted 1 row into {table}"))
        }
        Command::Load { table, path } => {
            let rows = loader::read_csv_rows(Path::new(&path), db.schema(&table)?)?;
            let report = db.bulk_load(&table, &rows)?;
            Ok(format_load_report(&table, &report))
        }
        Command::Update {
            table,
            assignments,
            filter,
        } => {
            let n = db.update(&table, assignments.as_slice(), filter.as_ref())?;
            Ok(format!("updated {n} rows in {table}"))
        }
        Command::Delete { table, filter } => {
            let n = db.delete(&table, filter.as_ref())?;
            Ok(format!("deleted {n} rows from {table}"))
        }
        Command::Query(plan) => Ok(format_result(&db.execute(&plan)?)),
        Command::Tables => Ok(db.table_names().join("\n")),
        Command::Describe(table) => {
            let schema = db.schema(&table)?;
            let lines: Vec<String> = schema
                .columns
                .iter()
                .map(|c| {
                    let mut line = format!("{}\t{}", c.name, c.dtype);
                    if c.primary_key {
                        line.push_str("\tprimary key");
                    } else if !c.nullable {
                        line.push_str("\tnot null");
                    }
                    if let Some(fk) = &c.foreign_key {
                        line.push_str(&format!("\treferences {}({})", fk.table, fk.column));
                    }
                    line
                })
                .collect();
            Ok(lines.join("\n"))
        }
    }
}
