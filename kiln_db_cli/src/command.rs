use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use kiln_db_core::query::{Plan, WhereClause};

/// One shell command. Structured arguments are the front-end's JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTable(JsonValue),
    DropTable(String),
    Insert { table: String, values: Vec<String> },
    Load { table: String, path: String },
    Update {
        table: String,
        assignments: Vec<(String, String)>,
        filter: Option<WhereClause>,
    },
    Delete { table: String, filter: Option<WhereClause> },
    Query(Plan),
    Tables,
    Describe(String),
}

#[derive(Debug, Deserialize)]
struct UpdateArgs {
    set: serde_json::Map<String, JsonValue>,
    #[serde(default, rename = "where")]
    filter: Option<WhereClause>,
}

/// Parses one input line.
///
/// ```text
/// create table {"name": "users", "columns": [...]}
/// insert users ["1", "alice"]
/// load data users ./users.csv
/// update users {"set": {"name": "bob"}, "where": {"eq": ["id", 1]}}
/// delete users {"eq": ["id", 1]}
/// drop table users
/// query {"steps": [{"name": "users"}]}
/// ```
pub fn parse(input: &str) -> Result<Command> {
    let (keyword, rest) = split_word(input);
    match keyword.to_ascii_lowercase().as_str() {
        "create" => {
            let (kind, body) = split_word(rest);
            if !kind.eq_ignore_ascii_case("table") {
                bail!("expected CREATE TABLE <definition>");
            }
            Ok(Command::CreateTable(parse_json(body)?))
        }
        "drop" => {
            let (kind, table) = split_word(rest);
            if !kind.eq_ignore_ascii_case("table") || table.is_empty() {
                bail!("expected DROP TABLE <name>");
            }
            Ok(Command::DropTable(table.to_string()))
        }
        "insert" => {
            let (table, body) = table_and_body(rest, "INSERT <table> [values]")?;
            let values = parse_json(body)?
                .as_array()
                .ok_or_else(|| anyhow!("INSERT expects a JSON array of values"))?
                .iter()
                .map(raw_token)
                .collect();
            Ok(Command::Insert { table, values })
        }
        "load" => {
            // LOAD DATA <table> <path> or LOAD <table> <path>
            let (first, tail) = split_word(rest);
            let tail = if first.eq_ignore_ascii_case("data") { tail } else { rest };
            let (table, path) = split_word(tail);
            if table.is_empty() || path.is_empty() {
                bail!("expected LOAD DATA <table> <csv path>");
            }
            Ok(Command::Load {
                table: table.to_string(),
                path: path.to_string(),
            })
        }
        "update" => {
            let (table, body) = table_and_body(rest, "UPDATE <table> {\"set\": {..}, \"where\": {..}}")?;
            let args: UpdateArgs =
                serde_json::from_value(parse_json(body)?).context("malformed UPDATE arguments")?;
            let assignments = args
                .set
                .iter()
                .map(|(column, value)| (column.clone(), raw_token(value)))
                .collect();
            Ok(Command::Update {
                table,
                assignments,
                filter: args.filter,
            })
        }
        "delete" => {
            let (table, body) = split_word(rest);
            if table.is_empty() {
                bail!("expected DELETE <table> [where]");
            }
            let filter = if body.is_empty() {
                None
            } else {
                Some(WhereClause::from_json(&parse_json(body)?)?)
            };
            Ok(Command::Delete {
                table: table.to_string(),
                filter,
            })
        }
        "query" | "plan" => Ok(Command::Query(Plan::from_json(&parse_json(rest)?)?)),
        "tables" => Ok(Command::Tables),
        "describe" if !rest.is_empty() => Ok(Command::Describe(rest.to_string())),
        _ => bail!("Unknown command: {keyword}"),
    }
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn table_and_body<'a>(input: &'a str, usage: &str) -> Result<(String, &'a str)> {
    let (table, body) = split_word(input);
    if table.is_empty() || body.is_empty() {
        bail!("expected {usage}");
    }
    Ok((table.to_string(), body))
}

fn parse_json(body: &str) -> Result<JsonValue> {
    serde_json::from_str(body).with_context(|| format!("invalid JSON: {body}"))
}

/// Scalars become the raw token the type converter expects; null is blank.
fn raw_token(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
