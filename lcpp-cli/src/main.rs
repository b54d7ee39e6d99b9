#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

use std::collections::HashMap;
use std::fs;
use std::io::{IsTerminal, Read, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use lcpp::{Config, IncludeKind, MacroValue};

/// A small C preprocessor: directive screening, conditional compilation, and
/// single-pass macro expansion.
#[derive(Parser, Debug)]
#[command(name = "lcpp", version, about)]
struct Cli {
    /// Input file to preprocess. Reads stdin when omitted or set to "-".
    input: Option<PathBuf>,

    /// Predefine NAME or NAME=VALUE, may be repeated.
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
    defines: Vec<String>,

    /// Add a directory to the `#include` search path, may be repeated.
    #[arg(short = 'I', long = "include-dir", value_name = "DIR")]
    include_dirs: Vec<PathBuf>,

    /// Emit the result as a JSON object instead of raw text.
    #[cfg(feature = "json")]
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (text, display_name) = read_input(cli.input.as_deref())?;
    let predefines = parse_defines(&cli.defines)?;
    let config = Config::new().with_include_resolver(make_resolver(cli.include_dirs.clone()));

    match lcpp::compile(&text, &config, &predefines, &display_name) {
        Ok((output, _state)) => {
            emit_success(&output, &cli);
            Ok(())
        }
        Err(err) => {
            emit_error(&err);
            std::process::exit(1);
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<(String, String)> {
    match path {
        Some(path) if path != Path::new("-") => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Ok((text, path.display().to_string()))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok((text, "<stdin>".to_string()))
        }
    }
}

/// Parse `-D NAME` / `-D NAME=VALUE` into a predefines table, matching `#define`'s own
/// Flag/Number/Text value inference.
fn parse_defines(defines: &[String]) -> Result<HashMap<String, MacroValue>> {
    let mut table = HashMap::new();
    for raw in defines {
        let (name, value) = match raw.split_once('=') {
            Some((name, value)) => (name, value),
            None => (raw.as_str(), ""),
        };
        anyhow::ensure!(!name.is_empty(), "-D requires a non-empty name: {raw:?}");
        let value = if value.is_empty() {
            MacroValue::Flag
        } else if let Ok(n) = value.parse::<i64>() {
            MacroValue::Number(n)
        } else {
            MacroValue::Text(value.to_string())
        };
        table.insert(name.to_string(), value);
    }
    Ok(table)
}

/// Build an `IncludeResolver` that searches `dirs` in order for both quote- and
/// angle-bracket includes; quote/system distinction is not otherwise policy-relevant
/// here since the resolver has no "current file's directory" to prefer without the
/// library tracking one itself.
fn make_resolver(dirs: Vec<PathBuf>) -> impl Fn(&str, IncludeKind) -> Option<String> {
    move |name, _kind| {
        dirs.iter()
            .map(|dir| dir.join(name))
            .find_map(|candidate| fs::read_to_string(candidate).ok())
    }
}

#[cfg(feature = "json")]
fn emit_success(output: &str, cli: &Cli) {
    if cli.json {
        let payload = serde_json::json!({ "output": output });
        println!("{payload}");
    } else {
        println!("{output}");
    }
}

#[cfg(not(feature = "json"))]
fn emit_success(output: &str, _cli: &Cli) {
    println!("{output}");
}

fn emit_error(err: &lcpp::PreprocessError) {
    let message = err.to_string();
    if std::io::stderr().is_terminal() {
        let _ = writeln!(std::io::stderr(), "{}", message.red());
    } else {
        let _ = writeln!(std::io::stderr(), "{message}");
    }
}
