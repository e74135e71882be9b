use anyhow::Context;
use clap::{Parser, Subcommand};
use parsetools::{LayoutOptions, Operation, Records, Sentence, Treebank, layout, parse};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Tools for bracketed parse trees, one record per balanced S-expression
#[derive(Parser, Debug)]
#[command(name = "parsetools", version)]
struct Cli {
    /// Log filter (e.g. `debug`, `parsetools=info`); overrides RUST_LOG
    #[arg(long, global = true, env = "PARSETOOLS_LOG")]
    log_level: Option<String>,

    /// Read every file matching this glob pattern instead of FILES
    #[arg(long, global = true)]
    glob: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collapse trees to one line each
    Collapse(Inputs),
    /// Apply an operation to each tree and print one JSON value per line
    Apply {
        /// One of: terminals, preterminals, paths, preorder, sexpr
        operation: Operation,
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Draw each tree as a bracket diagram
    Dump {
        /// Minimum column width
        #[arg(long, default_value_t = 3, env = "PARSETOOLS_MIN_WIDTH")]
        min_width: usize,
        /// Maximum number of bracket rows per tree
        #[arg(long, default_value_t = 40, env = "PARSETOOLS_MAX_ROWS")]
        max_rows: usize,
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Print a JSON sentence object (tokens and parse) per record
    Json(Inputs),
}

#[derive(clap::Args, Debug)]
struct Inputs {
    /// Input files (`.gz` is decompressed); `-` or nothing reads stdin
    files: Vec<PathBuf>,
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn treebank(glob: Option<&str>, inputs: &Inputs) -> anyhow::Result<Treebank> {
    if let Some(pattern) = glob {
        return Treebank::from_glob(pattern)
            .with_context(|| format!("failed to expand `{pattern}`"));
    }
    if inputs.files.is_empty() {
        Ok(Treebank::stdin())
    } else {
        Ok(Treebank::from_paths(&inputs.files))
    }
}

fn report(records: &Records) {
    let stats = records.stats();
    info!(
        lines = stats.lines,
        lossy_lines = stats.lossy_lines,
        "finished reading input"
    );
}

fn run_collapse(records: &mut Records, out: &mut impl Write) -> anyhow::Result<()> {
    for record in records.by_ref() {
        writeln!(out, "{}", record.collapsed())?;
    }
    Ok(())
}

fn run_apply(
    records: &mut Records,
    operation: Operation,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    while let Some(record) = records.next() {
        match parse(&record.text) {
            Ok(tree) => writeln!(out, "{}", operation.apply(&tree))?,
            Err(e) => warn!(
                source = %records.source(),
                line = record.line_num,
                error = %e,
                text = %record.collapsed(),
                "skipping record"
            ),
        }
    }
    Ok(())
}

fn run_dump(
    records: &mut Records,
    options: &LayoutOptions,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    while let Some(record) = records.next() {
        match parse(&record.text) {
            Ok(tree) => {
                writeln!(out, "\n===")?;
                write!(out, "{}", layout(&tree, options))?;
            }
            Err(e) => warn!(
                source = %records.source(),
                line = record.line_num,
                error = %e,
                text = %record.collapsed(),
                "skipping record"
            ),
        }
    }
    Ok(())
}

fn run_json(records: &mut Records, out: &mut impl Write) -> anyhow::Result<()> {
    for record in records.by_ref() {
        let sentence = Sentence::from_record(&record.text);
        serde_json::to_writer(&mut *out, &sentence)?;
        writeln!(out)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let glob = cli.glob.as_deref();

    let inputs = match &cli.command {
        Command::Collapse(inputs)
        | Command::Json(inputs)
        | Command::Apply { inputs, .. }
        | Command::Dump { inputs, .. } => inputs,
    };
    let mut records = treebank(glob, inputs)?.records();

    match cli.command {
        Command::Collapse(_) => run_collapse(&mut records, &mut out)?,
        Command::Apply { operation, .. } => run_apply(&mut records, operation, &mut out)?,
        Command::Dump {
            min_width,
            max_rows,
            ..
        } => {
            let options = LayoutOptions {
                min_width,
                max_rows,
            };
            run_dump(&mut records, &options, &mut out)?;
        }
        Command::Json(_) => run_json(&mut records, &mut out)?,
    }

    out.flush().context("failed to flush stdout")?;
    report(&records);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "(ROOT (S (N bob)\n   (VP (V is) (V running))))\n\n(S (N bad)\n";

    fn output(f: impl FnOnce(&mut Records, &mut Vec<u8>) -> anyhow::Result<()>) -> String {
        let mut records = Treebank::from_string(INPUT).records();
        let mut out = Vec::new();
        f(&mut records, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_collapse() {
        assert_eq!(
            output(|r, out| run_collapse(r, out)),
            "(ROOT (S (N bob) (VP (V is) (V running))))\n(S (N bad)\n"
        );
    }

    #[test]
    fn test_apply_terminals_skips_bad_record() {
        assert_eq!(
            output(|r, out| run_apply(r, Operation::Terminals, out)),
            "[\"bob\",\"is\",\"running\"]\n"
        );
    }

    #[test]
    fn test_dump() {
        let options = LayoutOptions::default();

        assert_eq!(
            output(|r, out| run_dump(r, &options, out)),
            "\n===\nS------------- \n    VP-------- \nN   V  V       \nbob is running \n"
        );
    }

    #[test]
    fn test_json() {
        assert_eq!(
            output(|r, out| run_json(r, out)),
            "{\"tokens\":[\"bob\",\"is\",\"running\"],\"parse\":\"(ROOT (S (N bob) (VP (V is) (V running))))\"}\n\
             {\"text\":\"(S (N bad)\",\"sexpr_parse_failed\":true}\n"
        );
    }

    #[test]
    fn test_cli_parses_operation() {
        let cli = Cli::try_parse_from(["parsetools", "apply", "paths", "a.mrg"]).unwrap();

        assert!(matches!(
            cli.command,
            Command::Apply {
                operation: Operation::Paths,
                ..
            }
        ));
        assert!(Cli::try_parse_from(["parsetools", "apply", "bfs_walk"]).is_err());
    }
}
