use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ltc_parser::Ast;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ltc")]
#[command(about = "Parse lexer token documents into AST documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Parse the token document and write the AST document (default)
    Parse,

    /// Report syntax errors without writing the tree
    Check,
}

#[derive(Args)]
struct SourceArgs {
    /// Read the token document from a file instead of stdin
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Refuse token documents holding more tokens than this
    #[arg(long, global = true)]
    max_tokens: Option<usize>,
}

#[derive(Args)]
struct OutputArgs {
    /// Output format for the tree
    #[arg(long, value_enum, default_value_t = Format::Json, global = true)]
    format: Format,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    /// AST document (`nodeType` / `value` / `children`)
    Json,
    /// One s-expression per top-level statement
    Tree,
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();

    let document = read_document(cli.source.input.as_deref())?;
    let ast = parse_document(&document, cli.source.max_tokens)?;

    match cli.command.unwrap_or(Command::Parse) {
        Command::Parse => cmd_parse(&ast, &cli.output),
        Command::Check => cmd_check(&ast),
    }
}

/// Logs go to stderr; stdout carries the document.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_document(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut document = String::new();
            std::io::stdin()
                .read_to_string(&mut document)
                .context("failed to read token document from stdin")?;
            Ok(document)
        }
    }
}

fn parse_document(document: &str, max_tokens: Option<usize>) -> anyhow::Result<Ast> {
    let ast = match max_tokens {
        Some(limit) => ltc_parser::Parser::parse_json_limited(document, limit),
        None => ltc_parser::Parser::parse_json(document),
    }?;

    tracing::info!(
        statements = ast.children.len(),
        has_errors = ast.has_errors(),
        "parsed token document"
    );
    Ok(ast)
}

fn cmd_parse(ast: &Ast, output: &OutputArgs) -> anyhow::Result<()> {
    let rendered = render(ast, output.format, output.pretty)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}").context("failed to write AST document")?;
    Ok(())
}

fn cmd_check(ast: &Ast) -> anyhow::Result<()> {
    let report = check_report(ast);
    if report.is_empty() {
        eprintln!("OK");
        return Ok(());
    }

    for line in &report {
        eprintln!("{line}");
    }
    std::process::exit(1);
}

fn render(ast: &Ast, format: Format, pretty: bool) -> anyhow::Result<String> {
    let rendered = match format {
        Format::Json => ast.to_json(pretty)?,
        Format::Tree => ast.to_string(),
    };
    Ok(rendered)
}

fn check_report(ast: &Ast) -> Vec<String> {
    ast.diagnostics().iter().map(ToString::to_string).collect()
}
