mod report;
mod schema;

use anyhow::{Context, Result};
use argwalk::{ArgParser, ParseOutcome};
use clap::{Parser, Subcommand, ValueEnum};
use std::{fs, path::PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

use crate::schema::{DEFAULT_SCHEMA_NAME, Schema};

#[derive(Parser)]
#[command(name = "argwalk")]
#[command(version, about = "Parse argument lists against a declared option schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an example argwalk.json schema
    Init(InitArgs),

    /// Parse tokens against a schema and print the resolved values
    Parse(ParseArgs),

    /// Print the usage banner generated from a schema
    Usage(UsageArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Target directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to the option schema
    #[arg(short, long, default_value = DEFAULT_SCHEMA_NAME, value_name = "FILE")]
    schema: PathBuf,

    /// Program name passed as argv[0] (overrides the schema)
    #[arg(short, long, value_name = "NAME")]
    program: Option<String>,

    /// Output format for resolved values
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Tokens to parse, given after `--`
    #[arg(last = true, value_name = "TOKENS")]
    tokens: Vec<String>,
}

#[derive(Parser)]
struct UsageArgs {
    /// Path to the option schema
    #[arg(short, long, default_value = DEFAULT_SCHEMA_NAME, value_name = "FILE")]
    schema: PathBuf,

    /// Program name shown in the banner (overrides the schema)
    #[arg(short, long, value_name = "NAME")]
    program: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Plain,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Parse(args) => parse(args),
        Commands::Usage(args) => usage(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let path = schema::write_example_schema(&dir)?;
    eprintln!("Created: {}", path.display());
    eprintln!("\nTry:");
    eprintln!("  argwalk parse -s {} -- -v -n 2 a.txt", path.display());
    Ok(())
}

fn parse(args: ParseArgs) -> Result<()> {
    tracing::debug!("executing parse command");
    let schema = schema::load_schema(&args.schema)?;
    let program = program_name(args.program, &schema);
    let parser = build_parser(&program, &schema)?;
    run_parse(parser, &schema, &program, args.tokens, args.format)
}

fn run_parse(
    mut parser: ArgParser,
    schema: &Schema,
    program: &str,
    tokens: Vec<String>,
    format: Format,
) -> Result<()> {
    let argv = std::iter::once(program.to_string()).chain(tokens);
    match parser.parse(argv).context("invalid arguments")? {
        ParseOutcome::Help => print!("{}", parser.help()),
        ParseOutcome::Parsed => match format {
            Format::Json => {
                let report = report::to_json(&parser, schema)?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Format::Plain => print!("{}", report::to_plain(&parser)),
        },
    }
    Ok(())
}

fn usage(args: UsageArgs) -> Result<()> {
    let schema = schema::load_schema(&args.schema)?;
    let program = program_name(args.program, &schema);
    let parser = build_parser(&program, &schema)?;
    print!("{}", parser.help());
    Ok(())
}

fn program_name(explicit: Option<String>, schema: &Schema) -> String {
    explicit
        .or_else(|| schema.program.clone())
        .unwrap_or_else(|| "prog".to_string())
}

fn build_parser(program: &str, schema: &Schema) -> Result<ArgParser> {
    let mut parser = ArgParser::new(program);
    schema
        .declare(&mut parser)
        .context("failed to declare schema arguments")?;
    Ok(parser)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
