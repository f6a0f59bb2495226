use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use luca::ast_printer::AstPrinter;
use luca::parser::parse;
use luca::scanner::scan;
use luca::session::{RunOutcome, Session, EXIT_STATIC_ERROR};

#[derive(ClapParser, Debug)]
#[command(version, about = "Luca language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to luca.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file and prints each statement's AST
    Parse { filename: PathBuf },

    /// Runs input from a file as a Luca program
    Run { filename: PathBuf },

    /// Starts an interactive prompt (the default)
    Repl,
}

/// Reads a whole source file as UTF‑8 text.
fn read_file(filename: PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("{:?} is not valid UTF-8", filename))
}

fn init_logger() -> Result<()> {
    let log_file = File::create("luca.log").context("Failed to create luca.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'luca::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("luca::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to luca.log");
    Ok(())
}

fn tokenize(filename: PathBuf, json: bool) -> Result<i32> {
    let source = read_file(filename)?;
    let (tokens, errors) = scan(&source);

    for e in &errors {
        eprintln!("{}", e);
    }

    if json {
        let rendered = serde_json::to_string_pretty(&tokens).context("Failed to encode tokens")?;
        println!("{}", rendered);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    Ok(if errors.is_empty() { 0 } else { EXIT_STATIC_ERROR })
}

fn parse_file(filename: PathBuf) -> Result<i32> {
    let source = read_file(filename)?;
    let (tokens, mut errors) = scan(&source);
    let (program, parse_errors) = parse(&tokens);
    errors.extend(parse_errors);

    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{}", e);
        }
        return Ok(EXIT_STATIC_ERROR);
    }

    for stmt in &program {
        println!("{}", AstPrinter::print_stmt(stmt));
    }

    Ok(0)
}

fn report(outcome: &RunOutcome) {
    for e in outcome.errors() {
        debug!("Reporting: {}", e);
        eprintln!("{}", e);
    }
}

fn run_file(filename: PathBuf) -> Result<i32> {
    let source = read_file(filename)?;
    let mut session = Session::new();

    let outcome = session.run(&source);
    report(&outcome);

    info!("Run finished with exit code {}", outcome.exit_code());

    Ok(outcome.exit_code())
}

fn run_prompt() -> Result<i32> {
    let mut session = Session::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        // Errors are reported and the prompt keeps going.
        report(&session.run(&line));
    }

    println!();

    Ok(0)
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let code = match args.commands.unwrap_or(Commands::Repl) {
        Commands::Tokenize { filename, json } => tokenize(filename, json)?,
        Commands::Parse { filename } => parse_file(filename)?,
        Commands::Run { filename } => run_file(filename)?,
        Commands::Repl => run_prompt()?,
    };

    if code != 0 {
        debug!("Exiting with code {}", code);
        std::process::exit(code);
    }

    Ok(())
}
