use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use solir::verify::{Config, SolcCommand, Verifier};
use solir::Sources;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "solir")]
#[command(about = "Solidity source analyzer - AST, IR, ABI and bytecode verification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit the typed AST as JSON.
    Ast {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Emit the lowered contract IR, including detected standards.
    Ir {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Entry contract name; defaults to the last contract parsed.
        #[arg(long)]
        entry: Option<String>,
    },

    /// Emit the Solidity ABI for every contract in the file.
    Abi {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile the sources and compare against expected bytecode.
    Verify {
        input: PathBuf,

        /// Expected deployed bytecode, hex with or without 0x prefix.
        #[arg(long)]
        bytecode: String,

        /// Path to the solc binary.
        #[arg(long, default_value = "solc")]
        solc: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ast { input, output } => cmd_ast(input, output),
        Commands::Ir {
            input,
            output,
            entry,
        } => cmd_ir(input, output, entry),
        Commands::Abi { input, output } => cmd_abi(input, output),
        Commands::Verify {
            input,
            bytecode,
            solc,
        } => cmd_verify(input, bytecode, solc),
    }
}

fn read_sources(input: &PathBuf, entry: Option<String>) -> Result<Sources> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let mut sources = Sources::from_single(&input.to_string_lossy(), &content);
    sources.entry_contract = entry;
    Ok(sources)
}

fn write_output(output: Option<PathBuf>, json: String) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_ast(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let sources = read_sources(&input, None)?;
    let ast = solir::build::AstBuilder::new().build(&sources)?;
    for diagnostic in &ast.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    write_output(output, serde_json::to_string_pretty(&ast)?)
}

fn cmd_ir(input: PathBuf, output: Option<PathBuf>, entry: Option<String>) -> Result<()> {
    let sources = read_sources(&input, entry)?;
    let ast = solir::build::AstBuilder::new().build(&sources)?;
    let ir = solir::ir::lower(&ast);
    write_output(output, serde_json::to_string_pretty(&ir)?)
}

fn cmd_abi(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let sources = read_sources(&input, None)?;
    let ast = solir::build::AstBuilder::new().build(&sources)?;
    let ir = solir::ir::lower(&ast);
    let abis = solir::abi::emit(&ir);
    write_output(output, solir::abi::to_json(&abis)?)
}

fn cmd_verify(input: PathBuf, bytecode: String, solc: PathBuf) -> Result<()> {
    let sources = read_sources(&input, None)?;
    let expected = hex::decode(bytecode.trim_start_matches("0x"))
        .map_err(|e| anyhow!("invalid bytecode hex: {e}"))?;

    let config = Config {
        solc,
        ..Config::default()
    };
    let verifier = Verifier::new(config, sources, SolcCommand::new())?;
    let result = verifier.verify(&expected)?;

    if result.verified {
        println!("verified");
    } else {
        println!("mismatch");
        println!("{}", result.diff_pretty);
        std::process::exit(1);
    }
    Ok(())
}
