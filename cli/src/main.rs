mod report;

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sia_compiler::{compile, compile_to_json, Backend, RustBackend, RustOptions, SiaError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sia")]
#[command(about = "Compile Sia schemas to their JSON IR or to Rust code", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the Schema IR of a `.sia` file as JSON
    Ir {
        /// Input `.sia` file
        #[arg(short, long)]
        input: PathBuf,

        /// Output `.json` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate Rust structs and plugin traits from a `.sia` schema
    GenRust {
        /// Input `.sia` schema file
        #[arg(short, long)]
        input: PathBuf,

        /// Output `.rs` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Wrap the generated code in `pub mod <MODULE>`
        #[arg(long)]
        module: Option<String>,
    },

    /// List definitions, schema dependency order and array helpers
    Info {
        /// Input `.sia` schema file
        #[arg(short, long)]
        input: PathBuf,
    },
}

impl Commands {
    fn input(&self) -> &Path {
        match self {
            Commands::Ir { input, .. } | Commands::GenRust { input, .. } | Commands::Info { input } => input.as_path(),
        }
    }
}

fn write_output(output: Option<&Path>, text: &str) -> Result<(), SiaError> {
    match output {
        Some(path) => {
            fs::write(path, text)?;
            println!("Written to {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn run(command: &Commands, source: &str) -> Result<(), SiaError> {
    match command {
        Commands::Ir { output, .. } => {
            let json = compile_to_json(source)?;
            write_output(output.as_deref(), &json)
        }

        Commands::GenRust { output, module, .. } => {
            let definitions = compile(source)?;
            let options = RustOptions { module: module.clone() };
            let rust_code = RustBackend::new(&definitions, options).to_code()?;
            write_output(output.as_deref(), &rust_code)
        }

        Commands::Info { .. } => {
            let definitions = compile(source)?;
            println!("{}", report::describe(&definitions)?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let input = cli.command.input();

    let source = match fs::read_to_string(input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Cannot read {}: {}", input.display(), err);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli.command, &source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", report::render(&source, &input.display().to_string(), &err));
            ExitCode::FAILURE
        }
    }
}
