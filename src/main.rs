#[macro_use]
extern crate log;
extern crate env_logger;

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use xmlrpc_proto::{Fault, GeneratorConfig, Response};

#[derive(Parser)]
#[command(name = "xrpc", version, about = "Inspect and produce XML-RPC methodResponse documents")]
struct Cli {
    /// Verbose mode
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a methodResponse read from FILE, or from stdin
    Decode { path: Option<PathBuf> },
    /// Print the fault methodResponse for CODE
    Fault {
        code: i32,
        /// Defaults to the built-in message for CODE
        message: Option<String>,
        #[arg(short, long, default_value = "UTF-8")]
        encoding: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Init logging to DEBUG only if user required it
    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let code = match cli.command {
        Commands::Decode { path } => decode(path),
        Commands::Fault {
            code,
            message,
            encoding,
        } => fault(code, message.as_deref().unwrap_or(""), &encoding),
    };
    process::exit(code);
}

fn read_input(path: Option<PathBuf>) -> io::Result<Vec<u8>> {
    match path {
        Some(path) => {
            debug!("Reading response from {}", path.display());
            fs::read(path)
        }
        None => {
            debug!("Reading response from stdin");
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn decode(path: Option<PathBuf>) -> i32 {
    let bytes = match read_input(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: {}", e);
            return 2;
        }
    };
    trace!("Read {} bytes", bytes.len());

    let mut response = Response::new();
    if response.load_bytes(&bytes) {
        if let Some(value) = response.return_value() {
            println!("{:#?}", value);
        }
        return 0;
    }
    match response.fault() {
        Some(fault) => eprintln!("{}", fault),
        None => eprintln!("error: response did not load"),
    }
    1
}

fn fault(code: i32, message: &str, encoding: &str) -> i32 {
    let config = GeneratorConfig::new(encoding);
    let xml = Fault::new(code, message).save_xml(&config);
    let mut stdout = io::stdout();
    let written = stdout
        .write_all(&config.charset().encode(&xml))
        .and_then(|_| stdout.write_all(b"\n"));
    match written {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {}", e);
            2
        }
    }
}
