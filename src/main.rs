use anyhow::Result;
use clap::Parser;
use cmake_probe::application::{Backend, ProbeAction, ProbeOptions};
use cmake_probe::config::ProbeConfig;
use cmake_probe::error::exit_code;
use cmake_probe::probe::CyclePolicy;
use std::path::PathBuf;
use std::process::ExitCode;

/// cmake-probe - describe installed CMake packages as JSON
///
/// Parameters are given as CMake-style definitions:
///
///   PACKAGE      package to find (required)
///   OUTPUT_FILE  where to write the JSON document (required)
///   VERSION      minimum version, applied when TARGET is set
///   COMPONENTS   ;-separated list of components
///   TARGET       imported target to resolve
///
/// Examples:
///   cmake-probe -D PACKAGE=OpenSSL -D OUTPUT_FILE=openssl.json
///   cmake-probe -D PACKAGE=OpenSSL -D TARGET=OpenSSL::SSL -D OUTPUT_FILE=ssl.json
#[derive(Parser, Debug)]
#[command(author, version = env!("CMAKE_PROBE_VERSION"), about)]
struct Cli {
    /// Parameter definition, NAME=VALUE (repeatable)
    #[arg(short = 'D', value_name = "NAME=VALUE")]
    definitions: Vec<String>,

    /// Read discovery results from a snapshot file instead of running cmake
    #[arg(long, value_name = "FILE")]
    registry: Option<PathBuf>,

    /// CMake program to run
    #[arg(
        long,
        env = "CMAKE_PROBE_CMAKE",
        value_name = "PATH",
        default_value = "cmake"
    )]
    cmake: PathBuf,

    /// Do not expand references to any unit already being resolved
    #[arg(long)]
    detect_cycles: bool,

    /// Show cmake's output
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> ProbeOptions {
        let backend = match &self.registry {
            Some(path) => Backend::Snapshot(path.clone()),
            None => Backend::CMake(self.cmake.clone()),
        };
        let cycle_policy = if self.detect_cycles {
            CyclePolicy::Ancestors
        } else {
            CyclePolicy::SelfOnly
        };

        ProbeOptions {
            backend,
            cycle_policy,
            verbose: self.verbose,
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = ProbeConfig::from_definitions(cli.definitions.as_slice())?;
    let runtime = cmake_probe::runtime::RealRuntime;
    ProbeAction::new(&runtime, cli.options()).run(&config)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err) as u8)
        }
    }
}
