use brfucky::{cli_util::print_engine_error, logging, Config, Engine, UnmatchedOpenPolicy};
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;

const PROGRAM: &str = "brfucky";

fn print_usage() {
    println!(
        r#"Usage: {0} [OPTIONS]...
    -i, --input [CODE]           Run CODE; without CODE, read the program from stdin (pipes) or by typing
    -h, --help                   Print this help menu
    -V, --version                Print the version

Engine options:
        --tape-size <N>          Number of tape cells (default 512)
        --unmatched-open <MODE>  What an unmatched '[' does: error (default) or halt
        --config <PATH>          Read settings from PATH instead of ~/.config/{0}.toml
        --verbose                Log interpreter activity to stderr

Environment:
    BRFUCKY_TAPE_SIZE, BRFUCKY_UNMATCHED_OPEN override the config file.
    RUST_LOG overrides --verbose.
"#,
        PROGRAM
    );
    let _ = io::stdout().flush();
}

#[derive(Parser, Debug)]
#[command(name = "brfucky", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Program text; read from stdin when the flag has no value
    #[arg(short = 'i', long = "input", value_name = "CODE", num_args = 0..=1)]
    input: Option<Option<String>>,

    /// Number of tape cells
    #[arg(long = "tape-size", value_name = "N", value_parser = parse_tape_size)]
    tape_size: Option<usize>,

    /// What an unmatched '[' does: error or halt
    #[arg(long = "unmatched-open", value_name = "MODE")]
    unmatched_open: Option<UnmatchedOpenPolicy>,

    /// Config file path
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log interpreter activity to stderr
    #[arg(long = "verbose")]
    verbose: bool,

    /// Print the version
    #[arg(short = 'V', long = "version", action = clap::ArgAction::SetTrue)]
    version: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,
}

fn parse_tape_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("tape size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn read_stdin() -> io::Result<String> {
    let mut buf = Vec::new();
    io::stdin().lock().read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn run(cli: Cli) -> i32 {
    let source = match cli.input {
        Some(Some(code)) => code,
        Some(None) => match read_stdin() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{PROGRAM}: failed reading stdin: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        },
        None => {
            debug!("no program given; nothing to run");
            return 0;
        }
    };

    // Resolve settings: file -> env -> flags
    let mut cfg = Config::load(cli.config.as_deref());
    if let Some(n) = cli.tape_size {
        cfg.tape_size = n;
    }
    if let Some(policy) = cli.unmatched_open {
        cfg.unmatched_open = policy;
    }
    debug!(?cfg, "resolved configuration");

    let mut engine =
        Engine::with_tape_size(&source, cfg.tape_size).unmatched_open(cfg.unmatched_open);
    match engine.run() {
        Ok(()) => 0,
        Err(err) => {
            print_engine_error(Some(PROGRAM), &source, &err);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.help {
        print_usage();
        std::process::exit(0);
    }

    if cli.version {
        println!("{PROGRAM} {}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    logging::init(cli.verbose);

    // The engine writes through the shared stdout handle, so this flush
    // delivers every byte the program has output so far.
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(130);
    }) {
        eprintln!("{PROGRAM}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        std::process::exit(1);
    }

    std::process::exit(run(cli));
}
