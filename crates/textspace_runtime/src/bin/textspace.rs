//! Textspace CLI entry point.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use textspace_runtime::repl::lock;
use textspace_runtime::{serialize, Repl, RuntimeConfig, ScriptLibrary, Session};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// CLI configuration parsed from arguments.
struct CliConfig {
    config: PathBuf,
    user: String,
    admin: bool,
    files: Vec<PathBuf>,
    batch_mode: bool,
    log: Option<String>,
    import: Option<PathBuf>,
    export: Option<PathBuf>,
    show_help: bool,
    show_version: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            config: PathBuf::from("textspace.toml"),
            user: "player".to_string(),
            admin: false,
            files: Vec::new(),
            batch_mode: false,
            log: None,
            import: None,
            export: None,
            show_help: false,
            show_version: false,
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();
    let mut args = args.into_iter().skip(1);

    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| format!("{name} requires a value"))
        };
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "--admin" => config.admin = true,
            "-c" | "--config" => config.config = PathBuf::from(value("--config")?),
            "-u" | "--user" => config.user = value("--user")?,
            "--log" => config.log = Some(value("--log")?),
            "--import" => config.import = Some(PathBuf::from(value("--import")?)),
            "--export" => config.export = Some(PathBuf::from(value("--export")?)),
            other if other.starts_with('-') => {
                return Err(format!("unknown option: {other}").into());
            }
            path => config.files.push(PathBuf::from(path)),
        }
    }

    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cli = parse_args(args)?;

    if cli.show_help {
        print_help();
        return Ok(());
    }

    if cli.show_version {
        println!("textspace {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = RuntimeConfig::load(&cli.config)?;
    let level = cli.log.clone().unwrap_or_else(|| config.log.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
    info!(path = %cli.config.display(), "configuration loaded");

    let mut session = Session::new(&config).inspect_err(|e| error!(error = %e, "bad world"))?;
    if let Some(path) = &cli.import {
        serialize::load_from_file(path)?.install(session.engine_mut());
    }
    if cli.admin {
        session.grant_admin(&cli.user);
    }
    session.connect(&cli.user);
    let session = Arc::new(Mutex::new(session));

    let mut repl = Repl::new(Arc::clone(&session), &cli.user)?
        .with_tick_interval(config.engine.tick_interval());
    for file in &cli.files {
        let text = fs::read_to_string(file)
            .map_err(|e| format!("failed to read '{}': {e}", file.display()))?;
        for line in repl.run_batch(text.lines())? {
            println!("{line}");
        }
    }

    if !cli.batch_mode {
        if !cli.files.is_empty() {
            repl = repl.without_banner();
        }
        repl.run()?;
    }

    if let Some(path) = &cli.export {
        let library = ScriptLibrary::from_engine(lock(&session)?.engine());
        serialize::save_to_file(&library, path)?;
        info!(path = %path.display(), scripts = library.scripts.len(), "script library exported");
    }
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mTextspace\x1b[0m - Multi-user text environment with scripted bots

\x1b[1mUSAGE:\x1b[0m
    textspace [OPTIONS] [FILES...]

\x1b[1mARGUMENTS:\x1b[0m
    [FILES...]    Command files to run before starting the REPL

\x1b[1mOPTIONS:\x1b[0m
    -h, --help            Print help information
    -V, --version         Print version information
    -b, --batch           Run files and exit (no REPL)
    -c, --config PATH     World configuration (default: textspace.toml)
    -u, --user NAME       Connect as NAME (default: player)
    --admin               Grant admin commands to the local user
    --log FILTER          Log filter, overriding the config (RUST_LOG wins)
    --import PATH         Install a script library before connecting
    --export PATH         Write the loaded scripts to a library on exit

\x1b[1mEXAMPLES:\x1b[0m
    textspace                          Start interactive REPL
    textspace -u alice --admin         Connect as alice with admin commands
    textspace -b tour.txt              Run tour.txt and exit
    textspace --export lib.msgpack -b  Export configured scripts

\x1b[1mIN THE REPL:\x1b[0m
    help [command]       List commands or show usage
    Tab                  Complete commands, names and items
    Ctrl+D               Leave
    Ctrl+C               Cancel current input"
    );
}
