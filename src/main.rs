use colored::Colorize;
use env_logger::{Builder, Env, Target};
use is_terminal::IsTerminal;
use log::{error, info};
use clap::Parser;
use rfsub::{build_request, diff_style, Cli, ColorChoice, Config, DiffRenderer, Result, RfsubError};
use std::fs;
use std::io;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = setup_logging(&cli) {
        eprintln!("{} {e}", "error:".red().bold());
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.log.is_some() {
                error!("{e}");
            }
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let start_time = Instant::now();
    let config = Config::load(cli.config.as_deref())?;
    let request = build_request(cli, &config)?;

    let color = cli.color.unwrap_or(config.display.color);
    let stdout = io::stdout();
    let style = diff_style(color, stdout.is_terminal());
    if color == ColorChoice::Always {
        colored::control::set_override(true);
    }

    info!(
        "rewriting {:?} -> {:?} over {} path(s), mode {:?}",
        request.match_pattern(),
        request.replace_pattern(),
        request.paths().len(),
        request.output_mode()
    );
    rfsub::run(&request, DiffRenderer::new(style), stdout.lock())?;

    info!(
        "Application finished. Total elapsed time: {:.2?}",
        start_time.elapsed()
    );
    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let default_level = if cli.debug { "debug" } else { "warn" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir).map_err(RfsubError::Io)?;
            }
        }
        let log_file = fs::File::create(log_path).map_err(RfsubError::Io)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| RfsubError::Config(e.to_string()))?;
    Ok(())
}
