use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{mpsc, Arc};
use termcolor::Color;
use threadpool::Builder;
use zupply::error::Error;
use zupply::log::{LogContext, LogLevel, Logger};

mod progress;
use progress::{verbs, Progress};

/// Log messages through a configured zupply logger
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Logging config file to load first
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name of the logger to log through
    #[arg(short, long, default_value = "zupply-cli")]
    logger: String,

    /// Level of the messages (trace, debug, info, warn, error, fatal)
    #[arg(long, default_value = "info")]
    level: String,

    /// How many times to log every message
    #[arg(long, default_value_t = 1)]
    repeat: usize,

    /// Number of worker threads logging at the same time
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Print the loggers and sinks after configuring
    #[arg(long)]
    dump: bool,

    /// Show diagnostics of the library itself
    #[arg(short, long)]
    verbose: bool,

    /// No status output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Messages to log
    #[arg(required = true)]
    messages: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }
    let mut progress = Progress::new(cli.quiet);
    match run(&cli, &mut progress) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = progress.print_status(verbs::FAILED, &e.current_context().to_string(), Color::Red);
            if cli.verbose {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, progress: &mut Progress) -> error_stack::Result<(), Error> {
    let level = cli.level.parse::<LogLevel>()?;
    let context = LogContext::global();
    if let Some(config) = &cli.config {
        context.config_from_file(config)?;
        let _ = progress.print_status(verbs::LOADED, &config.display().to_string(), Color::Green);
    }
    let logger = context.get_logger(&cli.logger)?;
    if cli.dump {
        eprint!("{}", context.dump());
    }
    let threads = cli.threads.max(1);
    let _ = progress.print_status(
        verbs::USING,
        &format!("logger `{}` with {} thread(s)", logger.name(), threads),
        Color::Yellow,
    );

    let messages = Arc::new(cli.messages.clone());
    let threadpool = Builder::new().num_threads(threads).build();
    let (send, recv) = mpsc::channel();
    for _ in 0..cli.repeat {
        let logger = Arc::clone(&logger);
        let messages = Arc::clone(&messages);
        let send = send.clone();
        progress.add_total(1);
        threadpool.execute(move || {
            log_all(&logger, level, &messages);
            let _ = send.send(());
        });
    }
    drop(send);

    while !progress.is_done() {
        if recv.recv().is_err() {
            break;
        }
        let _ = progress.add_done(1);
    }
    threadpool.join();
    context.flush()?;

    let _ = progress.print_status(
        verbs::DONE,
        &format!("{} message(s)", cli.repeat * cli.messages.len()),
        Color::Green,
    );
    Ok(())
}

fn log_all(logger: &Logger, level: LogLevel, messages: &[String]) {
    for message in messages {
        logger.log_if_enabled(level).write(message);
    }
}
