use chrono::Local;
use clap::ArgMatches;
use env_logger::{fmt::Formatter, Builder, Target};
use log::{LevelFilter, Record};
use std::io::{self, Write};

pub const LOG_FILE_ENV: &str = "VITALWATCH_LOG_FILE";

/// Multi-writer for logging to both file and stderr
struct DualWriter {
    file: std::fs::File,
    stderr: io::Stderr,
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        self.stderr.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.stderr.flush()?;
        Ok(())
    }
}

/// Pick the log destination for this run and install the logger.
///
/// The dashboard owns the terminal, so without a log file it logs nothing.
/// Headless runs always log to stderr, and to the file as well when one is
/// configured.
pub fn init_logging(matches: &ArgMatches) {
    let headless = matches.get_flag("headless");
    let log_file = resolve_log_file(matches.get_one::<String>("log-file").cloned());

    match log_file {
        Some(path) => {
            if let Err(err) = init_file_logger(&path, headless) {
                eprintln!("Failed to initialize file logger at '{path}': {err}");
                init_stderr_logger(headless);
            }
        }
        None => init_stderr_logger(headless),
    }
}

/// `--log-file`, then the environment, then a default in debug builds.
pub fn resolve_log_file(explicit: Option<String>) -> Option<String> {
    explicit
        .or_else(|| std::env::var(LOG_FILE_ENV).ok())
        .or_else(|| {
            #[cfg(debug_assertions)]
            {
                Some("./vitalwatch.log".to_string())
            }
            #[cfg(not(debug_assertions))]
            {
                None
            }
        })
}

fn format_record(buf: &mut Formatter, record: &Record) -> io::Result<()> {
    writeln!(
        buf,
        "{}:{} {} [{}] - {}",
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
        Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.level(),
        record.args()
    )
}

fn init_file_logger(path: &str, headless: bool) -> io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let target = if headless {
        Target::Pipe(Box::new(DualWriter {
            file,
            stderr: io::stderr(),
        }))
    } else {
        Target::Pipe(Box::new(file))
    };

    Builder::new()
        .format(format_record)
        .target(target)
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .init();

    log::info!("File logger initialized at {path}");

    Ok(())
}

fn init_stderr_logger(headless: bool) {
    let mut builder = Builder::new();
    builder.format(format_record).target(Target::Stderr);
    if headless {
        builder.filter_level(LevelFilter::Info).parse_default_env();
    } else {
        builder.filter_level(LevelFilter::Off);
    }
    builder.init();
}
