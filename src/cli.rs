use clap::{value_parser, Arg, ArgMatches, Command};

/// Command-line interface of the dashboard.
pub fn build_command() -> Command {
    Command::new("vitalwatch")
        .about("Replays recorded ventilator and patient-monitor logs as a live dashboard")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file (default: ./vitalwatch.toml when present)"),
        )
        .arg(
            Arg::new("waveform-file")
                .long("waveform-file")
                .value_name("FILE")
                .help("Headerless pressure/flow/volume recording"),
        )
        .arg(
            Arg::new("monitor-file")
                .long("monitor-file")
                .value_name("FILE")
                .help("Patient-monitor recording with a header row"),
        )
        .arg(
            Arg::new("poll-interval")
                .long("poll-interval")
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .help("Milliseconds between two reads of each recording"),
        )
        .arg(
            Arg::new("refresh-interval")
                .long("refresh-interval")
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .help("Milliseconds between two panel refreshes"),
        )
        .arg(
            Arg::new("rescan")
                .long("rescan")
                .help("Re-read each recording from the top on every poll")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("FILE")
                .help("Write logs to this file (also: VITALWATCH_LOG_FILE)"),
        )
        .arg(
            Arg::new("headless")
                .long("headless")
                .help("Replay without the dashboard, logging buffer summaries")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("summary-interval")
                .long("summary-interval")
                .value_name("SECS")
                .value_parser(value_parser!(u64))
                .default_value("5")
                .help("Seconds between two summaries in headless mode"),
        )
}

/// Parse command-line arguments
pub fn parse_args() -> ArgMatches {
    build_command().get_matches()
}
