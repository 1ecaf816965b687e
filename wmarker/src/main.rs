mod logger;

use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};
use web_marker::{
    GlobalConfig, LoggingMode, Marker, ReportOutput, RunReport,
    sandbox::{AppProfile, PollsApp},
};

/// Shape of the reference polls application to mark.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Profile {
    /// Every tutorial part, routes under the `polls` namespace.
    Complete,
    /// Every tutorial part, routes without a namespace.
    Flat,
    /// Only the index view.
    Part1,
    /// Index view, admin and models.
    Part2,
}

impl From<Profile> for AppProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Complete => AppProfile::complete(),
            Profile::Flat => AppProfile::flat(),
            Profile::Part1 => AppProfile::part1(),
            Profile::Part2 => AppProfile::part2(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "wmarker",
    version,
    about,
    long_about = "Mark the polls tutorial with the groups of CONFIGURATION_FILE (or the built-in tutorial marking when omitted)."
)]
struct Cli {
    configuration_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Profile::Complete)]
    profile: Profile,

    /// Disable logging, whatever the configuration says.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every collaborator call.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.configuration_file {
        Some(path) => web_marker::load_config(path)?,
        None => GlobalConfig::tutorial()?,
    };

    let logging_mode = if cli.quiet {
        LoggingMode::Silent
    } else if cli.verbose {
        LoggingMode::Verbose
    } else {
        config.logging_mode()
    };
    logger::init_logger(logging_mode)?;
    match &cli.configuration_file {
        Some(path) => debug!("Loaded configuration from {}", path.display()),
        None => debug!("Using the built-in tutorial configuration"),
    }

    let app = PollsApp::new(cli.profile.into());
    let marking = config.build_marking_config();
    let marker = Marker::new(&marking);
    let mut reports = RunReport::new();

    match config.report().output() {
        ReportOutput::Stdout => {
            let mut out = io::stdout().lock();
            marker.run(&app, &mut out, &mut reports)?;
            out.flush()?;
        }
        ReportOutput::Txt => {
            let path = config.report().path();
            let mut out = BufWriter::new(File::create(path)?);
            marker.run(&app, &mut out, &mut reports)?;
            out.flush()?;
            info!("Feedback written to {}", path.display());
        }
    }

    if let Some(json_path) = config.report().json_path() {
        reports.write_json(json_path)?;
        info!("Reports exported to {}", json_path.display());
    }

    info!(
        "Overall: {} out of {} ({} groups)",
        reports.marks(),
        reports.total_marks(),
        reports.len()
    );

    Ok(())
}
