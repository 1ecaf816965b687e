//! Marking harness for the polls web-framework tutorial.
//!
//! A marking run is a sequence of groups (one per tutorial part). Each group owns a
//! [`Report`], runs its checks against a [`WebApp`] through [`collect_report`], and on
//! finish prints its feedback and appends the report to the caller's [`RunReport`].

mod collaborator;
mod config;
mod error;
mod marker;
mod report;
pub mod sandbox;

pub use collaborator::{Choice, Question, Response, Store, TestClient, WebApp};
pub use config::{CheckSpec, GlobalConfig, load_config};
pub use config::{group_section::GroupSection, report_section::ReportSection};
pub use error::{CheckError, ConfigError};
pub use marker::marks::Marks;
pub use marker::{
    Check, CheckBody, CheckKind, CheckOutcome, GroupPlan, GroupState, Marker, MarkingConfig,
    MarkingGroup, assert_equal, assert_status, assert_template_used, collect_report,
};
pub use report::{Report, ReportOutput, RunReport};
use serde::Deserialize;
use serde::Serialize;

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum LoggingMode {
    Silent,
    #[default]
    Normal,
    Verbose,
}

impl LoggingMode {
    pub fn level_filter(&self) -> log::LevelFilter {
        match self {
            LoggingMode::Silent => log::LevelFilter::Off,
            LoggingMode::Normal => log::LevelFilter::Info,
            LoggingMode::Verbose => log::LevelFilter::Debug,
        }
    }
}
