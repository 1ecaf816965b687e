use crate::{
    LoggingMode,
    config::{group_section::GroupSection, report_section::ReportSection},
    error::ConfigError,
    marker::{CheckKind, MarkingConfig},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path};

pub(crate) mod group_section;
pub(crate) mod report_section;

pub use group_section::CheckSpec;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
struct GlobalConfigUnchecked {
    title: String,
    #[serde(default)]
    logging_mode: LoggingMode,
    #[serde(default)]
    report: ReportSection,
    groups: Vec<GroupSection>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(try_from = "GlobalConfigUnchecked")]
pub struct GlobalConfig {
    title: String,
    logging_mode: LoggingMode,
    report: ReportSection,
    groups: Vec<GroupSection>,
}

impl GlobalConfig {
    pub fn build(
        title: String,
        logging_mode: LoggingMode,
        report: ReportSection,
        groups: Vec<GroupSection>,
    ) -> Result<Self, &'static str> {
        if groups.is_empty() {
            return Err("at least one marking group is expected");
        }

        let mut seen = HashSet::new();
        for g in &groups {
            if !seen.insert((g.topic(), g.subtopic())) {
                return Err("duplicated group: topic and subtopic must be unique");
            }
        }

        Ok(Self {
            title,
            logging_mode,
            report,
            groups,
        })
    }

    /// The three parts of the polls tutorial, each check worth its default weight.
    pub fn tutorial() -> Result<Self, ConfigError> {
        let part = |subtopic: &str, kinds: &[CheckKind]| {
            let checks: Vec<CheckSpec> = kinds.iter().copied().map(CheckSpec::OnlyKind).collect();
            let total_marks = checks.iter().map(CheckSpec::weight).sum();
            GroupSection::build("Tutorial".to_string(), subtopic.to_string(), total_marks, checks)
        };
        let groups = [
            part("(part 1)", &[CheckKind::IndexView]),
            part(
                "(part 2)",
                &[
                    CheckKind::AdminView,
                    CheckKind::QuestionModel,
                    CheckKind::ChoiceModel,
                ],
            ),
            part(
                "(part 3)",
                &[
                    CheckKind::DetailView,
                    CheckKind::IndexTemplate,
                    CheckKind::Detail404,
                ],
            ),
        ];

        let groups = groups
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .map_err(ConfigError::Invalid)?;

        GlobalConfig::build(
            "Polls tutorial".to_string(),
            LoggingMode::default(),
            ReportSection::default(),
            groups,
        )
        .map_err(ConfigError::Invalid)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn logging_mode(&self) -> LoggingMode {
        self.logging_mode
    }

    pub fn report(&self) -> &ReportSection {
        &self.report
    }

    pub fn groups(&self) -> &[GroupSection] {
        &self.groups
    }

    pub fn build_marking_config(&self) -> MarkingConfig {
        let mut c = MarkingConfig::new(self.title.clone());

        for g in &self.groups {
            c.add_group(g.build_group_plan());
        }

        c
    }
}

impl TryFrom<GlobalConfigUnchecked> for GlobalConfig {
    type Error = &'static str;

    fn try_from(value: GlobalConfigUnchecked) -> Result<Self, Self::Error> {
        let GlobalConfigUnchecked {
            title,
            logging_mode,
            report,
            groups,
        } = value;

        GlobalConfig::build(title, logging_mode, report, groups)
    }
}

/// Reads and validates a JSON marking configuration.
pub fn load_config(path: &Path) -> Result<GlobalConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let unchecked: GlobalConfigUnchecked = serde_json::from_str(&content)?;
    GlobalConfig::try_from(unchecked).map_err(ConfigError::Invalid)
}
