use crate::report::ReportOutput;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ReportSection {
    output: ReportOutput,
    /// Where the feedback goes when `output` is `txt`.
    path: PathBuf,
    /// When set, the reports of the whole run are also exported there as JSON.
    json_path: Option<PathBuf>,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            output: ReportOutput::default(),
            path: PathBuf::from("marks.txt"),
            json_path: None,
        }
    }
}

impl ReportSection {
    pub fn new(output: ReportOutput, path: PathBuf, json_path: Option<PathBuf>) -> Self {
        Self {
            output,
            path,
            json_path,
        }
    }

    pub fn output(&self) -> ReportOutput {
        self.output
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn json_path(&self) -> Option<&Path> {
        self.json_path.as_deref()
    }
}
