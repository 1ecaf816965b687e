use crate::marker::marks::Marks;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, Write},
    path::Path,
};

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ReportOutput {
    Txt,
    #[default]
    Stdout,
}

/// Marks and feedback accumulated by one marking group.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct Report {
    topic: String,
    subtopic: String,
    total_marks: Marks,
    marks: Marks,
    feedback: Vec<String>,
}

impl Report {
    /// A fresh report holding only the banner line.
    pub fn new(topic: String, subtopic: String, total_marks: f64) -> Self {
        let banner = format!("\n----------------- Marking {topic} {subtopic} -----------------");
        Self {
            topic,
            subtopic,
            total_marks: Marks::new(total_marks),
            marks: Marks::ZERO,
            feedback: vec![banner],
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn subtopic(&self) -> &str {
        &self.subtopic
    }

    pub fn marks(&self) -> Marks {
        self.marks
    }

    pub fn total_marks(&self) -> Marks {
        self.total_marks
    }

    pub fn feedback(&self) -> &[String] {
        &self.feedback
    }

    pub(crate) fn push_line(&mut self, line: String) {
        self.feedback.push(line);
    }

    pub(crate) fn suffix_last_line(&mut self, suffix: &str) {
        match self.feedback.last_mut() {
            Some(line) => line.push_str(suffix),
            None => self.feedback.push(suffix.to_string()),
        }
    }

    pub(crate) fn add_marks(&mut self, weight: f64) {
        self.marks += weight;
    }

    pub(crate) fn summary_line(&self) -> String {
        format!(
            ">> Total marks for {} {}: {} out of {}",
            self.topic, self.subtopic, self.marks, self.total_marks
        )
    }

    pub fn write_feedback(&self, out: &mut dyn Write) -> io::Result<()> {
        for line in &self.feedback {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

/// Every report produced during a marking run, in the order the groups finished.
///
/// The caller creates it and owns it for the whole run; marking groups only append.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone)]
#[serde(transparent)]
pub struct RunReport {
    reports: Vec<Report>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, report: Report) {
        self.reports.push(report);
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn marks(&self) -> Marks {
        self.reports.iter().map(Report::marks).sum()
    }

    pub fn total_marks(&self) -> Marks {
        self.reports.iter().map(Report::total_marks).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;
        fs::write(path, json)
    }
}
