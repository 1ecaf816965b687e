mod assertions;
pub(crate) mod checks;
pub(crate) mod marks;

use crate::{
    collaborator::{TestClient, WebApp},
    error::CheckError,
    report::{Report, RunReport},
};
use log::{debug, info, warn};
use std::{
    fmt,
    io::{self, Write},
};

pub use assertions::{assert_equal, assert_status, assert_template_used};
pub use checks::CheckKind;

// Marking group -------------------------------------------------------------------

/// Everything a check body may touch: the report of its group, the group's test client
/// and the application under test.
pub struct GroupState<'a> {
    report: Report,
    client: Box<dyn TestClient + 'a>,
    app: &'a dyn WebApp,
}

impl<'a> GroupState<'a> {
    /// Appends the line that this check's outcome will be written after.
    pub fn describe(&mut self, line: impl Into<String>) {
        self.report.push_line(line.into());
    }

    /// Adds `weight` to the running total of the group.
    pub fn award(&mut self, weight: f64) {
        self.report.add_marks(weight);
    }

    pub fn client(&self) -> &dyn TestClient {
        self.client.as_ref()
    }

    pub fn app(&self) -> &'a dyn WebApp {
        self.app
    }

    pub fn report(&self) -> &Report {
        &self.report
    }
}

impl fmt::Debug for GroupState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupState")
            .field("report", &self.report)
            .field("app", &self.app)
            .finish_non_exhaustive()
    }
}

/// One topic/subtopic being marked.
///
/// `start` sets the report up and acquires a client; `finish` consumes the group, so it
/// runs exactly once.
#[derive(Debug)]
pub struct MarkingGroup<'a> {
    state: GroupState<'a>,
}

impl<'a> MarkingGroup<'a> {
    pub fn start(topic: &str, subtopic: &str, total_marks: f64, app: &'a dyn WebApp) -> Self {
        info!("📝 Marking {topic} {subtopic} ({total_marks} marks)");
        Self {
            state: GroupState {
                report: Report::new(topic.to_string(), subtopic.to_string(), total_marks),
                client: app.client(),
                app,
            },
        }
    }

    pub fn run_check(&mut self, check: &Check) -> CheckOutcome {
        collect_report(&mut self.state, check)
    }

    pub fn state(&self) -> &GroupState<'a> {
        &self.state
    }

    /// Closes the report with its summary line, stores it in `reports` and writes every
    /// feedback line to `out`.
    pub fn finish(self, out: &mut dyn Write, reports: &mut RunReport) -> io::Result<()> {
        let mut report = self.state.report;
        let summary = report.summary_line();
        report.push_line(summary);
        info!(
            "🏁 {} {}: {} out of {}",
            report.topic(),
            report.subtopic(),
            report.marks(),
            report.total_marks()
        );
        let written = report.write_feedback(out);
        reports.push(report);
        written
    }
}

// Checks ----------------------------------------------------------------------------

pub type CheckBody = Box<dyn Fn(&mut GroupState<'_>, f64) -> Result<(), CheckError>>;

/// A single verification worth `weight` marks.
///
/// The body is expected to describe itself first, then call the application, assert, and
/// finally award `weight` (its second argument) when everything held.
pub struct Check {
    name: String,
    weight: f64,
    body: CheckBody,
}

impl Check {
    pub fn new<F>(name: impl Into<String>, weight: f64, body: F) -> Self
    where
        F: Fn(&mut GroupState<'_>, f64) -> Result<(), CheckError> + 'static,
    {
        Self {
            name: name.into(),
            weight,
            body: Box::new(body),
        }
    }

    /// One of the built-in tutorial checks, worth `weight` or its default weight.
    pub fn from_kind(kind: CheckKind, weight: Option<f64>) -> Self {
        Self {
            name: kind.name().to_string(),
            weight: weight.unwrap_or_else(|| kind.default_weight()),
            body: kind.body(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum CheckOutcome {
    Passed,
    Failed(String),
}

/// Runs `check` against `state` and records exactly one outcome for it.
///
/// On success the last feedback line gets `OK`. On error it gets `FAILED` and the error is
/// appended on its own line. Marks are never touched here: whatever the body awarded
/// before failing stays awarded.
pub fn collect_report(state: &mut GroupState<'_>, check: &Check) -> CheckOutcome {
    info!("🚀 Executing check: '{}'", check.name);
    match (check.body)(state, check.weight) {
        Ok(()) => {
            state.report.suffix_last_line("OK");
            info!("✅ Check passed");
            CheckOutcome::Passed
        }
        Err(err) => {
            state.report.suffix_last_line("FAILED");
            state.report.push_line(format!("   Error: {err}"));
            info!("❌ Check not passed");
            debug!("💥 Error: '{err:?}'");
            CheckOutcome::Failed(err.to_string())
        }
    }
}

// Runner ----------------------------------------------------------------------------

/// Topic, subtopic, total marks and the ordered checks of one group.
#[derive(Debug)]
pub struct GroupPlan {
    topic: String,
    subtopic: String,
    total_marks: f64,
    checks: Vec<Check>,
}

impl GroupPlan {
    pub fn new(topic: impl Into<String>, subtopic: impl Into<String>, total_marks: f64) -> Self {
        Self {
            topic: topic.into(),
            subtopic: subtopic.into(),
            total_marks,
            checks: vec![],
        }
    }

    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub(crate) fn add_check(&mut self, check: Check) {
        self.checks.push(check);
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }
}

#[derive(Debug)]
pub struct MarkingConfig {
    title: String,
    groups: Vec<GroupPlan>,
}

impl MarkingConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            groups: vec![],
        }
    }

    pub fn with_group(mut self, group: GroupPlan) -> Self {
        self.groups.push(group);
        self
    }

    pub(crate) fn add_group(&mut self, group: GroupPlan) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[GroupPlan] {
        &self.groups
    }
}

/// Runs every group of a `MarkingConfig`, one after the other.
#[derive(Debug, Clone, Copy)]
pub struct Marker<'a> {
    config: &'a MarkingConfig,
}

impl<'a> Marker<'a> {
    pub fn new(config: &'a MarkingConfig) -> Self {
        Self { config }
    }

    /// Marks `app`, writing feedback to `out` and appending one report per group to
    /// `reports`.
    ///
    /// The application is reset before every check so each one starts from an empty
    /// database.
    pub fn run(
        &self,
        app: &dyn WebApp,
        out: &mut dyn Write,
        reports: &mut RunReport,
    ) -> io::Result<()> {
        info!("Running '{}'", self.config.title);
        for plan in &self.config.groups {
            let declared: f64 = plan.checks.iter().map(Check::weight).sum();
            if declared > plan.total_marks {
                warn!(
                    "checks of {} {} are worth {declared} but the group only has {} marks",
                    plan.topic, plan.subtopic, plan.total_marks
                );
            }

            let mut group = MarkingGroup::start(&plan.topic, &plan.subtopic, plan.total_marks, app);
            for check in &plan.checks {
                app.reset();
                group.run_check(check);
            }
            group.finish(out, reports)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{marker::marks::Marks, sandbox::PollsApp};

    fn passing(description: &'static str, weight: f64) -> Check {
        Check::new(description, weight, move |state, weight| {
            state.describe(format!(" - {description}..."));
            state.award(weight);
            Ok(())
        })
    }

    fn failing(description: &'static str, weight: f64) -> Check {
        Check::new(description, weight, move |state, _| {
            state.describe(format!(" - {description}..."));
            assert_equal(404u16, 200u16)?;
            unreachable!("the assertion above always fails")
        })
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn should_start_with_zero_marks_and_a_banner() {
            let app = PollsApp::default();
            let group = MarkingGroup::start("Tutorial", "(part 1)", 1.0, &app);
            let report = group.state().report();
            assert_eq!(report.marks(), Marks::ZERO);
            assert_eq!(report.feedback().len(), 1);
            assert!(report.feedback()[0].contains("Marking Tutorial (part 1)"));
        }

        #[test]
        fn should_not_write_anything_before_finishing() {
            let app = PollsApp::default();
            let mut out = Vec::new();
            let mut reports = RunReport::new();
            let mut group = MarkingGroup::start("Tutorial", "(part 1)", 1.0, &app);
            group.run_check(&passing("first", 1.0));
            assert!(out.is_empty());
            assert!(reports.is_empty());

            group.finish(&mut out, &mut reports).unwrap();
            assert!(!out.is_empty());
        }

        #[test]
        fn should_append_exactly_one_report_ending_with_the_summary() {
            let app = PollsApp::default();
            let mut out = Vec::new();
            let mut reports = RunReport::new();
            let mut group = MarkingGroup::start("Tutorial", "(part 2)", 1.5, &app);
            group.run_check(&passing("first", 0.5));
            group.finish(&mut out, &mut reports).unwrap();

            assert_eq!(reports.len(), 1);
            let report = &reports.reports()[0];
            assert_eq!(
                report.feedback().last().unwrap(),
                ">> Total marks for Tutorial (part 2): 0.5 out of 1.5"
            );

            let written = String::from_utf8(out).unwrap();
            let expected: String = report
                .feedback()
                .iter()
                .map(|line| format!("{line}\n"))
                .collect();
            assert_eq!(written, expected);
        }

        struct FullDisk;

        impl Write for FullDisk {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("disk full"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        #[test]
        fn should_keep_the_report_when_writing_feedback_fails() {
            let app = PollsApp::default();
            let mut reports = RunReport::new();
            let mut group = MarkingGroup::start("Tutorial", "(part 1)", 1.0, &app);
            group.run_check(&passing("first", 1.0));

            let result = group.finish(&mut FullDisk, &mut reports);
            assert_eq!(result.unwrap_err().to_string(), "disk full");
            assert_eq!(reports.len(), 1);
            assert_eq!(reports.reports()[0].marks(), Marks::new(1.0));
        }
    }

    mod collect_report_tests {
        use super::*;

        #[test_log::test]
        fn should_suffix_ok_and_award_the_weight_on_success() {
            let app = PollsApp::default();
            let mut group = MarkingGroup::start("Tutorial", "(part 1)", 1.0, &app);
            let outcome = group.run_check(&passing("index", 0.75));

            assert_eq!(outcome, CheckOutcome::Passed);
            let report = group.state().report();
            assert_eq!(report.feedback().last().unwrap(), " - index...OK");
            assert_eq!(report.marks(), Marks::new(0.75));
        }

        #[test_log::test]
        fn should_suffix_failed_and_append_the_error_on_failure() {
            let app = PollsApp::default();
            let mut group = MarkingGroup::start("Tutorial", "(part 1)", 1.0, &app);
            let outcome = group.run_check(&failing("index", 1.0));

            assert_eq!(outcome, CheckOutcome::Failed("404 != 200".to_string()));
            let feedback = group.state().report().feedback();
            assert_eq!(feedback.len(), 3);
            assert_eq!(feedback[1], " - index...FAILED");
            assert_eq!(feedback[2], "   Error: 404 != 200");
            assert_eq!(group.state().report().marks(), Marks::ZERO);
        }

        #[test]
        fn should_keep_marks_awarded_before_a_failure() {
            // Marks awarded before the failing assertion are not taken back.
            let app = PollsApp::default();
            let mut group = MarkingGroup::start("Tutorial", "(part 3)", 1.0, &app);
            let eager = Check::new("eager", 0.5, |state, weight| {
                state.describe(" - Eager check...");
                state.award(weight);
                assert_equal(1usize, 2usize)
            });
            let outcome = group.run_check(&eager);

            assert_eq!(outcome, CheckOutcome::Failed("1 != 2".to_string()));
            let report = group.state().report();
            assert_eq!(report.marks(), Marks::new(0.5));
            assert_eq!(report.feedback()[1], " - Eager check...FAILED");
        }

        #[test]
        fn should_suffix_the_banner_when_a_check_does_not_describe_itself() {
            let app = PollsApp::default();
            let mut group = MarkingGroup::start("Tutorial", "(part 1)", 1.0, &app);
            group.run_check(&Check::new("silent", 1.0, |_, _| Ok(())));
            let feedback = group.state().report().feedback();
            assert_eq!(feedback.len(), 1);
            assert!(feedback[0].ends_with("-----------------OK"));
        }
    }

    mod marker_tests {
        use super::*;

        #[test_log::test]
        fn should_mark_a_failing_and_a_passing_check() {
            let config = MarkingConfig::new("scenario").with_group(
                GroupPlan::new("Tutorial", "(part 2)", 1.5)
                    .with_check(failing("first", 0.5))
                    .with_check(passing("second", 1.0)),
            );
            let app = PollsApp::default();
            let mut out = Vec::new();
            let mut reports = RunReport::new();
            Marker::new(&config).run(&app, &mut out, &mut reports).unwrap();

            let report = &reports.reports()[0];
            assert_eq!(report.marks(), Marks::new(1.0));
            assert_eq!(
                report.feedback()[1..],
                [
                    " - first...FAILED".to_string(),
                    "   Error: 404 != 200".to_string(),
                    " - second...OK".to_string(),
                    ">> Total marks for Tutorial (part 2): 1.0 out of 1.5".to_string(),
                ]
            );
        }

        #[test]
        fn should_produce_one_report_per_group_in_order() {
            let config = MarkingConfig::new("two groups")
                .with_group(GroupPlan::new("Tutorial", "(part 1)", 1.0).with_check(passing("a", 1.0)))
                .with_group(GroupPlan::new("Tutorial", "(part 2)", 1.0).with_check(failing("b", 1.0)));
            let app = PollsApp::default();
            let mut out = Vec::new();
            let mut reports = RunReport::new();
            Marker::new(&config).run(&app, &mut out, &mut reports).unwrap();

            let subtopics: Vec<_> = reports.reports().iter().map(Report::subtopic).collect();
            assert_eq!(subtopics, ["(part 1)", "(part 2)"]);
            assert_eq!(reports.marks(), Marks::new(1.0));
            assert_eq!(reports.total_marks(), Marks::new(2.0));

            let written = String::from_utf8(out).unwrap();
            let part1 = written.find("Marking Tutorial (part 1)").unwrap();
            let part2 = written.find("Marking Tutorial (part 2)").unwrap();
            assert!(part1 < part2);
        }

        #[test_log::test]
        fn should_let_marks_exceed_the_total_of_the_group() {
            let config = MarkingConfig::new("generous").with_group(
                GroupPlan::new("Tutorial", "(part 1)", 1.0)
                    .with_check(passing("first", 1.0))
                    .with_check(passing("second", 1.0)),
            );
            let app = PollsApp::default();
            let mut out = Vec::new();
            let mut reports = RunReport::new();
            Marker::new(&config).run(&app, &mut out, &mut reports).unwrap();

            assert_eq!(reports.marks(), Marks::new(2.0));
            assert_eq!(reports.total_marks(), Marks::new(1.0));
            let written = String::from_utf8(out).unwrap();
            assert!(written.ends_with(">> Total marks for Tutorial (part 1): 2.0 out of 1.0\n"));
        }

        #[test]
        fn should_reset_the_application_before_every_check() {
            let count_questions = |expected: usize| {
                Check::new("count", 1.0, move |state, weight| {
                    state.describe(" - Fresh database...");
                    let app = state.app();
                    app.create_question("Test question", chrono::Utc::now())?;
                    assert_equal(app.count_questions()?, expected)?;
                    state.award(weight);
                    Ok(())
                })
            };
            let config = MarkingConfig::new("isolation").with_group(
                GroupPlan::new("Tutorial", "(part 2)", 2.0)
                    .with_check(count_questions(1))
                    .with_check(count_questions(1)),
            );
            let app = PollsApp::default();
            let mut reports = RunReport::new();
            Marker::new(&config)
                .run(&app, &mut io::sink(), &mut reports)
                .unwrap();
            assert_eq!(reports.marks(), Marks::new(2.0));
        }
    }
}
