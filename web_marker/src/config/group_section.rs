use crate::marker::{Check, CheckKind, GroupPlan};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(untagged, deny_unknown_fields)]
pub enum CheckSpec {
    /// Built-in check worth its default weight.
    OnlyKind(CheckKind),
    Complete {
        kind: CheckKind,
        #[serde(default)]
        weight: Option<f64>,
    },
}

impl CheckSpec {
    pub fn kind(&self) -> CheckKind {
        match self {
            CheckSpec::OnlyKind(kind) => *kind,
            CheckSpec::Complete { kind, .. } => *kind,
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            CheckSpec::OnlyKind(kind) => kind.default_weight(),
            CheckSpec::Complete { kind, weight } => weight.unwrap_or_else(|| kind.default_weight()),
        }
    }

    fn build_check(&self) -> Check {
        Check::from_kind(self.kind(), Some(self.weight()))
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
struct GroupSectionUnchecked {
    topic: String,
    subtopic: String,
    total_marks: f64,
    checks: Vec<CheckSpec>,
}

/// One marking group: what it is called, what it is worth and which checks it runs, in
/// order.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(try_from = "GroupSectionUnchecked")]
pub struct GroupSection {
    topic: String,
    subtopic: String,
    total_marks: f64,
    checks: Vec<CheckSpec>,
}

impl GroupSection {
    pub fn build(
        topic: String,
        subtopic: String,
        total_marks: f64,
        checks: Vec<CheckSpec>,
    ) -> Result<Self, &'static str> {
        if checks.is_empty() {
            return Err("at least one check is expected in every group");
        }
        if !total_marks.is_finite() || total_marks < 0.0 {
            return Err("total_marks must be a non-negative number");
        }
        if checks
            .iter()
            .any(|c| !c.weight().is_finite() || c.weight() <= 0.0)
        {
            return Err("check weights must be positive numbers");
        }

        Ok(Self {
            topic,
            subtopic,
            total_marks,
            checks,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn subtopic(&self) -> &str {
        &self.subtopic
    }

    pub fn total_marks(&self) -> f64 {
        self.total_marks
    }

    pub fn checks(&self) -> &[CheckSpec] {
        &self.checks
    }

    pub fn build_group_plan(&self) -> GroupPlan {
        let mut plan = GroupPlan::new(self.topic.clone(), self.subtopic.clone(), self.total_marks);
        for check in &self.checks {
            plan.add_check(check.build_check());
        }
        plan
    }
}

impl TryFrom<GroupSectionUnchecked> for GroupSection {
    type Error = &'static str;

    fn try_from(value: GroupSectionUnchecked) -> Result<Self, Self::Error> {
        let GroupSectionUnchecked {
            topic,
            subtopic,
            total_marks,
            checks,
        } = value;

        GroupSection::build(topic, subtopic, total_marks, checks)
    }
}
