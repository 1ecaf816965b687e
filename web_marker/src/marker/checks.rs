//! The checks of the polls tutorial, one per sub-feature.

use crate::{
    collaborator::Response,
    error::CheckError,
    marker::{
        CheckBody, GroupState,
        assertions::{assert_equal, assert_status, assert_template_used},
    },
};
use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};

/// Built-in tutorial checks that a configuration may refer to by name.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    IndexView,
    AdminView,
    QuestionModel,
    ChoiceModel,
    DetailView,
    IndexTemplate,
    #[serde(rename = "detail_404")]
    Detail404,
}

impl CheckKind {
    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::IndexView => "index_view",
            CheckKind::AdminView => "admin_view",
            CheckKind::QuestionModel => "question_model",
            CheckKind::ChoiceModel => "choice_model",
            CheckKind::DetailView => "detail_view",
            CheckKind::IndexTemplate => "index_template",
            CheckKind::Detail404 => "detail_404",
        }
    }

    pub fn default_weight(&self) -> f64 {
        match self {
            CheckKind::IndexView => 1.0,
            CheckKind::AdminView
            | CheckKind::QuestionModel
            | CheckKind::ChoiceModel
            | CheckKind::DetailView
            | CheckKind::IndexTemplate
            | CheckKind::Detail404 => 0.5,
        }
    }

    pub(crate) fn body(&self) -> CheckBody {
        match self {
            CheckKind::IndexView => Box::new(index_view),
            CheckKind::AdminView => Box::new(admin_view),
            CheckKind::QuestionModel => Box::new(question_model),
            CheckKind::ChoiceModel => Box::new(choice_model),
            CheckKind::DetailView => Box::new(detail_view),
            CheckKind::IndexTemplate => Box::new(index_template),
            CheckKind::Detail404 => Box::new(detail_404),
        }
    }
}

const INVALID_QUESTION_ID: u64 = 17;

/// Tries `attempt` with `primary`, and once more with `fallback` if that failed.
///
/// Students may or may not namespace their routes, so both spellings are accepted.
fn with_fallback<T>(
    primary: &str,
    fallback: &str,
    mut attempt: impl FnMut(&str) -> Result<T, CheckError>,
) -> Result<T, CheckError> {
    attempt(primary).or_else(|err| {
        debug!("'{primary}' failed ({err}), trying '{fallback}'");
        attempt(fallback)
    })
}

fn get_index(state: &GroupState<'_>) -> Result<Response, CheckError> {
    with_fallback("index", "polls:index", |name| {
        let url = state.app().reverse(name, &[])?;
        state.client().get(&url, true)
    })
}

fn index_view(state: &mut GroupState<'_>, weight: f64) -> Result<(), CheckError> {
    state.describe(" - View function with 'index' name created and returning '200 OK' response...");
    let response = get_index(state)?;
    assert_status(&response, 200)?;
    state.award(weight);
    Ok(())
}

fn admin_view(state: &mut GroupState<'_>, weight: f64) -> Result<(), CheckError> {
    state.describe(" - Admin page included and returning 200 response...");
    let response = state.client().get("/admin/", true)?;
    assert_status(&response, 200)?;
    state.award(weight);
    Ok(())
}

fn question_model(state: &mut GroupState<'_>, weight: f64) -> Result<(), CheckError> {
    state.describe(" - Question model created...");
    let app = state.app();
    app.create_question("Test question", Utc::now())?;
    assert_equal(app.count_questions()?, 1)?;
    state.award(weight);
    Ok(())
}

fn choice_model(state: &mut GroupState<'_>, weight: f64) -> Result<(), CheckError> {
    state.describe(" - Choice model created...");
    let app = state.app();
    let question = app.create_question("Test question", Utc::now())?;
    app.create_choice(&question, "Test choice", 0)?;
    assert_equal(app.count_choices()?, 1)?;
    state.award(weight);
    Ok(())
}

fn detail_view(state: &mut GroupState<'_>, weight: f64) -> Result<(), CheckError> {
    state.describe(" - Detail view created and returning 200 response...");
    let question = state.app().create_question("Test question", Utc::now())?;
    let response = with_fallback("detail", "polls:detail", |name| {
        let url = state
            .app()
            .reverse(name, &[("question_id", question.id.to_string())])?;
        state.client().get(&url, true)
    })?;
    assert_status(&response, 200)?;
    state.award(weight);
    Ok(())
}

fn index_template(state: &mut GroupState<'_>, weight: f64) -> Result<(), CheckError> {
    state.describe(" - Index view using index.html template...");
    let response = get_index(state)?;
    assert_template_used(&response, "polls/index.html")?;
    state.award(weight);
    Ok(())
}

fn detail_404(state: &mut GroupState<'_>, weight: f64) -> Result<(), CheckError> {
    state.describe(" - Detail view raises 404 on invalid question id...");
    let kwargs = [("question_id", INVALID_QUESTION_ID.to_string())];
    let url = with_fallback("detail", "polls:detail", |name| {
        state.app().reverse(name, &kwargs)
    })?;
    let response = state.client().get(&url, true)?;
    assert_status(&response, 404)?;
    state.award(weight);
    Ok(())
}
