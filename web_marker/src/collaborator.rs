//! This module provides the interface between the web application being marked and the
//! web_marker.
//!
//! The marker never knows how the application routes, renders or stores anything. It only
//! issues simulated requests through a `TestClient`, reverses route names through the
//! `WebApp`, and creates/counts records through its `Store`.

use crate::error::CheckError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Outcome of a simulated request.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Response {
    pub status_code: u16,
    /// Names of every template rendered while producing this response.
    pub templates: Vec<String>,
    /// `(url, status)` of every redirect that was followed, in order.
    pub redirect_chain: Vec<(String, u16)>,
}

impl Response {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            ..Default::default()
        }
    }

    pub fn with_template(mut self, template: &str) -> Self {
        self.templates.push(template.to_string());
        self
    }

    pub fn template_used(&self, template: &str) -> bool {
        self.templates.iter().any(|t| t == template)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub id: u64,
    pub question_id: u64,
    pub choice_text: String,
    pub votes: u32,
}

/// Issues simulated HTTP requests against the application.
pub trait TestClient {
    /// `GET path`. When `follow` is set, redirects are followed and the final response is
    /// returned with the chain recorded.
    fn get(&self, path: &str, follow: bool) -> Result<Response, CheckError>;
}

/// The data layer of the tutorial application: questions and the choices that refer to
/// them.
pub trait Store {
    fn create_question(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
    ) -> Result<Question, CheckError>;

    fn create_choice(
        &self,
        question: &Question,
        choice_text: &str,
        votes: u32,
    ) -> Result<Choice, CheckError>;

    fn count_questions(&self) -> Result<usize, CheckError>;

    fn count_choices(&self) -> Result<usize, CheckError>;
}

/// The application under test, as seen by the marker.
///
/// # Caveats
/// - State lives behind `&self`. The marker is single threaded and treats the application
///   as an external resource, so implementations are expected to use interior mutability.
/// - `reset` belongs to whoever drives the marking run. Marking groups and checks never
///   call it.
pub trait WebApp: Store + Debug {
    /// Hands out a fresh test client bound to this application.
    fn client(&self) -> Box<dyn TestClient + '_>;

    /// Resolves a (possibly namespaced) route name and its keyword arguments into a path.
    fn reverse(&self, name: &str, kwargs: &[(&str, String)]) -> Result<String, CheckError>;

    /// Drops every record so the next check starts from an empty database.
    fn reset(&self);
}
