//! An in-memory rendition of the polls tutorial application.
//!
//! It lets a marking configuration be tried out without a student submission: each
//! `AppProfile` describes how far along the tutorial the application got, so every check
//! can be seen both passing and failing.

mod urls;

use crate::{
    collaborator::{Choice, Question, Response, Store, TestClient, WebApp},
    error::CheckError,
};
use chrono::{DateTime, Utc};
use log::debug;
use std::cell::RefCell;
use urls::{UrlConf, View};

const MAX_REDIRECTS: usize = 20;

/// Which parts of the tutorial the application implements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppProfile {
    /// Application namespace of the polls routes (`polls:index`), if any.
    pub namespace: Option<String>,
    pub admin: bool,
    pub question_model: bool,
    pub choice_model: bool,
    pub detail_view: bool,
    /// Whether the detail view answers 404 for unknown questions instead of a bare page.
    pub detail_raises_404: bool,
    /// Template rendered by the index view. `None` means a plain text response.
    pub index_template: Option<String>,
}

impl AppProfile {
    /// Every part of the tutorial done, with namespaced routes.
    pub fn complete() -> Self {
        Self {
            namespace: Some("polls".to_string()),
            admin: true,
            question_model: true,
            choice_model: true,
            detail_view: true,
            detail_raises_404: true,
            index_template: Some("polls/index.html".to_string()),
        }
    }

    /// Like `complete`, without a routes namespace.
    pub fn flat() -> Self {
        Self {
            namespace: None,
            ..Self::complete()
        }
    }

    /// Only the first view of the tutorial.
    pub fn part1() -> Self {
        Self {
            namespace: None,
            admin: false,
            question_model: false,
            choice_model: false,
            detail_view: false,
            detail_raises_404: false,
            index_template: None,
        }
    }

    /// Models and admin in place, no templates nor detail view yet.
    pub fn part2() -> Self {
        Self {
            admin: true,
            question_model: true,
            choice_model: true,
            ..Self::part1()
        }
    }
}

impl Default for AppProfile {
    fn default() -> Self {
        Self::complete()
    }
}

#[derive(Debug, Default)]
struct Tables {
    questions: Vec<Question>,
    choices: Vec<Choice>,
    last_question_id: u64,
    last_choice_id: u64,
}

/// A served page, and where it redirects to when it does.
struct Served {
    response: Response,
    location: Option<String>,
}

impl Served {
    fn page(response: Response) -> Self {
        Self {
            response,
            location: None,
        }
    }

    fn redirect(status_code: u16, location: String) -> Self {
        Self {
            response: Response::new(status_code),
            location: Some(location),
        }
    }
}

#[derive(Debug)]
pub struct PollsApp {
    profile: AppProfile,
    urls: UrlConf,
    tables: RefCell<Tables>,
}

impl PollsApp {
    pub fn new(profile: AppProfile) -> Self {
        let urls = UrlConf::for_profile(&profile);
        Self {
            profile,
            urls,
            tables: RefCell::new(Tables::default()),
        }
    }

    fn require_model(&self, present: bool, model: &str) -> Result<(), CheckError> {
        if present {
            return Ok(());
        }
        Err(CheckError::collaborator(format!(
            "cannot import name '{model}' from 'polls.models'"
        )))
    }

    fn serve(&self, path: &str) -> Result<Served, CheckError> {
        debug!("GET {path}");
        let Some(found) = self.urls.resolve(path) else {
            // APPEND_SLASH
            if !path.ends_with('/') && !path.contains('?') {
                let slashed = format!("{path}/");
                if self.urls.resolve(&slashed).is_some() {
                    return Ok(Served::redirect(301, slashed));
                }
            }
            return Ok(Served::page(Response::new(404)));
        };

        let served = match found.view {
            View::Index => match &self.profile.index_template {
                Some(template) => {
                    self.require_model(self.profile.question_model, "Question")?;
                    Served::page(Response::new(200).with_template(template))
                }
                None => Served::page(Response::new(200)),
            },
            View::Detail => {
                self.require_model(self.profile.question_model, "Question")?;
                let Some(question_id) = found.kwarg("question_id") else {
                    return Err(CheckError::collaborator("detail() missing 'question_id'"));
                };
                let exists = self
                    .tables
                    .borrow()
                    .questions
                    .iter()
                    .any(|q| q.id == question_id);
                if exists {
                    Served::page(Response::new(200).with_template("polls/detail.html"))
                } else if self.profile.detail_raises_404 {
                    Served::page(Response::new(404))
                } else {
                    Served::page(Response::new(200))
                }
            }
            View::Admin => Served::redirect(302, "/admin/login/?next=/admin/".to_string()),
            View::AdminLogin => Served::page(Response::new(200).with_template("admin/login.html")),
        };
        Ok(served)
    }
}

impl Default for PollsApp {
    fn default() -> Self {
        Self::new(AppProfile::default())
    }
}

impl Store for PollsApp {
    fn create_question(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
    ) -> Result<Question, CheckError> {
        self.require_model(self.profile.question_model, "Question")?;
        let mut tables = self.tables.borrow_mut();
        tables.last_question_id += 1;
        let question = Question {
            id: tables.last_question_id,
            question_text: question_text.to_string(),
            pub_date,
        };
        tables.questions.push(question.clone());
        Ok(question)
    }

    fn create_choice(
        &self,
        question: &Question,
        choice_text: &str,
        votes: u32,
    ) -> Result<Choice, CheckError> {
        self.require_model(self.profile.choice_model, "Choice")?;
        let mut tables = self.tables.borrow_mut();
        if !tables.questions.iter().any(|q| q.id == question.id) {
            return Err(CheckError::collaborator("FOREIGN KEY constraint failed"));
        }
        tables.last_choice_id += 1;
        let choice = Choice {
            id: tables.last_choice_id,
            question_id: question.id,
            choice_text: choice_text.to_string(),
            votes,
        };
        tables.choices.push(choice.clone());
        Ok(choice)
    }

    fn count_questions(&self) -> Result<usize, CheckError> {
        self.require_model(self.profile.question_model, "Question")?;
        Ok(self.tables.borrow().questions.len())
    }

    fn count_choices(&self) -> Result<usize, CheckError> {
        self.require_model(self.profile.choice_model, "Choice")?;
        Ok(self.tables.borrow().choices.len())
    }
}

impl WebApp for PollsApp {
    fn client(&self) -> Box<dyn TestClient + '_> {
        Box::new(SandboxClient { app: self })
    }

    fn reverse(&self, name: &str, kwargs: &[(&str, String)]) -> Result<String, CheckError> {
        self.urls.reverse(name, kwargs)
    }

    fn reset(&self) {
        debug!("Flushing the database");
        *self.tables.borrow_mut() = Tables::default();
    }
}

struct SandboxClient<'a> {
    app: &'a PollsApp,
}

impl TestClient for SandboxClient<'_> {
    fn get(&self, path: &str, follow: bool) -> Result<Response, CheckError> {
        let mut served = self.app.serve(path)?;
        let mut chain = vec![];
        while follow {
            let Some(location) = served.location.take() else {
                break;
            };
            chain.push((location.clone(), served.response.status_code));
            if chain.len() > MAX_REDIRECTS {
                return Err(CheckError::collaborator("Redirect loop detected."));
            }
            served = self.app.serve(&location)?;
        }
        let mut response = served.response;
        response.redirect_chain = chain;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod client_tests {
        use super::*;

        #[test]
        fn should_follow_the_admin_redirect_to_the_login_page() {
            let app = PollsApp::new(AppProfile::complete());
            let client = app.client();

            let response = client.get("/admin/", false).unwrap();
            assert_eq!(response.status_code, 302);
            assert!(response.redirect_chain.is_empty());

            let response = client.get("/admin/", true).unwrap();
            assert_eq!(response.status_code, 200);
            assert!(response.template_used("admin/login.html"));
            assert_eq!(
                response.redirect_chain,
                vec![("/admin/login/?next=/admin/".to_string(), 302)]
            );
        }

        #[test]
        fn should_append_a_missing_slash() {
            let app = PollsApp::new(AppProfile::flat());
            let client = app.client();
            assert_eq!(client.get("/polls", false).unwrap().status_code, 301);
            let response = client.get("/polls", true).unwrap();
            assert_eq!(response.status_code, 200);
            assert_eq!(response.redirect_chain, vec![("/polls/".to_string(), 301)]);
        }

        #[test]
        fn should_answer_404_for_unknown_paths() {
            let app = PollsApp::new(AppProfile::part1());
            let client = app.client();
            assert_eq!(client.get("/admin/", true).unwrap().status_code, 404);
            assert_eq!(client.get("/polls/1/", true).unwrap().status_code, 404);
        }

        #[test]
        fn should_render_the_detail_of_existing_questions_only() {
            let app = PollsApp::new(AppProfile::complete());
            let question = app.create_question("Test question", Utc::now()).unwrap();
            let client = app.client();

            let response = client.get(&format!("/polls/{}/", question.id), true).unwrap();
            assert_eq!(response.status_code, 200);
            assert!(response.template_used("polls/detail.html"));

            assert_eq!(client.get("/polls/17/", true).unwrap().status_code, 404);
        }

        #[test]
        fn should_serve_a_bare_detail_page_when_not_raising_404() {
            let app = PollsApp::new(AppProfile {
                detail_raises_404: false,
                ..AppProfile::flat()
            });
            let response = app.client().get("/polls/17/", true).unwrap();
            assert_eq!(response.status_code, 200);
            assert!(response.templates.is_empty());
        }
    }

    mod store_tests {
        use super::*;

        #[test]
        fn should_assign_increasing_ids_and_count_records() {
            let app = PollsApp::default();
            let q1 = app.create_question("first", Utc::now()).unwrap();
            let q2 = app.create_question("second", Utc::now()).unwrap();
            assert_eq!((q1.id, q2.id), (1, 2));

            let choice = app.create_choice(&q2, "yes", 3).unwrap();
            assert_eq!(choice.question_id, q2.id);
            assert_eq!(choice.votes, 3);
            assert_eq!(app.count_questions(), Ok(2));
            assert_eq!(app.count_choices(), Ok(1));
        }

        #[test]
        fn should_enforce_the_question_foreign_key() {
            let app = PollsApp::default();
            let orphan = Question {
                id: 99,
                question_text: "orphan".to_string(),
                pub_date: Utc::now(),
            };
            assert_eq!(
                app.create_choice(&orphan, "no", 0),
                Err(CheckError::collaborator("FOREIGN KEY constraint failed"))
            );
        }

        #[test]
        fn should_fail_on_missing_models() {
            let app = PollsApp::new(AppProfile::part1());
            let expected = Err(CheckError::collaborator(
                "cannot import name 'Question' from 'polls.models'",
            ));
            assert_eq!(app.create_question("q", Utc::now()), expected);
            assert_eq!(
                app.count_choices(),
                Err(CheckError::collaborator(
                    "cannot import name 'Choice' from 'polls.models'"
                ))
            );
        }

        #[test]
        fn should_flush_everything_on_reset() {
            let app = PollsApp::default();
            let question = app.create_question("q", Utc::now()).unwrap();
            app.create_choice(&question, "c", 0).unwrap();
            app.reset();
            assert_eq!(app.count_questions(), Ok(0));
            assert_eq!(app.count_choices(), Ok(0));
            assert_eq!(app.create_question("q", Utc::now()).unwrap().id, 1);
        }
    }
}
