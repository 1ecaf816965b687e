use crate::{error::CheckError, sandbox::AppProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum View {
    Index,
    Detail,
    Admin,
    AdminLogin,
}

/// A named route such as `/polls/<int:question_id>/`.
#[derive(Debug, Clone)]
struct UrlPattern {
    name: String,
    route: &'static str,
    view: View,
}

fn param_name(segment: &str) -> Option<&str> {
    segment.strip_prefix("<int:")?.strip_suffix('>')
}

impl UrlPattern {
    fn new(name: String, route: &'static str, view: View) -> Self {
        Self { name, route, view }
    }

    fn params(&self) -> impl Iterator<Item = &str> {
        self.route.split('/').filter_map(param_name)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ResolverMatch {
    pub view: View,
    pub kwargs: Vec<(String, u64)>,
}

impl ResolverMatch {
    pub fn kwarg(&self, name: &str) -> Option<u64> {
        self.kwargs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UrlConf {
    patterns: Vec<UrlPattern>,
}

impl UrlConf {
    pub fn for_profile(profile: &AppProfile) -> Self {
        let qualify = |name: &str| match &profile.namespace {
            Some(namespace) => format!("{namespace}:{name}"),
            None => name.to_string(),
        };

        let mut patterns = vec![UrlPattern::new(qualify("index"), "/polls/", View::Index)];
        if profile.detail_view {
            patterns.push(UrlPattern::new(
                qualify("detail"),
                "/polls/<int:question_id>/",
                View::Detail,
            ));
        }
        if profile.admin {
            patterns.push(UrlPattern::new("admin:index".to_string(), "/admin/", View::Admin));
            patterns.push(UrlPattern::new(
                "admin:login".to_string(),
                "/admin/login/",
                View::AdminLogin,
            ));
        }
        Self { patterns }
    }

    pub fn reverse(&self, name: &str, kwargs: &[(&str, String)]) -> Result<String, CheckError> {
        let pattern = self
            .patterns
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| CheckError::no_reverse_match(name))?;

        let params: Vec<&str> = pattern.params().collect();
        let kwargs_match = params.len() == kwargs.len()
            && kwargs.iter().all(|(key, value)| {
                params.contains(key) && !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
            });
        if !kwargs_match {
            let given: Vec<String> = kwargs.iter().map(|(k, v)| format!("'{k}': {v}")).collect();
            return Err(CheckError::collaborator(format!(
                "Reverse for '{name}' with keyword arguments '{{{}}}' not found. 1 pattern(s) tried: ['{}']",
                given.join(", "),
                pattern.route
            )));
        }

        let path: Vec<&str> = pattern
            .route
            .split('/')
            .map(|segment| match param_name(segment) {
                Some(param) => kwargs
                    .iter()
                    .find(|(key, _)| *key == param)
                    .map_or("", |(_, value)| value.as_str()),
                None => segment,
            })
            .collect();
        Ok(path.join("/"))
    }

    /// Finds the view serving `path`, ignoring any query string.
    pub fn resolve(&self, path: &str) -> Option<ResolverMatch> {
        let path = path.split_once('?').map_or(path, |(path, _)| path);
        let segments: Vec<&str> = path.split('/').collect();

        'patterns: for pattern in &self.patterns {
            let route: Vec<&str> = pattern.route.split('/').collect();
            if route.len() != segments.len() {
                continue;
            }
            let mut kwargs = vec![];
            for (expected, obtained) in route.iter().zip(&segments) {
                match param_name(expected) {
                    Some(param) => match obtained.parse::<u64>() {
                        Ok(value) => kwargs.push((param.to_string(), value)),
                        Err(_) => continue 'patterns,
                    },
                    None if expected != obtained => continue 'patterns,
                    None => {}
                }
            }
            return Some(ResolverMatch {
                view: pattern.view,
                kwargs,
            });
        }
        None
    }
}
