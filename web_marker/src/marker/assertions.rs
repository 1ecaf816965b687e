//! Expectations used inside check bodies.
//!
//! Each helper either returns `Ok(())` or a `CheckError::Assertion` whose message is what
//! ends up on the `Error:` line of the feedback.

use crate::{collaborator::Response, error::CheckError};
use log::debug;
use std::fmt::Display;

/// `first == second`, reported as `"<first> != <second>"` otherwise.
pub fn assert_equal<T: PartialEq + Display>(first: T, second: T) -> Result<(), CheckError> {
    if first == second {
        return Ok(());
    }
    debug!("  ❌ Failed equality assertion.");
    debug!("   -📊 Obtained: {first}");
    debug!("   -📋 Expected: {second}");
    Err(CheckError::assertion(format!("{first} != {second}")))
}

pub fn assert_status(response: &Response, expected: u16) -> Result<(), CheckError> {
    assert_equal(response.status_code, expected)
}

/// The response must have been rendered with `template`, among possibly others.
pub fn assert_template_used(response: &Response, template: &str) -> Result<(), CheckError> {
    if response.template_used(template) {
        return Ok(());
    }
    debug!("  ❌ Failed template assertion.");
    debug!("   -📋 Expected: '{template}'");
    debug!("   -📊 Obtained: {:?}", response.templates);
    if response.templates.is_empty() {
        return Err(CheckError::assertion(
            "No templates used to render the response",
        ));
    }
    Err(CheckError::assertion(format!(
        "Template '{template}' was not a template used to render the response. Actual template(s) used: {}",
        response.templates.join(", ")
    )))
}
