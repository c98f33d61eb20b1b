//! Request validation against the closed post-count and color sets.

use crate::error::RenderError;
use crate::models::{Color, PostCount, RenderRequest};

/// Pure validator for raw render parameters.
pub struct RequestValidator;

impl RequestValidator {
    /// Validate raw `postCount` and `color` values.
    ///
    /// Values are compared exactly as provided. `postCount` is checked
    /// first, so a request with two bad fields reports `postCount`.
    pub fn validate(
        post_count: Option<&str>,
        color: Option<&str>,
    ) -> Result<RenderRequest, RenderError> {
        let post_count = post_count.and_then(PostCount::from_wire).ok_or_else(|| {
            RenderError::invalid_input(
                "postCount",
                format!(
                    "Invalid postCount. Must be {}",
                    allowed_values(PostCount::ALL.iter().map(PostCount::as_str))
                ),
            )
        })?;

        let color = color.and_then(Color::from_wire).ok_or_else(|| {
            RenderError::invalid_input(
                "color",
                format!(
                    "Invalid color. Must be {}",
                    allowed_values(Color::ALL.iter().map(Color::as_str))
                ),
            )
        })?;

        Ok(RenderRequest { post_count, color })
    }
}

/// `"a" or "b"` / `"a", "b", or "c"`.
fn allowed_values<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = values.map(|v| format!("\"{v}\"")).collect();
    match quoted.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} or {second}"),
        [init @ .., last] => format!("{}, or {last}", init.join(", ")),
    }
}
