//! Turns raw model text into a validated [`Action`].
//!
//! Models do not reliably honor "JSON only": replies often arrive wrapped in
//! Markdown fences, sometimes tagged `json`. Those two wrappers are peeled off
//! in that order and nothing else is recovered. Anything that still fails to
//! parse or validate is a `MalformedOutput`.

use serde_json::Value;

use crate::error::{NavError, NavResult};
use crate::types::Action;

const FENCE: &str = "```";
const LANGUAGE_TAG: &str = "json";

pub fn interpret(raw_model_output: &str) -> NavResult<Action> {
    let cleaned = normalize(raw_model_output);

    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| NavError::malformed(format!("invalid JSON: {e}")))?;

    serde_json::from_value(value)
        .map_err(|e| NavError::malformed(format!("schema validation failed: {e}")))
}

/// Strip surrounding whitespace, then fence backticks, then a leading
/// `json` tag. The tag is only looked for once the fence is gone.
fn normalize(raw: &str) -> &str {
    let mut text = raw.trim();

    if text.starts_with(FENCE) {
        text = text.trim_matches('`').trim();
        if text
            .get(..LANGUAGE_TAG.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(LANGUAGE_TAG))
        {
            text = text[LANGUAGE_TAG.len()..].trim_start();
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionKind, Status};

    const CLOSE_POPUP: &str = r#"{"plan":"Close popup","action":"CLICK","target":"close icon","coords":{"x":950,"y":20},"text_input":"","status":"IN_PROGRESS"}"#;
    const WAIT: &str = r#"{"plan":"p","action":"WAIT","target":"t","coords":{"x":0,"y":0},"text_input":"","status":"IN_PROGRESS"}"#;

    fn assert_malformed(input: &str) {
        match interpret(input) {
            Err(NavError::MalformedOutput(_)) => {}
            other => panic!("expected MalformedOutput for {input:?}, got {other:?}"),
        }
    }

    #[test]
    fn plain_object_keeps_every_field() {
        let action = interpret(CLOSE_POPUP).unwrap();
        assert_eq!(action.plan, "Close popup");
        assert_eq!(action.action, ActionKind::Click);
        assert_eq!(action.target, "close icon");
        assert_eq!(action.coords.x.get(), 950);
        assert_eq!(action.coords.y.get(), 20);
        assert_eq!(action.text_input, "");
        assert_eq!(action.status, Status::InProgress);
    }

    #[test]
    fn serialized_action_interprets_to_itself() {
        let action = interpret(CLOSE_POPUP).unwrap();
        let again = interpret(&serde_json::to_string(&action).unwrap()).unwrap();
        assert_eq!(action, again);
    }

    #[test]
    fn fenced_reply_matches_unwrapped() {
        let expected = interpret(WAIT).unwrap();
        for wrapped in [
            format!("```json\n{WAIT}\n```"),
            format!("```JSON\n{WAIT}\n```"),
            format!("```\n{WAIT}\n```"),
            format!("  \n```json {WAIT}```\n"),
        ] {
            assert_eq!(interpret(&wrapped).unwrap(), expected, "input: {wrapped:?}");
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let expected = interpret(WAIT).unwrap();
        assert_eq!(interpret(&format!("\n\t {WAIT} \n")).unwrap(), expected);
    }

    #[test]
    fn json_tag_without_fence_is_not_stripped() {
        assert_malformed(&format!("json {WAIT}"));
    }

    #[test]
    fn prose_around_the_object_is_rejected() {
        assert_malformed(&format!("Here is the next step: {WAIT}"));
        assert_malformed(&format!("{WAIT}\nLet me know if that works."));
    }

    #[test]
    fn empty_reply_is_malformed() {
        assert_malformed("");
        assert_malformed("   \n");
        assert_malformed("``````");
    }

    #[test]
    fn coordinates_outside_grid_are_malformed() {
        assert_malformed(&WAIT.replace(r#""x":0"#, r#""x":1001"#));
        assert_malformed(&WAIT.replace(r#""y":0"#, r#""y":-1"#));
    }

    #[test]
    fn non_integer_coordinates_are_malformed() {
        assert_malformed(&WAIT.replace(r#""x":0"#, r#""x":12.5"#));
        assert_malformed(&WAIT.replace(r#""x":0"#, r#""x":"12""#));
    }

    #[test]
    fn unknown_action_is_malformed() {
        assert_malformed(&WAIT.replace("WAIT", "HOVER"));
        assert_malformed(&WAIT.replace("WAIT", "wait"));
    }

    #[test]
    fn missing_fields_are_malformed() {
        for field in ["plan", "action", "target", "coords", "text_input", "status"] {
            let mut value: Value = serde_json::from_str(WAIT).unwrap();
            value.as_object_mut().unwrap().remove(field);
            assert_malformed(&value.to_string());
        }
        assert_malformed(&WAIT.replace(r#","y":0"#, ""));
    }

    #[test]
    fn parse_and_schema_failures_are_distinguishable() {
        let Err(NavError::MalformedOutput(syntax)) = interpret("{not json") else {
            panic!("expected MalformedOutput");
        };
        assert!(syntax.starts_with("invalid JSON"), "{syntax}");

        let Err(NavError::MalformedOutput(schema)) = interpret("[1, 2, 3]") else {
            panic!("expected MalformedOutput");
        };
        assert!(schema.starts_with("schema validation failed"), "{schema}");
    }

    #[test]
    fn stray_text_input_is_accepted() {
        let action = interpret(&WAIT.replace(r#""text_input":"""#, r#""text_input":"oops""#)).unwrap();
        assert_eq!(action.text_input, "oops");
        assert!(action.has_stray_text_input());
    }
}
