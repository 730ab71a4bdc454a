/// Behavioral contract handed to the model as the system instruction.
pub const SYSTEM_PROMPT: &str = r#"You are a UI Navigation Agent. Your goal is to execute user intents by observing screenshots and outputting precise JSON actions.

Operational Protocol:
1. Carefully inspect the provided screenshot. Identify all interactive elements such as buttons, input fields, links, toggles, and close icons.
2. Work toward the user's goal with a single best next step.
3. If any popup, modal, dialog, cookie banner, or overlay blocks the main content, your FIRST action must be to close or dismiss it.
4. Use a normalized coordinate system for the screenshot:
   - The top-left corner of the image is (0, 0).
   - The bottom-right corner of the image is (1000, 1000).
   - All coordinates must be integers in the range [0, 1000].
5. Decide on exactly ONE next action per response.

Output Format (STRICT):
You MUST output ONLY a single JSON object with this exact schema and nothing else:
{
  "plan": "Briefly state what you see and what you will do",
  "action": "CLICK" | "TYPE" | "SCROLL" | "WAIT" | "COMPLETE",
  "target": "description of the element",
  "coords": {"x": integer, "y": integer},
  "text_input": "string (if action is TYPE, otherwise empty string)",
  "status": "IN_PROGRESS" | "SUCCESS"
}

Rules:
- Never include any explanatory text, markdown, backticks, or comments outside of the JSON.
- Do not wrap the JSON in code fences.
- Do not include trailing commas.
- Ensure the JSON is syntactically valid and can be parsed by a strict JSON parser.
- The "coords" must point to the center of the interactive element you intend to act on.
- If "action" is not "TYPE", "text_input" MUST be an empty string.
- If the user's goal is already fully achieved on this screen, use action "COMPLETE" and status "SUCCESS".
- Otherwise, use status "IN_PROGRESS"."#;

const JSON_ONLY_REMINDER: &str = "Remember: respond with ONLY the JSON object, nothing else.";

/// Assemble the per-request user message. Optional lines are skipped when
/// absent or empty.
pub fn build_user_text(goal: &str, session_id: Option<&str>, context: Option<&str>) -> String {
    let mut lines = vec![format!("User Goal: {}", goal.trim())];

    if let Some(id) = session_id.filter(|s| !s.is_empty()) {
        lines.push(format!("Session ID: {}", id));
    }
    if let Some(ctx) = context.filter(|s| !s.is_empty()) {
        lines.push(format!("Context: {}", ctx));
    }

    lines.push(JSON_ONLY_REMINDER.to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_only() {
        assert_eq!(
            build_user_text("  Open settings \n", None, None),
            "User Goal: Open settings\nRemember: respond with ONLY the JSON object, nothing else."
        );
    }

    #[test]
    fn optional_lines_in_order() {
        let text = build_user_text("Log in", Some("abc-123"), Some("step 2 of login"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "User Goal: Log in",
                "Session ID: abc-123",
                "Context: step 2 of login",
                JSON_ONLY_REMINDER,
            ]
        );
    }

    #[test]
    fn empty_optionals_are_skipped() {
        let text = build_user_text("Log in", Some(""), Some(""));
        assert!(!text.contains("Session ID"));
        assert!(!text.contains("Context"));
    }

    #[test]
    fn system_prompt_describes_the_grid_and_schema() {
        assert!(SYSTEM_PROMPT.contains("(1000, 1000)"));
        for field in ["\"plan\"", "\"action\"", "\"target\"", "\"coords\"", "\"text_input\"", "\"status\""] {
            assert!(SYSTEM_PROMPT.contains(field), "missing {field}");
        }
    }
}
