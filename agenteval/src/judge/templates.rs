//! Minimal `{{var}}` placeholder substitution for judge prompt templates.
//!
//! The templates stored on a [`crate::model::JudgeConfig`] (and the default
//! system prompts seeded by [`crate::reconcile`]) use Handlebars-style
//! double-brace placeholders without conditionals or loops, so a plain
//! string replace is enough — no templating crate is pulled in for this.

pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    out
}

/// Renders the numbered `{index}. {text}` block used for both the batched
/// tool-argument checks and the batched behavior-assertion checks.
pub fn render_checklist(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{}. {}", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_known_placeholders() {
        let out = render("input: {{input}}, response: {{response}}", &[("input", "hi"), ("response", "ok")]);
        assert_eq!(out, "input: hi, response: ok");
    }

    #[test]
    fn render_checklist_numbers_from_one() {
        let items = vec!["a".to_string(), "b".to_string()];
        assert_eq!(render_checklist(&items), "1. a\n2. b");
    }
}
