// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Replaces each `{key}` in `template` with its value in one pass.
/// Substituted values are never rescanned; unknown `{...}` runs are kept as written.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let matched = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });
        match matched {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_replaces_known_keys() {
        let filled = fill_template(
            "Role: {name}, {number} questions",
            &[("name", "SRE"), ("number", "5")],
        );
        assert_eq!(filled, "Role: SRE, 5 questions");
    }

    #[test]
    fn test_fill_template_keeps_json_braces() {
        let filled = fill_template(r#"Return {"score": 1} for {name}"#, &[("name", "Ada")]);
        assert_eq!(filled, r#"Return {"score": 1} for Ada"#);
    }

    #[test]
    fn test_fill_template_does_not_rescan_values() {
        let filled = fill_template("{a} then {b}", &[("a", "{b}"), ("b", "done")]);
        assert_eq!(filled, "{b} then done");
    }
}
