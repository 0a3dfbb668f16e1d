use std::sync::LazyLock;

use regex::Regex;

/// Opening delimiter around the questionnaire in the user message.
pub const QUESTIONNAIRE_OPEN: &str = "<PATIENT_QUESTIONNAIRE>";
/// Closing delimiter around the questionnaire in the user message.
pub const QUESTIONNAIRE_CLOSE: &str = "</PATIENT_QUESTIONNAIRE>";

const FILTERED: &str = "[FILTERED]";

/// Clean patient free text before it is sent to the advisor.
///
/// Strips invisible Unicode and control characters (newline and tab are
/// kept), replaces prompt-injection patterns with `[FILTERED]`, then
/// truncates to `max_chars` characters at a word boundary.
pub fn sanitize_free_text(raw: &str, max_chars: usize) -> String {
    let text = remove_invisible_unicode(raw);
    let text = remove_control_characters(&text);
    let text = remove_injection_patterns(&text);
    truncate_at_word_boundary(text.trim(), max_chars)
}

/// Wrap serialized questionnaire data in delimiters for the prompt.
pub fn wrap_for_prompt(payload: &str) -> String {
    format!("{QUESTIONNAIRE_OPEN}\n{payload}\n{QUESTIONNAIRE_CLOSE}")
}

fn remove_invisible_unicode(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(
                *c,
                '\u{200B}'..='\u{200F}'  // Zero-width chars
                | '\u{202A}'..='\u{202E}' // Directional formatting
                | '\u{2060}'..='\u{2064}' // Invisible operators
                | '\u{2066}'..='\u{2069}' // Directional isolates
                | '\u{FEFF}'              // BOM
                | '\u{00AD}'              // Soft hyphen
                | '\u{034F}'              // Combining grapheme joiner
                | '\u{061C}'              // Arabic letter mark
                | '\u{180E}'              // Mongolian vowel separator
            )
        })
        .collect()
}

fn remove_control_characters(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

fn remove_injection_patterns(text: &str) -> String {
    static INJECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        [
            // Role override attempts
            r"(?i)ignore\s+(?:previous|above|all\s+prior|the\s+above|all)\s+(?:instructions?|rules?|prompts?)",
            r"(?i)disregard\s+(?:previous|above|all|the\s+above)\s+(?:instructions?|rules?|prompts?)",
            r"(?i)forget\s+(?:everything|all|your)\s+(?:previous|prior)?",
            r"(?i)new\s+instructions?:",
            r"(?i)you\s+are\s+now\s+(?:a|an)\s+",
            // System/role tags
            r"(?i)system\s*:",
            r"(?i)assistant\s*:",
            r"<<SYS>>",
            r"\[INST\]",
            r"<\|im_start\|>",
            r"<\|im_end\|>",
            // Delimiter spoofing
            r"(?i)</?\s*PATIENT_QUESTIONNAIRE\s*>",
            // Verdict steering
            r#"(?i)"?triage_level"?\s*[:=]"#,
            // Jailbreak patterns
            r"(?i)(?:DAN|do\s+anything\s+now)\s+mode",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("static regex"))
        .collect()
    });

    let mut result = text.to_string();
    for pattern in INJECTION_PATTERNS.iter() {
        result = pattern.replace_all(&result, FILTERED).into_owned();
    }
    result
}

/// Cut to at most `max_chars` characters, backing off to the last whitespace.
fn truncate_at_word_boundary(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };
    let truncated = &text[..cut];
    match truncated.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => truncated[..pos].trim_end().to_string(),
        _ => truncated.to_string(),
    }
}
