//! Turns a service response into the text shown as the assistant's turn.

use crate::rulebot::ServiceResponse;
use crate::trace::{rule_line, situation_line};

/// Header line opening the debug trailer.
pub const DEBUG_HEADER: &str = "----- Debug Information -----";
pub const ALL_RULES_HEADER: &str = "All retrieved rules:";
pub const TOP_RULES_HEADER: &str = "All retrieved top rules:";
pub const SITUATIONS_HEADER: &str = "All retrieved situations:";
pub const NO_RULES: &str = "    - no rules retrieved";
pub const NO_TOP_RULES: &str = "    - no top rules retrieved";
pub const NO_SITUATIONS: &str = "    - no situations retrieved";

/// Build the display text for a successful response.
///
/// Without debug mode this is the answer verbatim. With it, the answer is
/// followed by a trailer listing all rules, top rules and situations in the
/// order the service supplied them.
pub fn interpret(response: &ServiceResponse, debug_enabled: bool) -> String {
    if !debug_enabled {
        return response.answer_text.clone();
    }

    let mut text = response.answer_text.clone();
    text.push_str("\n\n");
    text.push_str(DEBUG_HEADER);
    text.push_str("\n\n");

    push_section(
        &mut text,
        ALL_RULES_HEADER,
        response.retrieved_all_rules.iter().map(rule_line),
        NO_RULES,
    );
    text.push('\n');
    push_section(
        &mut text,
        TOP_RULES_HEADER,
        response.retrieved_top_rules.iter().map(rule_line),
        NO_TOP_RULES,
    );
    text.push('\n');
    push_section(
        &mut text,
        SITUATIONS_HEADER,
        response.retrieved_situations.iter().map(situation_line),
        NO_SITUATIONS,
    );

    text
}

fn push_section(
    text: &mut String,
    header: &str,
    lines: impl Iterator<Item = String>,
    empty_line: &str,
) {
    text.push_str(header);
    text.push('\n');

    let mut wrote_any = false;
    for line in lines {
        text.push_str(&line);
        text.push('\n');
        wrote_any = true;
    }
    if !wrote_any {
        text.push_str(empty_line);
        text.push('\n');
    }
}
