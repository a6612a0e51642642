/// Longest log tail, in characters, quoted in a result comment.
pub const RESULT_COMMENT_LOG_TAIL_CHARS: usize = 9_000;

/// Markdown comment posted on the issue once orchestration finishes.
pub fn orchestrator_result_comment(success: bool, loops: u32, log: &str) -> String {
    let outcome = if success { "SUCCESS" } else { "FAILED" };
    format!(
        "**orchestrator result:** {outcome} after {loops} loop(s).\n\nSee logs:\n```\n{}\n```",
        tail_chars(log, RESULT_COMMENT_LOG_TAIL_CHARS)
    )
}

fn tail_chars(text: &str, max_chars: usize) -> &str {
    let total = text.chars().count();
    if total <= max_chars {
        return text;
    }
    text.char_indices()
        .nth(total - max_chars)
        .map(|(start, _)| &text[start..])
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_result_comment_reports_outcome_and_loop_count() {
        let comment = orchestrator_result_comment(true, 2, "TITLE: GEN: page /blog");
        assert_eq!(
            comment,
            "**orchestrator result:** SUCCESS after 2 loop(s).\n\nSee logs:\n```\nTITLE: GEN: page /blog\n```"
        );
        assert!(orchestrator_result_comment(false, 4, "").contains("FAILED after 4 loop(s)"));
    }

    #[test]
    fn regression_long_logs_keep_only_the_tail_on_char_boundaries() {
        let log = format!("{}{}", "é".repeat(10), "x".repeat(RESULT_COMMENT_LOG_TAIL_CHARS - 1));
        let comment = orchestrator_result_comment(false, 1, &log);
        let quoted = comment
            .split("```\n")
            .nth(1)
            .and_then(|rest| rest.strip_suffix("\n```"))
            .expect("quoted log");
        assert_eq!(quoted.chars().count(), RESULT_COMMENT_LOG_TAIL_CHARS);
        assert!(quoted.starts_with('é'));
        assert_eq!(quoted.chars().filter(|ch| *ch == 'é').count(), 1);
    }
}
