//! The rule-evaluation core: both matchers are pure functions over
//! read-only snapshots and never mutate their inputs.

use super::domain::{Answer, QuestionAnswer, QuestionId, ResultPattern};

/// Select the personalized message applicable to one `(question, option)`
/// pair, if any.
///
/// Candidates are filtered to records whose question id and condition
/// option both match exactly (case-sensitive). Among those, the lowest
/// `order` wins; equal `order` falls back to the lexicographically
/// smallest id. An empty filtered set is a normal outcome, not an error.
pub fn find_matching_question_answer<'a>(
    question_id: &QuestionId,
    selected_option: &str,
    candidates: &'a [QuestionAnswer],
) -> Option<&'a QuestionAnswer> {
    candidates
        .iter()
        .filter(|qa| {
            qa.question_id == *question_id && qa.condition.selected_option == selected_option
        })
        .min_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.0.cmp(&b.id.0)))
}

/// Select the best-matching result pattern for a full answer set.
///
/// Patterns are ranked by `priority` descending, then condition count
/// descending (more conditions wins among equal priority), then `order`
/// ascending and id ascending so the ranking is fully deterministic.
/// A pattern matches when every condition is satisfied by at least one
/// answer; a pattern with no conditions never matches. Returning `None`
/// is the expected generic-completion outcome.
pub fn find_matching_pattern<'a>(
    user_answers: &[Answer],
    patterns: &'a [ResultPattern],
) -> Option<&'a ResultPattern> {
    if user_answers.is_empty() || patterns.is_empty() {
        return None;
    }

    let mut ranked: Vec<&ResultPattern> = patterns.iter().collect();
    ranked.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.conditions.len().cmp(&a.conditions.len()))
            .then_with(|| a.order.cmp(&b.order))
            .then_with(|| a.id.0.cmp(&b.id.0))
    });

    ranked.into_iter().find(|pattern| {
        !pattern.conditions.is_empty()
            && pattern.conditions.iter().all(|condition| {
                user_answers.iter().any(|answer| {
                    answer.question_id == condition.question_id
                        && answer.selected_option == condition.selected_option
                })
            })
    })
}
