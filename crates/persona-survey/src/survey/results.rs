//! Per-question response tallies for the results board and the admin
//! console.

use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{Answer, Question, QuestionId};

/// One response row within a question's tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyEntry {
    pub user_name: String,
    pub selected_option: String,
}

/// All responses recorded for one question, in submission order, plus a
/// per-option count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionTally {
    pub question_id: QuestionId,
    pub text: String,
    pub answers: Vec<TallyEntry>,
    pub option_counts: BTreeMap<String, usize>,
}

/// Group answers under their questions, keeping the questions' display
/// order. Answers referencing a deleted question are dropped.
pub fn tally_answers(questions: &[Question], answers: &[Answer]) -> Vec<QuestionTally> {
    questions
        .iter()
        .map(|question| {
            let mut entries = Vec::new();
            let mut option_counts: BTreeMap<String, usize> = BTreeMap::new();
            for answer in answers.iter().filter(|a| a.question_id == question.id) {
                *option_counts
                    .entry(answer.selected_option.clone())
                    .or_default() += 1;
                entries.push(TallyEntry {
                    user_name: answer.user_name.clone(),
                    selected_option: answer.selected_option.clone(),
                });
            }
            QuestionTally {
                question_id: question.id.clone(),
                text: question.text.clone(),
                answers: entries,
                option_counts,
            }
        })
        .collect()
}
