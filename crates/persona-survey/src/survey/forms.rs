//! Admin console form validation, applied before any catalog write.

use super::domain::{Question, QuestionAnswerDraft, QuestionDraft, ResultPatternDraft};

pub const MIN_OPTIONS: usize = 2;
pub const MIN_CONDITIONS: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("question text is required")]
    MissingQuestionText,
    #[error("at least {MIN_OPTIONS} options are required")]
    TooFewOptions,
    #[error("a question must be selected")]
    MissingQuestionSelection,
    #[error("a name is required")]
    MissingName,
    #[error("a message is required")]
    MissingMessage,
    #[error("an option must be selected")]
    MissingOptionSelection,
    #[error("the selected question does not exist")]
    QuestionNotFound,
    #[error("the selected option does not belong to the question")]
    OptionNotInQuestion,
    #[error("at least {MIN_CONDITIONS} condition is required")]
    TooFewConditions,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Trim option entries and drop the blank ones before persisting.
pub fn retained_options(options: &[String]) -> Vec<String> {
    options
        .iter()
        .map(|option| option.trim().to_string())
        .filter(|option| !option.is_empty())
        .collect()
}

pub fn validate_question(draft: &QuestionDraft) -> Result<(), ValidationError> {
    if is_blank(&draft.text) {
        return Err(ValidationError::MissingQuestionText);
    }
    if retained_options(&draft.options).len() < MIN_OPTIONS {
        return Err(ValidationError::TooFewOptions);
    }
    Ok(())
}

/// A personalized message must reference an existing question and one of
/// its current options.
pub fn validate_question_answer(
    draft: &QuestionAnswerDraft,
    questions: &[Question],
) -> Result<(), ValidationError> {
    if draft.question_id.0.is_empty() {
        return Err(ValidationError::MissingQuestionSelection);
    }
    if is_blank(&draft.name) {
        return Err(ValidationError::MissingName);
    }
    if is_blank(&draft.message) {
        return Err(ValidationError::MissingMessage);
    }
    if is_blank(&draft.selected_option) {
        return Err(ValidationError::MissingOptionSelection);
    }

    let question = questions
        .iter()
        .find(|question| question.id == draft.question_id)
        .ok_or(ValidationError::QuestionNotFound)?;

    if !question
        .options
        .iter()
        .any(|option| option == &draft.selected_option)
    {
        return Err(ValidationError::OptionNotInQuestion);
    }

    Ok(())
}

pub fn validate_result_pattern(draft: &ResultPatternDraft) -> Result<(), ValidationError> {
    if is_blank(&draft.name) {
        return Err(ValidationError::MissingName);
    }
    if is_blank(&draft.message) {
        return Err(ValidationError::MissingMessage);
    }
    if draft.conditions.len() < MIN_CONDITIONS {
        return Err(ValidationError::TooFewConditions);
    }
    Ok(())
}
