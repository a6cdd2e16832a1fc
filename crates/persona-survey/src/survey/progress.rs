//! Per-user survey progression.
//!
//! The session walks `Answering(i) -> ShowingFeedback(i) -> Answering(i+1)
//! -> ... -> Completed`. Loading happens before a session exists: the
//! caller fetches the question list and constructs the session from it.
//! An answer only transitions the session once the caller reports it
//! durably recorded; on persistence failure the session stays in
//! `Answering` with the staged selection intact so the caller can retry.

use serde::{Deserialize, Serialize};

use super::domain::{
    Answer, PatternId, Question, QuestionAnswer, QuestionAnswerId, QuestionId, ResultPattern,
};
use super::matching::{find_matching_pattern, find_matching_question_answer};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Durable checkpoint of an in-flight session. Serialized as JSON by the
/// caller; `restore` validates it instead of trusting deserialized data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub version: u32,
    pub current_question_index: usize,
    pub showing_feedback: bool,
    pub completed: bool,
    pub answers: Vec<Answer>,
    pub selected_option: Option<String>,
    pub matched_pattern_id: Option<PatternId>,
    pub current_feedback_id: Option<QuestionAnswerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyPhase {
    Answering { index: usize },
    ShowingFeedback { index: usize },
    Completed,
}

/// A staged answer awaiting durable persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnswer {
    pub question_id: QuestionId,
    pub selected_option: String,
}

/// Outcome of advancing past a feedback screen.
#[derive(Debug, PartialEq)]
pub enum SurveyAdvance<'a> {
    NextQuestion { index: usize },
    Completed { pattern: Option<&'a ResultPattern> },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    #[error("unsupported progress snapshot version {found}")]
    UnsupportedVersion { found: u32 },
    #[error("snapshot question index {index} is out of range for {questions} questions")]
    IndexOutOfRange { index: usize, questions: usize },
    #[error("no question is awaiting an answer")]
    NotAnswering,
    #[error("option '{0}' is not offered by the current question")]
    UnknownOption(String),
    #[error("no staged selection to record")]
    NothingStaged,
    #[error("recorded answer does not match the staged selection")]
    SelectionMismatch,
    #[error("no feedback screen to advance past")]
    NotShowingFeedback,
}

/// State machine for one user's pass through the survey.
#[derive(Debug, Clone)]
pub struct SurveySession {
    questions: Vec<Question>,
    answers: Vec<Answer>,
    phase: SurveyPhase,
    selected_option: Option<String>,
    matched_pattern_id: Option<PatternId>,
    current_feedback_id: Option<QuestionAnswerId>,
}

impl SurveySession {
    /// Start a fresh session over an already-loaded question list. An
    /// empty survey is immediately complete.
    pub fn new(questions: Vec<Question>) -> Self {
        let phase = if questions.is_empty() {
            SurveyPhase::Completed
        } else {
            SurveyPhase::Answering { index: 0 }
        };

        Self {
            questions,
            answers: Vec::new(),
            phase,
            selected_option: None,
            matched_pattern_id: None,
            current_feedback_id: None,
        }
    }

    pub fn phase(&self) -> SurveyPhase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Answers accumulated locally during this session. The final match
    /// runs over these, never over a re-fetched store snapshot.
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn matched_pattern_id(&self) -> Option<&PatternId> {
        self.matched_pattern_id.as_ref()
    }

    pub fn current_feedback_id(&self) -> Option<&QuestionAnswerId> {
        self.current_feedback_id.as_ref()
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            SurveyPhase::Answering { index } | SurveyPhase::ShowingFeedback { index } => {
                self.questions.get(index)
            }
            SurveyPhase::Completed => None,
        }
    }

    /// Stage a selection for the current question. The caller persists the
    /// returned answer and then calls [`record`](Self::record). Staging is
    /// rejected outside the `Answering` phase, which is the re-entrant
    /// submission guard: one durable answer per question per session.
    pub fn stage(&mut self, option: &str) -> Result<PendingAnswer, ProgressError> {
        let question = match self.phase {
            SurveyPhase::Answering { index } => &self.questions[index],
            _ => return Err(ProgressError::NotAnswering),
        };

        if !question.options.iter().any(|candidate| candidate == option) {
            return Err(ProgressError::UnknownOption(option.to_string()));
        }

        self.selected_option = Some(option.to_string());
        Ok(PendingAnswer {
            question_id: question.id.clone(),
            selected_option: option.to_string(),
        })
    }

    /// Acknowledge that the staged answer was durably recorded, moving to
    /// the feedback screen. Returns the personalized message for the
    /// recorded choice, if one applies.
    pub fn record<'a>(
        &mut self,
        answer: Answer,
        question_answers: &'a [QuestionAnswer],
    ) -> Result<Option<&'a QuestionAnswer>, ProgressError> {
        let index = match self.phase {
            SurveyPhase::Answering { index } => index,
            _ => return Err(ProgressError::NotAnswering),
        };

        let staged = self
            .selected_option
            .as_deref()
            .ok_or(ProgressError::NothingStaged)?;
        let question = &self.questions[index];
        if answer.question_id != question.id || answer.selected_option != staged {
            return Err(ProgressError::SelectionMismatch);
        }

        let feedback =
            find_matching_question_answer(&answer.question_id, &answer.selected_option, question_answers);
        self.current_feedback_id = feedback.map(|qa| qa.id.clone());
        self.answers.push(answer);
        self.phase = SurveyPhase::ShowingFeedback { index };
        Ok(feedback)
    }

    /// Leave the feedback screen: either move to the next question or,
    /// after the last one, resolve the final pattern. The pattern match
    /// runs exactly once, on this transition, over the session-local
    /// answers.
    pub fn advance<'a>(
        &mut self,
        patterns: &'a [ResultPattern],
    ) -> Result<SurveyAdvance<'a>, ProgressError> {
        let index = match self.phase {
            SurveyPhase::ShowingFeedback { index } => index,
            _ => return Err(ProgressError::NotShowingFeedback),
        };

        self.selected_option = None;
        self.current_feedback_id = None;

        let next = index + 1;
        if next < self.questions.len() {
            self.phase = SurveyPhase::Answering { index: next };
            return Ok(SurveyAdvance::NextQuestion { index: next });
        }

        let pattern = find_matching_pattern(&self.answers, patterns);
        self.matched_pattern_id = pattern.map(|matched| matched.id.clone());
        self.phase = SurveyPhase::Completed;
        Ok(SurveyAdvance::Completed { pattern })
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let (current_question_index, showing_feedback, completed) = match self.phase {
            SurveyPhase::Answering { index } => (index, false, false),
            SurveyPhase::ShowingFeedback { index } => (index, true, false),
            SurveyPhase::Completed => (self.questions.len(), false, true),
        };

        ProgressSnapshot {
            version: SNAPSHOT_VERSION,
            current_question_index,
            showing_feedback,
            completed,
            answers: self.answers.clone(),
            selected_option: self.selected_option.clone(),
            matched_pattern_id: self.matched_pattern_id.clone(),
            current_feedback_id: self.current_feedback_id.clone(),
        }
    }

    /// Rebuild a session from a checkpoint. Rejects version mismatches and
    /// indices outside the current question list rather than trusting the
    /// stored blob.
    pub fn restore(
        questions: Vec<Question>,
        snapshot: ProgressSnapshot,
    ) -> Result<Self, ProgressError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ProgressError::UnsupportedVersion {
                found: snapshot.version,
            });
        }

        let phase = if snapshot.completed {
            SurveyPhase::Completed
        } else {
            let index = snapshot.current_question_index;
            if index >= questions.len() {
                return Err(ProgressError::IndexOutOfRange {
                    index,
                    questions: questions.len(),
                });
            }
            if snapshot.showing_feedback {
                SurveyPhase::ShowingFeedback { index }
            } else {
                SurveyPhase::Answering { index }
            }
        };

        Ok(Self {
            questions,
            answers: snapshot.answers,
            phase,
            selected_option: snapshot.selected_option,
            matched_pattern_id: snapshot.matched_pattern_id,
            current_feedback_id: snapshot.current_feedback_id,
        })
    }
}
