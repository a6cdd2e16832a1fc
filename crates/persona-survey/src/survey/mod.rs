//! Survey domain: entities, boundary normalization, the two matchers,
//! the per-user progression state machine, and the services/router that
//! expose them.

pub mod domain;
pub mod forms;
pub mod matching;
pub mod normalize;
pub mod progress;
pub mod results;
pub mod router;
pub mod service;
pub mod store;

pub use domain::{
    Answer, AnswerCondition, AnswerId, AnswerSubmission, PatternCondition, PatternId, Question,
    QuestionAnswer, QuestionAnswerDraft, QuestionAnswerId, QuestionDraft, QuestionId,
    ResultPattern, ResultPatternDraft, UserId,
};
pub use matching::{find_matching_pattern, find_matching_question_answer};
pub use progress::{ProgressError, ProgressSnapshot, SurveyAdvance, SurveyPhase, SurveySession};
pub use router::{survey_router, SurveyApi};
pub use service::{
    AdminService, AdminServiceError, SubmittedAnswer, SurveyService, SurveyServiceError,
};
pub use store::{CatalogStore, StoreError, SurveyStore};

#[cfg(test)]
mod tests;
