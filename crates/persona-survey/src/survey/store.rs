//! Storage abstractions over the external document store so services and
//! tests can be exercised against in-memory implementations.

use super::domain::{
    Answer, AnswerSubmission, PatternId, Question, QuestionAnswer, QuestionAnswerDraft,
    QuestionAnswerId, QuestionDraft, QuestionId, ResultPattern, ResultPatternDraft, UserId,
};

/// Read side plus the append-only answer log and the admin flag lookup.
pub trait SurveyStore: Send + Sync {
    /// Questions ordered by `order` ascending.
    fn questions(&self) -> Result<Vec<Question>, StoreError>;
    /// Personalized messages ordered by `order` ascending.
    fn question_answers(&self) -> Result<Vec<QuestionAnswer>, StoreError>;
    /// Patterns ordered by `priority` descending. Display ordering beyond
    /// that is presentation-only and never feeds match selection.
    fn result_patterns(&self) -> Result<Vec<ResultPattern>, StoreError>;
    /// All answers in submission order.
    fn answers(&self) -> Result<Vec<Answer>, StoreError>;
    fn answers_for_user(&self, user_id: &UserId) -> Result<Vec<Answer>, StoreError>;
    /// Append one answer record; answers are never mutated afterwards.
    fn append_answer(&self, submission: AnswerSubmission) -> Result<Answer, StoreError>;
    /// Existence check against the admin flag collection.
    fn is_admin(&self, user_id: &UserId) -> Result<bool, StoreError>;
}

/// Admin write side for the three managed collections.
pub trait CatalogStore: Send + Sync {
    fn create_question(&self, draft: &QuestionDraft) -> Result<Question, StoreError>;
    fn update_question(&self, id: &QuestionId, draft: &QuestionDraft) -> Result<(), StoreError>;
    fn delete_question(&self, id: &QuestionId) -> Result<(), StoreError>;

    fn create_question_answer(
        &self,
        draft: &QuestionAnswerDraft,
    ) -> Result<QuestionAnswer, StoreError>;
    fn update_question_answer(
        &self,
        id: &QuestionAnswerId,
        draft: &QuestionAnswerDraft,
    ) -> Result<(), StoreError>;
    fn delete_question_answer(&self, id: &QuestionAnswerId) -> Result<(), StoreError>;

    fn create_result_pattern(
        &self,
        draft: &ResultPatternDraft,
    ) -> Result<ResultPattern, StoreError>;
    fn update_result_pattern(
        &self,
        id: &PatternId,
        draft: &ResultPatternDraft,
    ) -> Result<(), StoreError>;
    fn delete_result_pattern(&self, id: &PatternId) -> Result<(), StoreError>;
}

/// Error enumeration for store failures. Load failures must surface to
/// the caller; they are never collapsed into an empty ruleset.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
