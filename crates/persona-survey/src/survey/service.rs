use std::sync::Arc;

use tracing::info;

use super::domain::{
    Answer, AnswerSubmission, PatternId, Question, QuestionAnswer, QuestionAnswerDraft,
    QuestionAnswerId, QuestionDraft, QuestionId, ResultPattern, ResultPatternDraft, UserId,
};
use super::forms::{
    retained_options, validate_question, validate_question_answer, validate_result_pattern,
    ValidationError,
};
use super::matching::{find_matching_pattern, find_matching_question_answer};
use super::results::{tally_answers, QuestionTally};
use super::store::{CatalogStore, StoreError, SurveyStore};

/// An accepted answer together with its personalized feedback, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedAnswer {
    pub answer: Answer,
    pub feedback: Option<QuestionAnswer>,
}

/// End-user facade over the store and the matching engine.
pub struct SurveyService<S> {
    store: Arc<S>,
}

impl<S: SurveyStore> SurveyService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn questions(&self) -> Result<Vec<Question>, SurveyServiceError> {
        Ok(self.store.questions()?)
    }

    pub fn question_answers(&self) -> Result<Vec<QuestionAnswer>, SurveyServiceError> {
        Ok(self.store.question_answers()?)
    }

    pub fn result_patterns(&self) -> Result<Vec<ResultPattern>, SurveyServiceError> {
        Ok(self.store.result_patterns()?)
    }

    /// Persist one answer and resolve its per-question feedback. The
    /// selected option is checked against the question's options at
    /// submission time; it is never re-validated later.
    pub fn submit_answer(
        &self,
        submission: AnswerSubmission,
    ) -> Result<SubmittedAnswer, SurveyServiceError> {
        let questions = self.store.questions()?;
        let question = questions
            .iter()
            .find(|question| question.id == submission.question_id)
            .ok_or_else(|| SurveyServiceError::UnknownQuestion(submission.question_id.0.clone()))?;

        if !question
            .options
            .iter()
            .any(|option| option == &submission.selected_option)
        {
            return Err(SurveyServiceError::IllegalOption {
                question: submission.question_id.0.clone(),
                option: submission.selected_option.clone(),
            });
        }

        let answer = self.store.append_answer(submission)?;
        info!(
            question = %answer.question_id.0,
            user = %answer.user_id.0,
            "answer recorded"
        );

        let candidates = self.store.question_answers()?;
        let feedback = find_matching_question_answer(
            &answer.question_id,
            &answer.selected_option,
            &candidates,
        )
        .cloned();

        Ok(SubmittedAnswer { answer, feedback })
    }

    /// Resolve the final pattern for a caller-supplied answer snapshot.
    /// `None` is the neutral "survey complete" outcome.
    pub fn resolve_result(
        &self,
        answers: &[Answer],
    ) -> Result<Option<ResultPattern>, SurveyServiceError> {
        let patterns = self.store.result_patterns()?;
        Ok(find_matching_pattern(answers, &patterns).cloned())
    }

    /// Resolve the final pattern from the answers the store holds for a
    /// user, for sessions that did not keep a local answer list.
    pub fn result_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ResultPattern>, SurveyServiceError> {
        let answers = self.store.answers_for_user(user_id)?;
        self.resolve_result(&answers)
    }

    /// Per-question tallies over every recorded answer.
    pub fn tally(&self) -> Result<Vec<QuestionTally>, SurveyServiceError> {
        let questions = self.store.questions()?;
        let answers = self.store.answers()?;
        Ok(tally_answers(&questions, &answers))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SurveyServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("question {0} not found")]
    UnknownQuestion(String),
    #[error("option '{option}' is not offered by question {question}")]
    IllegalOption { question: String, option: String },
}

/// Admin console facade: every write is validated and gated on the
/// acting user's admin flag.
pub struct AdminService<S> {
    store: Arc<S>,
}

impl<S: SurveyStore + CatalogStore> AdminService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn is_admin(&self, user_id: &UserId) -> Result<bool, AdminServiceError> {
        Ok(self.store.is_admin(user_id)?)
    }

    fn require_admin(&self, actor: &UserId) -> Result<(), AdminServiceError> {
        if self.store.is_admin(actor)? {
            Ok(())
        } else {
            Err(AdminServiceError::AccessDenied)
        }
    }

    pub fn create_question(
        &self,
        actor: &UserId,
        draft: QuestionDraft,
    ) -> Result<Question, AdminServiceError> {
        self.require_admin(actor)?;
        validate_question(&draft)?;
        let draft = QuestionDraft {
            options: retained_options(&draft.options),
            ..draft
        };
        let question = self.store.create_question(&draft)?;
        info!(question = %question.id.0, "question created");
        Ok(question)
    }

    pub fn update_question(
        &self,
        actor: &UserId,
        id: &QuestionId,
        draft: QuestionDraft,
    ) -> Result<(), AdminServiceError> {
        self.require_admin(actor)?;
        validate_question(&draft)?;
        let draft = QuestionDraft {
            options: retained_options(&draft.options),
            ..draft
        };
        self.store.update_question(id, &draft)?;
        Ok(())
    }

    pub fn delete_question(&self, actor: &UserId, id: &QuestionId) -> Result<(), AdminServiceError> {
        self.require_admin(actor)?;
        self.store.delete_question(id)?;
        info!(question = %id.0, "question deleted");
        Ok(())
    }

    pub fn create_question_answer(
        &self,
        actor: &UserId,
        draft: QuestionAnswerDraft,
    ) -> Result<QuestionAnswer, AdminServiceError> {
        self.require_admin(actor)?;
        let questions = self.store.questions()?;
        validate_question_answer(&draft, &questions)?;
        Ok(self.store.create_question_answer(&draft)?)
    }

    pub fn update_question_answer(
        &self,
        actor: &UserId,
        id: &QuestionAnswerId,
        draft: QuestionAnswerDraft,
    ) -> Result<(), AdminServiceError> {
        self.require_admin(actor)?;
        let questions = self.store.questions()?;
        validate_question_answer(&draft, &questions)?;
        self.store.update_question_answer(id, &draft)?;
        Ok(())
    }

    pub fn delete_question_answer(
        &self,
        actor: &UserId,
        id: &QuestionAnswerId,
    ) -> Result<(), AdminServiceError> {
        self.require_admin(actor)?;
        self.store.delete_question_answer(id)?;
        Ok(())
    }

    pub fn create_result_pattern(
        &self,
        actor: &UserId,
        draft: ResultPatternDraft,
    ) -> Result<ResultPattern, AdminServiceError> {
        self.require_admin(actor)?;
        validate_result_pattern(&draft)?;
        Ok(self.store.create_result_pattern(&draft)?)
    }

    pub fn update_result_pattern(
        &self,
        actor: &UserId,
        id: &PatternId,
        draft: ResultPatternDraft,
    ) -> Result<(), AdminServiceError> {
        self.require_admin(actor)?;
        validate_result_pattern(&draft)?;
        self.store.update_result_pattern(id, &draft)?;
        Ok(())
    }

    pub fn delete_result_pattern(
        &self,
        actor: &UserId,
        id: &PatternId,
    ) -> Result<(), AdminServiceError> {
        self.require_admin(actor)?;
        self.store.delete_result_pattern(id)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdminServiceError {
    #[error("admin access required")]
    AccessDenied,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
