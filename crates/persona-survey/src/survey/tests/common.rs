use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use crate::survey::domain::{
    Answer, AnswerCondition, AnswerId, AnswerSubmission, PatternCondition, PatternId, Question,
    QuestionAnswer, QuestionAnswerDraft, QuestionAnswerId, QuestionDraft, QuestionId,
    ResultPattern, ResultPatternDraft, UserId,
};
use crate::survey::store::{CatalogStore, StoreError, SurveyStore};

pub(super) fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(super) fn question(id: &str, text: &str, options: &[&str], order: i64) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        text: text.to_string(),
        options: options.iter().map(|option| option.to_string()).collect(),
        order,
    }
}

pub(super) fn question_answer(
    id: &str,
    question_id: &str,
    selected_option: &str,
    order: i64,
) -> QuestionAnswer {
    QuestionAnswer {
        id: QuestionAnswerId(id.to_string()),
        question_id: QuestionId(question_id.to_string()),
        name: format!("feedback {id}"),
        message: format!("message for {selected_option}"),
        description: None,
        condition: AnswerCondition {
            selected_option: selected_option.to_string(),
        },
        order,
        created_at: fixed_time(),
    }
}

pub(super) fn pattern(
    id: &str,
    priority: i64,
    order: i64,
    conditions: &[(&str, &str)],
) -> ResultPattern {
    ResultPattern {
        id: PatternId(id.to_string()),
        name: format!("pattern {id}"),
        message: format!("outcome {id}"),
        description: None,
        conditions: conditions
            .iter()
            .map(|(question_id, selected_option)| PatternCondition {
                question_id: QuestionId(question_id.to_string()),
                selected_option: selected_option.to_string(),
            })
            .collect(),
        priority,
        order,
        created_at: fixed_time(),
    }
}

pub(super) fn answer(question_id: &str, selected_option: &str) -> Answer {
    Answer {
        id: None,
        user_id: UserId("user-1".to_string()),
        user_name: "Kai".to_string(),
        question_id: QuestionId(question_id.to_string()),
        selected_option: selected_option.to_string(),
        created_at: fixed_time(),
    }
}

pub(super) fn submission(question_id: &str, selected_option: &str) -> AnswerSubmission {
    AnswerSubmission {
        user_id: UserId("user-1".to_string()),
        user_name: "Kai".to_string(),
        question_id: QuestionId(question_id.to_string()),
        selected_option: selected_option.to_string(),
    }
}

pub(super) fn two_question_catalog() -> Vec<Question> {
    vec![
        question("q1", "Coffee or tea?", &["Coffee", "Tea"], 1),
        question("q2", "Morning or night?", &["Morning", "Night"], 2),
    ]
}

#[derive(Default)]
struct StoreData {
    questions: Vec<Question>,
    question_answers: Vec<QuestionAnswer>,
    patterns: Vec<ResultPattern>,
    answers: Vec<Answer>,
    admins: BTreeSet<UserId>,
}

/// Typed in-memory double for both store traits.
#[derive(Default)]
pub(super) struct InMemoryStore {
    data: Mutex<StoreData>,
    sequence: AtomicU64,
}

impl InMemoryStore {
    pub(super) fn seeded(
        questions: Vec<Question>,
        question_answers: Vec<QuestionAnswer>,
        patterns: Vec<ResultPattern>,
    ) -> Self {
        let store = Self::default();
        {
            let mut data = store.data.lock().expect("store mutex poisoned");
            data.questions = questions;
            data.question_answers = question_answers;
            data.patterns = patterns;
        }
        store
    }

    pub(super) fn grant_admin(&self, user_id: &str) {
        let mut data = self.data.lock().expect("store mutex poisoned");
        data.admins.insert(UserId(user_id.to_string()));
    }

    pub(super) fn recorded_answers(&self) -> Vec<Answer> {
        self.data
            .lock()
            .expect("store mutex poisoned")
            .answers
            .clone()
    }

    fn next_id(&self, prefix: &str) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{id:04}")
    }
}

impl SurveyStore for InMemoryStore {
    fn questions(&self) -> Result<Vec<Question>, StoreError> {
        let data = self.data.lock().expect("store mutex poisoned");
        let mut questions = data.questions.clone();
        questions.sort_by_key(|question| question.order);
        Ok(questions)
    }

    fn question_answers(&self) -> Result<Vec<QuestionAnswer>, StoreError> {
        let data = self.data.lock().expect("store mutex poisoned");
        let mut records = data.question_answers.clone();
        records.sort_by_key(|record| record.order);
        Ok(records)
    }

    fn result_patterns(&self) -> Result<Vec<ResultPattern>, StoreError> {
        let data = self.data.lock().expect("store mutex poisoned");
        let mut patterns = data.patterns.clone();
        patterns.sort_by_key(|pattern| std::cmp::Reverse(pattern.priority));
        Ok(patterns)
    }

    fn answers(&self) -> Result<Vec<Answer>, StoreError> {
        Ok(self.recorded_answers())
    }

    fn answers_for_user(&self, user_id: &UserId) -> Result<Vec<Answer>, StoreError> {
        Ok(self
            .recorded_answers()
            .into_iter()
            .filter(|answer| &answer.user_id == user_id)
            .collect())
    }

    fn append_answer(&self, submission: AnswerSubmission) -> Result<Answer, StoreError> {
        let answer = Answer {
            id: Some(AnswerId(self.next_id("ans"))),
            user_id: submission.user_id,
            user_name: submission.user_name,
            question_id: submission.question_id,
            selected_option: submission.selected_option,
            created_at: Utc::now(),
        };
        let mut data = self.data.lock().expect("store mutex poisoned");
        data.answers.push(answer.clone());
        Ok(answer)
    }

    fn is_admin(&self, user_id: &UserId) -> Result<bool, StoreError> {
        let data = self.data.lock().expect("store mutex poisoned");
        Ok(data.admins.contains(user_id))
    }
}

impl CatalogStore for InMemoryStore {
    fn create_question(&self, draft: &QuestionDraft) -> Result<Question, StoreError> {
        let created = Question {
            id: QuestionId(self.next_id("q")),
            text: draft.text.clone(),
            options: draft.options.clone(),
            order: draft.order,
        };
        let mut data = self.data.lock().expect("store mutex poisoned");
        data.questions.push(created.clone());
        Ok(created)
    }

    fn update_question(&self, id: &QuestionId, draft: &QuestionDraft) -> Result<(), StoreError> {
        let mut data = self.data.lock().expect("store mutex poisoned");
        let question = data
            .questions
            .iter_mut()
            .find(|question| &question.id == id)
            .ok_or(StoreError::NotFound)?;
        question.text = draft.text.clone();
        question.options = draft.options.clone();
        question.order = draft.order;
        Ok(())
    }

    fn delete_question(&self, id: &QuestionId) -> Result<(), StoreError> {
        let mut data = self.data.lock().expect("store mutex poisoned");
        let before = data.questions.len();
        data.questions.retain(|question| &question.id != id);
        if data.questions.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn create_question_answer(
        &self,
        draft: &QuestionAnswerDraft,
    ) -> Result<QuestionAnswer, StoreError> {
        let created = QuestionAnswer {
            id: QuestionAnswerId(self.next_id("qa")),
            question_id: draft.question_id.clone(),
            name: draft.name.clone(),
            message: draft.message.clone(),
            description: draft.description.clone(),
            condition: AnswerCondition {
                selected_option: draft.selected_option.clone(),
            },
            order: draft.order,
            created_at: Utc::now(),
        };
        let mut data = self.data.lock().expect("store mutex poisoned");
        data.question_answers.push(created.clone());
        Ok(created)
    }

    fn update_question_answer(
        &self,
        id: &QuestionAnswerId,
        draft: &QuestionAnswerDraft,
    ) -> Result<(), StoreError> {
        let mut data = self.data.lock().expect("store mutex poisoned");
        let record = data
            .question_answers
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or(StoreError::NotFound)?;
        record.question_id = draft.question_id.clone();
        record.name = draft.name.clone();
        record.message = draft.message.clone();
        record.description = draft.description.clone();
        record.condition.selected_option = draft.selected_option.clone();
        record.order = draft.order;
        Ok(())
    }

    fn delete_question_answer(&self, id: &QuestionAnswerId) -> Result<(), StoreError> {
        let mut data = self.data.lock().expect("store mutex poisoned");
        let before = data.question_answers.len();
        data.question_answers.retain(|record| &record.id != id);
        if data.question_answers.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn create_result_pattern(
        &self,
        draft: &ResultPatternDraft,
    ) -> Result<ResultPattern, StoreError> {
        let created = ResultPattern {
            id: PatternId(self.next_id("pat")),
            name: draft.name.clone(),
            message: draft.message.clone(),
            description: draft.description.clone(),
            conditions: draft.conditions.clone(),
            priority: draft.priority,
            order: draft.order,
            created_at: Utc::now(),
        };
        let mut data = self.data.lock().expect("store mutex poisoned");
        data.patterns.push(created.clone());
        Ok(created)
    }

    fn update_result_pattern(
        &self,
        id: &PatternId,
        draft: &ResultPatternDraft,
    ) -> Result<(), StoreError> {
        let mut data = self.data.lock().expect("store mutex poisoned");
        let pattern = data
            .patterns
            .iter_mut()
            .find(|pattern| &pattern.id == id)
            .ok_or(StoreError::NotFound)?;
        pattern.name = draft.name.clone();
        pattern.message = draft.message.clone();
        pattern.description = draft.description.clone();
        pattern.conditions = draft.conditions.clone();
        pattern.priority = draft.priority;
        pattern.order = draft.order;
        Ok(())
    }

    fn delete_result_pattern(&self, id: &PatternId) -> Result<(), StoreError> {
        let mut data = self.data.lock().expect("store mutex poisoned");
        let before = data.patterns.len();
        data.patterns.retain(|pattern| &pattern.id != id);
        if data.patterns.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// Store double whose every read fails, for load-error propagation tests.
#[derive(Default)]
pub(super) struct UnavailableStore;

impl SurveyStore for UnavailableStore {
    fn questions(&self) -> Result<Vec<Question>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn question_answers(&self) -> Result<Vec<QuestionAnswer>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn result_patterns(&self) -> Result<Vec<ResultPattern>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn answers(&self) -> Result<Vec<Answer>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn answers_for_user(&self, _user_id: &UserId) -> Result<Vec<Answer>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn append_answer(&self, _submission: AnswerSubmission) -> Result<Answer, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn is_admin(&self, _user_id: &UserId) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}
