//! In-memory document store backing the service binary.
//!
//! Documents are free-form JSON in the external store's camelCase
//! convention and pass through boundary normalization on every read, so
//! the binary exercises the same tolerant parsing a real document store
//! deployment would.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use persona_survey::survey::domain::{
    Answer, AnswerSubmission, PatternId, Question, QuestionAnswer, QuestionAnswerDraft,
    QuestionAnswerId, QuestionDraft, QuestionId, ResultPattern, ResultPatternDraft, UserId,
};
use persona_survey::survey::normalize;
use persona_survey::survey::store::{CatalogStore, StoreError, SurveyStore};
use serde_json::{json, Value};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

const QUESTIONS: &str = "questions";
const ANSWERS: &str = "answers";
const QUESTION_ANSWERS: &str = "questionAnswers";
const RESULT_PATTERNS: &str = "resultPatterns";
const ADMINS: &str = "admins";

#[derive(Default)]
pub(crate) struct InMemoryDocumentStore {
    collections: Mutex<BTreeMap<&'static str, BTreeMap<String, Value>>>,
    sequence: AtomicU64,
}

impl InMemoryDocumentStore {
    pub(crate) fn grant_admin(&self, user_id: &str) {
        let mut guard = self.collections.lock().expect("store mutex poisoned");
        guard
            .entry(ADMINS)
            .or_default()
            .insert(user_id.to_string(), json!({}));
    }

    fn next_id(&self, prefix: &str) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{sequence:06}")
    }

    fn insert(&self, collection: &'static str, prefix: &str, mut doc: Value) -> (String, Value) {
        if let Some(fields) = doc.as_object_mut() {
            fields
                .entry("createdAt".to_string())
                .or_insert_with(|| json!(Utc::now().to_rfc3339()));
        }

        let id = self.next_id(prefix);
        let mut guard = self.collections.lock().expect("store mutex poisoned");
        guard.entry(collection).or_default().insert(id.clone(), doc.clone());
        (id, doc)
    }

    /// Replace a document's fields while keeping its original `createdAt`.
    fn replace(&self, collection: &'static str, id: &str, mut doc: Value) -> Result<(), StoreError> {
        let mut guard = self.collections.lock().expect("store mutex poisoned");
        let documents = guard.entry(collection).or_default();
        let existing = documents.get(id).ok_or(StoreError::NotFound)?;

        if let (Some(fields), Some(created_at)) = (doc.as_object_mut(), existing.get("createdAt")) {
            fields.insert("createdAt".to_string(), created_at.clone());
        }
        documents.insert(id.to_string(), doc);
        Ok(())
    }

    fn remove(&self, collection: &'static str, id: &str) -> Result<(), StoreError> {
        let mut guard = self.collections.lock().expect("store mutex poisoned");
        guard
            .entry(collection)
            .or_default()
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn documents(&self, collection: &'static str) -> Vec<(String, Value)> {
        let guard = self.collections.lock().expect("store mutex poisoned");
        guard
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl SurveyStore for InMemoryDocumentStore {
    fn questions(&self) -> Result<Vec<Question>, StoreError> {
        let mut questions: Vec<Question> = self
            .documents(QUESTIONS)
            .iter()
            .map(|(id, doc)| normalize::parse_question(id, doc))
            .collect();
        questions.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(questions)
    }

    fn question_answers(&self) -> Result<Vec<QuestionAnswer>, StoreError> {
        let mut messages: Vec<QuestionAnswer> = self
            .documents(QUESTION_ANSWERS)
            .iter()
            .map(|(id, doc)| normalize::parse_question_answer(id, doc))
            .collect();
        messages.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(messages)
    }

    fn result_patterns(&self) -> Result<Vec<ResultPattern>, StoreError> {
        let mut patterns: Vec<ResultPattern> = self
            .documents(RESULT_PATTERNS)
            .iter()
            .map(|(id, doc)| normalize::parse_result_pattern(id, doc))
            .collect();
        patterns.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.order.cmp(&b.order))
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(patterns)
    }

    fn answers(&self) -> Result<Vec<Answer>, StoreError> {
        let mut answers: Vec<Answer> = self
            .documents(ANSWERS)
            .iter()
            .map(|(id, doc)| normalize::parse_answer(id, doc))
            .collect();
        answers.sort_by(|a, b| {
            a.created_at.cmp(&b.created_at).then_with(|| {
                let a_id = a.id.as_ref().map(|id| id.0.as_str());
                let b_id = b.id.as_ref().map(|id| id.0.as_str());
                a_id.cmp(&b_id)
            })
        });
        Ok(answers)
    }

    fn answers_for_user(&self, user_id: &UserId) -> Result<Vec<Answer>, StoreError> {
        Ok(self
            .answers()?
            .into_iter()
            .filter(|answer| answer.user_id == *user_id)
            .collect())
    }

    fn append_answer(&self, submission: AnswerSubmission) -> Result<Answer, StoreError> {
        let doc = normalize::answer_document(&submission, Utc::now());
        let (id, doc) = self.insert(ANSWERS, "ans", doc);
        Ok(normalize::parse_answer(&id, &doc))
    }

    fn is_admin(&self, user_id: &UserId) -> Result<bool, StoreError> {
        let guard = self.collections.lock().expect("store mutex poisoned");
        Ok(guard
            .get(ADMINS)
            .is_some_and(|documents| documents.contains_key(&user_id.0)))
    }
}

impl CatalogStore for InMemoryDocumentStore {
    fn create_question(&self, draft: &QuestionDraft) -> Result<Question, StoreError> {
        let (id, doc) = self.insert(QUESTIONS, "q", normalize::question_document(draft));
        Ok(normalize::parse_question(&id, &doc))
    }

    fn update_question(&self, id: &QuestionId, draft: &QuestionDraft) -> Result<(), StoreError> {
        self.replace(QUESTIONS, &id.0, normalize::question_document(draft))
    }

    fn delete_question(&self, id: &QuestionId) -> Result<(), StoreError> {
        self.remove(QUESTIONS, &id.0)
    }

    fn create_question_answer(
        &self,
        draft: &QuestionAnswerDraft,
    ) -> Result<QuestionAnswer, StoreError> {
        let (id, doc) = self.insert(
            QUESTION_ANSWERS,
            "qa",
            normalize::question_answer_document(draft),
        );
        Ok(normalize::parse_question_answer(&id, &doc))
    }

    fn update_question_answer(
        &self,
        id: &QuestionAnswerId,
        draft: &QuestionAnswerDraft,
    ) -> Result<(), StoreError> {
        self.replace(
            QUESTION_ANSWERS,
            &id.0,
            normalize::question_answer_document(draft),
        )
    }

    fn delete_question_answer(&self, id: &QuestionAnswerId) -> Result<(), StoreError> {
        self.remove(QUESTION_ANSWERS, &id.0)
    }

    fn create_result_pattern(
        &self,
        draft: &ResultPatternDraft,
    ) -> Result<ResultPattern, StoreError> {
        let (id, doc) = self.insert(
            RESULT_PATTERNS,
            "pat",
            normalize::result_pattern_document(draft),
        );
        Ok(normalize::parse_result_pattern(&id, &doc))
    }

    fn update_result_pattern(
        &self,
        id: &PatternId,
        draft: &ResultPatternDraft,
    ) -> Result<(), StoreError> {
        self.replace(
            RESULT_PATTERNS,
            &id.0,
            normalize::result_pattern_document(draft),
        )
    }

    fn delete_result_pattern(&self, id: &PatternId) -> Result<(), StoreError> {
        self.remove(RESULT_PATTERNS, &id.0)
    }
}
