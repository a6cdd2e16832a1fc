//! Boundary normalization for loosely-typed store documents.
//!
//! The external document store hands back free-form JSON; each field is
//! validated individually and coerced to a default when missing or
//! ill-typed, so the matchers downstream can assume well-formed input.
//! Document keys follow the store's camelCase convention.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use super::domain::{
    Answer, AnswerCondition, AnswerId, AnswerSubmission, PatternCondition, PatternId, Question,
    QuestionAnswer, QuestionAnswerDraft, QuestionAnswerId, QuestionDraft, QuestionId,
    ResultPattern, ResultPatternDraft, UserId,
};

fn string_field(data: &Value, key: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn optional_string_field(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

fn integer_field(data: &Value, key: &str) -> i64 {
    let value = match data.get(key) {
        Some(value) => value,
        None => return 0,
    };
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|number| number as i64))
        .unwrap_or(0)
}

fn timestamp_field(data: &Value, key: &str) -> DateTime<Utc> {
    data.get(key)
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Parse a `questions` document. Non-string entries in `options` are
/// dropped rather than rejected.
pub fn parse_question(id: &str, data: &Value) -> Question {
    let options = data
        .get("options")
        .and_then(Value::as_array)
        .map(|raw| {
            raw.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Question {
        id: QuestionId(id.to_string()),
        text: string_field(data, "text"),
        options,
        order: integer_field(data, "order"),
    }
}

/// Parse an `answers` document.
pub fn parse_answer(id: &str, data: &Value) -> Answer {
    Answer {
        id: Some(AnswerId(id.to_string())),
        user_id: UserId(string_field(data, "userId")),
        user_name: string_field(data, "userName"),
        question_id: QuestionId(string_field(data, "questionId")),
        selected_option: string_field(data, "selectedOption"),
        created_at: timestamp_field(data, "createdAt"),
    }
}

/// Parse a `questionAnswers` document. A missing condition degrades to an
/// empty option, which can never match a real selection.
pub fn parse_question_answer(id: &str, data: &Value) -> QuestionAnswer {
    let selected_option = data
        .get("condition")
        .map(|condition| string_field(condition, "selectedOption"))
        .unwrap_or_default();

    QuestionAnswer {
        id: QuestionAnswerId(id.to_string()),
        question_id: QuestionId(string_field(data, "questionId")),
        name: string_field(data, "name"),
        message: string_field(data, "message"),
        description: optional_string_field(data, "description"),
        condition: AnswerCondition { selected_option },
        order: integer_field(data, "order"),
        created_at: timestamp_field(data, "createdAt"),
    }
}

/// Parse a `resultPatterns` document. Condition entries survive only when
/// they are objects carrying string `questionId` and `selectedOption`;
/// everything else is silently discarded so a malformed pattern degrades
/// to one that cannot match instead of crashing the engine.
pub fn parse_result_pattern(id: &str, data: &Value) -> ResultPattern {
    let conditions = data
        .get("conditions")
        .and_then(Value::as_array)
        .map(|raw| {
            raw.iter()
                .filter_map(|condition| {
                    let question_id = condition.get("questionId")?.as_str()?;
                    let selected_option = condition.get("selectedOption")?.as_str()?;
                    Some(PatternCondition {
                        question_id: QuestionId(question_id.to_string()),
                        selected_option: selected_option.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    ResultPattern {
        id: PatternId(id.to_string()),
        name: string_field(data, "name"),
        message: string_field(data, "message"),
        description: optional_string_field(data, "description"),
        conditions,
        priority: integer_field(data, "priority"),
        order: integer_field(data, "order"),
        created_at: timestamp_field(data, "createdAt"),
    }
}

/// Render a question draft as a store document. `createdAt` is the
/// store's to assign.
pub fn question_document(draft: &QuestionDraft) -> Value {
    json!({
        "text": draft.text,
        "options": draft.options,
        "order": draft.order,
    })
}

/// Render a personalized-message draft as a store document.
pub fn question_answer_document(draft: &QuestionAnswerDraft) -> Value {
    let mut doc = Map::new();
    doc.insert("questionId".to_string(), json!(draft.question_id.0));
    doc.insert("name".to_string(), json!(draft.name));
    doc.insert("message".to_string(), json!(draft.message));
    if let Some(description) = &draft.description {
        doc.insert("description".to_string(), json!(description));
    }
    doc.insert(
        "condition".to_string(),
        json!({ "selectedOption": draft.selected_option }),
    );
    doc.insert("order".to_string(), json!(draft.order));
    Value::Object(doc)
}

/// Render a result-pattern draft as a store document.
pub fn result_pattern_document(draft: &ResultPatternDraft) -> Value {
    let conditions: Vec<Value> = draft
        .conditions
        .iter()
        .map(|condition| {
            json!({
                "questionId": condition.question_id.0,
                "selectedOption": condition.selected_option,
            })
        })
        .collect();

    let mut doc = Map::new();
    doc.insert("name".to_string(), json!(draft.name));
    doc.insert("message".to_string(), json!(draft.message));
    if let Some(description) = &draft.description {
        doc.insert("description".to_string(), json!(description));
    }
    doc.insert("conditions".to_string(), Value::Array(conditions));
    doc.insert("priority".to_string(), json!(draft.priority));
    doc.insert("order".to_string(), json!(draft.order));
    Value::Object(doc)
}

/// Render an answer submission as a store document with the given
/// server-side timestamp.
pub fn answer_document(submission: &AnswerSubmission, created_at: DateTime<Utc>) -> Value {
    json!({
        "userId": submission.user_id.0,
        "userName": submission.user_name,
        "questionId": submission.question_id.0,
        "selectedOption": submission.selected_option,
        "createdAt": created_at.to_rfc3339(),
    })
}
