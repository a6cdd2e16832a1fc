use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for survey questions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub String);

/// Identifier wrapper for recorded answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerId(pub String);

/// Identifier wrapper for personalized per-choice messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionAnswerId(pub String);

/// Identifier wrapper for result patterns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternId(pub String);

/// Identifier wrapper for end users, anonymous or named.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// A multiple-choice question. `options` is the closed set of legal
/// answers; `order` positions the question within the survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<String>,
    pub order: i64,
}

/// One recorded answer. Append-only: re-answering a question creates an
/// additional record rather than overwriting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<AnswerId>,
    pub user_id: UserId,
    pub user_name: String,
    pub question_id: QuestionId,
    pub selected_option: String,
    pub created_at: DateTime<Utc>,
}

/// Client-supplied answer payload; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub user_id: UserId,
    pub user_name: String,
    pub question_id: QuestionId,
    pub selected_option: String,
}

/// The single-option condition attached to a personalized message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCondition {
    pub selected_option: String,
}

/// Personalized per-choice feedback for one specific option on one
/// specific question. Several records may target the same choice; the
/// matcher picks the lowest `(order, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub id: QuestionAnswerId,
    pub question_id: QuestionId,
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub condition: AnswerCondition,
    pub order: i64,
    pub created_at: DateTime<Utc>,
}

/// A single (question, option) requirement within a result pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCondition {
    pub question_id: QuestionId,
    pub selected_option: String,
}

/// An outcome the survey can resolve to. `conditions` is conjunctive;
/// `priority` ranks patterns, condition count breaks priority ties.
/// `order` is a display key only and never feeds match selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPattern {
    pub id: PatternId,
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub conditions: Vec<PatternCondition>,
    pub priority: i64,
    pub order: i64,
    pub created_at: DateTime<Utc>,
}

/// Admin form payload for creating or updating a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub order: i64,
}

/// Admin form payload for a personalized per-choice message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswerDraft {
    pub question_id: QuestionId,
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub selected_option: String,
    #[serde(default)]
    pub order: i64,
}

/// Admin form payload for a result pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPatternDraft {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub conditions: Vec<PatternCondition>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub order: i64,
}
