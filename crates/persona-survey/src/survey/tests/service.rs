use std::sync::Arc;

use super::common::{
    answer, pattern, question_answer, submission, two_question_catalog, InMemoryStore,
    UnavailableStore,
};
use crate::survey::domain::{
    PatternCondition, QuestionAnswerDraft, QuestionDraft, QuestionId, ResultPatternDraft, UserId,
};
use crate::survey::forms::ValidationError;
use crate::survey::service::{AdminService, AdminServiceError, SurveyService, SurveyServiceError};
use crate::survey::store::StoreError;

fn survey_service(store: Arc<InMemoryStore>) -> SurveyService<InMemoryStore> {
    SurveyService::new(store)
}

fn seeded_store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::seeded(
        two_question_catalog(),
        vec![
            question_answer("qa2", "q1", "Coffee", 2),
            question_answer("qa1", "q1", "Coffee", 1),
        ],
        vec![
            pattern("broad", 5, 1, &[("q1", "Coffee")]),
            pattern("specific", 5, 0, &[("q1", "Coffee"), ("q2", "Night")]),
        ],
    ))
}

#[test]
fn submit_answer_persists_and_returns_lowest_order_feedback() {
    let store = seeded_store();
    let service = survey_service(store.clone());

    let submitted = service
        .submit_answer(submission("q1", "Coffee"))
        .expect("legal answer accepted");

    assert_eq!(submitted.answer.question_id.0, "q1");
    assert!(submitted.answer.id.is_some());
    assert_eq!(submitted.feedback.expect("feedback matched").id.0, "qa1");
    assert_eq!(store.recorded_answers().len(), 1);
}

#[test]
fn submit_answer_without_feedback_is_not_an_error() {
    let store = seeded_store();
    let service = survey_service(store);

    let submitted = service
        .submit_answer(submission("q2", "Night"))
        .expect("legal answer accepted");

    assert!(submitted.feedback.is_none());
}

#[test]
fn resubmission_appends_instead_of_overwriting() {
    let store = seeded_store();
    let service = survey_service(store.clone());

    service
        .submit_answer(submission("q1", "Coffee"))
        .expect("first answer accepted");
    service
        .submit_answer(submission("q1", "Tea"))
        .expect("second answer accepted");

    assert_eq!(store.recorded_answers().len(), 2);
}

#[test]
fn submit_answer_rejects_unknown_question_and_illegal_option() {
    let service = survey_service(seeded_store());

    assert!(matches!(
        service.submit_answer(submission("q9", "Coffee")),
        Err(SurveyServiceError::UnknownQuestion(_))
    ));
    assert!(matches!(
        service.submit_answer(submission("q1", "Juice")),
        Err(SurveyServiceError::IllegalOption { .. })
    ));
}

#[test]
fn resolve_result_returns_none_as_a_normal_branch() {
    let service = survey_service(seeded_store());

    let outcome = service
        .resolve_result(&[answer("q2", "Morning")])
        .expect("store reachable");
    assert!(outcome.is_none());
}

#[test]
fn result_for_user_matches_over_stored_answers() {
    let store = seeded_store();
    let service = survey_service(store);

    service
        .submit_answer(submission("q1", "Coffee"))
        .expect("accepted");
    service
        .submit_answer(submission("q2", "Night"))
        .expect("accepted");

    let outcome = service
        .result_for_user(&UserId("user-1".to_string()))
        .expect("store reachable")
        .expect("pattern matched");
    assert_eq!(outcome.id.0, "specific");
}

#[test]
fn tally_groups_answers_under_their_questions() {
    let store = seeded_store();
    let service = survey_service(store);

    service
        .submit_answer(submission("q1", "Coffee"))
        .expect("accepted");
    service
        .submit_answer(submission("q1", "Coffee"))
        .expect("accepted");
    service
        .submit_answer(submission("q2", "Night"))
        .expect("accepted");

    let tallies = service.tally().expect("store reachable");
    assert_eq!(tallies.len(), 2);
    assert_eq!(tallies[0].question_id.0, "q1");
    assert_eq!(tallies[0].answers.len(), 2);
    assert_eq!(tallies[0].option_counts.get("Coffee"), Some(&2));
    assert_eq!(tallies[1].answers.len(), 1);
}

#[test]
fn store_outage_is_a_distinct_error_not_an_empty_ruleset() {
    let service = SurveyService::new(Arc::new(UnavailableStore));

    assert!(matches!(
        service.resolve_result(&[answer("q1", "Coffee")]),
        Err(SurveyServiceError::Store(StoreError::Unavailable(_)))
    ));
}

#[test]
fn admin_writes_require_the_admin_flag() {
    let store = seeded_store();
    let admin = AdminService::new(store);
    let outsider = UserId("nobody".to_string());

    let draft = QuestionDraft {
        text: "New question".to_string(),
        options: vec!["A".to_string(), "B".to_string()],
        order: 3,
    };

    assert!(matches!(
        admin.create_question(&outsider, draft),
        Err(AdminServiceError::AccessDenied)
    ));
}

#[test]
fn admin_question_crud_round_trip() {
    let store = seeded_store();
    store.grant_admin("admin-1");
    let actor = UserId("admin-1".to_string());
    let admin = AdminService::new(store.clone());
    let survey = survey_service(store);

    let created = admin
        .create_question(
            &actor,
            QuestionDraft {
                text: "Cats or dogs?".to_string(),
                options: vec!["Cats".to_string(), " Dogs ".to_string(), " ".to_string()],
                order: 3,
            },
        )
        .expect("question created");
    assert_eq!(created.options, vec!["Cats", "Dogs"], "blank options dropped");

    admin
        .update_question(
            &actor,
            &created.id,
            QuestionDraft {
                text: "Cats, dogs, or birds?".to_string(),
                options: vec!["Cats".to_string(), "Dogs".to_string(), "Birds".to_string()],
                order: 3,
            },
        )
        .expect("question updated");

    let questions = survey.questions().expect("store reachable");
    let updated = questions
        .iter()
        .find(|question| question.id == created.id)
        .expect("still listed");
    assert_eq!(updated.options.len(), 3);

    admin
        .delete_question(&actor, &created.id)
        .expect("question deleted");
    assert!(matches!(
        admin.delete_question(&actor, &created.id),
        Err(AdminServiceError::Store(StoreError::NotFound))
    ));
}

#[test]
fn admin_validation_blocks_bad_drafts() {
    let store = seeded_store();
    store.grant_admin("admin-1");
    let actor = UserId("admin-1".to_string());
    let admin = AdminService::new(store);

    let err = admin
        .create_question_answer(
            &actor,
            QuestionAnswerDraft {
                question_id: QuestionId("q1".to_string()),
                name: "n".to_string(),
                message: "m".to_string(),
                description: None,
                selected_option: "Juice".to_string(),
                order: 0,
            },
        )
        .expect_err("option not offered");
    assert!(matches!(
        err,
        AdminServiceError::Validation(ValidationError::OptionNotInQuestion)
    ));

    let err = admin
        .create_result_pattern(
            &actor,
            ResultPatternDraft {
                name: "n".to_string(),
                message: "m".to_string(),
                description: None,
                conditions: Vec::new(),
                priority: 1,
                order: 0,
            },
        )
        .expect_err("empty conjunction rejected");
    assert!(matches!(
        err,
        AdminServiceError::Validation(ValidationError::TooFewConditions)
    ));
}

#[test]
fn admin_pattern_crud_round_trip() {
    let store = seeded_store();
    store.grant_admin("admin-1");
    let actor = UserId("admin-1".to_string());
    let admin = AdminService::new(store.clone());
    let survey = survey_service(store);

    let created = admin
        .create_result_pattern(
            &actor,
            ResultPatternDraft {
                name: "Tea person".to_string(),
                message: "Calm and collected".to_string(),
                description: None,
                conditions: vec![PatternCondition {
                    question_id: QuestionId("q1".to_string()),
                    selected_option: "Tea".to_string(),
                }],
                priority: 9,
                order: 0,
            },
        )
        .expect("pattern created");

    let outcome = survey
        .resolve_result(&[answer("q1", "Tea")])
        .expect("store reachable")
        .expect("new pattern matches");
    assert_eq!(outcome.id, created.id);

    admin
        .delete_result_pattern(&actor, &created.id)
        .expect("pattern deleted");
    let outcome = survey
        .resolve_result(&[answer("q1", "Tea")])
        .expect("store reachable");
    assert!(outcome.is_none());
}
