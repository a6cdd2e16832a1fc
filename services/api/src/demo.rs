use crate::infra::InMemoryDocumentStore;
use clap::Args;
use persona_survey::error::AppError;
use persona_survey::survey::domain::{
    AnswerSubmission, PatternCondition, QuestionAnswerDraft, QuestionDraft, ResultPatternDraft,
    UserId,
};
use persona_survey::survey::progress::{SurveyAdvance, SurveyPhase, SurveySession};
use persona_survey::survey::service::{AdminService, SurveyService};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Display name for the demo respondent
    #[arg(long, default_value = "Ada")]
    pub(crate) user_name: String,
    /// Option to pick, one flag per question in survey order. A pick that
    /// is not offered by its question falls back to the first option.
    #[arg(long = "pick", default_values_t = [
        "Tea".to_string(),
        "Night".to_string(),
        "Sea".to_string(),
    ])]
    pub(crate) picks: Vec<String>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { user_name, picks } = args;

    let store = Arc::new(InMemoryDocumentStore::default());
    store.grant_admin("demo-admin");
    let admin = AdminService::new(store.clone());
    let survey = SurveyService::new(store);
    let actor = UserId("demo-admin".to_string());

    println!("Persona survey demo");
    seed_catalog(&admin, &actor)?;

    let questions = survey.questions()?;
    let question_answers = survey.question_answers()?;
    let patterns = survey.result_patterns()?;
    println!(
        "Catalog: {} questions, {} personalized messages, {} result patterns",
        questions.len(),
        question_answers.len(),
        patterns.len()
    );

    let user_id = UserId("demo-user".to_string());
    let mut session = SurveySession::new(questions);
    let mut answered = 0usize;

    while let SurveyPhase::Answering { index } = session.phase() {
        let question = match session.current_question() {
            Some(question) => question.clone(),
            None => break,
        };

        let choice = picks
            .get(answered)
            .filter(|pick| question.options.iter().any(|option| option == *pick))
            .cloned()
            .or_else(|| question.options.first().cloned())
            .unwrap_or_default();

        println!("\nQ{}: {}", index + 1, question.text);
        println!("  options: {}", question.options.join(" | "));
        println!("  {user_name} picks: {choice}");

        if let Err(err) = session.stage(&choice) {
            println!("  selection rejected: {err}");
            return Ok(());
        }

        let submitted = survey.submit_answer(AnswerSubmission {
            user_id: user_id.clone(),
            user_name: user_name.clone(),
            question_id: question.id.clone(),
            selected_option: choice,
        })?;

        match session.record(submitted.answer, &question_answers) {
            Ok(Some(feedback)) => println!("  feedback: {} ({})", feedback.message, feedback.name),
            Ok(None) => println!("  feedback: none for this choice"),
            Err(err) => {
                println!("  answer not recorded: {err}");
                return Ok(());
            }
        }
        answered += 1;

        match session.advance(&patterns) {
            Ok(SurveyAdvance::NextQuestion { .. }) => {}
            Ok(SurveyAdvance::Completed { pattern }) => {
                println!("\nSurvey complete after {answered} answers");
                match pattern {
                    Some(pattern) => {
                        println!("  result: {}", pattern.name);
                        println!("  {}", pattern.message);
                    }
                    None => println!("  result: no pattern matched, showing the generic screen"),
                }
            }
            Err(err) => {
                println!("  session stalled: {err}");
                return Ok(());
            }
        }
    }

    let tallies = survey.tally()?;
    println!("\nResponse tally");
    for tally in &tallies {
        println!("- {}", tally.text);
        for (option, count) in &tally.option_counts {
            println!("    {option}: {count}");
        }
    }

    Ok(())
}

fn seed_catalog(
    admin: &AdminService<InMemoryDocumentStore>,
    actor: &UserId,
) -> Result<(), AppError> {
    let q1 = admin.create_question(
        actor,
        QuestionDraft {
            text: "Coffee or tea?".to_string(),
            options: vec!["Coffee".to_string(), "Tea".to_string()],
            order: 1,
        },
    )?;
    let q2 = admin.create_question(
        actor,
        QuestionDraft {
            text: "Morning person or night person?".to_string(),
            options: vec!["Morning".to_string(), "Night".to_string()],
            order: 2,
        },
    )?;
    let q3 = admin.create_question(
        actor,
        QuestionDraft {
            text: "Mountains or sea?".to_string(),
            options: vec!["Mountains".to_string(), "Sea".to_string()],
            order: 3,
        },
    )?;

    admin.create_question_answer(
        actor,
        QuestionAnswerDraft {
            question_id: q1.id.clone(),
            name: "Tea drinker".to_string(),
            message: "Steeped in patience already.".to_string(),
            description: None,
            selected_option: "Tea".to_string(),
            order: 1,
        },
    )?;

    admin.create_result_pattern(
        actor,
        ResultPatternDraft {
            name: "Night owl".to_string(),
            message: "You do your best thinking after dark.".to_string(),
            description: None,
            conditions: vec![PatternCondition {
                question_id: q2.id.clone(),
                selected_option: "Night".to_string(),
            }],
            priority: 10,
            order: 1,
        },
    )?;
    admin.create_result_pattern(
        actor,
        ResultPatternDraft {
            name: "Beach dreamer".to_string(),
            message: "Salt air over summit views, every time.".to_string(),
            description: None,
            conditions: vec![PatternCondition {
                question_id: q3.id.clone(),
                selected_option: "Sea".to_string(),
            }],
            priority: 5,
            order: 2,
        },
    )?;
    admin.create_result_pattern(
        actor,
        ResultPatternDraft {
            name: "Quiet morning type".to_string(),
            message: "Tea at sunrise and a slow start.".to_string(),
            description: None,
            conditions: vec![
                PatternCondition {
                    question_id: q1.id.clone(),
                    selected_option: "Tea".to_string(),
                },
                PatternCondition {
                    question_id: q2.id,
                    selected_option: "Morning".to_string(),
                },
            ],
            priority: 5,
            order: 3,
        },
    )?;

    Ok(())
}
