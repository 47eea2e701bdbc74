use anyhow::Result;
use std::path::PathBuf;
use teloxide::types::FileId;

use survey_bot::dialogue::{
    transition, Action, AnswerValue, InboundEvent, MediaKind, MediaRef, SurveyProgress,
    SurveyState,
};
use survey_bot::survey::{Category, QuestionKind, SurveyCatalog};

fn progress(index: usize) -> SurveyProgress {
    SurveyProgress {
        category: "Feedback".to_string(),
        index,
        answers: Vec::new(),
    }
}

fn photo() -> MediaRef {
    MediaRef {
        kind: MediaKind::Photo,
        file_id: FileId("photo-1".to_string()),
    }
}

fn all_states() -> Vec<SurveyState> {
    vec![
        SurveyState::Idle,
        SurveyState::SelectingCategory,
        SurveyState::AnsweringText(progress(0)),
        SurveyState::AnsweringMedia(progress(2)),
    ]
}

/// Commands are honoured in every state
#[test]
fn test_commands_win_in_every_state() {
    for state in all_states() {
        assert_eq!(transition(state.clone(), InboundEvent::Start), Action::StartSession);
        assert_eq!(transition(state.clone(), InboundEvent::GetMedia), Action::ListMedia);
        assert_eq!(transition(state, InboundEvent::GetLogs), Action::FetchLogs);
    }
}

/// Idle users are always pointed at /start
#[test]
fn test_idle_prompts_for_start() {
    for event in [
        InboundEvent::Text("Feedback".to_string()),
        InboundEvent::Media(photo()),
        InboundEvent::Unsupported,
    ] {
        assert_eq!(transition(SurveyState::Idle, event), Action::PromptStart);
    }
}

/// The selection state only accepts text
#[test]
fn test_selecting_category_transitions() {
    assert_eq!(
        transition(
            SurveyState::SelectingCategory,
            InboundEvent::Text("Feedback".to_string())
        ),
        Action::SelectCategory("Feedback".to_string())
    );
    assert_eq!(
        transition(SurveyState::SelectingCategory, InboundEvent::Media(photo())),
        Action::RepromptCategory
    );
    assert_eq!(
        transition(SurveyState::SelectingCategory, InboundEvent::Unsupported),
        Action::RepromptCategory
    );
}

/// Text state accepts text only, media state accepts media only
#[test]
fn test_answer_state_transitions() {
    assert_eq!(
        transition(
            SurveyState::AnsweringText(progress(1)),
            InboundEvent::Text("Paris".to_string())
        ),
        Action::SubmitText(progress(1), "Paris".to_string())
    );
    assert_eq!(
        transition(SurveyState::AnsweringText(progress(1)), InboundEvent::Media(photo())),
        Action::RepromptText(progress(1))
    );
    assert_eq!(
        transition(SurveyState::AnsweringMedia(progress(2)), InboundEvent::Media(photo())),
        Action::SubmitMedia(progress(2), photo())
    );
    assert_eq!(
        transition(
            SurveyState::AnsweringMedia(progress(2)),
            InboundEvent::Text("a photo".to_string())
        ),
        Action::RepromptMedia(progress(2))
    );
}

/// Default state is idle
#[test]
fn test_default_state() {
    assert_eq!(SurveyState::default(), SurveyState::Idle);
    assert!(SurveyState::SelectingCategory.progress().is_none());
    assert_eq!(
        SurveyState::AnsweringMedia(progress(3)).progress().map(|p| p.index),
        Some(3)
    );
}

/// Index goes up by one per answer and answers keep question order
#[tokio::test]
async fn test_progress_through_whole_category() -> Result<()> {
    let catalog = SurveyCatalog::new(vec![Category::new(
        "Feedback",
        vec![
            "Name?".to_string(),
            "City?".to_string(),
            "Upload photo".to_string(),
            "Upload video".to_string(),
        ],
    )])?;
    let category = catalog.get("Feedback").unwrap();

    let mut progress = SurveyProgress::new("Feedback");
    let values = [
        AnswerValue::Text("Alice".to_string()),
        AnswerValue::Text("Paris".to_string()),
        AnswerValue::Media {
            kind: MediaKind::Photo,
            path: PathBuf::from("media_files/1_photo.jpg"),
        },
        AnswerValue::Media {
            kind: MediaKind::Video,
            path: PathBuf::from("media_files/1_video.mp4"),
        },
    ];

    for (expected_index, value) in values.into_iter().enumerate() {
        assert_eq!(progress.index, expected_index);
        let kind = category.question_kind(progress.index).unwrap();
        let is_media = matches!(value, AnswerValue::Media { .. });
        assert_eq!(kind == QuestionKind::Media, is_media);
        progress.record(category, value)?;
    }

    assert_eq!(progress.index, 4);
    assert_eq!(category.question_kind(progress.index), None);
    let questions: Vec<_> = progress.answers.iter().map(|a| a.question.as_str()).collect();
    assert_eq!(questions, vec!["Name?", "City?", "Upload photo", "Upload video"]);
    Ok(())
}

/// Dialogue states survive a serde round trip, so any storage backend can hold them
#[test]
fn test_state_serialization() -> Result<()> {
    let mut p = progress(3);
    p.answers.push(survey_bot::dialogue::Answer {
        question: "Upload photo".to_string(),
        value: AnswerValue::Media {
            kind: MediaKind::Photo,
            path: PathBuf::from("media_files/1_photo.jpg"),
        },
    });
    let state = SurveyState::AnsweringMedia(p);

    let json = serde_json::to_string(&state)?;
    let restored: SurveyState = serde_json::from_str(&json)?;
    assert_eq!(restored, state);
    Ok(())
}
