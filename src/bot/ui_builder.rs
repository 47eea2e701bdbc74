//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{KeyboardButton, KeyboardMarkup};

use crate::dialogue::Answer;
use crate::localization::LocalizationManager;
use crate::survey::QuestionKind;

/// Reply keyboard with one category per row
pub fn create_category_keyboard(names: &[String]) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = names
        .iter()
        .map(|name| vec![KeyboardButton::new(name.clone())])
        .collect();

    KeyboardMarkup::new(rows).resize_keyboard()
}

/// Question prompt, numbered from 1; media questions get an upload hint
pub fn format_question_prompt(
    l10n: &LocalizationManager,
    index: usize,
    question: &str,
    kind: QuestionKind,
) -> String {
    let number = (index + 1).to_string();
    let prompt = l10n.t_args(
        "question-prompt",
        &[("number", number.as_str()), ("question", question)],
    );

    match kind {
        QuestionKind::Text => prompt,
        QuestionKind::Media => format!("{prompt}\n{}", l10n.t("media-hint")),
    }
}

/// Report listing every answered question of one survey pass
pub fn format_report(l10n: &LocalizationManager, category: &str, answers: &[Answer]) -> String {
    let mut report = format!(
        "{}\n\n",
        l10n.t_args("report-title", &[("category", category)])
    );

    for answer in answers {
        let value = answer.value.to_string();
        report.push_str(&l10n.t_args("report-question", &[("question", answer.question.as_str())]));
        report.push('\n');
        report.push_str(&l10n.t_args("report-answer", &[("answer", value.as_str())]));
        report.push_str("\n\n");
    }

    report.trim_end().to_string()
}
