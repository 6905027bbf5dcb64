//! User prompt collaborator.
//!
//! Passed explicitly to every operation that may need to ask the user for
//! text. `None` always means the user cancelled.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Asks the user for a line of text.
pub trait UserPrompt {
    /// Returns the answer, or `None` when the user cancelled.
    fn ask(&self, question: &str, default_value: Option<&str>) -> Option<String>;
}

/// Prompt used when no prompt integration is available.
///
/// Answers with the default value when one is given, otherwise cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl UserPrompt for NoPrompt {
    fn ask(&self, _question: &str, default_value: Option<&str>) -> Option<String> {
        default_value.map(str::to_string)
    }
}

/// Prompt that replays queued answers in order, then cancels.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<Option<String>>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(|a| a.map(Into::into)).collect()),
            questions: Mutex::new(Vec::new()),
        }
    }

    /// Questions asked so far, in order.
    pub fn questions(&self) -> Vec<String> {
        self.questions
            .lock()
            .map(|questions| questions.clone())
            .unwrap_or_default()
    }
}

impl UserPrompt for ScriptedPrompt {
    fn ask(&self, question: &str, _default_value: Option<&str>) -> Option<String> {
        if let Ok(mut questions) = self.questions.lock() {
            questions.push(question.to_string());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::{NoPrompt, ScriptedPrompt, UserPrompt};

    #[test]
    fn no_prompt_returns_default_or_cancels() {
        assert_eq!(NoPrompt.ask("q", Some("d")).as_deref(), Some("d"));
        assert_eq!(NoPrompt.ask("q", None), None);
    }

    #[test]
    fn scripted_prompt_replays_answers_then_cancels() {
        let prompt = ScriptedPrompt::new([Some("one"), None]);
        assert_eq!(prompt.ask("first", None).as_deref(), Some("one"));
        assert_eq!(prompt.ask("second", None), None);
        assert_eq!(prompt.ask("third", Some("x")), None);
        assert_eq!(prompt.questions(), vec!["first", "second", "third"]);
    }
}
