use std::fmt;
use std::str::FromStr;

use glean_common::GleanError;

pub const TRANSLATE_INSTRUCTION: &str = "Translate the following text to Persian:";
pub const SUMMARY_INSTRUCTION: &str = "Provide a concise summary of the following text:";
pub const TRANSLATE_SUMMARY_INSTRUCTION: &str = "First, provide a concise summary of the following text, then translate the Summarized text to Persian:";

/// What the model is asked to do with the extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Translate,
    Summary,
    TranslateSummary,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Translate, Action::Summary, Action::TranslateSummary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Translate => "translate",
            Action::Summary => "summary",
            Action::TranslateSummary => "translate-summary",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Action::Translate => TRANSLATE_INSTRUCTION,
            Action::Summary => SUMMARY_INSTRUCTION,
            Action::TranslateSummary => TRANSLATE_SUMMARY_INSTRUCTION,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = GleanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| GleanError::InvalidAction(s.to_string()))
    }
}

/// Instruction line, a newline, then the input text exactly as given.
pub fn build_prompt(action: Action, text: &str) -> String {
    format!("{}\n{}", action.instruction(), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_prompt_starts_with_instruction_then_exact_text() {
        let text = "  Leading space, trailing newline\n";
        let prompt = build_prompt(Action::Translate, text);
        assert!(prompt.starts_with(TRANSLATE_INSTRUCTION));
        assert_eq!(&prompt[TRANSLATE_INSTRUCTION.len()..], format!("\n{text}"));
    }

    #[test]
    fn every_action_round_trips_through_its_name() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = "translate-everything".parse::<Action>().unwrap_err();
        assert!(matches!(err, GleanError::InvalidAction(a) if a == "translate-everything"));
    }

    #[test]
    fn prompts_match_the_fixed_wording() {
        assert_eq!(
            build_prompt(Action::Translate, "x"),
            "Translate the following text to Persian:\nx"
        );
        assert_eq!(
            build_prompt(Action::Summary, "x"),
            "Provide a concise summary of the following text:\nx"
        );
        assert_eq!(
            build_prompt(Action::TranslateSummary, "x"),
            "First, provide a concise summary of the following text, \
             then translate the Summarized text to Persian:\nx"
        );
    }
}
