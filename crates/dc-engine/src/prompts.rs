//! Generation prompts for each coaching moment.

use dc_core::{Addiction, Unit};

use crate::ports::PromptMessage;

/// Sent in place of generated text when the generator fails.
pub const FALLBACK_TEXT: &str = "The generator is down. Your discipline isn't. Get to work.";

pub fn oath() -> Vec<PromptMessage> {
    vec![PromptMessage::user(
        "Write a short, intense message demanding a new user's commitment. \
         Tell them to swear an oath by pressing the button. Three sentences at most.",
    )]
}

pub fn oath_sworn() -> Vec<PromptMessage> {
    vec![PromptMessage::user(
        "I just swore an oath to be honest with you. Acknowledge it in one sharp line, \
         then welcome me.",
    )]
}

pub fn motivation() -> Vec<PromptMessage> {
    vec![PromptMessage::user(
        "Give me one hard-hitting piece of advice about discipline, money or mental \
         toughness. Be direct.",
    )]
}

pub fn morning_motivation() -> Vec<PromptMessage> {
    vec![PromptMessage::user(
        "Write an aggressive motivational message for me to wake up to. No fluff.",
    )]
}

pub fn journal_review(entry: &str) -> Vec<PromptMessage> {
    vec![PromptMessage::user(format!(
        "Review my journal entry with brutal honesty. Focus on mindset, money and \
         fitness. Entry:\n\n\"{entry}\""
    ))]
}

pub fn habit_created(name: &str, unit: &Unit) -> Vec<PromptMessage> {
    vec![PromptMessage::user(format!(
        "I just committed to the habit \"{name}\", measured in {unit}. Tell me not to fail."
    ))]
}

pub fn addiction_created(name: &str, why: &str) -> Vec<PromptMessage> {
    vec![PromptMessage::user(format!(
        "I am quitting \"{name}\" because \"{why}\". Tell me this reason is my anchor."
    ))]
}

/// Follows up on the relapse notice the user was just shown.
pub fn relapse(addiction: &Addiction, logged: &str) -> Vec<PromptMessage> {
    vec![
        PromptMessage::assistant(logged),
        PromptMessage::user(format!(
            "I quit \"{}\" because \"{}\" and I still failed. Don't comfort me. \
             Demand that I restart right now.",
            addiction.name, addiction.why
        )),
    ]
}

pub fn reasons(addictions: &[Addiction]) -> Vec<PromptMessage> {
    let reasons = addictions
        .iter()
        .map(|addiction| format!("- {}: {}", addiction.name, addiction.why))
        .collect::<Vec<_>>()
        .join("\n");
    vec![PromptMessage::user(format!(
        "Remind me why I started. Make it land. My reasons:\n{reasons}"
    ))]
}

#[cfg(test)]
mod tests {
    use dc_core::AddictionId;

    use super::*;
    use crate::ports::PromptRole;

    #[test]
    fn reasons_lists_every_addiction() {
        let addictions = vec![
            Addiction {
                id: AddictionId::new("a").unwrap(),
                name: "Sugar".to_string(),
                why: "energy".to_string(),
                streak: 0,
                last_clean_day: None,
            },
            Addiction {
                id: AddictionId::new("b").unwrap(),
                name: "Scrolling".to_string(),
                why: "focus".to_string(),
                streak: 0,
                last_clean_day: None,
            },
        ];
        let prompt = reasons(&addictions);
        assert_eq!(prompt.len(), 1);
        assert!(prompt[0].content.ends_with("- Sugar: energy\n- Scrolling: focus"));
    }

    #[test]
    fn relapse_replays_the_notice_before_the_user_turn() {
        let addiction = Addiction {
            id: AddictionId::new("a").unwrap(),
            name: "Sugar".to_string(),
            why: "energy".to_string(),
            streak: 0,
            last_clean_day: None,
        };
        let prompt = relapse(&addiction, "Relapse logged.");
        assert_eq!(prompt[0], PromptMessage::assistant("Relapse logged."));
        assert_eq!(prompt[1].role, PromptRole::User);
        assert!(prompt[1].content.contains("because \"energy\""));
    }

    #[test]
    fn journal_review_quotes_entry() {
        let prompt = journal_review("skipped the gym");
        assert!(prompt[0].content.contains("\"skipped the gym\""));
    }
}
