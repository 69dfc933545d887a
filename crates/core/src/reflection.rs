//! Prompts attached to the reflection created when a goal is completed.

use rand::seq::IndexedRandom;

pub const REFLECTION_PROMPTS: &[&str] = &[
    "What surprised you most about achieving this goal?",
    "What would you do differently if you started over?",
    "Who helped you along the way?",
    "What skill did you develop while working on this?",
    "How has completing this goal changed your perspective?",
    "What was the hardest moment, and how did you push through?",
    "What are you most proud of in this journey?",
    "How will you build on this accomplishment?",
];

/// Pick a prompt at random.
pub fn random_prompt() -> &'static str {
    REFLECTION_PROMPTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(REFLECTION_PROMPTS[0])
}
