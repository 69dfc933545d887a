//! Goal reaction kinds.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Fire,
    Heart,
    Clap,
    Star,
}

impl ReactionKind {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim() {
            "fire" => Ok(Self::Fire),
            "heart" => Ok(Self::Heart),
            "clap" => Ok(Self::Clap),
            "star" => Ok(Self::Star),
            other => Err(CoreError::Validation(format!(
                "Invalid reaction type '{other}'. Must be: fire, heart, clap, or star"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Heart => "heart",
            Self::Clap => "clap",
            Self::Star => "star",
        }
    }
}
