//! The persisted training profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Preferred communication style, picked on the last-but-one step of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Direct,
    Detailed,
    Casual,
    Formal,
    Creative,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Direct => "direct",
            Style::Detailed => "detailed",
            Style::Casual => "casual",
            Style::Formal => "formal",
            Style::Creative => "creative",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Some(Style::Direct),
            "detailed" => Some(Style::Detailed),
            "casual" => Some(Style::Casual),
            "formal" => Some(Style::Formal),
            "creative" => Some(Style::Creative),
            _ => None,
        }
    }

    pub fn all() -> Vec<Style> {
        vec![
            Style::Direct,
            Style::Detailed,
            Style::Casual,
            Style::Formal,
            Style::Creative,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Style::Direct => "Direct - get to the point",
            Style::Detailed => "Detailed - cover everything",
            Style::Casual => "Casual - keep it friendly",
            Style::Formal => "Formal - keep it professional",
            Style::Creative => "Creative - think outside the box",
        }
    }

    /// Phrase substituted for "your communication style" in chat replies.
    pub fn descriptor(&self) -> &'static str {
        match self {
            Style::Direct => "direct and to-the-point",
            Style::Detailed => "comprehensive and thorough",
            Style::Casual => "friendly and conversational",
            Style::Formal => "professional and structured",
            Style::Creative => "innovative and expressive",
        }
    }
}

/// Everything the training form collects, plus submission metadata.
///
/// Written once at submission and overwritten wholesale on re-submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub approach: String,
    #[serde(default)]
    pub tools: String,
    #[serde(default)]
    pub style: Option<Style>,
    #[serde(default)]
    pub example: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub trained: bool,
}

impl Profile {
    /// Up to two uppercase initials from the name, "Y" (for "You") when unnamed.
    pub fn initials(&self) -> String {
        initials_of(&self.name)
    }
}

/// Avatar initials for a display name. A blank name stands for "You".
pub fn initials_of(name: &str) -> String {
    let name = match name.trim() {
        "" => "You",
        trimmed => trimmed,
    };
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}
