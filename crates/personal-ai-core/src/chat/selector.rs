//! Rule-based reply synthesis: classify, pick a template, personalize.

use crate::profile::Profile;
use crate::random::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Greeting,
    ProblemSolving,
    Productivity,
    Explanation,
    General,
}

/// Keyword sets in priority order. First category with any hit wins.
const KEYWORDS: [(Category, &[&str]); 4] = [
    (Category::Greeting, &["hello", "hi", "hey"]),
    (Category::ProblemSolving, &["problem", "solve", "challenge"]),
    (Category::Productivity, &["productive", "efficiency", "organize"]),
    (Category::Explanation, &["explain", "how", "what is"]),
];

const GREETING: [&str; 3] = [
    "Hello! I'm here to help you think through problems just like you would. What's on your mind?",
    "Hi there! I've learned your thinking patterns and I'm ready to assist. What would you like to explore?",
    "Hey! Ready to dive into some problem-solving together? What challenge are you facing?",
];

const PROBLEM_SOLVING: [&str; 3] = [
    "Let me think about this the way you would... First, I'd break this down into smaller, manageable parts. What specific aspect would you like to tackle first?",
    "Based on your approach, I'd start by gathering all the relevant information. Have you considered what resources or constraints we're working with?",
    "This reminds me of how you described your problem-solving process. Let's approach it systematically - what's the core issue here?",
];

const PRODUCTIVITY: [&str; 3] = [
    "From what I know about your work style, you seem to value efficiency and structure. Have you tried breaking this task into smaller, time-boxed chunks?",
    "Based on your preferred tools and methods, I'd suggest starting with a clear outline. What's the most important outcome you're aiming for?",
    "You mentioned you like systematic approaches. Let's prioritize - what's the one thing that would make the biggest impact?",
];

const EXPLANATION: [&str; 3] = [
    "Let me explain this in a way that matches your communication style. I'll keep it clear and practical...",
    "Based on how you like to process information, let me break this down step by step...",
    "I'll explain this using the kind of logical structure you prefer...",
];

const GENERAL: [&str; 3] = [
    "That's an interesting question. Given your background and thinking style, here's how I'd approach it...",
    "Let me think about this from your perspective. Based on your experience in your field...",
    "This is the kind of challenge where your systematic approach would really shine. Here's what I'm thinking...",
];

/// Appended when the user asks about their approach, keyed on what the profile says.
const APPROACH_SUFFIXES: [(&str, &str); 3] = [
    (
        "systematic",
        " I notice you prefer systematic approaches, so let's break this down methodically.",
    ),
    (
        "creative",
        " Given your creative problem-solving style, let's explore some innovative angles.",
    ),
    (
        "collaborative",
        " Since you value collaboration, consider who else might have insights on this.",
    ),
];

impl Category {
    pub fn templates(&self) -> &'static [&'static str] {
        match self {
            Category::Greeting => &GREETING,
            Category::ProblemSolving => &PROBLEM_SOLVING,
            Category::Productivity => &PRODUCTIVITY,
            Category::Explanation => &EXPLANATION,
            Category::General => &GENERAL,
        }
    }
}

/// Case-insensitive substring match against the keyword table.
///
/// No word boundaries: "hiking" is a greeting.
pub fn classify(input: &str) -> Category {
    let input = input.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| input.contains(w)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

pub fn pick_template(category: Category, rng: &mut impl RandomSource) -> &'static str {
    let templates = category.templates();
    templates[rng.pick(templates.len())]
}

/// Substitute profile details into a template. Each substitution hits the
/// first occurrence only.
pub fn personalize(template: &str, profile: &Profile, input: &str) -> String {
    let mut response = template.to_string();

    if !profile.field.is_empty() {
        response = response.replacen("your field", &profile.field.to_lowercase(), 1);
    }

    if let Some(style) = profile.style {
        response = response.replacen("your communication style", style.descriptor(), 1);
    }

    if input.to_lowercase().contains("approach") && !profile.approach.is_empty() {
        let approach = profile.approach.to_lowercase();
        if let Some((_, suffix)) = APPROACH_SUFFIXES
            .iter()
            .find(|(keyword, _)| approach.contains(keyword))
        {
            response.push_str(suffix);
        }
    }

    response
}

/// Turns user input into a canned reply, personalized when a profile is loaded.
#[derive(Debug, Clone, Default)]
pub struct ResponseSelector {
    profile: Option<Profile>,
}

impl ResponseSelector {
    pub fn new(profile: Option<Profile>) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn respond(&self, input: &str, rng: &mut impl RandomSource) -> String {
        let category = classify(input);
        let template = pick_template(category, rng);
        tracing::debug!(?category, "selected reply template");

        match &self.profile {
            Some(profile) => personalize(template, profile, input),
            None => template.to_string(),
        }
    }
}
