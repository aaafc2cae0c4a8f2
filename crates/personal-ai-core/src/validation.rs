//! Per-field validation rules for the training form.

use crate::error::FieldError;
use crate::profile::Style;

/// The fields the training form collects, in step order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    Name,
    Field,
    Approach,
    Tools,
    Style,
    Example,
}

impl FieldName {
    pub fn all() -> [FieldName; 6] {
        [
            FieldName::Name,
            FieldName::Field,
            FieldName::Approach,
            FieldName::Tools,
            FieldName::Style,
            FieldName::Example,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Name => "name",
            FieldName::Field => "field",
            FieldName::Approach => "approach",
            FieldName::Tools => "tools",
            FieldName::Style => "style",
            FieldName::Example => "example",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        FieldName::all().into_iter().find(|f| f.as_str() == s)
    }

    /// Prompt shown above the input on the field's step.
    pub fn label(&self) -> &'static str {
        match self {
            FieldName::Name => "What's your name?",
            FieldName::Field => "What field do you work in?",
            FieldName::Approach => "How do you approach solving problems?",
            FieldName::Tools => "Which tools and methods do you rely on?",
            FieldName::Style => "How do you like to communicate?",
            FieldName::Example => "Walk through a recent problem you solved",
        }
    }

    pub fn rule(&self) -> &'static Rule {
        match self {
            FieldName::Name => &NAME_RULE,
            FieldName::Field => &FIELD_RULE,
            FieldName::Approach => &APPROACH_RULE,
            FieldName::Tools => &TOOLS_RULE,
            FieldName::Style => &STYLE_RULE,
            FieldName::Example => &EXAMPLE_RULE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub required: bool,
    pub min_length: Option<usize>,
    pub message: &'static str,
}

static NAME_RULE: Rule = Rule {
    required: true,
    min_length: Some(2),
    message: "Please enter your full name (at least 2 characters)",
};

static FIELD_RULE: Rule = Rule {
    required: true,
    min_length: Some(3),
    message: "Please enter your field of work (at least 3 characters)",
};

static APPROACH_RULE: Rule = Rule {
    required: true,
    min_length: Some(50),
    message: "Please provide a detailed description (at least 50 characters)",
};

static TOOLS_RULE: Rule = Rule {
    required: true,
    min_length: Some(5),
    message: "Please list your favorite tools and methods",
};

static STYLE_RULE: Rule = Rule {
    required: true,
    min_length: None,
    message: "Please select your communication style",
};

static EXAMPLE_RULE: Rule = Rule {
    required: true,
    min_length: Some(100),
    message: "Please provide a detailed example (at least 100 characters)",
};

/// What a field's feedback slot should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    None,
    Valid,
    Invalid(&'static str),
}

impl Feedback {
    pub const SUCCESS_TEXT: &'static str = "✓ Looks good!";

    pub fn for_result(field: FieldName, result: Result<(), FieldError>) -> Self {
        match result {
            Ok(()) => Feedback::Valid,
            Err(_) => Feedback::Invalid(field.rule().message),
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Feedback::None => "",
            Feedback::Valid => Self::SUCCESS_TEXT,
            Feedback::Invalid(message) => *message,
        }
    }
}

/// Check one value against its field's rule. Values are trimmed first.
pub fn validate_field(field: FieldName, value: &str) -> Result<(), FieldError> {
    let rule = field.rule();
    let value = value.trim();

    if value.is_empty() {
        return if rule.required {
            Err(FieldError::Required)
        } else {
            Ok(())
        };
    }

    // A style that isn't one of the options is no selection at all
    if field == FieldName::Style && Style::from_str(value).is_none() {
        return Err(FieldError::Required);
    }

    if let Some(min) = rule.min_length {
        let actual = value.chars().count();
        if actual < min {
            return Err(FieldError::TooShort { min, actual });
        }
    }

    Ok(())
}
