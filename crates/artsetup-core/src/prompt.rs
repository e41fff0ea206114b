use crate::error::ModelError;
use std::fmt;

/// A room description wrapped in the fixed scenario-generation template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioPrompt {
    subject: String,
    text: String,
}

impl ScenarioPrompt {
    /// # Errors
    /// `EmptyPrompt` when `subject` is blank.
    pub fn new(subject: &str) -> Result<Self, ModelError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(ModelError::EmptyPrompt);
        }
        let text = format!(
            "a realistic and cozy {subject} with modern furniture, plants, and other decorations. \
             The walls are completely empty and clean, ready for art to be placed on them. \
             The room has natural lighting."
        );
        Ok(Self {
            subject: subject.to_string(),
            text,
        })
    }

    /// What the user typed, trimmed.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Full prompt sent to the image generator.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ScenarioPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_subject_in_template() {
        let p = ScenarioPrompt::new("  scandinavian living room ").unwrap();
        assert_eq!(p.subject(), "scandinavian living room");
        assert!(p.as_str().starts_with("a realistic and cozy scandinavian living room with modern furniture"));
        assert!(p.as_str().ends_with("The room has natural lighting."));
    }

    #[test]
    fn blank_prompt_is_rejected() {
        assert_eq!(ScenarioPrompt::new("   "), Err(ModelError::EmptyPrompt));
        assert_eq!(ScenarioPrompt::new(""), Err(ModelError::EmptyPrompt));
    }
}
