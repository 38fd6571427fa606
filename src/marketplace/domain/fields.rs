//! Validated text value types for the marketplace domain.
//!
//! Each newtype trims its input and enforces the character bounds of the
//! posting and application forms. Bounds are counted in characters, not
//! bytes.

use super::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trims `raw` and checks its character count against `min..=max`.
fn bounded_text(
    raw: &str,
    min: usize,
    max: usize,
    err: impl FnOnce(usize) -> DomainError,
) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    let length = trimmed.chars().count();
    if length < min || length > max {
        return Err(err(length));
    }
    Ok(trimmed.to_owned())
}

/// Validated task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Minimum title length in characters.
    pub const MIN_CHARS: usize = 10;
    /// Maximum title length in characters.
    pub const MAX_CHARS: usize = 200;

    /// Creates a validated task title.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::TitleLength`] when the trimmed value is outside
    /// the permitted range.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let text = bounded_text(&raw, Self::MIN_CHARS, Self::MAX_CHARS, |actual| {
            DomainError::TitleLength {
                min: Self::MIN_CHARS,
                max: Self::MAX_CHARS,
                actual,
            }
        })?;
        Ok(Self(text))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated task description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDescription(String);

impl TaskDescription {
    /// Minimum description length in characters.
    pub const MIN_CHARS: usize = 50;
    /// Maximum description length in characters.
    pub const MAX_CHARS: usize = 5000;

    /// Creates a validated task description.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DescriptionLength`] when the trimmed value is
    /// outside the permitted range.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let text = bounded_text(&raw, Self::MIN_CHARS, Self::MAX_CHARS, |actual| {
            DomainError::DescriptionLength {
                min: Self::MIN_CHARS,
                max: Self::MAX_CHARS,
                actual,
            }
        })?;
        Ok(Self(text))
    }

    /// Returns the description as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskDescription {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validated task category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Creates a validated category.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyCategory`] when the trimmed value is
    /// empty.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyCategory);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the category as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated set of required skills for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillSet(Vec<String>);

impl SkillSet {
    /// Maximum number of skills per task.
    pub const MAX_SKILLS: usize = 10;

    /// Creates a validated skill set.
    ///
    /// Entries are trimmed; the set must contain between one and
    /// [`Self::MAX_SKILLS`] non-empty entries.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NoSkillsRequired`],
    /// [`DomainError::TooManySkills`], or [`DomainError::EmptySkill`].
    pub fn new(values: impl IntoIterator<Item = String>) -> Result<Self, DomainError> {
        let mut skills = Vec::new();
        for value in values {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(DomainError::EmptySkill);
            }
            skills.push(trimmed.to_owned());
        }
        if skills.is_empty() {
            return Err(DomainError::NoSkillsRequired);
        }
        if skills.len() > Self::MAX_SKILLS {
            return Err(DomainError::TooManySkills {
                max: Self::MAX_SKILLS,
                actual: skills.len(),
            });
        }
        Ok(Self(skills))
    }

    /// Returns the skills as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns `true` when any entry of `other` appears in this set.
    #[must_use]
    pub fn overlaps(&self, other: &[String]) -> bool {
        other.iter().any(|skill| self.0.iter().any(|own| own == skill))
    }
}

/// Validated requirements text for a task posting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Requirements(String);

impl Requirements {
    /// Minimum length in characters.
    pub const MIN_CHARS: usize = 20;
    /// Maximum length in characters.
    pub const MAX_CHARS: usize = 2000;

    /// Creates validated requirements text.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::RequirementsLength`] when the trimmed value is
    /// outside the permitted range.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let text = bounded_text(&raw, Self::MIN_CHARS, Self::MAX_CHARS, |actual| {
            DomainError::RequirementsLength {
                min: Self::MIN_CHARS,
                max: Self::MAX_CHARS,
                actual,
            }
        })?;
        Ok(Self(text))
    }

    /// Returns the requirements as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Requirements {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validated deliverables text for a task posting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deliverables(String);

impl Deliverables {
    /// Minimum length in characters.
    pub const MIN_CHARS: usize = 20;
    /// Maximum length in characters.
    pub const MAX_CHARS: usize = 2000;

    /// Creates validated deliverables text.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DeliverablesLength`] when the trimmed value is
    /// outside the permitted range.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let text = bounded_text(&raw, Self::MIN_CHARS, Self::MAX_CHARS, |actual| {
            DomainError::DeliverablesLength {
                min: Self::MIN_CHARS,
                max: Self::MAX_CHARS,
                actual,
            }
        })?;
        Ok(Self(text))
    }

    /// Returns the deliverables as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Deliverables {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validated cover letter for a task application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverLetter(String);

impl CoverLetter {
    /// Minimum length in characters.
    pub const MIN_CHARS: usize = 100;
    /// Maximum length in characters.
    pub const MAX_CHARS: usize = 2000;

    /// Creates a validated cover letter.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::CoverLetterLength`] when the trimmed value is
    /// outside the permitted range.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let text = bounded_text(&raw, Self::MIN_CHARS, Self::MAX_CHARS, |actual| {
            DomainError::CoverLetterLength {
                min: Self::MIN_CHARS,
                max: Self::MAX_CHARS,
                actual,
            }
        })?;
        Ok(Self(text))
    }

    /// Returns the cover letter as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CoverLetter {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validated proposed timeline for a task application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposedTimeline(String);

impl ProposedTimeline {
    /// Maximum length in characters.
    pub const MAX_CHARS: usize = 500;

    /// Creates a validated proposed timeline.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::TimelineTooLong`] when the trimmed value
    /// exceeds the permitted length.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let text = bounded_text(&raw, 0, Self::MAX_CHARS, |actual| {
            DomainError::TimelineTooLong {
                max: Self::MAX_CHARS,
                actual,
            }
        })?;
        Ok(Self(text))
    }

    /// Returns the timeline as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProposedTimeline {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validated description of submitted work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkDescription(String);

impl WorkDescription {
    /// Minimum length in characters.
    pub const MIN_CHARS: usize = 50;
    /// Maximum length in characters.
    pub const MAX_CHARS: usize = 2000;

    /// Creates a validated work description.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::WorkDescriptionLength`] when the trimmed value
    /// is outside the permitted range.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let text = bounded_text(&raw, Self::MIN_CHARS, Self::MAX_CHARS, |actual| {
            DomainError::WorkDescriptionLength {
                min: Self::MIN_CHARS,
                max: Self::MAX_CHARS,
                actual,
            }
        })?;
        Ok(Self(text))
    }

    /// Returns the description as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for WorkDescription {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validated review notes attached to a submission decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewNotes(String);

impl ReviewNotes {
    /// Maximum length in characters.
    pub const MAX_CHARS: usize = 1000;

    /// Creates validated review notes.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ReviewNotesTooLong`] when the trimmed value
    /// exceeds the permitted length.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let text = bounded_text(&raw, 0, Self::MAX_CHARS, |actual| {
            DomainError::ReviewNotesTooLong {
                max: Self::MAX_CHARS,
                actual,
            }
        })?;
        Ok(Self(text))
    }

    /// Returns the notes as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ReviewNotes {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
