//! Listing filters and pagination for the public task catalogue.

use super::compensation::CompensationAmount;
use super::error::DomainError;
use super::fields::Category;
use super::task::Task;
use serde::{Deserialize, Serialize};

/// Filter over the open-task catalogue.
///
/// All criteria are conjunctive; an unset criterion matches every task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    category: Option<Category>,
    skills: Vec<String>,
    min_compensation: Option<CompensationAmount>,
    max_compensation: Option<CompensationAmount>,
    search: Option<String>,
}

impl TaskFilter {
    /// Creates an empty filter matching every open task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to one category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Restricts results to tasks requiring at least one of `skills`.
    #[must_use]
    pub fn with_skills(mut self, skills: impl IntoIterator<Item = String>) -> Self {
        self.skills = skills.into_iter().collect();
        self
    }

    /// Restricts results to tasks offering at least `amount`.
    #[must_use]
    pub const fn with_min_compensation(mut self, amount: CompensationAmount) -> Self {
        self.min_compensation = Some(amount);
        self
    }

    /// Restricts results to tasks offering at most `amount`.
    #[must_use]
    pub const fn with_max_compensation(mut self, amount: CompensationAmount) -> Self {
        self.max_compensation = Some(amount);
        self
    }

    /// Restricts results to tasks whose title or description contains
    /// `text`, case-insensitively.
    #[must_use]
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// Returns the category criterion, if set.
    #[must_use]
    pub const fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    /// Returns the skill criterion; empty means unset.
    #[must_use]
    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    /// Returns the minimum compensation criterion, if set.
    #[must_use]
    pub const fn min_compensation(&self) -> Option<CompensationAmount> {
        self.min_compensation
    }

    /// Returns the maximum compensation criterion, if set.
    #[must_use]
    pub const fn max_compensation(&self) -> Option<CompensationAmount> {
        self.max_compensation
    }

    /// Returns the search criterion, if set.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Returns `true` when `task` satisfies every set criterion.
    ///
    /// Adapters that cannot push a criterion into their query language use
    /// this as the reference predicate.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(category) = &self.category {
            if task.category() != category {
                return false;
            }
        }
        if !self.skills.is_empty() && !task.skills_required().overlaps(&self.skills) {
            return false;
        }
        let amount = task.compensation().amount();
        if self.min_compensation.is_some_and(|min| amount < min) {
            return false;
        }
        if self.max_compensation.is_some_and(|max| amount > max) {
            return false;
        }
        if let Some(text) = &self.search {
            let needle = text.to_lowercase();
            let in_title = task.title().as_str().to_lowercase().contains(&needle);
            let in_description = task
                .description()
                .as_str()
                .to_lowercase()
                .contains(&needle);
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}

/// Requested page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Default page size.
    pub const DEFAULT_PER_PAGE: u32 = 20;

    /// Creates a validated page request. Pages are one-based.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ZeroPageBound`] when either bound is zero.
    pub const fn new(page: u32, per_page: u32) -> Result<Self, DomainError> {
        if page == 0 || per_page == 0 {
            return Err(DomainError::ZeroPageBound);
        }
        Ok(Self { page, per_page })
    }

    /// Returns the one-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Returns the number of records preceding this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (u64::from(self.page) - 1) * u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

/// Pagination metadata returned with a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Total number of matching records.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl PageInfo {
    /// Computes pagination metadata for a result set of `total` records.
    #[must_use]
    pub fn compute(request: &PageRequest, total: u64) -> Self {
        Self {
            page: request.page(),
            per_page: request.per_page(),
            total,
            total_pages: total.div_ceil(u64::from(request.per_page())),
        }
    }
}

/// One page of the open-task catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskPage {
    /// Tasks on this page, newest publication first.
    pub tasks: Vec<Task>,
    /// Pagination metadata.
    pub page_info: PageInfo,
}
