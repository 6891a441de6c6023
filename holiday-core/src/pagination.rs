//! Fixed-size, one-indexed pages over an ordered sequence.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Items per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// One page of an ordered sequence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Page<T> {
    /// One-indexed page number that was requested.
    pub number: usize,
    /// Maximum items per page.
    pub size: usize,
    /// Length of the whole sequence.
    pub total_items: usize,
    /// Items on this page, in sequence order.
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Report whether the page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of non-empty pages in the whole sequence.
    #[must_use]
    pub const fn total_pages(&self) -> usize {
        if self.size == 0 {
            0
        } else {
            self.total_items.div_ceil(self.size)
        }
    }

    /// Report whether a later page holds items.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.total_pages()
    }
}

/// Slice page `number` (one-indexed) out of `items`.
///
/// Page zero and pages past the end are empty rather than errors.
///
/// # Examples
/// ```
/// use holiday_core::paginate;
///
/// let page = paginate((1..=7).collect::<Vec<_>>(), 2, 5);
/// assert_eq!(page.items, vec![6, 7]);
/// assert_eq!(page.total_pages(), 2);
/// assert!(!page.has_next());
///
/// assert!(paginate(vec![1, 2], 0, 5).is_empty());
/// assert!(paginate(vec![1, 2], 9, 5).is_empty());
/// ```
#[must_use]
pub fn paginate<T>(items: Vec<T>, number: usize, size: usize) -> Page<T> {
    let total_items = items.len();
    let offset = number
        .checked_sub(1)
        .and_then(|index| index.checked_mul(size));
    let items = match offset {
        Some(offset) => items.into_iter().skip(offset).take(size).collect(),
        None => Vec::new(),
    };
    Page {
        number,
        size,
        total_items,
        items,
    }
}

/// Session cursor tracking the last page served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct PageCursor(usize);

impl Default for PageCursor {
    fn default() -> Self {
        Self::FIRST
    }
}

impl PageCursor {
    /// Cursor positioned on the first page.
    pub const FIRST: Self = Self(1);

    /// Current page number.
    #[must_use]
    pub const fn page(self) -> usize {
        self.0
    }

    /// Return to the first page.
    pub const fn reset(&mut self) {
        *self = Self::FIRST;
    }

    /// Move to the following page and return its number.
    pub const fn advance(&mut self) -> usize {
        self.0 = self.0.saturating_add(1);
        self.0
    }
}
