use serde::{Deserialize, Serialize};

/// One decoded history entry from the moment feed. The two timestamps are
/// whatever the hub sent; they are displayed verbatim, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub entity_id: String,
    pub state: String,
    pub last_changed: String,
    pub last_updated: String,
}

/// The closed set of moment labels the chart knows about. Anything else the
/// sensor reports is displayed in the record list but never counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Meal,
    Work,
    Media,
    Sleep,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Meal,
        Category::Work,
        Category::Media,
        Category::Sleep,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Meal => "Meal",
            Category::Work => "Work",
            Category::Media => "Media",
            Category::Sleep => "Sleep",
        }
    }

    /// Exact, case-sensitive match against a sensor state.
    pub fn from_state(state: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.label() == state)
    }
}

/// Occurrence counts per category, derived from one record sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    counts: [u64; 4],
}

impl CategoryCounts {
    pub fn bump(&mut self, category: Category) {
        self.counts[category as usize] += 1;
    }

    pub fn get(&self, category: Category) -> u64 {
        self.counts[category as usize]
    }

    /// (label, count) pairs in fixed chart order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, u64)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Records that landed in a category; unknown states are not included.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}
