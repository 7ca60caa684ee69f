//! Fixed city list and the prefix-free substring matcher used for
//! autocomplete.

/// Queries shorter than this produce no suggestions.
pub const MIN_QUERY_CHARS: usize = 2;

pub const CITIES: &[&str] = &[
    "Dushanbe",
    "Khujand",
    "Kulob",
    "Bokhtar",
    "Khorog",
    "Tursunzoda",
    "Panjakent",
    "Hisor",
    "Isfara",
    "Konibodom",
    "Vahdat",
    "Moscow",
    "Minsk",
    "London",
    "New York",
    "Paris",
    "Berlin",
    "Milan",
    "Madrid",
    "Tokyo",
    "Shanghai",
];

/// Every catalog entry containing `query` case-insensitively, in catalog order.
pub fn suggest<'a>(catalog: &[&'a str], query: &str) -> Vec<&'a str> {
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    catalog
        .iter()
        .copied()
        .filter(|city| city.to_lowercase().contains(&needle))
        .collect()
}

/// City input text plus the suggestions currently offered for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchBox {
    text: String,
    suggestions: Vec<String>,
}

impl SearchBox {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Replaces the query and recomputes suggestions from scratch.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.suggestions = suggest(CITIES, &self.text)
            .into_iter()
            .map(str::to_string)
            .collect();
    }

    /// Takes the suggestion at `index` as the new query and clears the list.
    /// Returns the picked name, or `None` (leaving state untouched) for a bad index.
    pub fn pick(&mut self, index: usize) -> Option<&str> {
        let picked = self.suggestions.get(index)?.clone();
        self.text = picked;
        self.suggestions.clear();
        Some(&self.text)
    }
}
