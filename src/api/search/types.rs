use crate::api::listings::{Amenity, AmenityFlags, PropertyType};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Shortest text the autocomplete endpoint will look up.
pub const MIN_AUTOCOMPLETE_CHARS: usize = 2;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ordering {
    #[default]
    #[display(fmt = "-created_at")]
    Newest,
    #[display(fmt = "created_at")]
    Oldest,
    #[display(fmt = "price_per_night")]
    PriceLowToHigh,
    #[display(fmt = "-price_per_night")]
    PriceHighToLow,
}

impl Ordering {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "-created_at" | "newest" => Some(Ordering::Newest),
            "created_at" | "oldest" => Some(Ordering::Oldest),
            "price_per_night" | "price" => Some(Ordering::PriceLowToHigh),
            "-price_per_night" | "-price" => Some(Ordering::PriceHighToLow),
            _ => None,
        }
    }
}

/// Filter bar state. Unset values never reach the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub property_type: Option<PropertyType>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub min_guests: Option<u32>,
    pub min_bedrooms: Option<u32>,
    pub amenities: AmenityFlags,
    pub ordering: Option<Ordering>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn require(mut self, amenity: Amenity) -> Self {
        self.amenities.set(amenity, true);
        self
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(kind) = self.property_type {
            pairs.push(("property_type", kind.key().to_string()));
        }
        let text = [("city", &self.city), ("country", &self.country)];
        for (key, value) in text {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, value.to_string()));
            }
        }
        let numbers = [
            ("min_price", self.min_price),
            ("max_price", self.max_price),
            ("min_guests", self.min_guests.map(u64::from)),
            ("min_bedrooms", self.min_bedrooms.map(u64::from)),
        ];
        for (key, value) in numbers
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
        {
            pairs.push((key, value.to_string()));
        }
        for amenity in self.amenities.enabled() {
            pairs.push((amenity.key(), "true".to_string()));
        }
        if let Some(ordering) = self.ordering {
            pairs.push(("ordering", ordering.to_string()));
        }
        pairs
    }
}

/// Free text, filters and page of a listing search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    text: String,
    filters: SearchFilters,
    page: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: String::new(),
            filters: SearchFilters::default(),
            page: 1,
        }
    }
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// New text starts again from the first page.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.page = 1;
        }
    }

    pub fn set_filters(&mut self, filters: SearchFilters) {
        if filters != self.filters {
            self.filters = filters;
            self.page = 1;
        }
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.set_filters(filters);
        self
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.set_page(page);
        self
    }

    /// `q=..&<filters>&page=N`, form-encoded, without a leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        let text = self.text.trim();
        if !text.is_empty() {
            query.append_pair("q", text);
        }
        for (key, value) in self.filters.pairs() {
            query.append_pair(key, &value);
        }
        query.append_pair("page", &self.page.to_string());
        query.finish()
    }

    pub fn path(&self) -> String {
        format!("/search/?{}", self.to_query_string())
    }
}

/// Previous/next navigation over a paged result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: u32,
    total_pages: u32,
}

impl Pager {
    pub fn new(page: u32, total_pages: u32) -> Self {
        let total_pages = total_pages.max(1);
        Self {
            page: page.clamp(1, total_pages),
            total_pages,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn previous(&self) -> Option<u32> {
        self.has_previous().then(|| self.page - 1)
    }

    pub fn next(&self) -> Option<u32> {
        self.has_next().then(|| self.page + 1)
    }

    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub city: String,
    pub country: String,
    pub label: String,
}
