use crate::errors::ApiResult;
use crate::security::FormErrors;
use serde::{Deserialize, Serialize};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    #[serde(default)]
    pub listing: Option<u64>,
    #[serde(default)]
    pub author: Option<u64>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_avatar: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub cleanliness: Option<u8>,
    #[serde(default)]
    pub accuracy: Option<u8>,
    #[serde(default)]
    pub communication: Option<u8>,
    #[serde(default)]
    pub location: Option<u8>,
    #[serde(default)]
    pub value: Option<u8>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Review {
    /// Named sub-ratings that were filled in.
    pub fn categories(&self) -> Vec<(&'static str, u8)> {
        [
            ("Cleanliness", self.cleanliness),
            ("Accuracy", self.accuracy),
            ("Communication", self.communication),
            ("Location", self.location),
            ("Value", self.value),
        ]
        .into_iter()
        .filter_map(|(name, score)| score.map(|score| (name, score)))
        .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewReview {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanliness: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u8>,
    pub comment: String,
}

fn in_range(score: u8) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&score)
}

impl NewReview {
    pub fn validate(&self) -> ApiResult<()> {
        let mut errors = FormErrors::new();
        let message = format!("Rating must be between {MIN_RATING} and {MAX_RATING}");
        if !in_range(self.rating) {
            errors.add("rating", message.as_str());
        }
        for (field, score) in [
            ("cleanliness", self.cleanliness),
            ("accuracy", self.accuracy),
            ("communication", self.communication),
            ("location", self.location),
            ("value", self.value),
        ] {
            if matches!(score, Some(score) if !in_range(score)) {
                errors.add(field, message.as_str());
            }
        }
        errors.finish()
    }
}

/// Mean rating to two decimals, `None` without reviews.
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let sum: u64 = reviews.iter().map(|review| u64::from(review.rating)).sum();
    let mean = sum as f64 / reviews.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn review(rating: u8) -> Review {
        serde_json::from_value(json!({"id": 1, "rating": rating, "comment": "Lovely"})).unwrap()
    }

    #[test]
    fn test_rating_bounds() {
        assert!(NewReview { rating: 5, ..Default::default() }.validate().is_ok());
        assert!(NewReview { rating: 0, ..Default::default() }.validate().is_err());
        assert!(NewReview { rating: 6, ..Default::default() }.validate().is_err());

        let err = NewReview {
            rating: 4,
            value: Some(9),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.field("value").is_some());
        assert!(err.field("rating").is_none());
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[review(5), review(4), review(4)]), Some(4.33));
    }

    #[test]
    fn test_categories_skip_missing_scores() {
        let mut r = review(5);
        r.cleanliness = Some(4);
        assert_eq!(r.categories(), vec![("Cleanliness", 4)]);
    }
}
