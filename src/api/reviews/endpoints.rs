use super::types::*;
use crate::client::{ApiClient, ApiRequest};
use crate::errors::ApiResult;
use crate::types::Page;

fn reviews_path(listing_id: u64) -> String {
    format!("/reviews/listings/{listing_id}/reviews/")
}

impl ApiClient {
    pub async fn reviews(&self, listing_id: u64) -> ApiResult<Vec<Review>> {
        let page: Page<Review> = self.fetch(&ApiRequest::get(reviews_path(listing_id))).await?;
        Ok(page.results)
    }

    pub async fn post_review(&self, listing_id: u64, form: &NewReview) -> ApiResult<Review> {
        form.validate()?;
        let review: Review = self
            .fetch(&ApiRequest::post(reviews_path(listing_id)).json(form)?)
            .await?;
        tracing::info!(listing_id, review_id = review.id, "Review posted");
        Ok(review)
    }
}
