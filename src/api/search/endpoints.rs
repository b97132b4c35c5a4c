use super::types::*;
use crate::api::listings::Listing;
use crate::client::{ApiClient, ApiRequest};
use crate::errors::ApiResult;
use crate::types::Page;

impl ApiClient {
    pub async fn search(&self, query: &SearchQuery) -> ApiResult<Page<Listing>> {
        let page: Page<Listing> = self.fetch(&ApiRequest::get(query.path())).await?;
        tracing::debug!(
            count = page.count,
            total_pages = page.total_pages,
            "Search returned"
        );
        Ok(page)
    }

    /// City suggestions. Short input is answered locally with nothing.
    pub async fn autocomplete(&self, text: &str) -> ApiResult<Vec<Suggestion>> {
        let text = text.trim();
        if text.chars().count() < MIN_AUTOCOMPLETE_CHARS {
            return Ok(Vec::new());
        }

        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", text)
            .finish();
        self.fetch(&ApiRequest::get(format!("/search/autocomplete/?{query}")))
            .await
    }
}
