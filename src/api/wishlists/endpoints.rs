use super::types::*;
use crate::api::listings::Listing;
use crate::client::{ApiClient, ApiRequest};
use crate::errors::ApiResult;
use crate::types::Page;

impl ApiClient {
    pub async fn saved_listings(&self) -> ApiResult<Vec<Listing>> {
        let page: Page<Listing> = self.fetch(&ApiRequest::get("/wishlists/saved/")).await?;
        Ok(page.results)
    }

    /// Ids of saved listings. Used to decorate result cards, so a failure
    /// only costs the hearts and yields an empty set.
    pub async fn saved_ids(&self) -> SavedSet {
        match self
            .fetch::<Vec<u64>>(&ApiRequest::get("/wishlists/saved/ids/"))
            .await
        {
            Ok(ids) => SavedSet::new(ids),
            Err(err) => {
                tracing::warn!(error = %err, "Could not load saved listings, showing none");
                SavedSet::default()
            }
        }
    }

    pub async fn toggle_saved(&self, listing_id: u64) -> ApiResult<ToggleOutcome> {
        let outcome: ToggleOutcome = self
            .fetch(&ApiRequest::post(format!("/wishlists/toggle/{listing_id}/")))
            .await?;
        tracing::info!(listing_id, saved = outcome.saved, "Wishlist toggled");
        Ok(outcome)
    }
}
