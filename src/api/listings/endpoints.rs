use super::types::*;
use crate::api::bookings::Booking;
use crate::client::{ApiClient, ApiRequest};
use crate::errors::ApiResult;
use crate::types::Page;
use serde_json::json;

impl ApiClient {
    pub async fn listing(&self, listing_id: u64) -> ApiResult<Listing> {
        self.fetch(&ApiRequest::get(format!("/listings/{listing_id}/")))
            .await
    }

    pub async fn create_listing(&self, form: &NewListing) -> ApiResult<Listing> {
        form.validate()?;
        let listing: Listing = self
            .fetch(&ApiRequest::post("/listings/").json(form)?)
            .await?;
        tracing::info!(listing_id = listing.id, "Listing created");
        Ok(listing)
    }

    pub async fn update_listing(&self, listing_id: u64, changes: &ListingUpdate) -> ApiResult<Listing> {
        changes.validate()?;
        self.fetch(&ApiRequest::patch(format!("/listings/{listing_id}/")).json(changes)?)
            .await
    }

    /// Publish or unpublish a listing without touching anything else.
    pub async fn set_listing_active(&self, listing_id: u64, active: bool) -> ApiResult<Listing> {
        let request = ApiRequest::patch(format!("/listings/{listing_id}/"))
            .json(&json!({ "is_active": active }))?;
        self.fetch(&request).await
    }

    pub async fn delete_listing(&self, listing_id: u64) -> ApiResult<()> {
        self.call(&ApiRequest::delete(format!("/listings/{listing_id}/")))
            .await?;
        tracing::info!(listing_id, "Listing deleted");
        Ok(())
    }

    pub async fn host_stats(&self) -> ApiResult<HostStats> {
        self.fetch(&ApiRequest::get("/listings/host/stats/")).await
    }

    pub async fn host_listings(&self) -> ApiResult<Vec<Listing>> {
        let page: Page<Listing> = self
            .fetch(&ApiRequest::get("/listings/host/my-listings/"))
            .await?;
        Ok(page.results)
    }

    pub async fn host_bookings(&self) -> ApiResult<Vec<Booking>> {
        let page: Page<Booking> = self
            .fetch(&ApiRequest::get("/listings/host/bookings/"))
            .await?;
        Ok(page.results)
    }

    /// Stats, listings and incoming bookings, requested concurrently. The
    /// first failure fails the whole dashboard.
    pub async fn host_dashboard(&self) -> ApiResult<HostDashboard> {
        let (stats, listings, bookings) = futures_util::try_join!(
            self.host_stats(),
            self.host_listings(),
            self.host_bookings()
        )?;

        Ok(HostDashboard {
            stats,
            listings,
            bookings,
        })
    }
}
