use super::types::*;
use crate::client::{ApiClient, ApiRequest};
use crate::errors::ApiResult;
use crate::types::Page;

impl ApiClient {
    /// The signed-in guest's trips.
    pub async fn bookings(&self) -> ApiResult<Vec<Booking>> {
        let page: Page<Booking> = self.fetch(&ApiRequest::get("/bookings/")).await?;
        Ok(page.results)
    }

    pub async fn create_booking(&self, form: &NewBooking) -> ApiResult<Booking> {
        form.validate()?;
        let booking: Booking = self
            .fetch(&ApiRequest::post("/bookings/").json(form)?)
            .await?;
        tracing::info!(
            booking_id = booking.id,
            listing_id = booking.listing,
            "Booking requested"
        );
        Ok(booking)
    }

    /// Host side: accept a pending request.
    pub async fn confirm_booking(&self, booking_id: u64) -> ApiResult<Booking> {
        self.fetch(&ApiRequest::post(format!("/bookings/{booking_id}/confirm/")))
            .await
    }

    pub async fn cancel_booking(&self, booking_id: u64) -> ApiResult<Booking> {
        self.fetch(&ApiRequest::post(format!("/bookings/{booking_id}/cancel/")))
            .await
    }

    pub async fn availability(&self, listing_id: u64) -> ApiResult<Vec<BookedRange>> {
        self.fetch(&ApiRequest::get(format!("/bookings/availability/{listing_id}/")))
            .await
    }
}
