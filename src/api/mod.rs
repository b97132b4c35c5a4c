//! Typed wrappers for every backend route, one module per resource.

pub mod auth;
pub mod bookings;
pub mod listings;
pub mod reviews;
pub mod search;
pub mod wishlists;
