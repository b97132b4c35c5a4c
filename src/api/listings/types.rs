use crate::errors::ApiResult;
use crate::pricing::Quote;
use crate::security::{validation, FormErrors};
use crate::types::decimal;
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::bookings::Booking;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[display(fmt = "House")]
    House,
    #[display(fmt = "Apartment")]
    Apartment,
    #[display(fmt = "Villa")]
    Villa,
    #[display(fmt = "Cabin")]
    Cabin,
    #[display(fmt = "Condo")]
    Condo,
    #[display(fmt = "Studio")]
    Studio,
    #[display(fmt = "Beach House")]
    BeachHouse,
    #[display(fmt = "Treehouse")]
    Treehouse,
    #[display(fmt = "Farm")]
    Farm,
    #[display(fmt = "Boat")]
    Boat,
}

impl PropertyType {
    pub const ALL: [PropertyType; 10] = [
        PropertyType::House,
        PropertyType::Apartment,
        PropertyType::Villa,
        PropertyType::Cabin,
        PropertyType::Condo,
        PropertyType::Studio,
        PropertyType::BeachHouse,
        PropertyType::Treehouse,
        PropertyType::Farm,
        PropertyType::Boat,
    ];

    /// Wire value, e.g. `beach_house`.
    pub fn key(self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Apartment => "apartment",
            PropertyType::Villa => "villa",
            PropertyType::Cabin => "cabin",
            PropertyType::Condo => "condo",
            PropertyType::Studio => "studio",
            PropertyType::BeachHouse => "beach_house",
            PropertyType::Treehouse => "treehouse",
            PropertyType::Farm => "farm",
            PropertyType::Boat => "boat",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Amenity {
    #[display(fmt = "Wifi")]
    Wifi,
    #[display(fmt = "Kitchen")]
    Kitchen,
    #[display(fmt = "Parking")]
    Parking,
    #[display(fmt = "Pool")]
    Pool,
    #[display(fmt = "Air conditioning")]
    AirConditioning,
    #[display(fmt = "Washer")]
    Washer,
    #[display(fmt = "TV")]
    Tv,
    #[display(fmt = "Gym")]
    Gym,
    #[display(fmt = "Workspace")]
    Workspace,
    #[display(fmt = "Fireplace")]
    Fireplace,
    #[display(fmt = "BBQ grill")]
    Bbq,
    #[display(fmt = "EV charger")]
    EvCharger,
}

impl Amenity {
    pub const ALL: [Amenity; 12] = [
        Amenity::Wifi,
        Amenity::Kitchen,
        Amenity::Parking,
        Amenity::Pool,
        Amenity::AirConditioning,
        Amenity::Washer,
        Amenity::Tv,
        Amenity::Gym,
        Amenity::Workspace,
        Amenity::Fireplace,
        Amenity::Bbq,
        Amenity::EvCharger,
    ];

    /// Backend flag name, also used as the search filter key.
    pub fn key(self) -> &'static str {
        match self {
            Amenity::Wifi => "has_wifi",
            Amenity::Kitchen => "has_kitchen",
            Amenity::Parking => "has_parking",
            Amenity::Pool => "has_pool",
            Amenity::AirConditioning => "has_ac",
            Amenity::Washer => "has_washer",
            Amenity::Tv => "has_tv",
            Amenity::Gym => "has_gym",
            Amenity::Workspace => "has_workspace",
            Amenity::Fireplace => "has_fireplace",
            Amenity::Bbq => "has_bbq",
            Amenity::EvCharger => "has_ev_charger",
        }
    }

    /// Accepts the flag name with or without its `has_` prefix.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.strip_prefix("has_").unwrap_or(key);
        Self::ALL
            .into_iter()
            .find(|amenity| &amenity.key()[4..] == key)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmenityFlags {
    pub has_wifi: bool,
    pub has_kitchen: bool,
    pub has_parking: bool,
    pub has_pool: bool,
    pub has_ac: bool,
    pub has_washer: bool,
    pub has_tv: bool,
    pub has_gym: bool,
    pub has_workspace: bool,
    pub has_fireplace: bool,
    pub has_bbq: bool,
    pub has_ev_charger: bool,
}

impl AmenityFlags {
    pub fn get(&self, amenity: Amenity) -> bool {
        match amenity {
            Amenity::Wifi => self.has_wifi,
            Amenity::Kitchen => self.has_kitchen,
            Amenity::Parking => self.has_parking,
            Amenity::Pool => self.has_pool,
            Amenity::AirConditioning => self.has_ac,
            Amenity::Washer => self.has_washer,
            Amenity::Tv => self.has_tv,
            Amenity::Gym => self.has_gym,
            Amenity::Workspace => self.has_workspace,
            Amenity::Fireplace => self.has_fireplace,
            Amenity::Bbq => self.has_bbq,
            Amenity::EvCharger => self.has_ev_charger,
        }
    }

    pub fn set(&mut self, amenity: Amenity, value: bool) {
        let flag = match amenity {
            Amenity::Wifi => &mut self.has_wifi,
            Amenity::Kitchen => &mut self.has_kitchen,
            Amenity::Parking => &mut self.has_parking,
            Amenity::Pool => &mut self.has_pool,
            Amenity::AirConditioning => &mut self.has_ac,
            Amenity::Washer => &mut self.has_washer,
            Amenity::Tv => &mut self.has_tv,
            Amenity::Gym => &mut self.has_gym,
            Amenity::Workspace => &mut self.has_workspace,
            Amenity::Fireplace => &mut self.has_fireplace,
            Amenity::Bbq => &mut self.has_bbq,
            Amenity::EvCharger => &mut self.has_ev_charger,
        };
        *flag = value;
    }

    pub fn enabled(&self) -> Vec<Amenity> {
        Amenity::ALL
            .into_iter()
            .filter(|amenity| self.get(*amenity))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingImage {
    #[serde(default)]
    pub id: Option<u64>,
    pub url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub order: i32,
}

fn active_by_default() -> bool {
    true
}

fn is_positive_price(price: Decimal) -> bool {
    price > Decimal::ZERO
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: u64,
    #[serde(default)]
    pub host: Option<u64>,
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default)]
    pub host_avatar: Option<String>,
    #[serde(default)]
    pub host_is_superhost: bool,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub property_type: PropertyType,
    pub price_per_night: Decimal,
    #[serde(default)]
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub country: String,
    #[serde(default, with = "decimal::option")]
    pub latitude: Option<f64>,
    #[serde(default, with = "decimal::option")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub guests: u32,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub beds: u32,
    #[serde(default, with = "decimal::option")]
    pub bathrooms: Option<f64>,
    #[serde(flatten)]
    pub amenities: AmenityFlags,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub images: Vec<ListingImage>,
    #[serde(default)]
    pub primary_image: Option<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub review_count: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Listing {
    pub fn quote(&self, check_in: &str, check_out: &str) -> Quote {
        Quote::compute(self.price_per_night, check_in, check_out)
    }

    /// Primary image, falling back to the first one.
    pub fn cover_image(&self) -> Option<&str> {
        self.primary_image
            .as_deref()
            .or_else(|| {
                self.images
                    .iter()
                    .find(|image| image.is_primary)
                    .or_else(|| self.images.first())
                    .map(|image| image.url.as_str())
            })
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    pub fn location(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub property_type: Option<PropertyType>,
    pub price_per_night: Decimal,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub guests: u32,
    pub bedrooms: u32,
    pub beds: u32,
    pub bathrooms: f64,
    #[serde(flatten)]
    pub amenities: AmenityFlags,
    /// Image URLs, the first becomes the primary image
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl NewListing {
    pub fn validate(&self) -> ApiResult<()> {
        let mut errors = FormErrors::new();
        errors.check(
            "title",
            validation::validate_required(&self.title, "Title is required"),
        );
        errors.check(
            "description",
            validation::validate_required(&self.description, "Description is required"),
        );
        errors.check(
            "city",
            validation::validate_required(&self.city, "City is required"),
        );
        errors.check(
            "country",
            validation::validate_required(&self.country, "Country is required"),
        );
        errors.check(
            "address",
            validation::validate_required(&self.address, "Address is required"),
        );
        if !is_positive_price(self.price_per_night) {
            errors.add("price_per_night", "Price must be greater than 0");
        }
        if self.property_type.is_none() {
            errors.add("property_type", "Property type is required");
        }
        for url in &self.images {
            if validation::validate_url(url).is_err() {
                errors.add("images", format!("{url} is not a valid URL"));
            }
        }
        errors.finish()
    }
}

/// Partial listing edit. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_night: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guests: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ListingUpdate {
    pub fn validate(&self) -> ApiResult<()> {
        let mut errors = FormErrors::new();
        if let Some(title) = &self.title {
            errors.check(
                "title",
                validation::validate_required(title, "Title is required"),
            );
        }
        if matches!(self.price_per_night, Some(price) if !is_positive_price(price)) {
            errors.add("price_per_night", "Price must be greater than 0");
        }
        errors.finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostStats {
    pub total_listings: u64,
    pub active_listings: u64,
    pub total_bookings: u64,
    pub pending_bookings: u64,
    pub confirmed_bookings: u64,
    pub total_revenue: Decimal,
    pub total_guests: u64,
    #[serde(default)]
    pub average_rating: Option<f64>,
    pub total_reviews: u64,
}

/// Everything the host dashboard shows, fetched together.
#[derive(Debug, Clone)]
pub struct HostDashboard {
    pub stats: HostStats,
    pub listings: Vec<Listing>,
    pub bookings: Vec<Booking>,
}

impl HostDashboard {
    pub fn pending(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.iter().filter(|booking| booking.is_pending())
    }
}
