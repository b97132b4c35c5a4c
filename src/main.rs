use clap::{Parser, Subcommand};
use rentals::api::auth::{PasswordChange, RegisterRequest};
use rentals::api::bookings::{is_available, NewBooking};
use rentals::api::listings::{Amenity, Listing, PropertyType};
use rentals::api::reviews::NewReview;
use rentals::api::search::{Ordering, Pager, SearchFilters, SearchQuery};
use rentals::observability::{init_logging, ObservabilityConfig};
use rentals::security::PasswordStrength;
use rentals::{ApiClient, ApiError, ApiResult, ClientConfig, Navigator, SessionStore};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

/// Command-line client for the rentals marketplace
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Trip, review and hosting counters
    Stats,
    /// Change the account password
    Password,
    /// Search listings
    Search {
        /// Free text matched against title, city, country and description
        query: Option<String>,
        #[arg(long = "type", value_parser = parse_property_type)]
        property_type: Option<PropertyType>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        min_price: Option<u64>,
        #[arg(long)]
        max_price: Option<u64>,
        #[arg(long)]
        guests: Option<u32>,
        #[arg(long)]
        bedrooms: Option<u32>,
        /// Required amenity, e.g. wifi or pool (repeatable)
        #[arg(long = "amenity", value_parser = parse_amenity)]
        amenities: Vec<Amenity>,
        /// newest, oldest, price or -price
        #[arg(long, value_parser = parse_ordering)]
        sort: Option<Ordering>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show one listing
    Listing { id: u64 },
    /// Price a stay without booking it
    Quote {
        id: u64,
        #[arg(long)]
        check_in: String,
        #[arg(long)]
        check_out: String,
    },
    /// Request a booking
    Book {
        id: u64,
        #[arg(long)]
        check_in: String,
        #[arg(long)]
        check_out: String,
        #[arg(long, default_value_t = 1)]
        guests: u32,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List your trips
    Trips,
    /// Cancel one of your bookings
    Cancel { id: u64 },
    /// Confirm a pending booking on one of your listings
    Confirm { id: u64 },
    /// List saved listings
    Saved,
    /// Save or unsave a listing
    ToggleSave { id: u64 },
    /// Show the reviews of a listing
    Reviews { id: u64 },
    /// Review a listing
    Review {
        id: u64,
        #[arg(long)]
        rating: u8,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Host dashboard
    Host,
    /// Booked date ranges of a listing
    Availability {
        id: u64,
        /// Check a specific stay against the booked ranges
        #[arg(long, requires = "check_out")]
        check_in: Option<String>,
        #[arg(long, requires = "check_in")]
        check_out: Option<String>,
    },
}

fn parse_property_type(raw: &str) -> Result<PropertyType, String> {
    PropertyType::from_key(raw).ok_or_else(|| format!("unknown property type `{raw}`"))
}

fn parse_amenity(raw: &str) -> Result<Amenity, String> {
    Amenity::from_key(raw).ok_or_else(|| format!("unknown amenity `{raw}`"))
}

fn parse_ordering(raw: &str) -> Result<Ordering, String> {
    Ordering::parse(raw).ok_or_else(|| format!("unknown sort order `{raw}`"))
}

/// Terminal counterpart of returning to the home screen.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn reset_to_root(&self) {
        eprintln!("Your session has expired. Sign in again with `rentals login`.");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let observability = ObservabilityConfig::from_env();
    init_logging(&observability);

    let args = Args::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    let session = match SessionStore::open(&config.database_url) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to open credential store: {e}");
            return ExitCode::FAILURE;
        }
    };
    let client = match ApiClient::new(&config, session) {
        Ok(client) => client.with_navigator(Arc::new(TerminalNavigator)),
        Err(e) => {
            eprintln!("Failed to build HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &ApiError) {
    match &err.body {
        rentals::errors::ErrorBody::Fields(fields) => {
            for (field, messages) in fields {
                for message in messages {
                    if field == rentals::errors::NON_FIELD_KEY {
                        eprintln!("error: {message}");
                    } else {
                        eprintln!("error: {field}: {message}");
                    }
                }
            }
        }
        rentals::errors::ErrorBody::Detail { detail } => eprintln!("error: {detail}"),
    }
}

fn prompt_password(label: &str) -> ApiResult<String> {
    print!("{label}: ");
    std::io::stdout().flush().ok();
    rpassword::read_password().map_err(|e| {
        tracing::error!(error = %e, "Failed to read password");
        ApiError::request_failed()
    })
}

async fn run(client: &ApiClient, command: Command) -> ApiResult<()> {
    match command {
        Command::Login { email } => {
            let password = prompt_password("Password")?;
            let user = client.login(&email, &password).await?;
            println!("Signed in as {} <{}>", user.display_name(), user.email);
        }
        Command::Register {
            email,
            username,
            first_name,
            last_name,
        } => {
            let password = prompt_password("Password")?;
            println!("Strength: {}", PasswordStrength::of(&password));
            let password2 = prompt_password("Password again")?;
            let form = RegisterRequest {
                email,
                username,
                first_name,
                last_name,
                password,
                password2,
            };
            let user = client.register(&form).await?;
            println!("Welcome, {}!", user.display_name());
        }
        Command::Logout => {
            client.logout()?;
            println!("Signed out");
        }
        Command::Whoami => match client.restore_session().await? {
            Some(user) => {
                println!("{} <{}>", user.display_name(), user.email);
                if user.is_host {
                    println!("Host of {} listing(s)", user.listing_count.unwrap_or(0));
                }
            }
            None => println!("Not signed in"),
        },
        Command::Stats => {
            let stats = client.profile_stats().await?;
            println!(
                "Trips: {} total, {} upcoming, {} completed",
                stats.total_trips, stats.upcoming_trips, stats.completed_trips
            );
            println!("Reviews written: {}", stats.total_reviews);
            if stats.is_host() {
                println!(
                    "Listings: {} ({} active), revenue {:.2}",
                    stats.total_listings.unwrap_or(0),
                    stats.active_listings.unwrap_or(0),
                    stats.total_revenue.unwrap_or_default()
                );
            }
        }
        Command::Password => {
            let old_password = prompt_password("Current password")?;
            let new_password = prompt_password("New password")?;
            println!("Strength: {}", PasswordStrength::of(&new_password));
            let confirm = prompt_password("New password again")?;
            client
                .change_password(&PasswordChange {
                    old_password,
                    new_password,
                    confirm,
                })
                .await?;
            println!("Password updated");
        }
        Command::Search {
            query,
            property_type,
            city,
            country,
            min_price,
            max_price,
            guests,
            bedrooms,
            amenities,
            sort,
            page,
        } => {
            let mut filters = SearchFilters {
                property_type,
                city,
                country,
                min_price,
                max_price,
                min_guests: guests,
                min_bedrooms: bedrooms,
                ordering: sort,
                ..Default::default()
            };
            for amenity in amenities {
                filters.amenities.set(amenity, true);
            }
            let search = SearchQuery::new(query.unwrap_or_default())
                .with_filters(filters)
                .with_page(page);

            let signed_in = client.session().is_signed_in()?;
            let results = client.search(&search).await?;
            let saved = if signed_in {
                client.saved_ids().await
            } else {
                Default::default()
            };

            for listing in &results.results {
                let heart = if saved.contains(listing.id) { "♥" } else { " " };
                println!("{heart} {}", summary_line(listing));
            }
            println!(
                "{} result(s), {}",
                results.count,
                Pager::new(search.page(), results.total_pages).label()
            );
        }
        Command::Listing { id } => {
            let listing = client.listing(id).await?;
            println!("{}", summary_line(&listing));
            println!("{}", listing.description);
            println!(
                "{} guests · {} bedrooms · {} beds",
                listing.guests, listing.bedrooms, listing.beds
            );
            let amenities: Vec<String> = listing
                .amenities
                .enabled()
                .iter()
                .map(ToString::to_string)
                .collect();
            if !amenities.is_empty() {
                println!("Amenities: {}", amenities.join(", "));
            }
            if let Some(host) = &listing.host_name {
                println!("Hosted by {host}");
            }
        }
        Command::Quote {
            id,
            check_in,
            check_out,
        } => {
            let listing = client.listing(id).await?;
            let quote = listing.quote(&check_in, &check_out);
            if quote.is_empty() {
                println!("Pick a check-out after the check-in to see a price");
            } else {
                println!(
                    "{} x {} nights = {}",
                    listing.price_per_night,
                    quote.nights,
                    quote.subtotal
                );
                println!("Cleaning fee: {}", quote.cleaning_fee);
                println!("Total: {}", quote.total);
            }
        }
        Command::Book {
            id,
            check_in,
            check_out,
            guests,
            notes,
        } => {
            let booking = client
                .create_booking(&NewBooking {
                    listing: id,
                    check_in,
                    check_out,
                    guests,
                    notes,
                })
                .await?;
            println!(
                "Booking #{} is {} ({} nights, {:.2})",
                booking.id,
                booking.status,
                booking.nights(),
                booking.total_price
            );
        }
        Command::Trips => {
            let trips = client.bookings().await?;
            if trips.is_empty() {
                println!("No trips yet");
            }
            for trip in trips {
                println!(
                    "#{} {} {} → {} [{}]",
                    trip.id,
                    trip.listing_title.as_deref().unwrap_or("Listing"),
                    trip.check_in,
                    trip.check_out,
                    trip.status
                );
            }
        }
        Command::Cancel { id } => {
            let booking = client.cancel_booking(id).await?;
            println!("Booking #{} is {}", booking.id, booking.status);
        }
        Command::Confirm { id } => {
            let booking = client.confirm_booking(id).await?;
            println!("Booking #{} is {}", booking.id, booking.status);
        }
        Command::Saved => {
            let saved = client.saved_listings().await?;
            if saved.is_empty() {
                println!("Nothing saved yet");
            }
            for listing in &saved {
                println!("{}", summary_line(listing));
            }
        }
        Command::ToggleSave { id } => {
            let outcome = client.toggle_saved(id).await?;
            if outcome.saved {
                println!("Saved to wishlist");
            } else {
                println!("Removed from wishlist");
            }
        }
        Command::Reviews { id } => {
            let reviews = client.reviews(id).await?;
            if let Some(average) = rentals::api::reviews::average_rating(&reviews) {
                println!("★ {average:.2} · {} review(s)", reviews.len());
            }
            for review in reviews {
                println!(
                    "{} ★{} {}",
                    review.author_name.as_deref().unwrap_or("Guest"),
                    review.rating,
                    review.comment
                );
            }
        }
        Command::Review {
            id,
            rating,
            comment,
        } => {
            client
                .post_review(
                    id,
                    &NewReview {
                        rating,
                        comment,
                        ..Default::default()
                    },
                )
                .await?;
            println!("Thanks for your review");
        }
        Command::Host => {
            let dashboard = client.host_dashboard().await?;
            let stats = &dashboard.stats;
            println!(
                "{} listing(s), {} active · {} booking(s), {} pending · revenue {:.2}",
                stats.total_listings,
                stats.active_listings,
                stats.total_bookings,
                stats.pending_bookings,
                stats.total_revenue
            );
            for listing in &dashboard.listings {
                let state = if listing.is_active { "active" } else { "paused" };
                println!("[{state}] {}", summary_line(listing));
            }
            for booking in dashboard.pending() {
                println!(
                    "pending #{} {} {} → {}",
                    booking.id,
                    booking.guest_name.as_deref().unwrap_or("Guest"),
                    booking.check_in,
                    booking.check_out
                );
            }
        }
        Command::Availability {
            id,
            check_in,
            check_out,
        } => {
            let ranges = client.availability(id).await?;
            for range in &ranges {
                println!("booked {} → {}", range.check_in, range.check_out);
            }
            if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
                if is_available(&ranges, &check_in, &check_out) {
                    println!("{check_in} → {check_out} is available");
                } else {
                    println!("{check_in} → {check_out} is not available");
                }
            }
        }
    }
    Ok(())
}

fn summary_line(listing: &Listing) -> String {
    let rating = listing
        .average_rating
        .map(|rating| format!(" ★{rating:.2}"))
        .unwrap_or_default();
    format!(
        "#{} {} · {} · {} · {}/night{}",
        listing.id,
        listing.title,
        listing.property_type,
        listing.location(),
        listing.price_per_night,
        rating
    )
}
