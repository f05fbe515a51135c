//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness
//! GET  /health/ready                - Readiness (store ping)
//!
//! # Pins
//! POST   /api/pins                  - Create pin
//! GET    /api/pins?owner_id=        - Pins for an owner, insertion order
//! GET    /api/pins/near?lat&lng&maxDistanceMeters - Proximity search
//! GET    /api/pins/{id}             - Pin detail
//! DELETE /api/pins/{id}             - Delete pin (idempotent)
//! POST   /api/pins/{id}/play        - Play the pin's song
//!
//! # Pins (older spellings)
//! POST /api/pins/create             - Create pin, `{message, pin}` response
//! GET  /api/pins/user/{user_id}     - Pins for an owner
//! GET  /api/pins/nearby?latitude&longitude&maxDistance - Proximity search
//!
//! # Users
//! POST   /api/users                 - Register (also /api/users/register)
//! GET    /api/users                 - All users
//! GET    /api/users/{id}            - User detail
//! DELETE /api/users/{id}            - Delete user without pins
//! ```

pub mod health;
pub mod pins;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the pin routes router.
pub fn pin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pins::list).post(pins::create))
        .route("/near", get(pins::nearby))
        .route("/nearby", get(pins::nearby))
        .route("/create", post(pins::create_legacy))
        .route("/user/{user_id}", get(pins::list_for_user))
        .route("/{id}", get(pins::show).delete(pins::delete))
        .route("/{id}/play", post(pins::play))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route("/register", post(users::create))
        .route("/{id}", get(users::show).delete(users::delete))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/pins", pin_routes())
        .nest("/api/users", user_routes())
}
