//! Pin route handlers.
//!
//! Accepts both the current field names and the older ones used by early
//! clients (`latitude`/`longitude`, `user_id`, `maxDistance`).

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use songpin_core::{GeoPoint, NearbyPin, Pin, PinId, ProximityQuery, Song, UserId};

use crate::error::{AppError, Result};
use crate::services::playback::play_song;
use crate::state::AppState;

/// A coordinate as sent by clients, validated into a [`GeoPoint`] by the
/// handler so range errors become 400s with a readable message.
#[derive(Debug, Deserialize)]
pub struct CoordinateBody {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lng: f64,
}

/// Pin creation body.
///
/// The location is either a nested `coordinate` or flat
/// `latitude`/`longitude` fields.
#[derive(Debug, Deserialize)]
pub struct CreatePinRequest {
    pub song: String,
    #[serde(alias = "user_id")]
    pub owner_id: String,
    #[serde(default)]
    pub coordinate: Option<CoordinateBody>,
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lng")]
    pub longitude: Option<f64>,
}

impl CreatePinRequest {
    fn coordinate(&self) -> Result<GeoPoint> {
        let (lat, lng) = match (&self.coordinate, self.latitude, self.longitude) {
            (Some(c), None, None) => (c.lat, c.lng),
            (None, Some(lat), Some(lng)) => (lat, lng),
            (Some(_), _, _) => {
                return Err(AppError::Validation(
                    "send either coordinate or latitude/longitude, not both".to_string(),
                ));
            }
            _ => {
                return Err(AppError::Validation(
                    "coordinate (lat, lng) is required".to_string(),
                ));
            }
        };
        Ok(GeoPoint::new(lat, lng)?)
    }
}

/// `GET /pins` query.
#[derive(Debug, Deserialize)]
pub struct ListPinsParams {
    #[serde(default, alias = "user_id")]
    pub owner_id: Option<String>,
}

/// Proximity query parameters. Kept as strings so defaulting and parsing
/// follow the core rules rather than serde's.
#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    #[serde(default, alias = "latitude")]
    pub lat: Option<String>,
    #[serde(default, alias = "longitude")]
    pub lng: Option<String>,
    #[serde(default, rename = "maxDistanceMeters", alias = "maxDistance")]
    pub max_distance: Option<String>,
}

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

fn query<T>(params: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

fn parse_pin_id(raw: &str) -> Result<PinId> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("invalid pin id: {raw}")))
}

fn pin_not_found() -> AppError {
    AppError::NotFound("Pin not found".to_string())
}

async fn insert_pin(state: &AppState, request: &CreatePinRequest) -> Result<Pin> {
    let song = Song::parse(&request.song)?;
    let owner_id = UserId::parse(&request.owner_id)?;
    let coordinate = request.coordinate()?;

    let pin = state
        .store()
        .create_pin(Pin::new(song, owner_id, coordinate))
        .await?;

    tracing::info!(
        pin_id = %pin.id,
        owner_id = %pin.owner_id,
        coordinate = %pin.coordinate,
        "Pin created"
    );
    Ok(pin)
}

/// `POST /api/pins`
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreatePinRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Pin>)> {
    let request = body(payload)?;
    let pin = insert_pin(&state, &request).await?;
    Ok((StatusCode::CREATED, Json(pin)))
}

/// `POST /api/pins/create`: older clients expect the pin wrapped with a
/// message.
#[instrument(skip_all)]
pub async fn create_legacy(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreatePinRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let request = body(payload)?;
    let pin = insert_pin(&state, &request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Pin created successfully", "pin": pin })),
    ))
}

/// `GET /api/pins/{id}`
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Pin>> {
    let id = parse_pin_id(&id)?;
    state
        .store()
        .get_pin(id)
        .await?
        .map(Json)
        .ok_or_else(pin_not_found)
}

/// `GET /api/pins?owner_id=`
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListPinsParams>, QueryRejection>,
) -> Result<Json<Vec<Pin>>> {
    let owner = query(params)?
        .owner_id
        .ok_or_else(|| AppError::Validation("owner_id is required".to_string()))?;
    pins_for(&state, &owner).await
}

/// `GET /api/pins/user/{user_id}`
#[instrument(skip(state))]
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Pin>>> {
    pins_for(&state, &user_id).await
}

async fn pins_for(state: &AppState, owner: &str) -> Result<Json<Vec<Pin>>> {
    let owner = UserId::parse(owner)?;
    let pins = state.store().pins_by_owner(&owner).await?;
    Ok(Json(pins))
}

/// `GET /api/pins/near?lat&lng&maxDistanceMeters` (also `/nearby`).
#[instrument(skip_all)]
pub async fn nearby(
    State(state): State<AppState>,
    params: std::result::Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<Vec<NearbyPin>>> {
    let params = query(params)?;
    let proximity = ProximityQuery::from_params(
        params.lat.as_deref(),
        params.lng.as_deref(),
        params.max_distance.as_deref(),
    )
    .inspect_err(|e| tracing::warn!(error = %e, "Rejected proximity query"))?;

    let pins = state.store().nearby_pins(proximity).await?;
    tracing::debug!(
        center = %proximity.center(),
        max_distance_m = proximity.max_distance_m(),
        results = pins.len(),
        "Proximity query"
    );
    Ok(Json(pins))
}

/// `DELETE /api/pins/{id}`: 204 whether or not the pin existed.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = parse_pin_id(&id)?;
    if state.store().delete_pin(id).await? {
        tracing::info!(pin_id = %id, "Pin deleted");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/pins/{id}/play`
#[instrument(skip(state))]
pub async fn play(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = parse_pin_id(&id)?;
    let playback = state.playback().ok_or(AppError::PlaybackUnavailable)?;
    let pin = state.store().get_pin(id).await?.ok_or_else(pin_not_found)?;

    let track = play_song(playback, &pin.song).await?;
    tracing::info!(pin_id = %id, track = %track, "Playing pin");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(json: &str) -> CreatePinRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_nested_coordinate() {
        let req = request(
            r#"{"song":"Shape of You","owner_id":"12345","coordinate":{"lat":40.7128,"lng":-74.006}}"#,
        );
        let point = req.coordinate().unwrap();
        assert!((point.latitude() - 40.7128).abs() < f64::EPSILON);
    }

    #[test]
    fn test_flat_legacy_coordinate() {
        let req = request(
            r#"{"pin_id":"p1","song":"x","user_id":"12345","latitude":34.0522,"longitude":-118.2437}"#,
        );
        assert_eq!(req.owner_id, "12345");
        let point = req.coordinate().unwrap();
        assert!((point.longitude() + 118.2437).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_or_ambiguous_coordinate() {
        let req = request(r#"{"song":"x","owner_id":"1","latitude":1.0}"#);
        assert!(matches!(req.coordinate(), Err(AppError::Validation(_))));

        let req = request(
            r#"{"song":"x","owner_id":"1","coordinate":{"lat":1,"lng":2},"lat":1.0,"lng":2.0}"#,
        );
        assert!(matches!(req.coordinate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_out_of_range_coordinate() {
        let req = request(r#"{"song":"x","owner_id":"1","coordinate":{"lat":91,"lng":0}}"#);
        assert!(matches!(req.coordinate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_pin_id() {
        assert!(parse_pin_id("not-a-uuid").is_err());
        let id = PinId::generate();
        assert_eq!(parse_pin_id(&id.to_string()).unwrap(), id);
    }
}
