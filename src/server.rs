/*
 *  server.rs
 *
 *  weatherboard - e-paper weather dashboard
 *
 *  HTTP surface: one render endpoint plus a health check.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono_tz::Tz;
use log::{info, warn};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::canvas::{FontStore, IconStore};
use crate::composer::{Composer, Extras, Style};
use crate::config::Config;
use crate::error::Error;
use crate::geocode::LocationService;
use crate::strava::StravaService;
use crate::weather::WeatherClient;

const DEFAULT_LATITUDE: &str = "39.75";
const DEFAULT_LONGITUDE: &str = "-104.90";
const DEFAULT_TIMEZONE: &str = "Europe/Copenhagen";

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub fonts: Arc<FontStore>,
    pub icons: Arc<IconStore>,
    pub location: LocationService,
    pub strava: Option<StravaService>,
}

/// Render errors mapped onto HTTP statuses: caller mistakes are 400,
/// upstream trouble is 502, everything else is a 500.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Config(_) => StatusCode::BAD_REQUEST,
        Error::Fetch(_) | Error::Parse(_) => StatusCode::BAD_GATEWAY,
        Error::State | Error::Range(_) | Error::Asset(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        warn!("Render failed: {}", self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(render_dashboard))
        .route("/health", get(health))
        .with_state(state)
}

/// Binds and serves until the process is stopped.
pub async fn serve(state: AppState, bind: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on http://{bind}");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn health() -> &'static str {
    "OK"
}

fn parse_coord(params: &HashMap<String, String>, name: &str, default: &str) -> Result<f64, Error> {
    let raw = params.get(name).map(String::as_str).unwrap_or(default);
    raw.parse()
        .map_err(|_| Error::Config(format!("invalid {name} {raw:?}")))
}

fn parse_timezone(params: &HashMap<String, String>) -> Result<Tz, Error> {
    let raw = params
        .get("timezone")
        .map(String::as_str)
        .unwrap_or(DEFAULT_TIMEZONE);
    raw.parse()
        .map_err(|_| Error::Config(format!("invalid timezone {raw:?}")))
}

/// GET /: fetches weather for the requested coordinate and responds
/// with the rendered dashboard PNG.
///
/// Query parameters: `api_key` (required), `latitude`, `longitude`,
/// `timezone`, `style` (`7` for the seven layout, classic otherwise).
async fn render_dashboard(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let Some(api_key) = params.get("api_key").filter(|k| !k.is_empty()) else {
        return Ok((StatusCode::BAD_REQUEST, Json(json!({ "error": "no_api_key" }))).into_response());
    };
    let latitude = parse_coord(&params, "latitude", DEFAULT_LATITUDE)?;
    let longitude = parse_coord(&params, "longitude", DEFAULT_LONGITUDE)?;
    let timezone = parse_timezone(&params)?;
    let style = Style::from_query(params.get("style").map(String::as_str).unwrap_or("2"));

    let mut weather = WeatherClient::new(latitude, longitude, timezone)?;
    weather.load(api_key).await?;

    // A failed city lookup degrades to a blank line rather than a
    // broken dashboard.
    let city = match state.location.get_city(latitude, longitude).await {
        Ok(city) => city,
        Err(e) => {
            warn!("City lookup failed: {e}");
            String::new()
        }
    };
    let ride_ytd_m = match (&state.strava, style) {
        (Some(strava), Style::Classic) => strava.get_ride_ytd().await,
        _ => -1.0,
    };
    let extras = Extras {
        city,
        ride_ytd_m,
        aqi: None,
    };

    let composer = Composer::new(style, state.config.locale);
    let png = composer.render(&weather, &state.fonts, &state.icons, &extras)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn coords_default_to_denver() {
        let empty = params(&[]);
        assert_eq!(parse_coord(&empty, "latitude", DEFAULT_LATITUDE).unwrap(), 39.75);
        assert_eq!(
            parse_coord(&empty, "longitude", DEFAULT_LONGITUDE).unwrap(),
            -104.90
        );
    }

    #[test]
    fn bad_coord_is_config_error() {
        let bad = params(&[("latitude", "north")]);
        assert!(matches!(
            parse_coord(&bad, "latitude", DEFAULT_LATITUDE),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn timezone_defaults_to_copenhagen() {
        assert_eq!(
            parse_timezone(&params(&[])).unwrap(),
            chrono_tz::Europe::Copenhagen
        );
    }

    #[test]
    fn bad_timezone_is_config_error() {
        let bad = params(&[("timezone", "Mars/Olympus_Mons")]);
        assert!(matches!(parse_timezone(&bad), Err(Error::Config(_))));
    }

    #[test]
    fn error_statuses() {
        assert_eq!(
            status_for(&Error::Config("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&Error::Fetch("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(&Error::State), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status_for(&Error::Asset("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
