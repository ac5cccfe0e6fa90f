/*
 *  strava.rs
 *
 *  weatherboard - e-paper weather dashboard
 *
 *  Year-to-date ride distance for the stats corner.
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

use log::warn;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{Error, Result};

const TOKEN_URL: &str = "https://www.strava.com/oauth/token";
const STATS_URL: &str = "https://www.strava.com/api/v3/athletes";

#[derive(Debug, Clone)]
pub struct StravaConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub rider_id: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct AthleteStats {
    ytd_ride_totals: RideTotals,
}

#[derive(Debug, Deserialize)]
struct RideTotals {
    distance: f64,
}

/// Strava stats client. An upstream failure yields the -1 sentinel the
/// dashboard has always shown rather than aborting the render.
#[derive(Debug, Clone)]
pub struct StravaService {
    config: StravaConfig,
    client: Client,
}

impl StravaService {
    pub fn new(config: StravaConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;
        Ok(StravaService { config, client })
    }

    /// Year-to-date ride distance in metres, or -1.0 when the API is
    /// unavailable.
    pub async fn get_ride_ytd(&self) -> f64 {
        match self.try_get_ride_ytd().await {
            Ok(distance) => distance,
            Err(e) => {
                warn!("Strava stats unavailable: {e}");
                -1.0
            }
        }
    }

    async fn try_get_ride_ytd(&self) -> Result<f64> {
        let token = self.acquire_access_token().await?;
        let url = format!("{}/{}/stats", STATS_URL, self.config.rider_id);
        let stats: AthleteStats = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(stats.ytd_ride_totals.distance)
    }

    async fn acquire_access_token(&self) -> Result<String> {
        let payload = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", self.config.refresh_token.as_str()),
        ];
        let token: TokenResponse = self
            .client
            .post(TOKEN_URL)
            .form(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(token.access_token)
    }
}
