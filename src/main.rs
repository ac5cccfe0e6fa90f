/*
 *  main.rs
 *
 *  weatherboard - e-paper weather dashboard
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

use anyhow::Context;
use env_logger::Env;
use log::info;
use std::sync::Arc;

use weatherboard::canvas::{FontStore, IconStore};
use weatherboard::config;
use weatherboard::geocode::LocationService;
use weatherboard::server::{self, AppState};
use weatherboard::strava::StravaService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = config::load()?;
    let fonts = Arc::new(
        FontStore::load(&config.assets_dir)
            .with_context(|| format!("loading fonts from {}", config.assets_dir.display()))?,
    );
    let icons = Arc::new(IconStore::new(&config.assets_dir));
    let location = LocationService::new(config.maps_api_key.clone())?;
    let strava = match &config.strava {
        Some(credentials) => Some(StravaService::new(credentials.clone())?),
        None => {
            info!("Strava credentials not configured, ride stats disabled");
            None
        }
    };

    let bind = config.bind;
    let state = AppState {
        config,
        fonts,
        icons,
        location,
        strava,
    };
    server::serve(state, bind).await
}
