/*
 *  config.rs
 *
 *  weatherboard - e-paper weather dashboard
 *
 *  Runtime configuration: CLI flags layered over environment variables
 *  (with .env support for development).
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

use chrono::Locale;
use clap::{Parser, ValueHint};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::strava::StravaConfig;

/// CLI flags. Secrets stay in the environment; only addresses, paths
/// and rendering knobs live here.
#[derive(Debug, Parser, Clone)]
#[command(name = "weatherboard", about = "e-paper weather dashboard server")]
pub struct Cli {
    /// Socket address the HTTP server binds to
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,
    /// Directory holding the fonts/ and icons/ subdirectories
    #[arg(long, default_value = "assets", value_hint = ValueHint::DirPath)]
    pub assets: PathBuf,
    /// Locale for rendered dates, e.g. da_DK
    #[arg(long, default_value = "da_DK")]
    pub locale: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub assets_dir: PathBuf,
    pub locale: Locale,
    pub maps_api_key: Option<String>,
    pub strava: Option<StravaConfig>,
}

/// Parses CLI flags and the environment into the effective config.
/// Reads a `.env` file first when one exists.
pub fn load() -> Result<Config> {
    dotenvy::dotenv().ok();
    Config::resolve(Cli::parse())
}

impl Config {
    pub fn resolve(cli: Cli) -> Result<Config> {
        let locale = Locale::try_from(cli.locale.as_str())
            .map_err(|_| Error::Config(format!("unknown locale {:?}", cli.locale)))?;
        Ok(Config {
            bind: cli.bind,
            assets_dir: cli.assets,
            locale,
            maps_api_key: env_nonempty("MAPS_API_KEY"),
            strava: strava_from_env(),
        })
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Strava needs all four credentials; with any of them missing the
/// service is simply disabled.
fn strava_from_env() -> Option<StravaConfig> {
    Some(StravaConfig {
        client_id: env_nonempty("STRAVA_CLIENT_ID")?,
        client_secret: env_nonempty("STRAVA_CLIENT_SECRET")?,
        refresh_token: env_nonempty("STRAVA_REFRESH_TOKEN")?,
        rider_id: env_nonempty("STRAVA_RIDER_ID")?,
    })
}
