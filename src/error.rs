/*
 *  error.rs
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

use thiserror::Error;

/// Error taxonomy for one render pass. Everything propagates to the
/// immediate caller; there is no retry or partial-result degradation.
#[derive(Debug, Error)]
pub enum Error {
    /// Upstream HTTP call failed or returned a non-success status.
    #[error("upstream fetch failed: {0}")]
    Fetch(String),

    /// Provider payload did not match the expected schema.
    #[error("malformed provider payload: {0}")]
    Parse(#[from] serde_json::Error),

    /// A weather accessor was used before `load()` succeeded.
    #[error("weather data accessed before load")]
    State,

    /// Index or offset outside the fetched data window.
    #[error("out of range: {0}")]
    Range(String),

    /// A font or icon asset is missing from the asset directory.
    #[error("missing asset: {0}")]
    Asset(String),

    /// Invalid configuration (bad timezone name, bad locale, ...).
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
