/*
 *  device.rs
 *
 *  weatherboard - e-paper weather dashboard
 *
 *  Display-side loop: periodically downloads the rendered dashboard
 *  from the server and writes it where the e-paper driver picks it up.
 *  With the `gpio` feature the four panel buttons switch between
 *  preset cities.
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
use clap::{Parser, ValueHint};
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy)]
struct Location {
    name: &'static str,
    latitude: f64,
    longitude: f64,
}

/// Preset cities for panel buttons A through D.
const CITIES: [Location; 4] = [
    Location {
        name: "Copenhagen",
        latitude: 55.676098,
        longitude: 12.568337,
    },
    Location {
        name: "Ålsgårde",
        latitude: 56.075008,
        longitude: 12.545572,
    },
    Location {
        name: "Karlslunde",
        latitude: 55.566929,
        longitude: 12.245408,
    },
    Location {
        name: "Aarhus",
        latitude: 56.162939,
        longitude: 10.203921,
    },
];

/// BCM pins for the panel buttons, top to bottom.
#[cfg(feature = "gpio")]
const BUTTONS: [u8; 4] = [5, 6, 16, 24];

const DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug, Parser)]
#[command(name = "weatherboard-device", about = "e-paper weather dashboard device loop")]
struct Cli {
    /// Base URL of the dashboard server
    #[arg(long, default_value = "http://localhost:8080")]
    server_url: String,
    /// Where to write the downloaded PNG
    #[arg(long, default_value = "image.png", value_hint = ValueHint::FilePath)]
    output: PathBuf,
    /// Seconds between refreshes
    #[arg(long, default_value_t = 300)]
    interval_secs: u64,
    /// Timezone passed to the server
    #[arg(long, default_value = "Europe/Copenhagen")]
    timezone: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let api_key = std::env::var("OWA_API_KEY").context("OWA_API_KEY is not set")?;
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(30))
        .build()?;

    let (button_tx, mut button_rx) = mpsc::unbounded_channel::<usize>();
    #[cfg(feature = "gpio")]
    let _buttons = gpio::watch_buttons(button_tx.clone())?;
    // Keeps the channel open on builds without button support.
    let _button_tx = button_tx;

    let mut current = 0usize;
    let mut ticker = interval(Duration::from_secs(cli.interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_press = Instant::now() - DEBOUNCE;

    info!(
        "Device loop started, refreshing {} every {}s",
        CITIES[current].name, cli.interval_secs
    );
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            Some(index) = button_rx.recv() => {
                if last_press.elapsed() < DEBOUNCE {
                    continue;
                }
                last_press = Instant::now();
                current = index % CITIES.len();
                info!("Button {index} pressed, switching to {}", CITIES[current].name);
            }
        }
        if let Err(e) = refresh(&client, &cli, &api_key, &CITIES[current]).await {
            error!("Refresh failed: {e:#}");
        }
    }
}

/// One download cycle. Failures are reported to the caller; the loop
/// keeps the previous image on screen.
async fn refresh(
    client: &reqwest::Client,
    cli: &Cli,
    api_key: &str,
    city: &Location,
) -> anyhow::Result<()> {
    let url = format!(
        "{}/?api_key={}&latitude={}&longitude={}&timezone={}",
        cli.server_url.trim_end_matches('/'),
        api_key,
        city.latitude,
        city.longitude,
        cli.timezone
    );
    let bytes = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    tokio::fs::write(&cli.output, &bytes)
        .await
        .with_context(|| format!("writing {}", cli.output.display()))?;
    info!(
        "Dashboard for {} written to {} ({} bytes)",
        city.name,
        cli.output.display(),
        bytes.len()
    );
    Ok(())
}

#[cfg(feature = "gpio")]
mod gpio {
    use super::BUTTONS;
    use rppal::gpio::{Gpio, InputPin, Trigger};
    use tokio::sync::mpsc::UnboundedSender;

    /// Arms a falling-edge interrupt on every button pin. The returned
    /// pins must stay alive for the interrupts to keep firing.
    pub fn watch_buttons(tx: UnboundedSender<usize>) -> anyhow::Result<Vec<InputPin>> {
        let gpio = Gpio::new()?;
        let mut pins = Vec::with_capacity(BUTTONS.len());
        for (index, &bcm) in BUTTONS.iter().enumerate() {
            let mut pin = gpio.get(bcm)?.into_input_pullup();
            let tx = tx.clone();
            pin.set_async_interrupt(Trigger::FallingEdge, move |_| {
                let _ = tx.send(index);
            })?;
            pins.push(pin);
        }
        Ok(pins)
    }
}
