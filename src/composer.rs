/*
 *  composer.rs
 *
 *  weatherboard - e-paper weather dashboard
 *
 *  Layout engine: turns one weather snapshot plus auxiliary data into
 *  the finished 800x480 PNG, in either the classic or the seven-style
 *  arrangement.
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

use chrono::{DateTime, Locale, NaiveDate, Utc};

use crate::canvas::{Canvas, FontStore, HAlign, IconStore, Rgb, VAlign, Weight};
use crate::error::Result;
use crate::holidays;
use crate::weather::{title_case, AlertSummary, DailySummary, HourlySummary, WeatherClient};

pub const CANVAS_WIDTH: u32 = 800;
pub const CANVAS_HEIGHT: u32 = 480;

pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const BLUE: Rgb = Rgb(0, 0, 255);
pub const LIGHT_BLUE: Rgb = Rgb(128, 191, 255);
pub const RED: Rgb = Rgb(255, 0, 0);
pub const PURPLE: Rgb = Rgb(128, 0, 255);
pub const ORANGE: Rgb = Rgb(255, 140, 0);
pub const GREY: Rgb = Rgb(102, 102, 102);
pub const GREEN: Rgb = Rgb(0, 255, 0);

const RAIN_COLOR: Rgb = BLUE;

/// How far ahead the alert row looks for holidays, in days.
const HOLIDAY_HORIZON_DAYS: i64 = 14;

/// Dashboard arrangement. Classic is the two-day wide layout; Seven is
/// the narrower layout with the alert pill row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Classic,
    Seven,
}

impl Style {
    /// `"7"` selects the seven style; anything else is classic.
    pub fn from_query(value: &str) -> Style {
        if value == "7" {
            Style::Seven
        } else {
            Style::Classic
        }
    }
}

/// Per-render data gathered outside the weather snapshot.
#[derive(Debug, Clone, Default)]
pub struct Extras {
    pub city: String,
    /// Year-to-date ride distance in metres; -1.0 when unavailable.
    pub ride_ytd_m: f64,
    pub aqi: Option<i64>,
}

/// One pill in the seven-style alert row.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPill {
    pub text: String,
    pub subtext: Option<String>,
    pub color: Rgb,
}

/// Merges active weather alerts with upcoming Danish holidays into the
/// pill row, weather first. An empty row becomes the single black
/// "Ingen advarsler" placeholder.
pub fn compose_alerts(weather_alerts: &[AlertSummary], today: NaiveDate) -> Vec<AlertPill> {
    let mut pills: Vec<AlertPill> = weather_alerts
        .iter()
        .map(|a| AlertPill {
            text: a.text.clone(),
            subtext: Some(a.subtext.clone()),
            color: RED,
        })
        .collect();
    for (days_until, name) in holidays::upcoming(today, HOLIDAY_HORIZON_DAYS) {
        pills.push(AlertPill {
            text: name.to_string(),
            subtext: Some(if days_until == 1 {
                "i morgen".to_string()
            } else {
                format!("om {days_until} dage")
            }),
            color: BLUE,
        });
    }
    if pills.is_empty() {
        pills.push(AlertPill {
            text: "Ingen advarsler".to_string(),
            subtext: None,
            color: BLACK,
        });
    }
    pills
}

pub struct Composer {
    style: Style,
    locale: Locale,
}

impl Composer {
    pub fn new(style: Style, locale: Locale) -> Self {
        Composer { style, locale }
    }

    /// Renders the dashboard for the current instant.
    pub fn render(
        &self,
        weather: &WeatherClient,
        fonts: &FontStore,
        icons: &IconStore,
        extras: &Extras,
    ) -> Result<Vec<u8>> {
        self.render_at(weather, fonts, icons, extras, Utc::now())
    }

    /// Renders the dashboard as of `now`. Separated from [`render`] so
    /// tests can pin the clock.
    ///
    /// [`render`]: Composer::render
    pub fn render_at(
        &self,
        weather: &WeatherClient,
        fonts: &FontStore,
        icons: &IconStore,
        extras: &Extras,
        now: DateTime<Utc>,
    ) -> Result<Vec<u8>> {
        let mut canvas = Canvas::new(CANVAS_WIDTH, CANVAS_HEIGHT, fonts)?;
        match self.style {
            Style::Classic => self.render_classic(&mut canvas, weather, icons, extras, now)?,
            Style::Seven => self.render_seven(&mut canvas, weather, icons, extras, now)?,
        }
        canvas.encode_png()
    }

    fn render_classic(
        &self,
        canvas: &mut Canvas,
        weather: &WeatherClient,
        icons: &IconStore,
        extras: &Extras,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.draw_date(canvas, weather, now, true);
        self.draw_city(canvas, extras);
        self.draw_uvi(canvas, weather, icons)?;
        self.draw_temps_daily(canvas, weather)?;
        let ts = now.timestamp();
        for (offset_hours, left) in [(0, 30.0), (2, 155.0), (4, 280.0), (6, 405.0)] {
            let summary = weather.hourly_summary_at(ts + offset_hours * 3600)?;
            self.draw_hourly_column(canvas, weather, icons, &summary, 135.0, left, true)?;
        }
        canvas.stroke_line((515.0, 135.0), (515.0, 290.0), 2.0, GREY);
        for (day_offset, left) in [(1, 530.0), (2, 655.0)] {
            let summary = weather.daily_summary(day_offset)?;
            self.draw_daily_column(canvas, weather, icons, &summary, 135.0, left, true)?;
        }
        self.draw_meteogram(canvas, weather, now)?;
        self.draw_stats_classic(canvas, weather, icons, extras)?;
        Ok(())
    }

    fn render_seven(
        &self,
        canvas: &mut Canvas,
        weather: &WeatherClient,
        icons: &IconStore,
        extras: &Extras,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.draw_date(canvas, weather, now, false);
        self.draw_temps_24hr(canvas, weather)?;
        let ts = now.timestamp();
        for (offset_hours, left) in [(0, 30.0), (2, 155.0), (5, 280.0)] {
            let summary = weather.hourly_summary_at(ts + offset_hours * 3600)?;
            self.draw_hourly_column(canvas, weather, icons, &summary, 120.0, left, false)?;
        }
        let daily = weather.daily_summary(1)?;
        self.draw_daily_column(canvas, weather, icons, &daily, 120.0, 440.0, false)?;
        self.draw_meteogram(canvas, weather, now)?;
        self.draw_alerts(canvas, weather, now)?;
        self.draw_stats_seven(canvas, weather, icons, extras)?;
        Ok(())
    }

    /// Weekday in large light type, with the localized, lowercased date
    /// below it. The classic style title-cases the weekday.
    fn draw_date(
        &self,
        canvas: &mut Canvas,
        weather: &WeatherClient,
        now: DateTime<Utc>,
        titled: bool,
    ) {
        let local = now.with_timezone(&weather.timezone());
        let weekday = local.format_localized("%A", self.locale).to_string();
        let weekday = if titled { title_case(&weekday) } else { weekday };
        let left = 5.0;
        canvas.draw_text(
            &weekday,
            (left, 55.0),
            60.0,
            Weight::Light,
            BLACK,
            HAlign::Left,
            VAlign::Top,
        );
        let date = local
            .format_localized("%-d. %B", self.locale)
            .to_string()
            .to_lowercase();
        canvas.draw_text(
            &date,
            (left, 90.0),
            30.0,
            Weight::Bold,
            BLACK,
            HAlign::Left,
            VAlign::Top,
        );
    }

    fn draw_city(&self, canvas: &mut Canvas, extras: &Extras) {
        canvas.draw_text(
            &extras.city,
            (5.0, 125.0),
            30.0,
            Weight::Light,
            BLACK,
            HAlign::Left,
            VAlign::Top,
        );
    }

    fn draw_uvi(
        &self,
        canvas: &mut Canvas,
        weather: &WeatherClient,
        icons: &IconStore,
    ) -> Result<()> {
        let left = 500.0;
        canvas.draw_icon(icons, "uv", (300.0, 5.0), 0.7)?;
        let max_label = format!("Max: {}", weather.uvi_max_today()?.round() as i64);
        canvas.draw_text(
            &max_label,
            (left, 35.0),
            30.0,
            Weight::Regular,
            BLACK,
            HAlign::Right,
            VAlign::Top,
        );
        let now_label = format!("Nu: {}", weather.uvi_current()?.round() as i64);
        canvas.draw_text(
            &now_label,
            (left, 65.0),
            30.0,
            Weight::Regular,
            BLACK,
            HAlign::Right,
            VAlign::Top,
        );
        Ok(())
    }

    /// Classic min/now/max boxes, fed by today's daily forecast range,
    /// with degree suffixes.
    fn draw_temps_daily(&self, canvas: &mut Canvas, weather: &WeatherClient) -> Result<()> {
        let daily = weather.daily_summary(0)?;
        self.draw_temp_boxes(
            canvas,
            (535.0, 710.0),
            (577.0, 665.0, 753.0),
            &format!("{}°", daily.temp_min.round() as i64),
            &format!("{}°", weather.temp_current()?.round() as i64),
            &format!("{}°", daily.temp_max.round() as i64),
        );
        Ok(())
    }

    /// Seven-style min/now/max boxes over the next 24 hourly records,
    /// bare numbers.
    fn draw_temps_24hr(&self, canvas: &mut Canvas, weather: &WeatherClient) -> Result<()> {
        let (temp_min, temp_max) = weather.temp_range_24hr()?;
        self.draw_temp_boxes(
            canvas,
            (335.0, 510.0),
            (377.0, 465.0, 553.0),
            &(temp_min.round() as i64).to_string(),
            &(weather.temp_current()?.round() as i64).to_string(),
            &(temp_max.round() as i64).to_string(),
        );
        Ok(())
    }

    fn draw_temp_boxes(
        &self,
        canvas: &mut Canvas,
        rects: (f32, f32),
        centers: (f32, f32, f32),
        min_text: &str,
        now_text: &str,
        max_text: &str,
    ) {
        canvas.fill_roundrect(rects.0, 5.0, 85.0, 90.0, 5.0, BLUE);
        canvas.fill_roundrect(rects.1, 5.0, 85.0, 90.0, 5.0, RED);
        let boxes = [
            (centers.0, min_text, "Min.", WHITE),
            (centers.1, now_text, "Nu", BLACK),
            (centers.2, max_text, "Max.", WHITE),
        ];
        for (cx, value, label, color) in boxes {
            canvas.draw_text(
                value,
                (cx, 55.0),
                50.0,
                Weight::Bold,
                color,
                HAlign::Center,
                VAlign::Top,
            );
            canvas.draw_text(
                label,
                (cx, 82.0),
                23.0,
                Weight::Regular,
                color,
                HAlign::Center,
                VAlign::Top,
            );
        }
    }

    /// Forecast column: hour heading, condition icon, temperature plus
    /// wind. The classic style pads the hour to two digits.
    #[allow(clippy::too_many_arguments)]
    fn draw_hourly_column(
        &self,
        canvas: &mut Canvas,
        weather: &WeatherClient,
        icons: &IconStore,
        summary: &HourlySummary,
        top: f32,
        left: f32,
        padded_hour: bool,
    ) -> Result<()> {
        let local = summary.time.with_timezone(&weather.timezone());
        let heading = if padded_hour {
            local.format("%H").to_string()
        } else {
            local.format("%-H").to_string()
        };
        canvas.draw_text(
            &heading,
            (left + 50.0, top + 25.0),
            28.0,
            Weight::Regular,
            BLACK,
            HAlign::Center,
            VAlign::Top,
        );
        canvas.draw_icon(icons, summary.icon, (left, top + 33.0), 1.0)?;
        if self.style == Style::Classic {
            canvas.draw_text(
                &format!("{}°", summary.temperature.round() as i64),
                (left + 30.0, top + 150.0),
                28.0,
                Weight::Bold,
                BLACK,
                HAlign::Right,
                VAlign::Top,
            );
            canvas.draw_icon(icons, summary.wind_icon, (left + 40.0, top + 125.0), 0.5)?;
            canvas.draw_text(
                &(summary.wind.round() as i64).to_string(),
                (left + 70.0, top + 150.0),
                28.0,
                Weight::Regular,
                BLACK,
                HAlign::Left,
                VAlign::Top,
            );
        }
        Ok(())
    }

    /// Forecast column for a whole day: weekday heading and icon, plus
    /// the min/max range in the classic style.
    #[allow(clippy::too_many_arguments)]
    fn draw_daily_column(
        &self,
        canvas: &mut Canvas,
        weather: &WeatherClient,
        icons: &IconStore,
        summary: &DailySummary,
        top: f32,
        left: f32,
        with_range: bool,
    ) -> Result<()> {
        let local = summary.date.with_timezone(&weather.timezone());
        let heading = title_case(&local.format_localized("%A", self.locale).to_string());
        canvas.draw_text(
            &heading,
            (left + 50.0, top + 25.0),
            28.0,
            Weight::Regular,
            BLACK,
            HAlign::Center,
            VAlign::Top,
        );
        canvas.draw_icon(icons, summary.icon, (left, top + 33.0), 1.0)?;
        if with_range {
            let range = format!(
                "{}° • {}°",
                summary.temp_min.round() as i64,
                summary.temp_max.round() as i64
            );
            canvas.draw_text(
                &range,
                (left + 50.0, top + 150.0),
                28.0,
                Weight::Regular,
                BLACK,
                HAlign::Center,
                VAlign::Top,
            );
        }
        Ok(())
    }

    /// 24-hour temperature/precipitation chart with the hour axis and
    /// UV bar underneath.
    fn draw_meteogram(
        &self,
        canvas: &mut Canvas,
        weather: &WeatherClient,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let top = 310.0f32;
        let left = 10.0f32;
        let width: f32 = match self.style {
            Style::Classic => 625.0,
            Style::Seven => 425.0,
        };
        let snow_color = match self.style {
            Style::Classic => LIGHT_BLUE,
            Style::Seven => PURPLE,
        };
        let height = 85.0f32;
        let left_axis = 18.0f32;
        let hours: i64 = 24;
        let y_interval: i64 = 10;
        let graph_width = width - left_axis;
        let ts = now.timestamp();

        let summaries: Vec<HourlySummary> = (0..=hours)
            .map(|hour| weather.hourly_summary_at(ts + hour * 3600))
            .collect::<Result<_>>()?;

        let hour_to_x = |hour: i64| left + left_axis + hour as f32 * (graph_width / hours as f32);

        // Day boundary lines
        let mut today = summaries[0].day.clone();
        for hour in 0..hours {
            let day = &summaries[hour as usize].day;
            if *day != today {
                let x = hour_to_x(hour) - 0.5;
                canvas.dashed_line((x, top), (x, top + height), 1.0, BLACK);
                today = day.clone();
            }
        }

        // Temperature scale, snapped outward to the 10-degree grid. A
        // flat series still needs a non-zero span.
        let temp_min = summaries.iter().map(|s| s.temperature).fold(f64::MAX, f64::min);
        let temp_max = summaries.iter().map(|s| s.temperature).fold(f64::MIN, f64::max);
        let scale_min = (temp_min / y_interval as f64).floor() as i64 * y_interval;
        let mut scale_max = (temp_max / y_interval as f64).ceil() as i64 * y_interval;
        if scale_max == scale_min {
            scale_max += y_interval;
        }
        let temp_to_y = |temp: f64| {
            top + ((scale_max as f64 - temp) * (height as f64 / (scale_max - scale_min) as f64))
                as f32
        };

        // Rain/snow curves
        let precip_to_y =
            |precip: f64| top + 1.0 + ((4.0 - precip).max(0.0) * (height as f64 / 4.0)) as f32;
        let mut rain_points = Vec::with_capacity(summaries.len());
        let mut snow_points = Vec::with_capacity(summaries.len());
        let mut has_rain = false;
        let mut has_snow = false;
        for (hour, summary) in summaries.iter().enumerate() {
            let x = hour_to_x(hour as i64);
            has_rain |= summary.rain > 0.0;
            has_snow |= summary.snow > 0.0;
            rain_points.push((x, precip_to_y(summary.rain)));
            snow_points.push((x, precip_to_y(summary.snow)));
        }
        let bottom = precip_to_y(0.0).floor();
        canvas.fill_precip_curve(&rain_points, bottom, RAIN_COLOR, 7.0);
        canvas.fill_precip_curve(&snow_points, bottom, snow_color, 7.0);

        // Legend below the chart, classic only
        if self.style == Style::Classic {
            let mut cursor = left + left_axis;
            if has_rain {
                cursor += canvas.fill_circle(cursor, top + 150.0, 6.0, RAIN_COLOR);
                cursor += canvas.draw_text(
                    "Regn",
                    (cursor, top + 157.0),
                    20.0,
                    Weight::Regular,
                    BLACK,
                    HAlign::Left,
                    VAlign::Top,
                ) as f32;
                cursor += 40.0;
            }
            if has_snow {
                cursor += canvas.fill_circle(cursor, top + 150.0, 6.0, snow_color);
                canvas.draw_text(
                    "Sne",
                    (cursor, top + 157.0),
                    20.0,
                    Weight::Regular,
                    BLACK,
                    HAlign::Left,
                    VAlign::Top,
                );
            }
        }

        // Gridlines with temperature labels
        let (label_suffix, label_right) = match self.style {
            Style::Classic => ("°", left + left_axis - 2.0),
            Style::Seven => ("", left + left_axis - 6.0),
        };
        let mut t = scale_min;
        while t <= scale_max {
            let y = temp_to_y(t as f64);
            canvas.dashed_line(
                (left + left_axis, y + 0.5),
                (left + left_axis + graph_width, y + 0.5),
                1.0,
                BLACK,
            );
            canvas.draw_text(
                &format!("{t}{label_suffix}"),
                (label_right, y),
                14.0,
                Weight::Regular,
                BLACK,
                HAlign::Right,
                VAlign::Middle,
            );
            t += y_interval;
        }

        // Temperature curve: white casing with the gradient core on top
        let temp_points: Vec<(f32, f32)> = summaries
            .iter()
            .enumerate()
            .map(|(hour, s)| (hour_to_x(hour as i64), temp_to_y(s.temperature)))
            .collect();
        canvas.stroke_polyline(&temp_points, 6.0, WHITE);
        canvas.stroke_polyline_gradient(&temp_points, 3.0, temp_to_y(0.0), RED, BLUE);

        // Hour axis and UV bar
        let bar_top = top + height + 13.0;
        let label_step = match self.style {
            Style::Classic => 2,
            Style::Seven => 3,
        };
        for hour in 0..hours {
            let summary = &summaries[hour as usize];
            let x = hour_to_x(hour);
            if hour % label_step == 0 {
                let label = match self.style {
                    Style::Classic => format!("{}:00", summary.hour),
                    Style::Seven => summary.hour.clone(),
                };
                canvas.draw_text(
                    &label,
                    (x, bar_top + 19.0),
                    15.0,
                    Weight::Regular,
                    BLACK,
                    HAlign::Center,
                    VAlign::Bottom,
                );
            }
            canvas.fill_rect(
                x,
                bar_top,
                graph_width / hours as f32 + 1.0,
                8.0,
                self.uv_bar_color(summary.uv),
            );
        }
        Ok(())
    }

    /// UV bar tier color. The classic style has a three-tier scale; the
    /// seven style only flags extreme values.
    fn uv_bar_color(&self, uv: f64) -> Rgb {
        match self.style {
            Style::Classic => {
                if uv >= 7.0 {
                    PURPLE
                } else if uv >= 3.0 {
                    RED
                } else if uv > 0.0 {
                    ORANGE
                } else {
                    BLACK
                }
            }
            Style::Seven => {
                if uv > 7.0 {
                    RED
                } else if uv > 0.0 {
                    ORANGE
                } else {
                    BLACK
                }
            }
        }
    }

    /// Seven-style pill row: weather alerts in red, upcoming holidays
    /// in blue, or the black placeholder.
    fn draw_alerts(
        &self,
        canvas: &mut Canvas,
        weather: &WeatherClient,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let today = now.with_timezone(&weather.timezone()).date_naive();
        let pills = compose_alerts(&weather.active_alerts_at(now.timestamp())?, today);
        let top = 265.0;
        let mut left = 5.0;
        for pill in pills {
            let text = pill.text.to_uppercase();
            let text_width = canvas.measure_text(&text, 20.0, Weight::Bold) as f32;
            canvas.fill_roundrect(left, top, text_width + 15.0, 30.0, 4.0, pill.color);
            left += canvas.draw_text(
                &text,
                (left + 8.0, top + 23.0),
                20.0,
                Weight::Bold,
                WHITE,
                HAlign::Left,
                VAlign::Top,
            ) as f32;
            let subtext_width = match pill.subtext {
                Some(subtext) => canvas.draw_text(
                    &subtext,
                    (left + 20.0, top + 26.0),
                    15.0,
                    Weight::Regular,
                    BLACK,
                    HAlign::Left,
                    VAlign::Top,
                ) as f32,
                None => 0.0,
            };
            left += 30.0 + subtext_width;
        }
        Ok(())
    }

    /// Classic stats corner: sunrise/sunset and the year-to-date ride
    /// distance.
    fn draw_stats_classic(
        &self,
        canvas: &mut Canvas,
        weather: &WeatherClient,
        icons: &IconStore,
        extras: &Extras,
    ) -> Result<()> {
        canvas.draw_icon(icons, "rise-set", (650.0, 300.0), 1.0)?;
        self.draw_sun_times(canvas, weather, 705.0)?;
        canvas.draw_icon(icons, "ride", (657.0, 402.0), 0.5)?;
        canvas.draw_text(
            &format!("{:.0} km", extras.ride_ytd_m / 1000.0),
            (705.0, 430.0),
            30.0,
            Weight::Bold,
            BLACK,
            HAlign::Left,
            VAlign::Top,
        );
        Ok(())
    }

    /// Seven-style stats corner: sunrise/sunset and the air-quality
    /// pill.
    fn draw_stats_seven(
        &self,
        canvas: &mut Canvas,
        weather: &WeatherClient,
        icons: &IconStore,
        extras: &Extras,
    ) -> Result<()> {
        canvas.draw_icon(icons, "rise-set-aqi", (450.0, 300.0), 1.0)?;
        self.draw_sun_times(canvas, weather, 505.0)?;
        let (text, color) = aqi_pill(extras.aqi);
        let text_width = canvas.measure_text(&text, 30.0, Weight::Bold) as f32;
        canvas.fill_roundrect(505.0, 402.0, text_width + 13.0, 36.0, 3.0, color);
        canvas.draw_text(
            &text,
            (510.0, 430.0),
            30.0,
            Weight::Bold,
            WHITE,
            HAlign::Left,
            VAlign::Top,
        );
        Ok(())
    }

    fn draw_sun_times(
        &self,
        canvas: &mut Canvas,
        weather: &WeatherClient,
        left: f32,
    ) -> Result<()> {
        let tz = weather.timezone();
        let sunrise = weather.sunrise()?.with_timezone(&tz).format("%H:%M");
        let sunset = weather.sunset()?.with_timezone(&tz).format("%H:%M");
        canvas.draw_text(
            &sunrise.to_string(),
            (left, 337.0),
            32.0,
            Weight::Regular,
            BLACK,
            HAlign::Left,
            VAlign::Top,
        );
        canvas.draw_text(
            &sunset.to_string(),
            (left, 385.0),
            32.0,
            Weight::Regular,
            BLACK,
            HAlign::Left,
            VAlign::Top,
        );
        Ok(())
    }
}

/// Air-quality pill text and color: green below 50, orange below 150,
/// red above, grey "N/A" when the index is unknown.
pub fn aqi_pill(aqi: Option<i64>) -> (String, Rgb) {
    match aqi {
        Some(value) if value < 50 => (value.to_string(), GREEN),
        Some(value) if value < 150 => (value.to_string(), ORANGE),
        Some(value) => (value.to_string(), RED),
        None => ("N/A".to_string(), GREY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::AlertSummary;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn style_from_query() {
        assert_eq!(Style::from_query("7"), Style::Seven);
        assert_eq!(Style::from_query("2"), Style::Classic);
        assert_eq!(Style::from_query(""), Style::Classic);
        assert_eq!(Style::from_query("nonsense"), Style::Classic);
    }

    #[test]
    fn empty_alert_row_gets_placeholder() {
        // Mid-February: no Danish holiday within two weeks.
        let pills = compose_alerts(&[], date(2026, 2, 10));
        assert_eq!(
            pills,
            vec![AlertPill {
                text: "Ingen advarsler".to_string(),
                subtext: None,
                color: BLACK,
            }]
        );
    }

    #[test]
    fn weather_alerts_lead_and_are_red() {
        let alerts = vec![AlertSummary {
            text: "Storm".to_string(),
            subtext: "for 3 hours".to_string(),
        }];
        let pills = compose_alerts(&alerts, date(2026, 12, 20));
        assert_eq!(pills[0].text, "Storm");
        assert_eq!(pills[0].color, RED);
        assert_eq!(pills[0].subtext.as_deref(), Some("for 3 hours"));
        // Juleaften is four days out, so a blue holiday pill follows.
        assert!(pills[1..]
            .iter()
            .all(|p| p.color == BLUE && p.subtext.is_some()));
        assert_eq!(pills[1].text, "Juleaften");
        assert_eq!(pills[1].subtext.as_deref(), Some("om 4 dage"));
    }

    #[test]
    fn holiday_tomorrow_says_i_morgen() {
        let pills = compose_alerts(&[], date(2026, 12, 23));
        assert_eq!(pills[0].text, "Juleaften");
        assert_eq!(pills[0].subtext.as_deref(), Some("i morgen"));
    }

    #[test]
    fn holiday_today_counts_in_days() {
        let pills = compose_alerts(&[], date(2026, 12, 24));
        assert_eq!(pills[0].text, "Juleaften");
        assert_eq!(pills[0].subtext.as_deref(), Some("om 0 dage"));
    }

    #[test]
    fn uv_bar_tiers_classic() {
        let composer = Composer::new(Style::Classic, Locale::da_DK);
        assert_eq!(composer.uv_bar_color(0.0), BLACK);
        assert_eq!(composer.uv_bar_color(1.0), ORANGE);
        assert_eq!(composer.uv_bar_color(3.0), RED);
        assert_eq!(composer.uv_bar_color(7.0), PURPLE);
    }

    #[test]
    fn uv_bar_tiers_seven() {
        let composer = Composer::new(Style::Seven, Locale::da_DK);
        assert_eq!(composer.uv_bar_color(0.0), BLACK);
        assert_eq!(composer.uv_bar_color(3.0), ORANGE);
        assert_eq!(composer.uv_bar_color(7.0), ORANGE);
        assert_eq!(composer.uv_bar_color(7.5), RED);
    }

    #[test]
    fn aqi_pill_colors() {
        assert_eq!(aqi_pill(Some(20)), ("20".to_string(), GREEN));
        assert_eq!(aqi_pill(Some(100)), ("100".to_string(), ORANGE));
        assert_eq!(aqi_pill(Some(200)), ("200".to_string(), RED));
        assert_eq!(aqi_pill(None), ("N/A".to_string(), GREY));
    }
}
