/*
 *  holidays.rs
 *
 *  weatherboard - e-paper weather dashboard
 *
 *  Danish holiday calendar feeding the alert pill row.
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

use chrono::{Datelike, Duration, NaiveDate};

/// Easter Sunday for `year` (anonymous Gregorian computus).
pub fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = ((h + l - 7 * m + 114) % 31) + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).expect("computus yields a valid date")
}

/// All Danish holidays for one year, in calendar order.
pub fn holidays_for_year(year: i32) -> Vec<(NaiveDate, &'static str)> {
    let easter = easter_sunday(year);
    let fixed = |m: u32, d: u32| NaiveDate::from_ymd_opt(year, m, d).unwrap();
    let mut days = vec![
        (fixed(1, 1), "Nytårsdag"),
        (easter - Duration::days(3), "Skærtorsdag"),
        (easter - Duration::days(2), "Langfredag"),
        (easter, "Påskedag"),
        (easter + Duration::days(1), "2. påskedag"),
        (easter + Duration::days(39), "Kristi himmelfartsdag"),
        (easter + Duration::days(49), "Pinsedag"),
        (easter + Duration::days(50), "2. pinsedag"),
        (fixed(6, 5), "Grundlovsdag"),
        (fixed(6, 23), "Sankthansaften"),
        (fixed(12, 24), "Juleaften"),
        (fixed(12, 25), "1. juledag"),
        (fixed(12, 26), "2. juledag"),
        (fixed(12, 31), "Nytårsaften"),
    ];
    days.sort_by_key(|(date, _)| *date);
    days
}

/// Holidays within `horizon_days` of `today` (inclusive on both ends),
/// as (days-until, name) pairs in calendar order. Checks the following
/// year too so the window works across New Year.
pub fn upcoming(today: NaiveDate, horizon_days: i64) -> Vec<(i64, &'static str)> {
    let mut hits = Vec::new();
    for year in [today.year(), today.year() + 1] {
        for (date, name) in holidays_for_year(year) {
            let days_until = (date - today).num_days();
            if (0..=horizon_days).contains(&days_until) {
                hits.push((days_until, name));
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn computus_known_years() {
        assert_eq!(easter_sunday(2024), date(2024, 3, 31));
        assert_eq!(easter_sunday(2025), date(2025, 4, 20));
        assert_eq!(easter_sunday(2026), date(2026, 4, 5));
        assert_eq!(easter_sunday(2038), date(2038, 4, 25));
    }

    #[test]
    fn upcoming_window_is_inclusive() {
        // 2026-12-10: Juleaften is 14 days out, exactly on the horizon.
        let hits = upcoming(date(2026, 12, 10), 14);
        assert_eq!(hits, vec![(14, "Juleaften")]);
        // One day later the window also catches 1. juledag.
        let hits = upcoming(date(2026, 12, 11), 14);
        assert_eq!(hits, vec![(13, "Juleaften"), (14, "1. juledag")]);
    }

    #[test]
    fn upcoming_wraps_into_next_year() {
        let hits = upcoming(date(2026, 12, 28), 14);
        assert_eq!(hits, vec![(3, "Nytårsaften"), (4, "Nytårsdag")]);
    }

    #[test]
    fn holiday_today_counts_as_zero_days() {
        let hits = upcoming(date(2026, 6, 5), 0);
        assert_eq!(hits, vec![(0, "Grundlovsdag")]);
    }
}
