//! Plain-text views of the application state.

use std::io::IsTerminal;

use chrono::{DateTime, Local, Utc};
use cityweather_core::{AppState, ForecastEntry, Tab, WeatherReport};

/// Entries shown in the preview under current conditions.
const PREVIEW_HOURS: usize = 8;

fn time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%-I:%M %p").to_string()
}

fn date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%a, %b %-d").to_string()
}

/// `#rrggbb` as channel values.
fn rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Colour `text` with a 24-bit foreground when stdout is a terminal and
/// `NO_COLOR` is unset.
fn paint(hex: &str, text: &str) -> String {
    if std::env::var_os("NO_COLOR").is_some() || !std::io::stdout().is_terminal() {
        return text.to_string();
    }
    match rgb(hex) {
        Some((r, g, b)) => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
        None => text.to_string(),
    }
}

/// The active tab of the state's report, or its error.
pub fn state(state: &AppState) -> String {
    if let Some(err) = &state.error {
        return format!("Error: {err}");
    }
    let Some(report) = &state.report else {
        return "No weather loaded yet.".to_string();
    };

    let tabs: Vec<String> = Tab::ALL
        .iter()
        .map(|t| {
            if *t == state.tab {
                format!("[{}]", t.label())
            } else {
                t.label().to_string()
            }
        })
        .collect();

    let body = match state.tab {
        Tab::Current => current(report),
        Tab::Hourly => hourly(report),
        Tab::Daily => daily(report),
    };
    format!("{}\n\n{body}", tabs.join("  "))
}

pub fn current(report: &WeatherReport) -> String {
    let s = &report.snapshot;
    let sym = s.units.temperature_symbol();
    let band = s.temperature_band();

    let mut lines = vec![
        format!("{}, {}", s.location_name, s.country),
        format!(
            "{}  {}  [{}]",
            paint(band.color(), &format!("{}{sym}", s.rounded_temperature())),
            s.condition.description,
            band.label()
        ),
        format!("Feels like: {}°", s.rounded_feels_like()),
        format!("Humidity:   {}%", s.humidity_pct),
        format!("Wind:       {} {}", s.wind_speed, s.units.wind_speed_unit()),
    ];
    if let Some(km) = s.visibility_km() {
        lines.push(format!("Visibility: {km} km"));
    }
    lines.push(format!("Sunrise:    {}", time(s.sunrise)));
    lines.push(format!("Sunset:     {}", time(s.sunset)));
    if let Some(aqi) = s.air_quality {
        lines.push(format!(
            "Air quality: {} ({}/5)",
            paint(aqi.color(), aqi.label()),
            aqi.index()
        ));
    }
    lines.push(format!("Icon: {}", s.condition.icon_url()));
    lines.push(format!("Map:  {}", s.coordinates.map_url()));

    let preview = report.forecast.hourly(PREVIEW_HOURS);
    if !preview.is_empty() {
        lines.push(String::new());
        lines.push("Next hours:".to_string());
        lines.extend(preview.iter().map(|entry| {
            format!("  {:>8}  {}{sym}", time(entry.time), entry.rounded_temperature())
        }));
    }
    lines.join("\n")
}

fn entry_line(entry: &ForecastEntry, sym: &str) -> String {
    format!(
        "{}{sym}  {}  Humidity: {}%",
        entry.rounded_temperature(),
        entry.condition.description,
        entry.humidity_pct
    )
}

pub fn hourly(report: &WeatherReport) -> String {
    let sym = report.units().temperature_symbol();
    let mut lines = vec!["Hourly Forecast".to_string()];
    lines.extend(
        report
            .forecast
            .entries()
            .iter()
            .map(|entry| format!("  {:>8}  {}", time(entry.time), entry_line(entry, sym))),
    );
    lines.join("\n")
}

pub fn daily(report: &WeatherReport) -> String {
    let units = report.units();
    let sym = units.temperature_symbol();
    let mut lines = vec!["5-Day Forecast".to_string()];
    lines.extend(report.forecast.daily().into_iter().map(|entry| {
        format!(
            "  {:<12} {}  Wind: {} {}",
            date(entry.time),
            entry_line(entry, sym),
            entry.wind_speed,
            units.wind_speed_unit()
        )
    }));
    lines.join("\n")
}

/// Primary city and the comparison city side by side.
pub fn comparison(state: &AppState) -> String {
    let mut lines = Vec::new();
    if let Some(report) = &state.report {
        let s = &report.snapshot;
        let sym = s.units.temperature_symbol();
        lines.push(format!("{}, {}", s.location_name, s.country));
        lines.push(format!("  Temperature: {}{sym}", s.rounded_temperature()));
        lines.push(format!("  Feels like:  {}{sym}", s.rounded_feels_like()));
        lines.push(format!("  {}", s.condition.description));
        lines.push(String::new());
    }

    match (&state.compare.snapshot, &state.compare.error) {
        (_, Some(err)) => lines.push(format!("Compare: {err}")),
        (Some(c), None) => {
            let sym = c.units.temperature_symbol();
            lines.push(format!("{}, {}", c.location_name, c.country));
            lines.push(format!("  Temperature: {}{sym}", c.rounded_temperature()));
            lines.push(format!("  Feels like:  {}{sym}", c.rounded_feels_like()));
            lines.push(format!("  {}", c.description));
        }
        (None, None) => lines.push("No comparison city yet.".to_string()),
    }
    lines.join("\n")
}

pub fn history(cities: &[String]) -> String {
    if cities.is_empty() {
        return "No recent searches.".to_string();
    }
    let mut lines = vec!["Recent Searches".to_string()];
    lines.extend(
        cities
            .iter()
            .enumerate()
            .map(|(i, city)| format!("  {}. {city}", i + 1)),
    );
    lines.join("\n")
}
