//! View model: everything the dashboard shows, derived from shared state
//!
//! Nothing here touches I/O. [`DashboardView::derive`] is a pure function of
//! the latest reading and the history, so the HTML renderer and the JSON API
//! always agree.

use std::fmt::Display;

use chrono::TimeZone;
use serde::Serialize;

use crate::reading::Reading;
use crate::state::SharedState;

pub const OFFLINE_LABEL: &str = "SYSTEM OFFLINE";
pub const PLACEHOLDER: &str = "--";

/// Colour scheme switched on the critical state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Normal,
    Alert,
}

impl Theme {
    pub fn for_critical(is_critical: bool) -> Self {
        if is_critical {
            Theme::Alert
        } else {
            Theme::Normal
        }
    }

    /// Temperature text, chart stroke and gradient colour
    pub fn accent(self) -> &'static str {
        match self {
            Theme::Normal => "#38bdf8",
            Theme::Alert => "#ef4444",
        }
    }

    pub fn background(self) -> &'static str {
        match self {
            Theme::Normal => "#0f172a",
            Theme::Alert => "#450a0a",
        }
    }

    /// (text, background) of the status badge
    pub fn badge_colors(self) -> (&'static str, &'static str) {
        match self {
            Theme::Normal => ("#bbf7d0", "#14532d"),
            Theme::Alert => ("#fecaca", "#7f1d1d"),
        }
    }
}

/// The three metrics shown as cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    Pressure,
    Vibration,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Temperature, Metric::Pressure, Metric::Vibration];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Pressure => "Pressure",
            Metric::Vibration => "Vibration",
        }
    }

    /// Suffix appended to the formatted value, including any separator
    pub fn unit(self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Pressure => " PSI",
            Metric::Vibration => " Hz",
        }
    }

    pub fn value(self, reading: &Reading) -> Option<f64> {
        match self {
            Metric::Temperature => reading.temperature,
            Metric::Pressure => reading.pressure,
            Metric::Vibration => reading.vibration,
        }
    }

    /// Only temperature follows the theme; the others keep a fixed colour.
    pub fn color(self, theme: Theme) -> &'static str {
        match self {
            Metric::Temperature => theme.accent(),
            Metric::Pressure => "#a855f7",
            Metric::Vibration => "#fbbf24",
        }
    }
}

/// Status indicator in the header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub text: String,
    pub alert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub metric: Metric,
    pub label: String,
    pub value: String,
    pub color: String,
    pub alert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Time of day in the display time zone
    pub label: String,
    pub epoch_ms: i64,
    pub temperature: Option<f64>,
}

/// Temperature over the history, ready to plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub points: Vec<ChartPoint>,
    /// Auto-scaled y range; `None` when there is nothing to plot
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub color: String,
}

impl ChartSeries {
    pub fn from_history<Tz>(history: &[Reading], tz: &Tz, theme: Theme) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let points: Vec<ChartPoint> = history
            .iter()
            .map(|r| ChartPoint {
                label: r.timestamp.with_timezone(tz).format("%H:%M:%S").to_string(),
                epoch_ms: r.timestamp.timestamp_millis(),
                temperature: r.temperature.filter(|t| t.is_finite()),
            })
            .collect();

        let (y_min, y_max) = match auto_scale(points.iter().filter_map(|p| p.temperature)) {
            Some((lo, hi)) => (Some(lo), Some(hi)),
            None => (None, None),
        };

        Self {
            points,
            y_min,
            y_max,
            color: theme.accent().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.y_min.is_none()
    }
}

/// Data range padded by 5% on each side; a flat series gets ±1. Falls back
/// to the bare data range when padding would overflow.
pub fn auto_scale(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;

    let (padded_lo, padded_hi) = if hi == lo {
        (lo - 1.0, hi + 1.0)
    } else {
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    };

    if padded_lo.is_finite() && padded_hi.is_finite() && padded_lo < padded_hi {
        Some((padded_lo, padded_hi))
    } else {
        Some((lo, hi))
    }
}

/// Everything the dashboard page shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub is_critical: bool,
    pub theme: Theme,
    pub badge: StatusBadge,
    pub cards: Vec<MetricCard>,
    pub chart: ChartSeries,
}

impl DashboardView {
    pub fn derive<Tz>(latest: Option<&Reading>, history: &[Reading], tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let critical = is_critical(latest);
        let theme = Theme::for_critical(critical);

        let badge = StatusBadge {
            text: latest
                .map(|r| r.status.to_string())
                .unwrap_or_else(|| OFFLINE_LABEL.to_string()),
            alert: critical,
        };

        let cards = Metric::ALL
            .iter()
            .map(|&metric| MetricCard {
                metric,
                label: metric.label().to_string(),
                value: format_metric(latest.and_then(|r| metric.value(r)), metric.unit()),
                color: metric.color(theme).to_string(),
                alert: critical && metric == Metric::Temperature,
            })
            .collect();

        Self {
            is_critical: critical,
            theme,
            badge,
            cards,
            chart: ChartSeries::from_history(history, tz, theme),
        }
    }

    pub fn from_state<Tz>(state: &SharedState, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self::derive(state.latest.as_ref(), &state.history, tz)
    }

    pub fn card(&self, metric: Metric) -> Option<&MetricCard> {
        self.cards.iter().find(|c| c.metric == metric)
    }
}

/// Critical iff there is a latest reading and its status is CRITICAL
pub fn is_critical(latest: Option<&Reading>) -> bool {
    latest.is_some_and(Reading::is_critical)
}

/// One decimal place plus unit, or the placeholder when there is no value
pub fn format_metric(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1}{}", v, unit),
        _ => format!("{}{}", PLACEHOLDER, unit),
    }
}
