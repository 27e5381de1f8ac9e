//! Server-side HTML rendering of a [`DashboardView`]

use crate::view::{ChartSeries, DashboardView, MetricCard};

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 50.0;
const MARGIN_RIGHT: f64 = 10.0;
const MARGIN_TOP: f64 = 10.0;
const MARGIN_BOTTOM: f64 = 30.0;
const Y_TICKS: usize = 5;
const MAX_X_LABELS: usize = 6;

/// Full page: the dashboard fragment plus a script that swaps in a fresh
/// fragment every `refresh_ms`.
pub fn render_page(view: &DashboardView, refresh_ms: u64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>EcoStream Industrial AI</title>
    <script>
        function refreshDashboard() {{
            fetch('/fragment')
                .then(r => r.ok ? r.text() : null)
                .then(html => {{
                    if (html) {{
                        document.getElementById('dashboard').outerHTML = html;
                    }}
                }})
                .catch(() => {{}});
        }}
        setInterval(refreshDashboard, {refresh_ms});
    </script>
</head>
<body style="margin: 0; font-family: system-ui, sans-serif; color: #e2e8f0;">
{dashboard}
</body>
</html>"#,
        refresh_ms = refresh_ms,
        dashboard = render_dashboard(view, refresh_ms),
    )
}

/// The `#dashboard` fragment: header, metric cards and chart
pub fn render_dashboard(view: &DashboardView, refresh_ms: u64) -> String {
    let (badge_fg, badge_bg) = view.theme.badge_colors();
    let badge_class = if view.badge.alert {
        "status-critical"
    } else {
        "status-normal"
    };
    // warning sign vs. check mark
    let badge_icon = if view.badge.alert { "&#9888;" } else { "&#10004;" };
    let cards: String = view.cards.iter().map(render_card).collect();

    format!(
        r#"<div id="dashboard" class="dashboard{critical_class}" style="min-height: 100vh; background-color: {background}; padding: 1rem;">
    <div style="max-width: 1100px; margin: 0 auto;">
        <header style="display: flex; justify-content: space-between; align-items: center; margin-bottom: 1.5rem;">
            <h1>EcoStream <span style="font-weight: 300; opacity: 0.7;">Industrial AI</span></h1>
            <div class="status-badge {badge_class}" style="display: flex; gap: 0.5rem; align-items: center; padding: 0.5em 1em; border-radius: 9999px; font-weight: 600; color: {badge_fg}; background-color: {badge_bg};">
                <span>{badge_icon}</span>
                <span>{badge_text}</span>
            </div>
        </header>
        <div class="stats-grid" style="display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem; margin-bottom: 1.5rem;">{cards}</div>
        <div class="chart-container" style="background-color: #1e293b; border-radius: 0.75rem; padding: 1rem;">
            <div style="display: flex; justify-content: space-between; margin-bottom: 1rem;">
                <h2 style="margin: 0;">Live Sensor Telemetry</h2>
                <div style="font-size: 0.9rem; color: #94a3b8;">Updates every {cadence}</div>
            </div>
            {chart}
        </div>
    </div>
</div>"#,
        critical_class = if view.is_critical { " critical-bg" } else { "" },
        background = view.theme.background(),
        badge_class = badge_class,
        badge_fg = badge_fg,
        badge_bg = badge_bg,
        badge_icon = badge_icon,
        badge_text = escape_html(&view.badge.text),
        cards = cards,
        cadence = format_cadence(refresh_ms),
        chart = render_chart(&view.chart),
    )
}

fn format_cadence(ms: u64) -> String {
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{}ms", ms)
    }
}

fn render_card(card: &MetricCard) -> String {
    let border = if card.alert { "#ef4444" } else { "#334155" };
    format!(
        r#"
            <div class="card{alert_class}" style="background-color: #1e293b; border: 1px solid {border}; border-radius: 0.75rem; padding: 1rem;">
                <h3 style="margin: 0 0 0.5rem 0;">{label}</h3>
                <p class="stat-value" style="margin: 0; font-size: 2.5rem; font-weight: 700; color: {color};">{value}</p>
            </div>"#,
        alert_class = if card.alert { " card-critical" } else { "" },
        border = border,
        label = escape_html(&card.label),
        color = card.color,
        value = escape_html(&card.value),
    )
}

/// Inline SVG area chart of temperature over time
pub fn render_chart(chart: &ChartSeries) -> String {
    let (y_min, y_max) = match (chart.y_min, chart.y_max) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => {
            return r#"<p class="chart-empty" style="color: #94a3b8;">Waiting for data...</p>"#
                .to_string()
        }
    };

    let plot_w = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let bottom = MARGIN_TOP + plot_h;
    let n = chart.points.len();
    let x_at = |i: usize| {
        if n <= 1 {
            MARGIN_LEFT + plot_w / 2.0
        } else {
            MARGIN_LEFT + plot_w * i as f64 / (n - 1) as f64
        }
    };
    // halved so extreme ranges cannot overflow to infinity
    let y_at = |v: f64| MARGIN_TOP + plot_h * (y_max / 2.0 - v / 2.0) / (y_max / 2.0 - y_min / 2.0);

    let coords: Vec<(f64, f64)> = chart
        .points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.temperature.map(|t| (x_at(i), y_at(t))))
        .collect();

    let line: String = coords
        .iter()
        .enumerate()
        .map(|(i, (x, y))| format!("{}{:.1},{:.1}", if i == 0 { "M" } else { " L" }, x, y))
        .collect();
    let area = match (coords.first(), coords.last()) {
        (Some((x0, _)), Some((xn, _))) => format!(
            "{} L{:.1},{:.1} L{:.1},{:.1} Z",
            line, xn, bottom, x0, bottom
        ),
        _ => String::new(),
    };

    let grid: String = (0..Y_TICKS)
        .map(|k| {
            let t = k as f64 / (Y_TICKS - 1) as f64;
            let v = y_min * (1.0 - t) + y_max * t;
            let y = y_at(v);
            format!(
                r##"<line x1="{x1:.1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" stroke="#334155" stroke-dasharray="3 3"/><text x="{tx:.1}" y="{ty:.1}" fill="#94a3b8" font-size="12" text-anchor="end">{v:.1}</text>"##,
                x1 = MARGIN_LEFT,
                x2 = CHART_WIDTH - MARGIN_RIGHT,
                y = y,
                tx = MARGIN_LEFT - 6.0,
                ty = y + 4.0,
                v = v,
            )
        })
        .collect();

    let step = n.div_ceil(MAX_X_LABELS).max(1);
    let x_labels: String = chart
        .points
        .iter()
        .enumerate()
        .filter(|(i, _)| i % step == 0)
        .map(|(i, p)| {
            format!(
                r##"<text x="{:.1}" y="{:.1}" fill="#94a3b8" font-size="12" text-anchor="middle">{}</text>"##,
                x_at(i),
                bottom + 18.0,
                escape_html(&p.label)
            )
        })
        .collect();

    format!(
        r##"<svg class="chart" viewBox="0 0 {w} {h}" width="100%" preserveAspectRatio="none" xmlns="http://www.w3.org/2000/svg">
                <defs>
                    <linearGradient id="colorTemp" x1="0" y1="0" x2="0" y2="1">
                        <stop offset="5%" stop-color="{color}" stop-opacity="0.3"/>
                        <stop offset="95%" stop-color="{color}" stop-opacity="0"/>
                    </linearGradient>
                </defs>
                {grid}
                <path class="chart-area" d="{area}" fill="url(#colorTemp)" stroke="none"/>
                <path class="chart-line" d="{line}" fill="none" stroke="{color}" stroke-width="3"/>
                {x_labels}
            </svg>"##,
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
        color = chart.color,
        grid = grid,
        area = area,
        line = line,
        x_labels = x_labels,
    )
}

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
