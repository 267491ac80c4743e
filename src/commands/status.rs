use crate::error::Error;
use crate::utils::embeds;
use async_trait::async_trait;
use serde_json::json;
use serenity::all::{CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, Timestamp};

const CHART_ENDPOINT: &str = "https://quickchart.io/chart";
const MONITOR_ICON: &str = "https://cdn-icons-png.flaticon.com/512/9638/9638162.png";
pub const PROGRESS_GLYPHS: usize = 10;
const FILLED: &str = "\u{1F7E9}";
const EMPTY: &str = "\u{2B1B}";

/// Values displayed by the `!status` panel.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub node_name: String,
    pub region: String,
    pub uptime: String,
    pub players: u32,
    pub max_players: u32,
    /// (label, player count), oldest first.
    pub player_history: Vec<(String, u32)>,
    pub latency_ms: u32,
    pub ram_used_gb: u32,
    pub ram_total_gb: u32,
    pub protection: String,
}

/// Source of the numbers shown by `!status`.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    async fn snapshot(&self) -> Result<StatusSnapshot, Error>;
}

/// Static showcase values; there is no monitoring backend yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedStatusProvider;

impl FixedStatusProvider {
    pub fn showcase() -> StatusSnapshot {
        let history = [
            ("10m", 210),
            ("8m", 245),
            ("6m", 300),
            ("4m", 280),
            ("2m", 320),
            ("Now", 342),
        ];

        StatusSnapshot {
            node_name: "Survival SMP (Node 1)".into(),
            region: "\u{1F1E9}\u{1F1EA} Germany".into(),
            uptime: "14d 2h".into(),
            players: 342,
            max_players: 500,
            player_history: history
                .iter()
                .map(|(label, count)| (label.to_string(), *count))
                .collect(),
            latency_ms: 24,
            ram_used_gb: 12,
            ram_total_gb: 64,
            protection: "Active".into(),
        }
    }
}

#[async_trait]
impl StatusProvider for FixedStatusProvider {
    async fn snapshot(&self) -> Result<StatusSnapshot, Error> {
        Ok(Self::showcase())
    }
}

/// Number of filled glyphs for `current / max`, rounded to the nearest glyph.
pub fn filled_glyphs(current: u32, max: u32, total: usize) -> usize {
    if max == 0 {
        return 0;
    }
    let ratio = f64::from(current) / f64::from(max);
    let filled = (ratio * total as f64).round() as usize;
    filled.min(total)
}

pub fn progress_bar(current: u32, max: u32, total: usize) -> String {
    let filled = filled_glyphs(current, max, total);
    format!("{}{}", FILLED.repeat(filled), EMPTY.repeat(total - filled))
}

/// QuickChart URL rendering the player history as a line chart.
pub fn chart_url(snapshot: &StatusSnapshot) -> String {
    let (labels, data): (Vec<&str>, Vec<u32>) = snapshot
        .player_history
        .iter()
        .map(|(label, count)| (label.as_str(), *count))
        .unzip();

    let chart = json!({
        "type": "line",
        "data": {
            "labels": labels,
            "datasets": [{
                "label": "Players",
                "data": data,
                "borderColor": "#00ff00",
                "backgroundColor": "rgba(0, 255, 0, 0.2)",
                "fill": true,
                "tension": 0.4,
                "pointRadius": 0
            }]
        },
        "options": {
            "legend": { "display": false },
            "title": { "display": true, "text": "Network Traffic (Incoming)", "fontColor": "#00ff00" },
            "scales": {
                "xAxes": [{ "gridLines": { "display": false }, "ticks": { "fontColor": "#999" } }],
                "yAxes": [{ "gridLines": { "color": "#333" }, "ticks": { "fontColor": "#999" } }]
            }
        }
    });

    format!(
        "{CHART_ENDPOINT}?c={}&backgroundColor=black&width=500&height=300",
        urlencoding::encode(&chart.to_string())
    )
}

pub fn status_embed(snapshot: &StatusSnapshot) -> CreateEmbed {
    let players = format!(
        "{} **{}/{}**",
        progress_bar(snapshot.players, snapshot.max_players, PROGRESS_GLYPHS),
        snapshot.players,
        snapshot.max_players
    );

    embeds::success_embed()
        .author(CreateEmbedAuthor::new("SNAC-Hosting \u{2022} Systems Monitor").icon_url(MONITOR_ICON))
        .title(format!("\u{1F7E2} {}", snapshot.node_name))
        .description(format!(
            "**Status:** Online  \u{2022}  **Region:** {}  \u{2022}  **Uptime:** {}",
            snapshot.region, snapshot.uptime
        ))
        .field("\u{1F465} Player Count", players, false)
        .field("\u{1F4E1} Latency", format!("`{}ms`", snapshot.latency_ms), true)
        .field(
            "\u{1F4BE} RAM Usage",
            format!("`{}GB / {}GB`", snapshot.ram_used_gb, snapshot.ram_total_gb),
            true,
        )
        .field("\u{1F6E1}\u{FE0F} Protection", format!("`{}`", snapshot.protection), true)
        .image(chart_url(snapshot))
        .footer(CreateEmbedFooter::new("Last updated"))
        .timestamp(Timestamp::now())
}
