use crate::models::GalleryEntry;
use chrono::{DateTime, Local};

const PALETTE: [(u8, u8, u8); 8] = [
    (249, 115, 22),  // orange
    (31, 41, 55),    // dark grey
    (255, 206, 86),  // yellow
    (75, 192, 192),  // teal
    (54, 162, 235),  // blue
    (153, 102, 255), // purple
    (255, 99, 132),  // red
    (46, 204, 113),  // green
];

pub fn palette_color_for(index: usize, alpha: f64) -> String {
    let (r, g, b) = PALETTE[index % PALETTE.len()];
    format!("rgba({r}, {g}, {b}, {alpha})")
}

/// Admin chart label for a table id.
pub fn display_name_for(table: &str) -> String {
    match table {
        "free-talk" => "Free Talk".to_string(),
        "it" => "AI / IT".to_string(),
        "japanese" => "Japanese".to_string(),
        "board-game" => "Card Games".to_string(),
        other => other.split('-').map(capitalize).collect::<Vec<_>>().join(" "),
    }
}

/// Long table name used by the landing page ticker.
pub fn ticker_table_name(table: &str) -> String {
    match table {
        "free-talk" => "English - Free Talk Table".to_string(),
        "it" => "English - AI / IT Table".to_string(),
        "japanese" => "Japanese - Language Exchange Table".to_string(),
        "board-game" => "English - Card Game Table".to_string(),
        other => other.to_string(),
    }
}

/// Sheet dates sometimes arrive as full ISO instants (midnight UTC of the
/// previous day for Asian timezones); those are shown as the local date.
pub fn gallery_display_date(raw: &str) -> String {
    if !raw.contains('T') {
        return raw.to_string();
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(instant) => instant.with_timezone(&Local).format("%Y/%m/%d").to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn gallery_caption(entry: &GalleryEntry) -> &'static str {
    if entry.id.is_some() {
        "Community Photo"
    } else {
        "Weekly Meetup"
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
