use colored::Colorize;
use serde_json::Value as JsonValue;
use std::env;

use crate::core::output::{fit, format_price};

const MIN_BOX_WIDTH: usize = 40;
const MAX_BOX_WIDTH: usize = 60;

/// Header of the single list section.
pub const SECTION_TITLE: &str = "Shopping list";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ItemStatus {
    Added,
    Updated,
    Removed,
    Missing,
    Info,
}

impl ItemStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            ItemStatus::Added => "+",
            ItemStatus::Updated => "~",
            ItemStatus::Removed => "-",
            ItemStatus::Missing => "?",
            ItemStatus::Info => "i",
        }
    }
}

pub fn terminal_width() -> usize {
    env::var("COLUMNS")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or(80)
}

fn effective_width() -> usize {
    terminal_width().clamp(MIN_BOX_WIDTH, MAX_BOX_WIDTH)
}

pub fn box_top(width: usize) -> String {
    format!("╔{}╗", "═".repeat(width.saturating_sub(2)))
}

pub fn box_bottom(width: usize) -> String {
    format!("╚{}╝", "═".repeat(width.saturating_sub(2)))
}

pub fn box_row(left: &str, content: &str, right: &str, width: usize) -> String {
    let content_len = content.chars().count();
    let padding = width.saturating_sub(2).saturating_sub(content_len);
    let left_pad = padding / 2;
    let right_pad = padding - left_pad;
    format!(
        "{}{}{}{}{}",
        left,
        " ".repeat(left_pad),
        content,
        " ".repeat(right_pad),
        right
    )
}

/// Blocking alert, e.g. for a rejected add.
pub fn render_alert(title: &str, message: &str) -> String {
    let width = effective_width().max(message.chars().count() + 4);
    [
        box_top(width).bright_red().to_string(),
        box_row("║", title, "║", width).bright_red().bold().to_string(),
        box_row("║", message, "║", width).red().to_string(),
        box_bottom(width).bright_red().to_string(),
    ]
    .join("\n")
}

pub fn render_status(status: ItemStatus, message: &str) -> String {
    let icon = status.icon();
    match status {
        ItemStatus::Added => format!("{} {}", icon.bright_green(), message),
        ItemStatus::Updated => format!("{} {}", icon.bright_cyan(), message),
        ItemStatus::Removed => format!("{} {}", icon.bright_yellow(), message),
        ItemStatus::Missing => format!("{} {}", icon.bright_red(), message.dimmed()),
        ItemStatus::Info => format!("{} {}", icon.cyan(), message),
    }
}

fn str_field<'a>(item: &'a JsonValue, key: &str) -> &'a str {
    item.get(key).and_then(|x| x.as_str()).unwrap_or("")
}

/// One row of the list view, from a product item in a `list` envelope.
pub fn render_product_row(item: &JsonValue, currency: &str) -> String {
    let name = fit(str_field(item, "name"), 24);
    let price = format_price(
        item.get("price").and_then(|x| x.as_f64()).unwrap_or_default(),
        currency,
    );
    let store = fit(str_field(item, "store"), 14);
    let purchased = item
        .get("purchased")
        .and_then(|x| x.as_bool())
        .unwrap_or(false);
    let label = if purchased {
        "Purchased".bright_white().on_green().to_string()
    } else {
        "To buy".red().on_yellow().to_string()
    };
    let id = str_field(item, "id");

    let row = format!(
        "{} {:>12}  {}  {}  {}",
        name.bold(),
        price,
        store.dimmed(),
        label,
        id.dimmed()
    );
    match str_field(item, "state") {
        "pending_removal" => row.strikethrough().dimmed().to_string(),
        "entering" => format!("{} {}", row, "new".bright_green()),
        _ => row,
    }
}

/// Full list view from a `list` envelope: section header, rows, totals.
pub fn render_list(out: &JsonValue, currency: &str) -> String {
    let mut lines = Vec::new();
    let mut header = SECTION_TITLE.to_string();
    if out.get("sorted").and_then(|x| x.as_bool()) == Some(true) {
        header.push_str(" (A-Z)");
    }
    let filter = str_field(out, "filter");
    if !filter.is_empty() {
        header.push_str(&format!(" [filter: {}]", filter));
    }
    lines.push(header.bright_blue().bold().to_string());

    let items = out
        .get("items")
        .and_then(|x| x.as_array())
        .cloned()
        .unwrap_or_default();
    if items.is_empty() {
        lines.push("  No products.".dimmed().to_string());
        return lines.join("\n");
    }
    for item in &items {
        lines.push(format!("  {}", render_product_row(item, currency)));
    }

    let total = out.get("total").and_then(|x| x.as_f64()).unwrap_or_default();
    let remaining = out
        .get("remaining_total")
        .and_then(|x| x.as_f64())
        .unwrap_or_default();
    lines.push(format!(
        "  {} {}   {} {}",
        "total:".dimmed(),
        format_price(total, currency),
        "to buy:".dimmed(),
        format_price(remaining, currency)
    ));
    lines.join("\n")
}
