//! Compact output rendering helpers for CLI surfaces.

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Fixed two-decimal price with a currency suffix, e.g. `4.99 zł`.
pub fn format_price(price: f64, currency: &str) -> String {
    if currency.is_empty() {
        format!("{:.2}", price)
    } else {
        format!("{:.2} {}", price, currency)
    }
}

/// Pad or truncate to an exact display width, counted in chars.
pub fn fit(input: &str, width: usize) -> String {
    let line = compact_line(input, width.saturating_sub(3).max(1));
    let len = line.chars().count();
    if len >= width {
        line
    } else {
        format!("{}{}", line, " ".repeat(width - len))
    }
}
