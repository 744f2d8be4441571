//! Print-oriented rendering of a generated schedule.

use chrono::NaiveDate;

use crate::{
    config::AppConfig,
    models::Line,
    rotation::{LineRotation, Schedule},
};

const EMPTY_MESSAGE: &str = "No pairs generated";

const PRINT_STYLE: &str = r#"
@media print { @page { size: A4; margin: 10mm; } body { margin: 0; -webkit-print-color-adjust: exact; print-color-adjust: exact; } }
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; background-color: white; color: #1c1c1e; font-size: 10pt; margin: 10mm; line-height: 1.2; }
.header { text-align: center; margin-bottom: 8mm; padding-bottom: 4mm; border-bottom: 1px solid #d1d1d6; }
.title { font-size: 16pt; font-weight: bold; margin: 0; text-transform: uppercase; }
.date { font-size: 10pt; margin: 3mm 0; color: #8e8e93; }
.columns { display: flex; justify-content: space-between; gap: 8mm; }
.column { flex: 1; max-width: 48%; }
.line-group { margin-bottom: 6mm; page-break-inside: avoid; }
.line-title { font-size: 12pt; font-weight: 600; text-align: center; margin-bottom: 3mm; padding: 2mm 4mm; background-color: #f2f2f7; text-transform: uppercase; border-radius: 4px; }
.pairs { display: grid; grid-template-columns: repeat(auto-fill, minmax(80px, 1fr)); gap: 3mm; padding: 0 2mm; }
.pair { padding: 3mm 4mm; border: 1px solid #d1d1d6; border-radius: 4px; text-align: center; }
.pair.single { border-style: dashed; }
.accommodations { margin-top: 3mm; padding: 0 2mm; }
.accommodation-label { font-weight: 600; font-size: 9pt; text-transform: uppercase; margin-bottom: 2mm; }
.pair.accommodation { border: 2px solid #1c1c1e; font-weight: bold; }
.empty-message { font-style: italic; color: #8e8e93; text-align: center; padding: 3mm; grid-column: 1 / -1; }
"#;

/// Settings controlling printed output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// Heading above the schedule.
    pub title: String,
    /// chrono format for the printed date.
    pub date_format: String,
}

impl PrintOptions {
    /// Derive print settings from the application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            title: config.title.clone(),
            date_format: config.date_format.clone(),
        }
    }

    /// Date formatted for display.
    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(&self.date_format).to_string()
    }
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// File name (without extension) for the schedule of `date`.
pub fn file_stem(date: NaiveDate) -> String {
    format!("station_rotation_{}", date.format("%m-%d-%Y"))
}

/// Render a standalone A4 page with the lines split across two columns.
pub fn render_html(schedule: &Schedule, options: &PrintOptions) -> String {
    let date = escape_html(&options.format_date(schedule.date));
    let title = escape_html(&options.title);

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} - {date}</title>
<style>{PRINT_STYLE}</style>
</head>
<body>
<div class="header"><div class="title">{title}</div><div class="date">Date: {date}</div></div>
<div class="columns">
"#
    );
    for column in Line::COLUMNS {
        html.push_str("<div class=\"column\">\n");
        for line in column {
            if let Some(rotation) = schedule.line(line) {
                render_line_html(&mut html, rotation);
            }
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_line_html(html: &mut String, rotation: &LineRotation) {
    html.push_str(&format!(
        r#"<div class="line-group"><div class="line-title">{}</div><div class="pairs">"#,
        rotation.line.display_name()
    ));
    if rotation.pairs.is_empty() {
        html.push_str(&format!(
            r#"<div class="empty-message">{EMPTY_MESSAGE}</div>"#
        ));
    }
    for pair in &rotation.pairs {
        let class = if pair.is_single() { "pair single" } else { "pair" };
        html.push_str(&format!(r#"<div class="{class}">{}</div>"#, pair.label()));
    }
    html.push_str("</div>");
    if !rotation.accommodations.is_empty() {
        html.push_str(r#"<div class="accommodations"><div class="accommodation-label">Accommodation</div><div class="pairs">"#);
        for station in &rotation.accommodations {
            html.push_str(&format!(
                r#"<div class="pair accommodation">{}</div>"#,
                station.number
            ));
        }
        html.push_str("</div></div>");
    }
    html.push_str("</div>\n");
}

/// Render the schedule as plain text lines, one block per line.
pub fn render_text(schedule: &Schedule, options: &PrintOptions) -> Vec<String> {
    let mut lines = vec![
        options.title.clone(),
        format!("Date: {}", options.format_date(schedule.date)),
    ];
    for rotation in &schedule.lines {
        lines.push(String::new());
        lines.extend(render_line_text(rotation));
    }
    lines
}

/// Plain text lines for a single line's rotation.
pub fn render_line_text(rotation: &LineRotation) -> Vec<String> {
    let mut lines = vec![rotation.line.display_name()];
    if rotation.pairs.is_empty() {
        lines.push(format!("  {EMPTY_MESSAGE}"));
    } else {
        let labels = rotation
            .pairs
            .iter()
            .map(|pair| pair.label())
            .collect::<Vec<_>>();
        for chunk in labels.chunks(5) {
            lines.push(format!("  {}", chunk.join("  ")));
        }
    }
    if !rotation.accommodations.is_empty() {
        let stations = rotation
            .accommodations
            .iter()
            .map(|station| station.number.to_string())
            .collect::<Vec<_>>();
        lines.push(format!("  Accommodation: {}", stations.join(", ")));
    }
    lines
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
