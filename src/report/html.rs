//! Standalone HTML report
//!
//! The document carries its own `<style>` block and references nothing
//! external, so it can be saved and opened as a single file.

use chrono::{DateTime, Local, NaiveDate};

use super::context::PatientReportContext;
use super::observations::generate_observations;
use super::stats::{parse_timestamp, AggregateStats, DisplayPrecision, TimeSeriesReading};
use crate::config::DEFAULT_HISTORY_LIMIT;

pub const HTML_MIME_TYPE: &str = "text/html;charset=utf-8";

const MISSING_VALUE: &str = "\u{2014}";
const LONG_DATE_FORMAT: &str = "%B %-d, %Y";
const TABLE_DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Rendering knobs with report defaults
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HtmlOptions {
    /// Rows per history table
    pub history_limit: usize,
    pub precision: DisplayPrecision,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            precision: DisplayPrecision::default(),
        }
    }
}

/// Render the report with default options
pub fn render_html_report(ctx: &PatientReportContext, now: DateTime<Local>) -> String {
    render_html_report_with(ctx, now, &HtmlOptions::default())
}

pub fn render_html_report_with(
    ctx: &PatientReportContext,
    now: DateTime<Local>,
    options: &HtmlOptions,
) -> String {
    let name = html_escape(&ctx.full_name());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Health Report - {name}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        {header}
        {identity}
        {stats}
        {tables}
        {observations}
        {footer}
    </div>
</body>
</html>
"#,
        name = name,
        css = inline_css(),
        header = render_header(now),
        identity = render_identity(ctx),
        stats = render_stats(ctx, options.precision),
        tables = render_history_tables(ctx, options),
        observations = render_observations(ctx),
        footer = render_footer(now),
    )
}

/// `report-<lastname>-<firstname>-<YYYY-MM-DD>.html`
pub fn html_report_filename(ctx: &PatientReportContext, date: NaiveDate) -> String {
    format!(
        "report-{}-{}-{}.html",
        filename_segment(&ctx.last_name),
        filename_segment(&ctx.first_name),
        date.format("%Y-%m-%d")
    )
}

/// Keep names intact apart from characters a file name cannot hold
fn filename_segment(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_whitespace() => '-',
            c => c,
        })
        .collect()
}

fn inline_css() -> &'static str {
    r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; color: #1f2937; background: #f3f4f6; margin: 0; }
.container { max-width: 960px; margin: 0 auto; padding: 24px; background: #ffffff; }
header { background: linear-gradient(90deg, #1d4ed8, #2563eb); color: #ffffff; padding: 24px; border-radius: 8px; }
header h1 { margin: 0 0 6px 0; font-size: 26px; letter-spacing: 0.5px; }
header .date { opacity: 0.85; }
h2 { color: #1d4ed8; border-bottom: 2px solid #e5e7eb; padding-bottom: 6px; margin-top: 28px; }
.identity { display: flex; gap: 32px; margin-top: 20px; }
.identity .label { color: #6b7280; font-size: 13px; }
.identity .value { font-size: 18px; font-weight: 600; }
.stats { display: grid; grid-template-columns: repeat(3, 1fr); gap: 16px; }
.stat-card { background: #f3f4f6; border-radius: 8px; padding: 16px; }
.stat-card h3 { margin: 0 0 10px 0; font-size: 15px; color: #2563eb; }
.stat-card dl { display: grid; grid-template-columns: auto 1fr; gap: 4px 12px; margin: 0; }
.stat-card dt { color: #6b7280; }
.stat-card dd { margin: 0; font-weight: 600; text-align: right; }
table { width: 100%; border-collapse: collapse; margin-bottom: 16px; }
th { background: #2563eb; color: #ffffff; text-align: left; padding: 8px; }
td { border-bottom: 1px solid #e5e7eb; padding: 8px; }
tr:nth-child(even) td { background: #f9fafb; }
td.empty { color: #9ca3af; font-style: italic; }
.observations p { background: #eff6ff; border-left: 4px solid #2563eb; padding: 10px 14px; margin: 8px 0; }
footer { margin-top: 32px; padding-top: 12px; border-top: 1px solid #e5e7eb; color: #6b7280; font-size: 12px; text-align: center; }
"#
}

fn render_header(now: DateTime<Local>) -> String {
    format!(
        r#"<header>
    <h1>Diabetes Health Report</h1>
    <div class="date">Generated on {date}</div>
</header>"#,
        date = now.format(LONG_DATE_FORMAT),
    )
}

fn render_identity(ctx: &PatientReportContext) -> String {
    let bmi = ctx
        .bmi
        .map(|b| format!("{:.1}", b))
        .unwrap_or_else(|| MISSING_VALUE.to_string());

    format!(
        r#"<section class="identity">
    <div><div class="label">Patient</div><div class="value">{name}</div></div>
    <div><div class="label">Diabetes type</div><div class="value">{diabetes}</div></div>
    <div><div class="label">BMI</div><div class="value">{bmi}</div></div>
</section>"#,
        name = html_escape(&ctx.full_name()),
        diabetes = html_escape(ctx.diabetes_type.display_label()),
        bmi = bmi,
    )
}

fn render_stats(ctx: &PatientReportContext, precision: DisplayPrecision) -> String {
    format!(
        r#"<h2>Summary</h2>
<section class="stats">
{glucose}
{weight}
{insulin}
</section>"#,
        glucose = render_stat_card("Glucose", "mmol/L", &ctx.glucose, precision),
        weight = render_stat_card("Weight", "kg", &ctx.weight, precision),
        insulin = render_stat_card("Insulin", "units", &ctx.insulin, precision),
    )
}

fn render_stat_card(
    title: &str,
    unit: &str,
    stats: &AggregateStats,
    precision: DisplayPrecision,
) -> String {
    format!(
        r#"    <div class="stat-card">
        <h3>{title}</h3>
        <dl>
            <dt>Average</dt><dd>{avg} {unit}</dd>
            <dt>Minimum</dt><dd>{min} {unit}</dd>
            <dt>Maximum</dt><dd>{max} {unit}</dd>
            <dt>Measurements</dt><dd>{count}</dd>
        </dl>
    </div>"#,
        title = title,
        unit = unit,
        avg = precision.format(stats.average),
        min = precision.format(stats.min),
        max = precision.format(stats.max),
        count = stats.count,
    )
}

fn render_history_tables(ctx: &PatientReportContext, options: &HtmlOptions) -> String {
    [
        ("Glucose", "Glucose (mmol/L)", &ctx.recent_glucose),
        ("Weight", "Weight (kg)", &ctx.recent_weight),
        ("Insulin", "Dose (units)", &ctx.recent_insulin),
    ]
    .iter()
    .map(|(title, column, readings)| {
        render_history_table(title, column, readings, options)
    })
    .collect::<Vec<_>>()
    .join("\n")
}

/// First `history_limit` readings in the order given
fn render_history_table(
    title: &str,
    value_column: &str,
    readings: &[TimeSeriesReading],
    options: &HtmlOptions,
) -> String {
    let rows: String = if readings.is_empty() {
        r#"        <tr><td class="empty" colspan="2">No readings recorded</td></tr>
"#
        .to_string()
    } else {
        readings
            .iter()
            .take(options.history_limit)
            .map(|r| {
                format!(
                    "        <tr><td>{date}</td><td>{value}</td></tr>\n",
                    date = html_escape(&format_table_date(&r.timestamp)),
                    value = format_cell(r.value, options.precision),
                )
            })
            .collect()
    };

    format!(
        r#"<h2>{title} history</h2>
<table>
    <thead><tr><th>Date</th><th>{column}</th></tr></thead>
    <tbody>
{rows}    </tbody>
</table>"#,
        title = title,
        column = value_column,
        rows = rows,
    )
}

fn render_observations(ctx: &PatientReportContext) -> String {
    let paragraphs: String = generate_observations(&ctx.observation_input())
        .iter()
        .map(|line| format!("    <p>{}</p>\n", html_escape(line)))
        .collect();

    format!(
        r#"<h2>Clinical observations</h2>
<section class="observations">
{paragraphs}</section>"#,
        paragraphs = paragraphs,
    )
}

fn render_footer(now: DateTime<Local>) -> String {
    format!(
        r#"<footer>
    <p>Confidential: this report contains personal health information intended for the patient and their care team.</p>
    <p>Report generated on {date} at {time}</p>
</footer>"#,
        date = now.format(LONG_DATE_FORMAT),
        time = now.format("%H:%M"),
    )
}

fn format_cell(value: Option<f64>, precision: DisplayPrecision) -> String {
    match value {
        Some(v) => precision.format(v),
        None => MISSING_VALUE.to_string(),
    }
}

/// Short date with time; unparseable timestamps are shown as written
fn format_table_date(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format(TABLE_DATE_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
