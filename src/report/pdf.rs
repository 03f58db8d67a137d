//! Two-page A4 patient report
//!
//! The layout only talks to [`DrawingSurface`], one surface per page, so the
//! same code drives the printpdf backend and the recording surface used in
//! tests.

use chrono::{DateTime, Datelike, Local, NaiveDate};

use super::canvas::{
    Color, DrawingSurface, LineStyle, ShapeStyle, TextStyle, BLACK, CRITICAL, DARK_GRAY,
    FOOTER_GRAY, LIGHT_GRAY, MEDIUM_GRAY, PRIMARY, PRIMARY_DARK, PRIMARY_LIGHT, STABLE, TEXT,
    TEXT_LIGHT, WARNING, WATERMARK_GRAY, WHITE,
};
use super::charts::{
    draw_bar_chart, draw_gauge, draw_line_chart, draw_linear_gradient, BarChart, ChartPoint,
    Frame, GaugeSpec, LineChart,
};
use super::context::MGDL_PER_MMOLL;
use super::observations::GLUCOSE_HIGH_THRESHOLD;
use super::pdf_canvas::{PdfCanvas, PdfFonts};
use super::{ReportError, ReportResult};
use crate::models::{ActivityLevel, DiabetesType, StatusTag};

/// A4 portrait, millimetres
pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;
pub const PAGE_COUNT: usize = 2;

const MARGIN: f64 = 15.0;
const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;
const FOOTER_Y: f64 = PAGE_HEIGHT - 10.0;

/// Everything the PDF report draws
#[derive(Debug, Clone)]
pub struct PdfReportInput {
    pub patient_name: String,
    pub patient_id: String,
    pub status: StatusTag,
    pub diabetes_type: DiabetesType,
    /// `YYYY-MM-DD`
    pub diagnosis_date: Option<String>,
    pub activity_level: ActivityLevel,
    pub bmi: Option<f64>,
    /// Percent
    pub a1c: Option<f64>,
    /// Percent
    pub compliance: Option<f64>,
    pub meals_per_day: u32,
    pub insulin_injections: u32,
    /// Daily averages in mg/dL
    pub weekly_glucose: Vec<ChartPoint>,
    /// Monthly averages in mg/dL
    pub monthly_glucose: Vec<ChartPoint>,
}

// ============================================================================
// Clinical wording and colors
// ============================================================================

pub fn status_color(status: StatusTag) -> Color {
    match status {
        StatusTag::Critical => CRITICAL,
        StatusTag::Warning => WARNING,
        StatusTag::Stable => STABLE,
    }
}

pub fn a1c_color(a1c: f64) -> Color {
    if a1c < 7.0 {
        STABLE
    } else if a1c < 8.0 {
        WARNING
    } else {
        CRITICAL
    }
}

pub fn bmi_color(bmi: f64) -> Color {
    if bmi < 25.0 {
        STABLE
    } else if bmi < 30.0 {
        WARNING
    } else {
        CRITICAL
    }
}

pub fn compliance_color(compliance: f64) -> Color {
    if compliance >= 90.0 {
        STABLE
    } else if compliance >= 70.0 {
        WARNING
    } else {
        CRITICAL
    }
}

pub fn recommendations(status: StatusTag) -> [&'static str; 3] {
    match status {
        StatusTag::Critical => [
            "Immediate consultation with endocrinologist recommended",
            "Consider adjusting insulin dosage under medical supervision",
            "Increase blood glucose monitoring frequency to 4 times daily",
        ],
        StatusTag::Warning => [
            "Schedule follow-up visit within 2 weeks",
            "Review meal plan and carbohydrate counting",
            "Maintain regular blood glucose monitoring",
        ],
        StatusTag::Stable => [
            "Continue current treatment plan",
            "Regular check-up in 3 months",
            "Maintain physical activity levels",
        ],
    }
}

pub fn medication_plan(diabetes_type: &DiabetesType, injections: u32) -> String {
    match diabetes_type {
        DiabetesType::Type1 => format!(
            "Insulin therapy: continue with current regimen of {} injections per day.",
            injections
        ),
        _ => "Oral medication: Metformin 500mg twice daily.".to_string(),
    }
}

pub fn diet_plan(meals_per_day: u32) -> String {
    format!(
        "Follow the recommended meal plan with {} balanced meals per day.",
        meals_per_day
    )
}

pub fn follow_up_plan(status: StatusTag) -> &'static str {
    match status {
        StatusTag::Critical => "Schedule appointment within 1 week.",
        StatusTag::Warning => "Schedule appointment within 3 weeks.",
        StatusTag::Stable => "Schedule routine appointment in 3 months.",
    }
}

/// Diet, activity and insulin scores for the factors chart
pub fn contributing_factors(input: &PdfReportInput) -> Vec<ChartPoint> {
    let activity = match input.activity_level {
        ActivityLevel::Low => 30.0,
        ActivityLevel::Moderate => 60.0,
        ActivityLevel::High => 90.0,
    };
    vec![
        ChartPoint::new("Diet", f64::from(input.meals_per_day) * 20.0).with_color(PRIMARY),
        ChartPoint::new("Activity", activity).with_color(STABLE),
        ChartPoint::new("Insulin", f64::from(input.insulin_injections) * 25.0).with_color(WARNING),
    ]
}

/// `patient-report-<name>-<YYYY-MM-DD>.pdf`, name lowercased with every
/// whitespace run turned into one hyphen
pub fn pdf_report_filename(name: &str, date: NaiveDate) -> String {
    let slug = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    format!("patient-report-{}-{}.pdf", slug, date.format("%Y-%m-%d"))
}

// ============================================================================
// Rendering
// ============================================================================

/// Draw the PDF document and return its bytes
pub fn render_pdf_report(input: &PdfReportInput, now: DateTime<Local>) -> ReportResult<Vec<u8>> {
    let (doc, page1, layer1) = printpdf::PdfDocument::new(
        "Patient Health Report",
        printpdf::Mm(PAGE_WIDTH as f32),
        printpdf::Mm(PAGE_HEIGHT as f32),
        "Layer 1",
    );
    let fonts = PdfFonts::load(&doc)?;

    let pages = layout_report(
        |index| {
            let (page, layer) = if index == 0 {
                (page1, layer1)
            } else {
                doc.add_page(
                    printpdf::Mm(PAGE_WIDTH as f32),
                    printpdf::Mm(PAGE_HEIGHT as f32),
                    format!("Page {}", index + 1),
                )
            };
            PdfCanvas::new(doc.get_page(page).get_layer(layer), &fonts, PAGE_HEIGHT)
        },
        input,
        now,
    );
    tracing::debug!("Laid out {} PDF pages", pages.len());
    drop(pages);

    let mut writer = std::io::BufWriter::new(Vec::new());
    doc.save(&mut writer)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(bytes)
}

/// Draw both pages, asking `new_page` for a fresh surface per page
pub fn layout_report<S, F>(mut new_page: F, input: &PdfReportInput, now: DateTime<Local>) -> Vec<S>
where
    S: DrawingSurface,
    F: FnMut(usize) -> S,
{
    let mut first = new_page(0);
    draw_summary_page(&mut first, input, now);
    draw_footer(&mut first, 1, now);

    let mut second = new_page(1);
    draw_analysis_page(&mut second, input);
    draw_footer(&mut second, 2, now);

    vec![first, second]
}

fn draw_summary_page<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    input: &PdfReportInput,
    now: DateTime<Local>,
) {
    draw_watermark(surface, "DIABETES");

    // header band with logo
    draw_linear_gradient(
        surface,
        Frame::new(0.0, 0.0, PAGE_WIDTH, 40.0),
        PRIMARY_DARK,
        PRIMARY,
        false,
    );
    surface.circle(20.0, 20.0, 12.0, &ShapeStyle::filled(WHITE).with_opacity(0.2));
    surface.circle(20.0, 20.0, 9.0, &ShapeStyle::filled(WHITE).with_opacity(0.3));
    surface.circle(20.0, 20.0, 5.0, &ShapeStyle::filled(WHITE));
    for i in 0..8 {
        let angle = i as f64 * std::f64::consts::PI / 4.0;
        surface.circle(
            20.0 + 10.0 * angle.cos(),
            20.0 + 10.0 * angle.sin(),
            1.0,
            &ShapeStyle::filled(WHITE),
        );
    }

    let title = TextStyle::new(24.0, WHITE).bold();
    surface.text(
        41.0,
        20.0,
        "PATIENT HEALTH REPORT",
        &TextStyle {
            color: PRIMARY_DARK.lerp(BLACK, 0.4),
            ..title
        },
    );
    surface.text(40.0, 19.0, "PATIENT HEALTH REPORT", &title);
    surface.text(
        40.0,
        29.0,
        &format!("Generated: {}", now.format("%B %-d, %Y")),
        &TextStyle::new(11.0, WHITE),
    );

    draw_patient_card(surface, input);

    // key metrics
    draw_section(surface, 102.0, 60.0, "KEY METRICS");
    let gauges = [
        (
            45.0,
            metric_gauge("A1C (%)", input.a1c, 12.0, a1c_color),
        ),
        (
            PAGE_WIDTH / 2.0,
            metric_gauge("BMI", input.bmi, 40.0, bmi_color),
        ),
        (
            PAGE_WIDTH - 45.0,
            metric_gauge("Compliance (%)", input.compliance, 100.0, compliance_color),
        ),
    ];
    for (cx, gauge) in &gauges {
        draw_gauge(surface, *cx, 146.0, 16.0, gauge);
    }

    draw_section(surface, 168.0, 68.0, "GLUCOSE MONITORING");
    draw_line_chart(
        surface,
        &LineChart {
            points: &input.weekly_glucose,
            title: "Weekly Blood Glucose Readings (mg/dL)",
            show_grid: true,
            target: Some(GLUCOSE_HIGH_THRESHOLD * MGDL_PER_MMOLL),
        },
        Frame::new(MARGIN + 10.0, 188.0, CONTENT_WIDTH - 20.0, 44.0),
    );

    draw_section(surface, 242.0, 38.0, "RECOMMENDATIONS");
    let bullet = ShapeStyle::filled(status_color(input.status));
    for (i, line) in recommendations(input.status).iter().enumerate() {
        let y = 260.0 + i as f64 * 8.0;
        surface.circle(MARGIN + 10.0, y - 1.2, 1.0, &bullet);
        surface.text(MARGIN + 14.0, y, line, &TextStyle::new(10.0, TEXT));
    }
}

fn draw_patient_card<S: DrawingSurface + ?Sized>(surface: &mut S, input: &PdfReportInput) {
    let (x, y, w, h) = (MARGIN, 46.0, CONTENT_WIDTH, 50.0);
    surface.rect(x + 1.0, y + 1.0, w, h, 5.0, &ShapeStyle::filled(BLACK).with_opacity(0.05));
    surface.rect(x, y, w, h, 5.0, &ShapeStyle::filled_and_stroked(WHITE, MEDIUM_GRAY, 0.3));

    // avatar with initials
    surface.circle(x + 20.0, y + 25.0, 12.0, &ShapeStyle::filled(PRIMARY_LIGHT));
    surface.text(
        x + 20.0,
        y + 29.0,
        &initials(&input.patient_name),
        &TextStyle::new(14.0, PRIMARY_DARK).bold().centered(),
    );

    surface.text(x + 40.0, y + 14.0, &input.patient_name, &TextStyle::new(18.0, TEXT).bold());
    surface.text(
        x + 40.0,
        y + 22.0,
        &format!(
            "ID: {}",
            if input.patient_id.is_empty() { "N/A" } else { input.patient_id.as_str() }
        ),
        &TextStyle::new(10.0, TEXT_LIGHT),
    );

    let color = status_color(input.status);
    surface.rect(x + 40.0, y + 28.0, 40.0, 10.0, 3.0, &ShapeStyle::filled(color));
    surface.text(
        x + 60.0,
        y + 34.8,
        &input.status.as_str().to_uppercase(),
        &TextStyle::new(10.0, WHITE).bold().centered(),
    );

    let detail = TextStyle::new(10.0, TEXT);
    let column = x + 100.0;
    surface.text(
        column,
        y + 14.0,
        &format!("Type: {}", input.diabetes_type.display_label()),
        &detail,
    );
    surface.text(
        column,
        y + 24.0,
        &format!("Diagnosed: {}", format_diagnosis_date(input.diagnosis_date.as_deref())),
        &detail,
    );
    surface.text(
        column,
        y + 34.0,
        &format!("Activity Level: {}", input.activity_level.display_name()),
        &detail,
    );
}

fn draw_analysis_page<S: DrawingSurface + ?Sized>(surface: &mut S, input: &PdfReportInput) {
    draw_watermark(surface, "REPORT");

    surface.rect(0.0, 0.0, PAGE_WIDTH, 20.0, 0.0, &ShapeStyle::filled(PRIMARY));
    surface.text(
        PAGE_WIDTH / 2.0,
        13.0,
        &format!("{} - Detailed Analysis", input.patient_name),
        &TextStyle::new(16.0, WHITE).bold().centered(),
    );

    draw_section(surface, 26.0, 80.0, "DETAILED TRENDS");
    draw_line_chart(
        surface,
        &LineChart {
            points: &input.monthly_glucose,
            title: "Monthly Average Blood Glucose (mg/dL)",
            show_grid: true,
            target: None,
        },
        Frame::new(MARGIN + 10.0, 46.0, CONTENT_WIDTH - 20.0, 55.0),
    );

    draw_section(surface, 112.0, 80.0, "CONTRIBUTING FACTORS");
    let factors = contributing_factors(input);
    draw_bar_chart(
        surface,
        &BarChart {
            points: &factors,
            title: "Contributing Factors Score",
            show_labels_on_bars: true,
        },
        Frame::new(MARGIN + 10.0, 132.0, CONTENT_WIDTH - 20.0, 55.0),
    );

    draw_section(surface, 198.0, 80.0, "TREATMENT PLAN");
    let heading = TextStyle::new(10.0, TEXT).bold();
    let body = TextStyle::new(10.0, TEXT);
    let plan = [
        (
            "Medication:",
            medication_plan(&input.diabetes_type, input.insulin_injections),
        ),
        ("Diet:", diet_plan(input.meals_per_day)),
        ("Follow-up:", follow_up_plan(input.status).to_string()),
    ];
    for (i, (label, text)) in plan.iter().enumerate() {
        let y = 220.0 + i as f64 * 19.0;
        surface.text(MARGIN + 10.0, y, label, &heading);
        surface.text(MARGIN + 20.0, y + 7.0, text, &body);
    }
}

fn draw_section<S: DrawingSurface + ?Sized>(surface: &mut S, y: f64, height: f64, title: &str) {
    surface.rect(MARGIN, y, CONTENT_WIDTH, height, 3.0, &ShapeStyle::filled(LIGHT_GRAY));
    surface.rect(MARGIN, y, CONTENT_WIDTH, 10.0, 0.0, &ShapeStyle::filled(PRIMARY));
    surface.text(
        PAGE_WIDTH / 2.0,
        y + 7.0,
        title,
        &TextStyle::new(12.0, WHITE).bold().centered(),
    );
}

/// Large pale diagonal word behind the page content
fn draw_watermark<S: DrawingSurface + ?Sized>(surface: &mut S, word: &str) {
    surface.text(
        PAGE_WIDTH / 2.0,
        PAGE_HEIGHT / 2.0,
        word,
        &TextStyle::new(60.0, WATERMARK_GRAY)
            .italic()
            .centered()
            .rotated(45.0),
    );
}

fn draw_footer<S: DrawingSurface + ?Sized>(surface: &mut S, page: usize, now: DateTime<Local>) {
    surface.line(
        MARGIN,
        FOOTER_Y - 5.0,
        PAGE_WIDTH - MARGIN,
        FOOTER_Y - 5.0,
        &LineStyle::solid(MEDIUM_GRAY, 0.3),
    );
    let style = TextStyle::new(8.0, FOOTER_GRAY);
    surface.text(
        PAGE_WIDTH / 2.0,
        FOOTER_Y,
        &format!("Page {}/{}", page, PAGE_COUNT),
        &style.centered(),
    );
    surface.text(
        MARGIN,
        FOOTER_Y,
        &format!("\u{a9} Health Monitoring System {}", now.year()),
        &style,
    );
    surface.text(PAGE_WIDTH - MARGIN, FOOTER_Y, "CONFIDENTIAL", &style.right());
}

/// Gauge for an optional metric; missing values sit at zero marked N/A
fn metric_gauge(title: &str, value: Option<f64>, max: f64, color_for: fn(f64) -> Color) -> GaugeSpec {
    match value {
        Some(v) => GaugeSpec::new(title, (v * 10.0).round() / 10.0, max).with_color(color_for(v)),
        None => GaugeSpec::new(title, 0.0, max)
            .with_color(DARK_GRAY)
            .with_value_label("N/A"),
    }
}

fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

/// `Mar 15, 2022`; anything that is not an ISO date is shown as stored
fn format_diagnosis_date(raw: Option<&str>) -> String {
    match raw {
        Some(s) => match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
            Ok(date) => date.format("%b %d, %Y").to_string(),
            Err(_) => s.to_string(),
        },
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::canvas::{DrawCommand, RecordingSurface};
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn input() -> PdfReportInput {
        PdfReportInput {
            patient_name: "John Doe".to_string(),
            patient_id: "P-0001".to_string(),
            status: StatusTag::Critical,
            diabetes_type: DiabetesType::Type1,
            diagnosis_date: Some("2022-03-15".to_string()),
            activity_level: ActivityLevel::Moderate,
            bmi: Some(30.0),
            a1c: Some(8.5),
            compliance: Some(75.0),
            meals_per_day: 4,
            insulin_injections: 3,
            weekly_glucose: ["Mon", "Tue", "Wed"]
                .iter()
                .zip([150.0, 180.0, 165.0])
                .map(|(l, v)| ChartPoint::new(*l, v))
                .collect(),
            monthly_glucose: vec![ChartPoint::new("Sep", 190.0), ChartPoint::new("Oct", 198.0)],
        }
    }

    fn pages(input: &PdfReportInput) -> Vec<RecordingSurface> {
        layout_report(|_| RecordingSurface::new(), input, now())
    }

    #[test]
    fn test_two_pages_with_watermarks_first() {
        let pages = pages(&input());
        assert_eq!(pages.len(), 2);

        for (page, word) in pages.iter().zip(["DIABETES", "REPORT"]) {
            match &page.commands[0] {
                DrawCommand::Text { text, style, .. } => {
                    assert_eq!(text, word);
                    assert_eq!(style.rotation, 45.0);
                    assert_eq!(style.color, WATERMARK_GRAY);
                }
                other => panic!("expected watermark, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_footers() {
        let pages = pages(&input());
        for (i, page) in pages.iter().enumerate() {
            let label = format!("Page {}/2", i + 1);
            let (_, y, _) = page.find_text(&label).unwrap();
            assert_eq!(y, PAGE_HEIGHT - 10.0);
            assert!(page.find_text("CONFIDENTIAL").is_some());
            assert!(page.find_text("\u{a9} Health Monitoring System 2026").is_some());
        }
    }

    #[test]
    fn test_everything_fits_on_a4() {
        for page in pages(&input()) {
            for command in &page.commands {
                if let DrawCommand::Text { y, text, .. } = command {
                    assert!(*y <= PAGE_HEIGHT, "{:?} drawn below the page at {}", text, y);
                }
                if let DrawCommand::Rect { y, height, .. } = command {
                    assert!(y + height <= PAGE_HEIGHT);
                }
            }
        }
    }

    #[test]
    fn test_summary_page_content() {
        let pages = pages(&input());
        let texts = pages[0].texts();
        assert!(texts.contains(&"PATIENT HEALTH REPORT"));
        assert!(texts.contains(&"Generated: October 19, 2026"));
        assert!(texts.contains(&"CRITICAL"));
        assert!(texts.contains(&"Diagnosed: Mar 15, 2022"));
        assert!(texts.contains(&"Activity Level: Moderate"));
        assert!(texts.contains(&"Type: Type 1"));
        assert!(texts.contains(&"Immediate consultation with endocrinologist recommended"));
        assert!(texts.contains(&"Target: 180"));

        let (_, _, a1c) = pages[0].find_text("8.5").unwrap();
        assert_eq!(a1c.color, CRITICAL);
        let (_, _, compliance) = pages[0].find_text("75").unwrap();
        assert_eq!(compliance.color, WARNING);
    }

    #[test]
    fn test_analysis_page_content() {
        let pages = pages(&input());
        let texts = pages[1].texts();
        assert!(texts.contains(&"John Doe - Detailed Analysis"));
        assert!(texts.contains(&"Monthly Average Blood Glucose (mg/dL)"));
        assert!(texts.contains(&"Contributing Factors Score"));
        assert!(texts.contains(
            &"Insulin therapy: continue with current regimen of 3 injections per day."
        ));
        assert!(texts.contains(&"Follow the recommended meal plan with 4 balanced meals per day."));
        assert!(texts.contains(&"Schedule appointment within 1 week."));
    }

    #[test]
    fn test_branches_on_status_and_type() {
        let mut stable = input();
        stable.status = StatusTag::Stable;
        stable.diabetes_type = DiabetesType::Type2;
        let pages = pages(&stable);

        assert!(pages[0].texts().contains(&"Continue current treatment plan"));
        let texts = pages[1].texts();
        assert!(texts.contains(&"Oral medication: Metformin 500mg twice daily."));
        assert!(texts.contains(&"Schedule routine appointment in 3 months."));
        assert_eq!(recommendations(StatusTag::Warning)[0], "Schedule follow-up visit within 2 weeks");
        assert_eq!(follow_up_plan(StatusTag::Warning), "Schedule appointment within 3 weeks.");
    }

    #[test]
    fn test_missing_metrics_show_na() {
        let mut sparse = input();
        sparse.a1c = None;
        sparse.bmi = None;
        sparse.diagnosis_date = None;
        let pages = pages(&sparse);
        let texts = pages[0].texts();
        assert_eq!(texts.iter().filter(|t| **t == "N/A").count(), 2);
        assert!(texts.contains(&"Diagnosed: N/A"));
    }

    #[test]
    fn test_gauge_thresholds() {
        assert_eq!(a1c_color(6.9), STABLE);
        assert_eq!(a1c_color(7.0), WARNING);
        assert_eq!(a1c_color(8.0), CRITICAL);
        assert_eq!(bmi_color(24.9), STABLE);
        assert_eq!(bmi_color(25.0), WARNING);
        assert_eq!(bmi_color(30.0), CRITICAL);
        assert_eq!(compliance_color(90.0), STABLE);
        assert_eq!(compliance_color(70.0), WARNING);
        assert_eq!(compliance_color(69.9), CRITICAL);
    }

    #[test]
    fn test_contributing_factors() {
        let factors = contributing_factors(&input());
        let values: Vec<f64> = factors.iter().map(|f| f.value).collect();
        assert_eq!(values, vec![80.0, 60.0, 75.0]);
        assert_eq!(factors[1].color, Some(STABLE));
    }

    #[test]
    fn test_filename() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(
            pdf_report_filename("Mary  Ann Smith", date),
            "patient-report-mary-ann-smith-2026-10-19.pdf"
        );
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("john doe"), "JD");
        assert_eq!(initials("Cher"), "C");
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let bytes = render_pdf_report(&input(), now()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
