//! Line charts, bar charts and radial gauges drawn from surface primitives
//!
//! The geometry helpers (`line_chart_range`, `bar_layout`, ...) are pure and
//! are what the drawing routines use to place every primitive.

use std::f64::consts::PI;

use super::canvas::{
    estimate_text_width, Color, DrawingSurface, LineStyle, ShapeStyle, TextStyle, BLACK,
    CRITICAL, DARK_GRAY, LIGHT_GRAY, MEDIUM_GRAY, PRIMARY, PRIMARY_LIGHT, STABLE, STABLE_LIGHT,
    TEXT, TEXT_LIGHT, WARNING, WARNING_LIGHT, WHITE,
};

/// Gauge background bands, start of the sweep first
pub const GAUGE_BANDS: [Color; 5] = [CRITICAL, WARNING, WARNING_LIGHT, STABLE_LIGHT, STABLE];

/// Points at which categories are crowded enough to rotate their labels
const LABEL_ROTATION_THRESHOLD: usize = 10;
const GRID_DIVISIONS: usize = 5;
const GAUGE_TICKS: usize = 10;
const GRADIENT_STEPS: usize = 20;
const ARC_SEGMENTS: usize = 24;

/// One category of a chart series
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    pub color: Option<Color>,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            color: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// Bounding box in millimetres, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom edge of the plotting area
    fn baseline(&self) -> f64 {
        self.y + self.height - 15.0
    }

    fn plot_height(&self) -> f64 {
        self.height - 25.0
    }
}

#[derive(Debug, Clone)]
pub struct LineChart<'a> {
    pub points: &'a [ChartPoint],
    pub title: &'a str,
    pub show_grid: bool,
    /// Reference value drawn as a dashed line when it falls inside the range
    pub target: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct BarChart<'a> {
    pub points: &'a [ChartPoint],
    pub title: &'a str,
    pub show_labels_on_bars: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeSpec {
    pub value: f64,
    pub max_value: f64,
    pub title: String,
    pub color: Option<Color>,
    /// Text shown in the value pill; defaults to the formatted value
    pub value_label: Option<String>,
}

impl GaugeSpec {
    pub fn new(title: impl Into<String>, value: f64, max_value: f64) -> Self {
        Self {
            value,
            max_value,
            title: title.into(),
            color: None,
            value_label: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_value_label(mut self, label: impl Into<String>) -> Self {
        self.value_label = Some(label.into());
        self
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Y-axis range for a line chart: ten units of padding above, and below
/// only when the minimum is above 20 (otherwise the axis starts at zero)
pub fn line_chart_range(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 10.0);
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let lower = if min > 20.0 { min - 10.0 } else { 0.0 };
    (lower, max + 10.0)
}

/// Y-axis maximum for a bar chart: 10% headroom over the tallest bar
pub fn bar_chart_max(values: &[f64]) -> f64 {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() && max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarLayout {
    pub slot: f64,
    pub gap: f64,
    pub bar_width: f64,
}

pub fn bar_layout(width: f64, count: usize) -> BarLayout {
    if count == 0 {
        return BarLayout {
            slot: 0.0,
            gap: 0.0,
            bar_width: 0.0,
        };
    }
    let slot = (width - 30.0) / count as f64;
    let gap = slot * 0.2;
    BarLayout {
        slot,
        gap,
        bar_width: slot - gap,
    }
}

/// Needle angle in radians: `π` at zero, `0` at `max`
pub fn gauge_needle_angle(value: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return PI;
    }
    let clamped = value.clamp(0.0, max);
    PI - (clamped / max) * PI
}

/// Point on a dial centred at `(cx, cy)`; angles sweep the upper half
pub fn gauge_point(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.cos(), cy - radius * angle.sin())
}

/// Where each point of a line chart lands inside `frame`
pub fn line_chart_points(values: &[f64], frame: Frame) -> Vec<(f64, f64)> {
    let (min, max) = line_chart_range(values);
    let left = frame.x + 10.0;
    let plot_width = frame.width - 20.0;
    let n = values.len();

    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = if n > 1 {
                left + i as f64 * (plot_width / (n - 1) as f64)
            } else {
                left + plot_width / 2.0
            };
            let y = frame.baseline() - ((v - min) / (max - min)) * frame.plot_height();
            (x, y)
        })
        .collect()
}

/// Whole numbers without decimals, everything else with one
pub fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn arc_points(cx: f64, cy: f64, radius: f64, from: f64, to: f64) -> Vec<(f64, f64)> {
    (0..=ARC_SEGMENTS)
        .map(|i| {
            let angle = from + (to - from) * i as f64 / ARC_SEGMENTS as f64;
            gauge_point(cx, cy, radius, angle)
        })
        .collect()
}

fn wedge(cx: f64, cy: f64, radius: f64, from: f64, to: f64) -> Vec<(f64, f64)> {
    let mut points = vec![(cx, cy)];
    points.extend(arc_points(cx, cy, radius, from, to));
    points
}

fn ring_segment(cx: f64, cy: f64, inner: f64, outer: f64, from: f64, to: f64) -> Vec<(f64, f64)> {
    let mut points = arc_points(cx, cy, outer, from, to);
    points.extend(arc_points(cx, cy, inner, to, from));
    points
}

// ============================================================================
// Shared chart furniture
// ============================================================================

fn draw_title<S: DrawingSurface + ?Sized>(surface: &mut S, frame: Frame, title: &str) {
    surface.text(
        frame.x + frame.width / 2.0,
        frame.y - 4.0,
        title,
        &TextStyle::new(10.0, TEXT).bold().centered(),
    );
}

fn draw_frame<S: DrawingSurface + ?Sized>(surface: &mut S, frame: Frame) {
    surface.rect(
        frame.x + 1.0,
        frame.y + 1.0,
        frame.width,
        frame.height,
        3.0,
        &ShapeStyle::filled(BLACK).with_opacity(0.05),
    );
    surface.rect(
        frame.x,
        frame.y,
        frame.width,
        frame.height,
        3.0,
        &ShapeStyle::filled(LIGHT_GRAY),
    );
}

/// Dashed grid, axes and the six y-axis labels
fn draw_axes<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    frame: Frame,
    min: f64,
    max: f64,
    show_grid: bool,
) {
    let left = frame.x + 10.0;
    let right = frame.x + frame.width - 10.0;
    let baseline = frame.baseline();
    let range = max - min;

    if show_grid {
        let grid = LineStyle::dashed(MEDIUM_GRAY, 0.2, 0.5, 1.0);
        for i in 1..GRID_DIVISIONS {
            let y = baseline - (i as f64 / GRID_DIVISIONS as f64) * frame.plot_height();
            surface.line(left, y, right, y, &grid);
        }
    }

    let axis = LineStyle::solid(DARK_GRAY, 0.5);
    surface.line(left, baseline, right, baseline, &axis);
    surface.line(left, frame.y + 10.0, left, baseline, &axis);

    let label_style = TextStyle::new(7.0, TEXT_LIGHT).right();
    for i in 0..=GRID_DIVISIONS {
        let fraction = i as f64 / GRID_DIVISIONS as f64;
        let y = baseline - fraction * frame.plot_height();
        let value = (min + range * fraction).round();
        surface.text(left - 2.0, y + 1.0, &format!("{:.0}", value), &label_style);
    }
}

// ============================================================================
// Line chart
// ============================================================================

pub fn draw_line_chart<S: DrawingSurface + ?Sized>(surface: &mut S, chart: &LineChart, frame: Frame) {
    let values: Vec<f64> = chart.points.iter().map(|p| p.value).collect();
    let (min, max) = line_chart_range(&values);

    draw_title(surface, frame, chart.title);
    draw_frame(surface, frame);
    draw_axes(surface, frame, min, max, chart.show_grid);

    let points = line_chart_points(&values, frame);
    let baseline = frame.baseline();

    if points.is_empty() {
        surface.text(
            frame.x + frame.width / 2.0,
            frame.y + frame.height / 2.0,
            "No data available",
            &TextStyle::new(9.0, TEXT_LIGHT).italic().centered(),
        );
    }

    if points.len() > 1 {
        let mut area = Vec::with_capacity(points.len() + 2);
        area.push((points[0].0, baseline));
        area.extend(points.iter().copied());
        area.push((points[points.len() - 1].0, baseline));
        surface.polygon(&area, &ShapeStyle::filled(PRIMARY_LIGHT).with_opacity(0.3));
    }

    let crowded = points.len() > LABEL_ROTATION_THRESHOLD;
    let label_style = if crowded {
        TextStyle::new(6.0, TEXT).rotated(45.0)
    } else {
        TextStyle::new(7.0, TEXT).centered()
    };
    for (point, (x, _)) in chart.points.iter().zip(&points) {
        surface.text(*x, frame.y + frame.height - 5.0, &point.label, &label_style);
    }

    let stroke = LineStyle::solid(PRIMARY, 0.5);
    for pair in points.windows(2) {
        surface.line(pair[0].0, pair[0].1, pair[1].0, pair[1].1, &stroke);
    }

    let halo = ShapeStyle::filled(PRIMARY).with_opacity(0.3);
    let disc = ShapeStyle::filled_and_stroked(PRIMARY, WHITE, 0.3);
    for (x, y) in &points {
        surface.circle(*x, *y, 1.8, &halo);
        surface.circle(*x, *y, 1.0, &disc);
    }

    if let Some(target) = chart.target {
        if target >= min && target <= max {
            draw_target_line(surface, frame, target, min, max);
        }
    }
}

fn draw_target_line<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    frame: Frame,
    target: f64,
    min: f64,
    max: f64,
) {
    let y = frame.baseline() - ((target - min) / (max - min)) * frame.plot_height();
    let left = frame.x + 10.0;
    let right = frame.x + frame.width - 10.0;
    surface.line(left, y, right, y, &LineStyle::dashed(STABLE, 0.4, 3.0, 2.0));

    let label = format!("Target: {}", format_number(target));
    let label_width = estimate_text_width(&label, 7.0);
    surface.rect(
        right - label_width - 4.0,
        y - 4.0,
        label_width + 6.0,
        5.0,
        2.0,
        &ShapeStyle::filled(STABLE).with_opacity(0.2),
    );
    surface.text(right - 1.0, y - 0.3, &label, &TextStyle::new(7.0, STABLE).bold().right());
}

// ============================================================================
// Bar chart
// ============================================================================

pub fn draw_bar_chart<S: DrawingSurface + ?Sized>(surface: &mut S, chart: &BarChart, frame: Frame) {
    let values: Vec<f64> = chart.points.iter().map(|p| p.value).collect();
    let max = bar_chart_max(&values);

    draw_title(surface, frame, chart.title);
    draw_frame(surface, frame);
    draw_axes(surface, frame, 0.0, max, true);

    let layout = bar_layout(frame.width, chart.points.len());
    let baseline = frame.baseline();

    for (i, point) in chart.points.iter().enumerate() {
        let color = point.color.unwrap_or(PRIMARY);
        let bar_x = frame.x + 15.0 + i as f64 * layout.slot + layout.gap / 2.0;
        let bar_height = (point.value.max(0.0) / max) * frame.plot_height();
        let bar_y = baseline - bar_height;
        let center = bar_x + layout.bar_width / 2.0;

        surface.rect(
            bar_x,
            bar_y,
            layout.bar_width,
            bar_height,
            1.0,
            &ShapeStyle::filled(color),
        );
        surface.text(
            center,
            frame.y + frame.height - 5.0,
            &point.label,
            &TextStyle::new(7.0, TEXT).centered(),
        );

        if chart.show_labels_on_bars {
            let text = format_number(point.value);
            let text_width = estimate_text_width(&text, 8.0);
            surface.rect(
                center - text_width / 2.0 - 2.0,
                bar_y - 6.5,
                text_width + 4.0,
                5.0,
                2.0,
                &ShapeStyle::filled_and_stroked(WHITE, color, 0.2).with_opacity(0.7),
            );
            surface.text(
                center,
                bar_y - 2.7,
                &text,
                &TextStyle::new(8.0, color).bold().centered(),
            );
        }
    }
}

// ============================================================================
// Gauge
// ============================================================================

pub fn draw_gauge<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    cx: f64,
    cy: f64,
    radius: f64,
    gauge: &GaugeSpec,
) {
    let color = gauge.color.unwrap_or(PRIMARY);

    surface.text(
        cx,
        cy - radius - 8.0,
        &gauge.title,
        &TextStyle::new(10.0, TEXT).bold().centered(),
    );

    let band_sweep = PI / GAUGE_BANDS.len() as f64;
    for (i, band) in GAUGE_BANDS.iter().enumerate() {
        let from = PI - i as f64 * band_sweep;
        let to = from - band_sweep;
        surface.polygon(
            &wedge(cx, cy, radius, from, to),
            &ShapeStyle::filled(*band).with_opacity(0.8),
        );
    }

    // donut hole
    surface.polygon(&wedge(cx, cy, radius * 0.7, PI, 0.0), &ShapeStyle::filled(LIGHT_GRAY));

    let needle_angle = gauge_needle_angle(gauge.value, gauge.max_value);
    if needle_angle < PI {
        surface.polygon(
            &ring_segment(cx, cy, radius * 0.6, radius * 0.7, PI, needle_angle),
            &ShapeStyle::filled(color),
        );
    }

    for i in 0..=GAUGE_TICKS {
        let angle = PI - (i as f64 / GAUGE_TICKS as f64) * PI;
        let major = i % 5 == 0;
        let length = if major { radius * 0.15 } else { radius * 0.05 };
        let (x1, y1) = gauge_point(cx, cy, radius - length, angle);
        let (x2, y2) = gauge_point(cx, cy, radius, angle);
        let width = if major { 0.5 } else { 0.3 };
        surface.line(x1, y1, x2, y2, &LineStyle::solid(TEXT, width));

        if major {
            let (lx, ly) = gauge_point(cx, cy, radius + 5.0, angle);
            let value = gauge.max_value * i as f64 / GAUGE_TICKS as f64;
            surface.text(
                lx,
                ly + 1.0,
                &format_number(value),
                &TextStyle::new(6.0, TEXT_LIGHT).centered(),
            );
        }
    }

    let (nx, ny) = gauge_point(cx, cy, radius * 0.9, needle_angle);
    surface.line(cx, cy, nx, ny, &LineStyle::solid(TEXT, 0.8));
    surface.circle(cx, cy, radius * 0.07, &ShapeStyle::filled(TEXT));
    surface.circle(cx, cy, radius * 0.03, &ShapeStyle::filled(WHITE));

    let value_text = gauge
        .value_label
        .clone()
        .unwrap_or_else(|| format_number(gauge.value));
    let value_width = estimate_text_width(&value_text, 12.0);
    surface.rect(
        cx - value_width / 2.0 - 4.0,
        cy + 3.0,
        value_width + 8.0,
        8.0,
        3.0,
        &ShapeStyle::filled_and_stroked(WHITE, color, 0.3).with_opacity(0.8),
    );
    surface.text(
        cx,
        cy + 9.2,
        &value_text,
        &TextStyle::new(12.0, color).bold().centered(),
    );
}

// ============================================================================
// Gradient
// ============================================================================

/// Fill `frame` with strips stepping from `from` to `to`
pub fn draw_linear_gradient<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    frame: Frame,
    from: Color,
    to: Color,
    vertical: bool,
) {
    let extent = if vertical { frame.height } else { frame.width };
    let step = extent / GRADIENT_STEPS as f64;

    for i in 0..GRADIENT_STEPS {
        let color = from.lerp(to, i as f64 / (GRADIENT_STEPS - 1) as f64);
        let style = ShapeStyle::filled(color);
        let offset = i as f64 * step;
        // strips overlap slightly so no hairline gaps show between them
        if vertical {
            surface.rect(frame.x, frame.y + offset, frame.width, step + 0.5, 0.0, &style);
        } else {
            surface.rect(frame.x + offset, frame.y, step + 0.5, frame.height, 0.0, &style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::canvas::{DrawCommand, RecordingSurface};

    fn series(values: &[f64]) -> Vec<ChartPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| ChartPoint::new(format!("P{}", i + 1), *v))
            .collect()
    }

    #[test]
    fn test_line_chart_range_padding() {
        assert_eq!(line_chart_range(&[25.0, 30.0, 28.0]), (15.0, 40.0));
        assert_eq!(line_chart_range(&[5.0, 8.0]), (0.0, 18.0));
        assert_eq!(line_chart_range(&[20.0]), (0.0, 30.0));
        assert_eq!(line_chart_range(&[]), (0.0, 10.0));
    }

    #[test]
    fn test_bar_chart_max_headroom() {
        assert!((bar_chart_max(&[80.0, 60.0, 100.0]) - 110.0).abs() < 1e-9);
        assert_eq!(bar_chart_max(&[]), 1.0);
        assert_eq!(bar_chart_max(&[0.0, 0.0]), 1.0);
    }

    #[test]
    fn test_bar_layout_gap() {
        let layout = bar_layout(180.0, 3);
        assert!((layout.slot - 50.0).abs() < 1e-9);
        assert!((layout.gap - 10.0).abs() < 1e-9);
        assert!((layout.bar_width - 40.0).abs() < 1e-9);
        assert_eq!(bar_layout(180.0, 0).bar_width, 0.0);
    }

    #[test]
    fn test_gauge_needle_angle() {
        assert!((gauge_needle_angle(6.0, 12.0) - PI / 2.0).abs() < 1e-12);
        assert_eq!(gauge_needle_angle(0.0, 12.0), PI);
        assert_eq!(gauge_needle_angle(12.0, 12.0), 0.0);
        // out-of-range values pin to the ends of the dial
        assert_eq!(gauge_needle_angle(-3.0, 12.0), PI);
        assert_eq!(gauge_needle_angle(50.0, 12.0), 0.0);
        assert_eq!(gauge_needle_angle(5.0, 0.0), PI);
    }

    #[test]
    fn test_gauge_point_sweeps_upper_half() {
        let (x, y) = gauge_point(50.0, 50.0, 10.0, PI / 2.0);
        assert!((x - 50.0).abs() < 1e-9);
        assert!((y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_line_chart_points_span_plot_area() {
        let frame = Frame::new(0.0, 0.0, 120.0, 65.0);
        let points = line_chart_points(&[25.0, 30.0, 28.0], frame);
        assert_eq!(points[0].0, 10.0);
        assert_eq!(points[2].0, 110.0);
        // range is 15..40; 25 sits 40% of the way up from the baseline at y=50
        assert!((points[0].1 - (50.0 - 0.4 * 40.0)).abs() < 1e-9);

        let single = line_chart_points(&[25.0], frame);
        assert_eq!(single[0].0, 60.0);
    }

    #[test]
    fn test_line_chart_draw_order_and_labels() {
        let mut surface = RecordingSurface::new();
        let points = series(&[120.0, 150.0, 135.0]);
        let chart = LineChart {
            points: &points,
            title: "Glucose",
            show_grid: true,
            target: Some(140.0),
        };
        draw_line_chart(&mut surface, &chart, Frame::new(15.0, 60.0, 180.0, 60.0));

        let texts = surface.texts();
        assert_eq!(texts[0], "Glucose");
        assert!(texts.contains(&"Target: 140"));
        // six y-axis labels from 110 to 160
        assert!(texts.contains(&"110"));
        assert!(texts.contains(&"160"));

        let polygon_idx = surface
            .commands
            .iter()
            .position(|c| matches!(c, DrawCommand::Polygon { .. }))
            .unwrap();
        let first_circle = surface
            .commands
            .iter()
            .position(|c| matches!(c, DrawCommand::Ellipse { .. }))
            .unwrap();
        assert!(polygon_idx < first_circle);

        let (_, _, style) = surface.find_text("P1").unwrap();
        assert_eq!(style.rotation, 0.0);
        assert_eq!(style.size, 7.0);
    }

    #[test]
    fn test_line_chart_rotates_crowded_labels() {
        let mut surface = RecordingSurface::new();
        let points = series(&[1.0; 11]);
        let chart = LineChart {
            points: &points,
            title: "Dense",
            show_grid: false,
            target: None,
        };
        draw_line_chart(&mut surface, &chart, Frame::new(0.0, 0.0, 180.0, 60.0));

        let (_, _, style) = surface.find_text("P11").unwrap();
        assert_eq!(style.rotation, 45.0);
        assert_eq!(style.size, 6.0);
        assert!(!surface.texts().iter().any(|t| t.starts_with("Target")));
    }

    #[test]
    fn test_target_outside_range_is_skipped() {
        let mut surface = RecordingSurface::new();
        let points = series(&[5.0, 8.0]);
        let chart = LineChart {
            points: &points,
            title: "",
            show_grid: false,
            target: Some(100.0),
        };
        draw_line_chart(&mut surface, &chart, Frame::new(0.0, 0.0, 100.0, 60.0));
        assert!(surface.find_text("Target: 100").is_none());
        // a single series of two points still gets its area polygon
        assert_eq!(surface.polygons().len(), 1);
    }

    #[test]
    fn test_bar_chart_pills_and_colors() {
        let mut surface = RecordingSurface::new();
        let points = vec![
            ChartPoint::new("Diet", 80.0),
            ChartPoint::new("Activity", 60.0).with_color(STABLE),
            ChartPoint::new("Insulin", 75.0).with_color(WARNING),
        ];
        let chart = BarChart {
            points: &points,
            title: "Factors",
            show_labels_on_bars: true,
        };
        draw_bar_chart(&mut surface, &chart, Frame::new(15.0, 150.0, 180.0, 55.0));

        let (_, _, style) = surface.find_text("60").unwrap();
        assert_eq!(style.color, STABLE);
        assert!(surface.find_text("80").is_some());
        assert!(surface.find_text("Insulin").is_some());

        let bar_fills: Vec<Color> = surface
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { radius, style, .. } if *radius == 1.0 => style.fill,
                _ => None,
            })
            .collect();
        assert_eq!(bar_fills, vec![PRIMARY, STABLE, WARNING]);
    }

    #[test]
    fn test_gauge_ticks_and_labels() {
        let mut surface = RecordingSurface::new();
        let gauge = GaugeSpec::new("A1C", 8.5, 12.0).with_color(CRITICAL);
        draw_gauge(&mut surface, 40.0, 140.0, 18.0, &gauge);

        let texts = surface.texts();
        assert_eq!(texts[0], "A1C");
        for label in ["0", "6", "12", "8.5"] {
            assert!(texts.contains(&label), "missing {}", label);
        }
        // 11 ticks plus the needle
        assert_eq!(surface.lines().len(), 12);
        // five bands, the hole and the value arc
        assert_eq!(surface.polygons().len(), 7);
    }

    #[test]
    fn test_gauge_at_zero_has_no_value_arc() {
        let mut surface = RecordingSurface::new();
        let gauge = GaugeSpec::new("BMI", 0.0, 40.0).with_value_label("N/A");
        draw_gauge(&mut surface, 40.0, 140.0, 18.0, &gauge);
        assert_eq!(surface.polygons().len(), 6);
        assert!(surface.find_text("N/A").is_some());
    }

    #[test]
    fn test_gradient_runs_from_start_to_end_color() {
        let mut surface = RecordingSurface::new();
        draw_linear_gradient(&mut surface, Frame::new(0.0, 0.0, 210.0, 40.0), BLACK, WHITE, false);
        let fills: Vec<Color> = surface
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { style, .. } => style.fill,
                _ => None,
            })
            .collect();
        assert_eq!(fills.len(), 20);
        assert_eq!(fills[0], BLACK);
        assert_eq!(fills[19], WHITE);
    }
}
