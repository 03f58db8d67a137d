//! Drawing surface abstraction
//!
//! Charts and page layouts draw through [`DrawingSurface`], which exposes the
//! handful of primitives a PDF page offers: rectangles (optionally rounded),
//! ellipses, straight lines, positioned text and filled polygons. Coordinates
//! are millimetres with the origin at the top-left corner of the page and y
//! growing downward.

// ============================================================================
// Colors
// ============================================================================

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`
    pub fn lerp(&self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) * (1.0 - t) + f64::from(b) * t).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// The color seen when painted with `alpha` opacity over white paper
    pub fn blend_over_white(&self, alpha: f64) -> Color {
        WHITE.lerp(*self, alpha)
    }

    /// Channels scaled to `0.0..=1.0`
    pub fn to_unit_rgb(&self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

pub const WHITE: Color = Color::rgb(255, 255, 255);
pub const BLACK: Color = Color::rgb(0, 0, 0);

// Report palette
pub const PRIMARY: Color = Color::rgb(0x25, 0x63, 0xeb);
pub const PRIMARY_LIGHT: Color = Color::rgb(0x93, 0xc5, 0xfd);
pub const PRIMARY_DARK: Color = Color::rgb(0x1d, 0x4e, 0xd8);
pub const CRITICAL: Color = Color::rgb(0xdc, 0x26, 0x26);
pub const CRITICAL_LIGHT: Color = Color::rgb(0xfc, 0xa5, 0xa5);
pub const WARNING: Color = Color::rgb(0xd9, 0x77, 0x06);
pub const WARNING_LIGHT: Color = Color::rgb(0xfc, 0xd3, 0x4d);
pub const STABLE: Color = Color::rgb(0x05, 0x96, 0x69);
pub const STABLE_LIGHT: Color = Color::rgb(0x6e, 0xe7, 0xb7);
pub const TEXT: Color = Color::rgb(0x1f, 0x29, 0x37);
pub const TEXT_LIGHT: Color = Color::rgb(0x6b, 0x72, 0x80);
pub const LIGHT_GRAY: Color = Color::rgb(0xf3, 0xf4, 0xf6);
pub const MEDIUM_GRAY: Color = Color::rgb(0xe5, 0xe7, 0xeb);
pub const DARK_GRAY: Color = Color::rgb(0x9c, 0xa3, 0xaf);
pub const FOOTER_GRAY: Color = Color::rgb(150, 150, 150);
pub const WATERMARK_GRAY: Color = Color::rgb(230, 230, 230);

// ============================================================================
// Styles
// ============================================================================

/// Fill and/or outline for closed shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    /// Outline width in millimetres
    pub stroke_width: f64,
    /// Fill opacity, `1.0` is opaque
    pub opacity: f64,
}

impl ShapeStyle {
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
        }
    }

    pub fn stroked(color: Color, width: f64) -> Self {
        Self {
            fill: None,
            stroke: Some(color),
            stroke_width: width,
            opacity: 1.0,
        }
    }

    pub fn filled_and_stroked(fill: Color, stroke: Color, width: f64) -> Self {
        Self {
            fill: Some(fill),
            stroke: Some(stroke),
            stroke_width: width,
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Fill color after applying opacity over a white page
    pub fn effective_fill(&self) -> Option<Color> {
        self.fill.map(|c| c.blend_over_white(self.opacity))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    /// Width in millimetres
    pub width: f64,
    /// Dash and gap lengths in millimetres; `None` draws a solid line
    pub dash: Option<(f64, f64)>,
}

impl LineStyle {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Color, width: f64, dash: f64, gap: f64) -> Self {
        Self {
            color,
            width,
            dash: Some((dash, gap)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Bold,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in points
    pub size: f64,
    pub color: Color,
    pub font: FontStyle,
    pub align: TextAlign,
    /// Counter-clockwise rotation in degrees around the anchor point
    pub rotation: f64,
}

impl TextStyle {
    pub fn new(size: f64, color: Color) -> Self {
        Self {
            size,
            color,
            font: FontStyle::Normal,
            align: TextAlign::Left,
            rotation: 0.0,
        }
    }

    pub fn bold(mut self) -> Self {
        self.font = FontStyle::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.font = FontStyle::Italic;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }

    pub fn right(mut self) -> Self {
        self.align = TextAlign::Right;
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }
}

// ============================================================================
// Surface
// ============================================================================

pub trait DrawingSurface {
    /// Rectangle with top-left corner `(x, y)`; `radius > 0` rounds the corners
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64, style: &ShapeStyle);

    fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, style: &ShapeStyle);

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &LineStyle);

    /// Text whose baseline anchor is `(x, y)`, aligned per `style.align`
    fn text(&mut self, x: f64, y: f64, text: &str, style: &TextStyle);

    /// Closed polygon. Surfaces that cannot fill arbitrary paths fall back
    /// to tracing the outline with lines.
    fn polygon(&mut self, points: &[(f64, f64)], style: &ShapeStyle) {
        if points.len() < 2 {
            return;
        }
        let Some(color) = style.stroke.or(style.fill) else {
            return;
        };
        let line_style = LineStyle::solid(color, style.stroke_width.max(0.1));
        for i in 0..points.len() {
            let (x1, y1) = points[i];
            let (x2, y2) = points[(i + 1) % points.len()];
            self.line(x1, y1, x2, y2, &line_style);
        }
    }

    fn circle(&mut self, cx: f64, cy: f64, radius: f64, style: &ShapeStyle) {
        self.ellipse(cx, cy, radius, radius, style);
    }
}

/// Split a dashed line into its solid segments
pub fn dash_segments(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    dash: f64,
    gap: f64,
) -> Vec<((f64, f64), (f64, f64))> {
    let length = ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
    if length == 0.0 || dash <= 0.0 {
        return Vec::new();
    }
    let (ux, uy) = ((x2 - x1) / length, (y2 - y1) / length);
    let period = dash + gap.max(0.0);

    let mut segments = Vec::new();
    let mut start = 0.0;
    while start < length {
        let end = (start + dash).min(length);
        segments.push(((x1 + ux * start, y1 + uy * start), (x1 + ux * end, y1 + uy * end)));
        start += period;
    }
    segments
}

/// Approximate rendered width, in millimetres, of `text` set in Helvetica at
/// `size` points
pub fn estimate_text_width(text: &str, size: f64) -> f64 {
    const PT_TO_MM: f64 = 0.352_778;
    let em: f64 = text
        .chars()
        .map(|c| match c {
            'i' | 'j' | 'l' | '\'' | '|' => 0.222,
            ' ' | '.' | ',' | ':' | ';' | '!' | 'f' | 't' | 'I' | '/' | '-' | '(' | ')' => 0.278,
            'r' => 0.333,
            'm' | 'M' => 0.833,
            'w' => 0.722,
            'W' => 0.944,
            '%' => 0.889,
            '0'..='9' | 'a'..='z' => 0.556,
            'A'..='Z' => 0.667,
            _ => 0.6,
        })
        .sum();
    em * size * PT_TO_MM
}

/// Horizontal offset to apply to an anchor so text lands with `align`
pub fn align_offset(text: &str, size: f64, align: TextAlign) -> f64 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => -estimate_text_width(text, size) / 2.0,
        TextAlign::Right => -estimate_text_width(text, size),
    }
}

// ============================================================================
// Recording surface
// ============================================================================

/// One primitive call captured by [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        style: ShapeStyle,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        style: ShapeStyle,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: LineStyle,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        style: TextStyle,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        style: ShapeStyle,
    },
}

/// Surface that only records what was drawn
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every text string drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn find_text(&self, needle: &str) -> Option<(f64, f64, &TextStyle)> {
        self.commands.iter().find_map(|c| match c {
            DrawCommand::Text { x, y, text, style } if text == needle => Some((*x, *y, style)),
            _ => None,
        })
    }

    pub fn lines(&self) -> Vec<&DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .collect()
    }

    pub fn polygons(&self) -> Vec<&DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Polygon { .. }))
            .collect()
    }
}

impl DrawingSurface for RecordingSurface {
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64, style: &ShapeStyle) {
        self.commands.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            radius,
            style: *style,
        });
    }

    fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, style: &ShapeStyle) {
        self.commands.push(DrawCommand::Ellipse {
            cx,
            cy,
            rx,
            ry,
            style: *style,
        });
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &LineStyle) {
        self.commands.push(DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            style: *style,
        });
    }

    fn text(&mut self, x: f64, y: f64, text: &str, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            style: *style,
        });
    }

    fn polygon(&mut self, points: &[(f64, f64)], style: &ShapeStyle) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            style: *style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Surface implementing only the four required primitives
    #[derive(Default)]
    struct LinesOnly {
        lines: usize,
    }

    impl DrawingSurface for LinesOnly {
        fn rect(&mut self, _: f64, _: f64, _: f64, _: f64, _: f64, _: &ShapeStyle) {}
        fn ellipse(&mut self, _: f64, _: f64, _: f64, _: f64, _: &ShapeStyle) {}
        fn line(&mut self, _: f64, _: f64, _: f64, _: f64, _: &LineStyle) {
            self.lines += 1;
        }
        fn text(&mut self, _: f64, _: f64, _: &str, _: &TextStyle) {}
    }

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(Color::from_hex("#2563eb"), Some(PRIMARY));
        assert_eq!(PRIMARY.to_hex(), "#2563eb");
        assert_eq!(Color::from_hex("2563eb"), None);
        assert_eq!(Color::from_hex("#25g3eb"), None);
    }

    #[test]
    fn test_blend_over_white() {
        assert_eq!(BLACK.blend_over_white(1.0), BLACK);
        assert_eq!(BLACK.blend_over_white(0.0), WHITE);
        assert_eq!(BLACK.blend_over_white(0.5), Color::rgb(128, 128, 128));
    }

    #[test]
    fn test_polygon_falls_back_to_outline() {
        let mut surface = LinesOnly::default();
        surface.polygon(
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)],
            &ShapeStyle::filled(PRIMARY),
        );
        assert_eq!(surface.lines, 3);
    }

    #[test]
    fn test_dash_segments() {
        let segments = dash_segments(0.0, 0.0, 10.0, 0.0, 3.0, 2.0);
        assert_eq!(
            segments,
            vec![
                ((0.0, 0.0), (3.0, 0.0)),
                ((5.0, 0.0), (8.0, 0.0)),
            ]
        );
        assert!(dash_segments(0.0, 0.0, 0.0, 0.0, 3.0, 2.0).is_empty());
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let small = estimate_text_width("Target: 140", 7.0);
        let large = estimate_text_width("Target: 140", 14.0);
        assert!(small > 0.0);
        assert!((large - small * 2.0).abs() < 1e-9);
        assert_eq!(align_offset("abc", 10.0, TextAlign::Left), 0.0);
        assert!(align_offset("abc", 10.0, TextAlign::Right) < align_offset("abc", 10.0, TextAlign::Center));
    }
}
