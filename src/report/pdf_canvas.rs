//! printpdf backend for [`DrawingSurface`]

use std::f64::consts::PI;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;

use super::canvas::{self, align_offset, dash_segments, DrawingSurface, FontStyle};
use super::{ReportError, ReportResult};

const CURVE_SEGMENTS: usize = 48;
const CORNER_SEGMENTS: usize = 6;

fn mm_to_pt(mm: f64) -> f32 {
    (mm * 2.834645669) as f32
}

fn pdf_color(color: canvas::Color) -> Color {
    let (r, g, b) = color.to_unit_rgb();
    Color::Rgb(Rgb::new(r, g, b, None))
}

/// Builtin Helvetica faces shared by every page of a document
pub(crate) struct PdfFonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl PdfFonts {
    pub(crate) fn load(doc: &PdfDocumentReference) -> ReportResult<Self> {
        let load = |font| {
            doc.add_builtin_font(font)
                .map_err(|e| ReportError::Pdf(e.to_string()))
        };
        Ok(Self {
            regular: load(BuiltinFont::Helvetica)?,
            bold: load(BuiltinFont::HelveticaBold)?,
            italic: load(BuiltinFont::HelveticaOblique)?,
        })
    }

    fn for_style(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Normal => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

/// One page layer. Converts the top-left millimetre coordinates of the
/// surface into PDF user space.
pub(crate) struct PdfCanvas<'a> {
    layer: PdfLayerReference,
    fonts: &'a PdfFonts,
    page_height: f64,
}

impl<'a> PdfCanvas<'a> {
    pub(crate) fn new(layer: PdfLayerReference, fonts: &'a PdfFonts, page_height: f64) -> Self {
        Self {
            layer,
            fonts,
            page_height,
        }
    }

    fn point(&self, x: f64, y: f64) -> Point {
        Point::new(Mm(x as f32), Mm((self.page_height - y) as f32))
    }

    fn paint(&self, points: &[(f64, f64)], style: &canvas::ShapeStyle) {
        if points.len() < 3 {
            return;
        }
        let mode = match (style.effective_fill(), style.stroke) {
            (Some(fill), Some(stroke)) => {
                self.layer.set_fill_color(pdf_color(fill));
                self.set_stroke(stroke, style.stroke_width);
                PaintMode::FillStroke
            }
            (Some(fill), None) => {
                self.layer.set_fill_color(pdf_color(fill));
                PaintMode::Fill
            }
            (None, Some(stroke)) => {
                self.set_stroke(stroke, style.stroke_width);
                PaintMode::Stroke
            }
            (None, None) => return,
        };

        let ring = points.iter().map(|(x, y)| (self.point(*x, *y), false)).collect();
        self.layer.add_polygon(Polygon {
            rings: vec![ring],
            mode,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn set_stroke(&self, color: canvas::Color, width_mm: f64) {
        self.layer.set_outline_color(pdf_color(color));
        self.layer.set_outline_thickness(mm_to_pt(width_mm));
    }

    fn stroke_segment(&self, from: (f64, f64), to: (f64, f64)) {
        self.layer.add_line(Line {
            points: vec![
                (self.point(from.0, from.1), false),
                (self.point(to.0, to.1), false),
            ],
            is_closed: false,
        });
    }
}

/// Corner arcs approximated with short segments, clockwise from top-left
fn rounded_rect_points(x: f64, y: f64, w: f64, h: f64, radius: f64) -> Vec<(f64, f64)> {
    let r = radius.min(w / 2.0).min(h / 2.0);
    if r <= 0.0 {
        return vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
    }

    // corner centres with the angle each arc starts at (y grows downward)
    let corners = [
        (x + r, y + r, PI),
        (x + w - r, y + r, 1.5 * PI),
        (x + w - r, y + h - r, 0.0),
        (x + r, y + h - r, 0.5 * PI),
    ];
    corners
        .iter()
        .flat_map(|&(cx, cy, start)| {
            (0..=CORNER_SEGMENTS).map(move |i| {
                let angle = start + (PI / 2.0) * i as f64 / CORNER_SEGMENTS as f64;
                (cx + r * angle.cos(), cy + r * angle.sin())
            })
        })
        .collect()
}

fn ellipse_points(cx: f64, cy: f64, rx: f64, ry: f64) -> Vec<(f64, f64)> {
    (0..CURVE_SEGMENTS)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / CURVE_SEGMENTS as f64;
            (cx + rx * angle.cos(), cy + ry * angle.sin())
        })
        .collect()
}

/// The builtin fonts only cover Latin-1
fn pdf_safe_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '*',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}

impl DrawingSurface for PdfCanvas<'_> {
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64, style: &canvas::ShapeStyle) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.paint(&rounded_rect_points(x, y, width, height, radius), style);
    }

    fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, style: &canvas::ShapeStyle) {
        self.paint(&ellipse_points(cx, cy, rx, ry), style);
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &canvas::LineStyle) {
        self.set_stroke(style.color, style.width);
        match style.dash {
            Some((dash, gap)) => {
                for (from, to) in dash_segments(x1, y1, x2, y2, dash, gap) {
                    self.stroke_segment(from, to);
                }
            }
            None => self.stroke_segment((x1, y1), (x2, y2)),
        }
    }

    fn text(&mut self, x: f64, y: f64, text: &str, style: &canvas::TextStyle) {
        let text = pdf_safe_text(text);
        let font = self.fonts.for_style(style.font);
        let size = style.size as f32;

        // shift the anchor back along the (possibly rotated) baseline
        let offset = align_offset(&text, style.size, style.align);
        let angle = style.rotation.to_radians();
        let ax = x + offset * angle.cos();
        let ay = y - offset * angle.sin();

        self.layer.set_fill_color(pdf_color(style.color));
        if style.rotation == 0.0 {
            self.layer
                .use_text(text, size, Mm(ax as f32), Mm((self.page_height - ay) as f32), font);
        } else {
            self.layer.begin_text_section();
            self.layer.set_font(font, size);
            self.layer.set_text_matrix(TextMatrix::TranslateRotate(
                Pt(mm_to_pt(ax)),
                Pt(mm_to_pt(self.page_height - ay)),
                style.rotation as f32,
            ));
            self.layer.write_text(text, font);
            self.layer.end_text_section();
        }
    }

    fn polygon(&mut self, points: &[(f64, f64)], style: &canvas::ShapeStyle) {
        self.paint(points, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_rect_stays_in_bounds() {
        let points = rounded_rect_points(10.0, 20.0, 40.0, 10.0, 3.0);
        assert_eq!(points.len(), 4 * (CORNER_SEGMENTS + 1));
        for (x, y) in &points {
            assert!(*x >= 10.0 - 1e-9 && *x <= 50.0 + 1e-9);
            assert!(*y >= 20.0 - 1e-9 && *y <= 30.0 + 1e-9);
        }
        assert_eq!(rounded_rect_points(0.0, 0.0, 5.0, 5.0, 0.0).len(), 4);
    }

    #[test]
    fn test_pdf_safe_text() {
        assert_eq!(pdf_safe_text("\u{a9} 2026 \u{2014} Zo\u{eb}"), "\u{a9} 2026 - Zo\u{eb}");
        assert_eq!(pdf_safe_text("\u{2022} ok \u{2713}"), "* ok ?");
    }

    #[test]
    fn test_paints_every_shape_kind() {
        let (doc, page, layer) = PdfDocument::new("shapes", Mm(210.0), Mm(297.0), "Layer 1");
        let fonts = PdfFonts::load(&doc).unwrap();
        {
            let mut surface = PdfCanvas::new(doc.get_page(page).get_layer(layer), &fonts, 297.0);
            surface.rect(
                10.0,
                10.0,
                60.0,
                20.0,
                4.0,
                &canvas::ShapeStyle::filled_and_stroked(canvas::PRIMARY_LIGHT, canvas::PRIMARY, 0.5),
            );
            surface.ellipse(100.0, 50.0, 12.0, 8.0, &canvas::ShapeStyle::filled(canvas::STABLE));
            surface.polygon(
                &[(20.0, 80.0), (60.0, 80.0), (40.0, 110.0)],
                &canvas::ShapeStyle::stroked(canvas::CRITICAL, 0.8),
            );
            surface.line(
                10.0,
                150.0,
                200.0,
                150.0,
                &canvas::LineStyle::dashed(canvas::DARK_GRAY, 0.3, 2.0, 1.0),
            );
            let label = canvas::TextStyle::new(12.0, canvas::TEXT).centered();
            surface.text(105.0, 200.0, "Glucose \u{2014} mg/dL", &label);
        }

        let mut writer = std::io::BufWriter::new(Vec::new());
        doc.save(&mut writer).unwrap();
        let bytes = writer.into_inner().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
