//! Single-page SVG document backend.

use std::fmt::Write;

use crate::scene::{Color, Point, Rect, Stroke};

use super::{DocumentPage, EmbeddedImage, PageOrientation};

/// Accumulates primitives into an SVG document of a fixed page size.
pub struct SvgPage {
    width: u32,
    height: u32,
    orientation: PageOrientation,
    body: String,
}

fn fmt_num(v: f32) -> String {
    // Trim float noise so the document stays readable and diffable.
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

fn fill_attrs(color: Color) -> String {
    if color.a < 1.0 {
        format!(
            r#"fill="{}" fill-opacity="{}""#,
            color.to_hex_string(),
            fmt_num(color.a)
        )
    } else {
        format!(r#"fill="{}""#, color.to_hex_string())
    }
}

impl SvgPage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            orientation: PageOrientation::for_size(width, height),
            body: String::new(),
        }
    }

    pub fn orientation(&self) -> PageOrientation {
        self.orientation
    }
}

impl DocumentPage for SvgPage {
    fn line(&mut self, from: Point, to: Point, stroke: &Stroke) {
        let _ = writeln!(
            self.body,
            r#"  <line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" stroke-linecap="butt"/>"#,
            fmt_num(from.x),
            fmt_num(from.y),
            fmt_num(to.x),
            fmt_num(to.y),
            stroke.color.to_hex_string(),
            fmt_num(stroke.width)
        );
    }

    fn filled_rect(&mut self, rect: Rect, fill: Color) {
        let _ = writeln!(
            self.body,
            r#"  <rect x="{}" y="{}" width="{}" height="{}" {}/>"#,
            fmt_num(rect.x),
            fmt_num(rect.y),
            fmt_num(rect.width),
            fmt_num(rect.height),
            fill_attrs(fill)
        );
    }

    fn filled_polygon(&mut self, points: &[Point], fill: Color) {
        let points = points
            .iter()
            .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            self.body,
            r#"  <polygon points="{points}" {}/>"#,
            fill_attrs(fill)
        );
    }

    fn filled_circle(&mut self, center: Point, radius: f32, fill: Color) {
        let _ = writeln!(
            self.body,
            r#"  <circle cx="{}" cy="{}" r="{}" {}/>"#,
            fmt_num(center.x),
            fmt_num(center.y),
            fmt_num(radius),
            fill_attrs(fill)
        );
    }

    fn image(&mut self, image: &EmbeddedImage, dest: Rect, rotation_degrees: f32) {
        let transform = if rotation_degrees != 0.0 {
            let center = dest.center();
            format!(
                r#" transform="rotate({} {} {})""#,
                fmt_num(rotation_degrees),
                fmt_num(center.x),
                fmt_num(center.y)
            )
        } else {
            String::new()
        };
        let _ = writeln!(
            self.body,
            r#"  <image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="none" href="data:{};base64,{}"{transform}/>"#,
            fmt_num(dest.x),
            fmt_num(dest.y),
            fmt_num(dest.width),
            fmt_num(dest.height),
            image.mime_type,
            image.base64
        );
    }

    fn finish(self) -> Vec<u8> {
        let mut out = String::with_capacity(self.body.len() + 256);
        let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" data-orientation="{o}">"#,
            w = self.width,
            h = self.height,
            o = self.orientation.as_str()
        );
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out.into_bytes()
    }
}
