/*
 *  canvas.rs
 *
 *  weatherboard - e-paper weather dashboard
 *
 *  Fixed-size drawing surface for one render pass: shape primitives on
 *  a tiny-skia pixmap, text via rusttype with cairo-style extents, and
 *  the font/icon asset stores.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use rusttype::{point, Font, Scale};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tiny_skia::{
    Color, FillRule, GradientStop, LinearGradient, Paint, Path as SkiaPath, PathBuilder, Pixmap,
    PixmapPaint, Point, Rect, SpreadMode, Stroke, StrokeDash, Transform,
};

use crate::error::{Error, Result};

/// Opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn to_skia(self) -> Color {
        Color::from_rgba8(self.0, self.1, self.2, 255)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    /// Position y is the text baseline.
    Top,
    Middle,
    Bottom,
}

/// The three font faces the dashboard uses, loaded once per process and
/// shared across renders.
pub struct FontStore {
    regular: Font<'static>,
    bold: Font<'static>,
    light: Font<'static>,
}

impl FontStore {
    /// Loads the Roboto faces from `<assets>/fonts`.
    pub fn load(assets_dir: &Path) -> Result<Self> {
        let dir = assets_dir.join("fonts");
        FontStore::from_files(
            &dir.join("Roboto-Regular.ttf"),
            &dir.join("Roboto-Bold.ttf"),
            &dir.join("Roboto-Light.ttf"),
        )
    }

    pub fn from_files(regular: &Path, bold: &Path, light: &Path) -> Result<Self> {
        Ok(FontStore {
            regular: load_font(regular)?,
            bold: load_font(bold)?,
            light: load_font(light)?,
        })
    }

    pub fn font(&self, weight: Weight) -> &Font<'static> {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
            Weight::Light => &self.light,
        }
    }
}

fn load_font(path: &Path) -> Result<Font<'static>> {
    let data = fs::read(path).map_err(|_| Error::Asset(path.display().to_string()))?;
    Font::try_from_vec(data).ok_or_else(|| Error::Asset(format!("unusable font {}", path.display())))
}

/// Named PNG icons, decoded on first use and memoized for the process
/// lifetime. A missing file is a hard error at draw time.
pub struct IconStore {
    dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<Pixmap>>>,
}

impl IconStore {
    pub fn new(assets_dir: &Path) -> Self {
        IconStore {
            dir: assets_dir.join("icons"),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<Pixmap>> {
        let mut cache = self.cache.lock().expect("icon cache poisoned");
        if let Some(icon) = cache.get(name) {
            return Ok(icon.clone());
        }
        let path = self.dir.join(format!("{name}.png"));
        let data = fs::read(&path).map_err(|_| Error::Asset(path.display().to_string()))?;
        let pixmap = Pixmap::decode_png(&data)
            .map_err(|e| Error::Asset(format!("{}: {e}", path.display())))?;
        let icon = Arc::new(pixmap);
        cache.insert(name.to_string(), icon.clone());
        Ok(icon)
    }
}

/// Cairo-style ink extents: bearing and size of the rendered string's
/// bounding box relative to the baseline origin.
#[derive(Debug, Clone, Copy, Default)]
struct InkExtents {
    x_bearing: f32,
    width: f32,
    height: f32,
}

/// One render's drawing surface, origin top-left, white background.
/// Owned exclusively by a single render call.
pub struct Canvas<'a> {
    pixmap: Pixmap,
    fonts: &'a FontStore,
}

impl<'a> Canvas<'a> {
    pub fn new(width: u32, height: u32, fonts: &'a FontStore) -> Result<Self> {
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| Error::Config(format!("invalid canvas size {width}x{height}")))?;
        pixmap.fill(Color::WHITE);
        Ok(Canvas { pixmap, fonts })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| Error::Config(format!("PNG encoding failed: {e}")))
    }

    fn solid_paint(color: Rgb) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.anti_alias = true;
        paint
    }

    fn fill(&mut self, path: &SkiaPath, color: Rgb) {
        self.pixmap.fill_path(
            path,
            &Self::solid_paint(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn stroke(&mut self, path: &SkiaPath, stroke: &Stroke, paint: &Paint) {
        self.pixmap
            .stroke_path(path, paint, stroke, Transform::identity(), None);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        if let Some(rect) = Rect::from_xywh(x, y, w, h) {
            self.pixmap.fill_rect(
                rect,
                &Self::solid_paint(color),
                Transform::identity(),
                None,
            );
        }
    }

    pub fn fill_roundrect(&mut self, x: f32, y: f32, w: f32, h: f32, r: f32, color: Rgb) {
        let mut pb = PathBuilder::new();
        pb.move_to(x + r, y);
        pb.line_to(x + w - r, y);
        pb.quad_to(x + w, y, x + w, y + r);
        pb.line_to(x + w, y + h - r);
        pb.quad_to(x + w, y + h, x + w - r, y + h);
        pb.line_to(x + r, y + h);
        pb.quad_to(x, y + h, x, y + h - r);
        pb.line_to(x, y + r);
        pb.quad_to(x, y, x + r, y);
        pb.close();
        if let Some(path) = pb.finish() {
            self.fill(&path, color);
        }
    }

    /// Filled circle; returns the diameter so callers can advance a
    /// running cursor past it.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgb) -> f32 {
        if let Some(path) = PathBuilder::from_circle(cx, cy, r) {
            self.fill(&path, color);
        }
        r * 2.0
    }

    pub fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb) {
        self.line_with_dash(from, to, width, color, None);
    }

    /// One-on, one-off pixel dashing, as used for the meteogram grid.
    pub fn dashed_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb) {
        self.line_with_dash(from, to, width, color, StrokeDash::new(vec![1.0, 1.0], 0.0));
    }

    fn line_with_dash(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Rgb,
        dash: Option<StrokeDash>,
    ) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width,
                dash,
                ..Stroke::default()
            };
            self.stroke(&path, &stroke, &Self::solid_paint(color));
        }
    }

    fn polyline_path(points: &[(f32, f32)]) -> Option<SkiaPath> {
        let mut pb = PathBuilder::new();
        for (i, &(x, y)) in points.iter().enumerate() {
            if i == 0 {
                pb.move_to(x, y);
            } else {
                pb.line_to(x, y);
            }
        }
        pb.finish()
    }

    pub fn stroke_polyline(&mut self, points: &[(f32, f32)], width: f32, color: Rgb) {
        if let Some(path) = Self::polyline_path(points) {
            let stroke = Stroke {
                width,
                ..Stroke::default()
            };
            self.stroke(&path, &stroke, &Self::solid_paint(color));
        }
    }

    /// Strokes a polyline with a one-pixel-tall vertical gradient placed
    /// at `gradient_y`: everything above it takes `top`, everything
    /// below takes `bottom` (pad spreading).
    pub fn stroke_polyline_gradient(
        &mut self,
        points: &[(f32, f32)],
        width: f32,
        gradient_y: f32,
        top: Rgb,
        bottom: Rgb,
    ) {
        let Some(path) = Self::polyline_path(points) else {
            return;
        };
        let Some(shader) = LinearGradient::new(
            Point::from_xy(0.0, gradient_y),
            Point::from_xy(0.0, gradient_y + 1.0),
            vec![
                GradientStop::new(0.0, top.to_skia()),
                GradientStop::new(1.0, bottom.to_skia()),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        ) else {
            return;
        };
        let mut paint = Paint::default();
        paint.shader = shader;
        paint.anti_alias = true;
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.stroke(&path, &stroke, &paint);
    }

    /// Smoothed, filled precipitation curve: cubic Beziers through the
    /// sample points, closed down to `bottom`.
    pub fn fill_precip_curve(
        &mut self,
        points: &[(f32, f32)],
        bottom: f32,
        color: Rgb,
        curviness: f32,
    ) {
        if points.len() < 2 {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(points[0].0, points[0].1);
        for pair in points.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            pb.cubic_to(
                prev.0 + curviness,
                prev.1,
                next.0 - curviness,
                next.1,
                next.0,
                next.1,
            );
        }
        pb.line_to(points[points.len() - 1].0, bottom);
        pb.line_to(points[0].0, bottom);
        pb.close();
        if let Some(path) = pb.finish() {
            self.fill(&path, color);
        }
    }

    /// Blits a named icon at its natural size times `scale`.
    pub fn draw_icon(
        &mut self,
        icons: &IconStore,
        name: &str,
        position: (f32, f32),
        scale: f32,
    ) -> Result<()> {
        let icon = icons.get(name)?;
        let transform = Transform::from_row(scale, 0.0, 0.0, scale, position.0, position.1);
        self.pixmap
            .draw_pixmap(0, 0, icon.as_ref().as_ref(), &PixmapPaint::default(), transform, None);
        Ok(())
    }

    fn ink_extents(font: &Font, text: &str, size: f32) -> InkExtents {
        let scale = Scale::uniform(size);
        let mut min_x = f32::MAX;
        let mut max_x = f32::MIN;
        let mut min_y = f32::MAX;
        let mut max_y = f32::MIN;
        let mut inked = false;
        for glyph in font.layout(text, scale, point(0.0, 0.0)) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                min_x = min_x.min(bb.min.x as f32);
                max_x = max_x.max(bb.max.x as f32);
                min_y = min_y.min(bb.min.y as f32);
                max_y = max_y.max(bb.max.y as f32);
                inked = true;
            }
        }
        if !inked {
            return InkExtents::default();
        }
        InkExtents {
            x_bearing: min_x,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// Measured ink width of `text` without drawing it.
    pub fn measure_text(&self, text: &str, size: f32, weight: Weight) -> i32 {
        Self::ink_extents(self.fonts.font(weight), text, size).width as i32
    }

    /// Draws `text` and returns its measured ink width so callers can
    /// continue a running cursor. For `VAlign::Top` the y coordinate is
    /// the baseline, matching the layout tables this crate uses.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text(
        &mut self,
        text: &str,
        position: (f32, f32),
        size: f32,
        weight: Weight,
        color: Rgb,
        halign: HAlign,
        valign: VAlign,
    ) -> i32 {
        let font = self.fonts.font(weight);
        let ext = Self::ink_extents(font, text, size);
        let x = match halign {
            HAlign::Left => position.0,
            HAlign::Right => position.0 - ext.width - ext.x_bearing,
            HAlign::Center => position.0 - ext.width / 2.0 - ext.x_bearing,
        };
        let baseline = match valign {
            VAlign::Top => position.1,
            VAlign::Middle => position.1 + ext.height / 2.0,
            VAlign::Bottom => position.1 + ext.height,
        };

        let scale = Scale::uniform(size);
        let glyphs: Vec<_> = font.layout(text, scale, point(x, baseline)).collect();
        let width = self.pixmap.width() as i32;
        let height = self.pixmap.height() as i32;
        let data = self.pixmap.data_mut();
        for glyph in &glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, coverage| {
                    let px = gx as i32 + bb.min.x;
                    let py = gy as i32 + bb.min.y;
                    if px < 0 || py < 0 || px >= width || py >= height {
                        return;
                    }
                    let idx = ((py * width + px) * 4) as usize;
                    let inv = 1.0 - coverage;
                    data[idx] = (color.0 as f32 * coverage + data[idx] as f32 * inv) as u8;
                    data[idx + 1] = (color.1 as f32 * coverage + data[idx + 1] as f32 * inv) as u8;
                    data[idx + 2] = (color.2 as f32 * coverage + data[idx + 2] as f32 * inv) as u8;
                    data[idx + 3] = 255;
                });
            }
        }
        ext.width as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every canvas carries a font store, so these tests locate a real
    // font via the shared helper and skip on machines without one.
    fn test_fonts() -> Option<FontStore> {
        crate::testutil::find_test_fonts()
    }

    #[test]
    fn canvas_starts_white() {
        let Some(fonts) = test_fonts() else { return };
        let canvas = Canvas::new(16, 16, &fonts).unwrap();
        let px = canvas.pixmap().pixel(8, 8).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (255, 255, 255));
    }

    #[test]
    fn fill_rect_paints_pixels() {
        let Some(fonts) = test_fonts() else { return };
        let mut canvas = Canvas::new(16, 16, &fonts).unwrap();
        canvas.fill_rect(4.0, 4.0, 8.0, 8.0, Rgb(255, 0, 0));
        let px = canvas.pixmap().pixel(8, 8).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (255, 0, 0));
        // Outside the rect stays white.
        let px = canvas.pixmap().pixel(1, 1).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (255, 255, 255));
    }

    #[test]
    fn circle_advance_is_diameter() {
        let Some(fonts) = test_fonts() else { return };
        let mut canvas = Canvas::new(32, 32, &fonts).unwrap();
        assert_eq!(canvas.fill_circle(16.0, 16.0, 6.0, Rgb(0, 0, 255)), 12.0);
    }

    #[test]
    fn measure_text_is_deterministic_and_monotonic() {
        let Some(fonts) = test_fonts() else { return };
        let canvas = Canvas::new(16, 16, &fonts).unwrap();
        let once = canvas.measure_text("Onsdag", 30.0, Weight::Regular);
        let twice = canvas.measure_text("Onsdag", 30.0, Weight::Regular);
        assert_eq!(once, twice);
        assert!(once > 0);
        assert!(canvas.measure_text("Onsdag Onsdag", 30.0, Weight::Regular) > once);
        assert_eq!(canvas.measure_text("", 30.0, Weight::Regular), 0);
    }

    #[test]
    fn draw_text_returns_measured_width() {
        let Some(fonts) = test_fonts() else { return };
        let mut canvas = Canvas::new(200, 60, &fonts).unwrap();
        let measured = canvas.measure_text("12:00", 20.0, Weight::Bold);
        let drawn = canvas.draw_text(
            "12:00",
            (10.0, 40.0),
            20.0,
            Weight::Bold,
            Rgb(0, 0, 0),
            HAlign::Left,
            VAlign::Top,
        );
        assert_eq!(measured, drawn);
    }

    #[test]
    fn missing_icon_is_asset_error() {
        let icons = IconStore::new(Path::new("/nonexistent"));
        assert!(matches!(
            icons.get("clear-day"),
            Err(crate::error::Error::Asset(_))
        ));
    }
}
