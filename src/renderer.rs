//! Macroquad collaborators: drawing render commands, font metrics, input
//! polling and the system clipboard.

use macroquad::color::Color;
use macroquad::prelude::warn;
use macroquad::input::{
    get_char_pressed, is_key_down, is_mouse_button_down, mouse_position, mouse_wheel, KeyCode,
    MouseButton as MqMouseButton,
};
use macroquad::shapes::{draw_arc, draw_line, draw_poly, draw_rectangle, draw_rectangle_lines};
use macroquad::text::{draw_text_ex, measure_text, Font, TextParams};
use macroquad::window::get_internal_gl;

use crate::clipboard::Clipboard;
use crate::elements::{BorderWidth, CornerRadius};
use crate::input::{InputState, Key, MouseButton};
use crate::math::BoundingBox;
use crate::render_commands::{Border, Rectangle, RenderCommand, RenderCommandConfig, Text};
use crate::text::{FontId, FontMetrics, LineMetrics};

const PIXELS_PER_POINT: f32 = 2.0;

fn ply_to_macroquad_color(ply_color: &crate::color::Color) -> Color {
    Color {
        r: ply_color.r / 255.0,
        g: ply_color.g / 255.0,
        b: ply_color.b / 255.0,
        a: ply_color.a / 255.0,
    }
}

fn draw_good_circle(x: f32, y: f32, r: f32, color: Color) {
    let sides = ((2.0 * std::f32::consts::PI * r) / PIXELS_PER_POINT).max(20.0);
    draw_poly(x, y, sides.min(255.0) as u8, r, 0.0, color);
}

fn arc_points(radius: f32, width: f32) -> u8 {
    ((std::f32::consts::PI * (radius + width)) / 2.0 / PIXELS_PER_POINT).clamp(5.0, 255.0) as u8
}

type Scissor = (i32, i32, i32, i32);

fn to_scissor(bb: &BoundingBox) -> Scissor {
    (bb.x as i32, bb.y as i32, bb.width as i32, bb.height as i32)
}

fn set_scissor(clip: Option<Scissor>) {
    unsafe {
        get_internal_gl().quad_gl.scissor(clip);
    }
}

/// The fonts a frame's text refers to, indexed by [`FontId`]. A missing id
/// falls back to macroquad's built-in font.
#[derive(Clone, Default)]
pub struct MacroquadFonts {
    fonts: Vec<Font>,
}

impl MacroquadFonts {
    pub fn new(fonts: Vec<Font>) -> Self {
        Self { fonts }
    }

    /// Adds a font and returns the id text configs should use for it.
    pub fn push(&mut self, font: Font) -> FontId {
        self.fonts.push(font);
        FontId((self.fonts.len() - 1) as u16)
    }

    fn get(&self, id: FontId) -> Option<&Font> {
        self.fonts.get(id.0 as usize)
    }
}

impl FontMetrics for MacroquadFonts {
    fn glyph_advances(&self, text: &str, font: FontId, font_size: f64) -> Vec<f64> {
        let font = self.get(font);
        let mut buffer = [0u8; 4];
        text.chars()
            .map(|ch| measure_text(ch.encode_utf8(&mut buffer), font, font_size as u16, 1.0).width as f64)
            .collect()
    }

    fn line_metrics(&self, font: FontId, font_size: f64) -> LineMetrics {
        let measured = measure_text("Ag", self.get(font), font_size as u16, 1.0);
        let ascent = measured.offset_y as f64;
        LineMetrics {
            ascent,
            descent: (measured.height as f64 - ascent).max(0.0),
            line_gap: 0.0,
        }
    }
}

/// Draws render commands with macroquad's immediate-mode shapes and text.
#[derive(Clone, Default)]
pub struct MacroquadRenderer {
    fonts: MacroquadFonts,
}

impl MacroquadRenderer {
    pub fn new(fonts: MacroquadFonts) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &MacroquadFonts {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut MacroquadFonts {
        &mut self.fonts
    }

    /// Draws one frame's render commands in order.
    pub fn render(&self, commands: &[RenderCommand]) {
        let mut clips: Vec<Scissor> = Vec::new();
        for command in commands {
            let bb = &command.bounding_box;
            match &command.config {
                RenderCommandConfig::Rectangle(config) => draw_rect(bb, config),
                RenderCommandConfig::Border(config) => draw_border(bb, config),
                RenderCommandConfig::Text(config) => draw_text(bb, config, &self.fonts),
                RenderCommandConfig::ScissorStart() => {
                    // Already intersected with the enclosing scissor.
                    clips.push(to_scissor(bb));
                    set_scissor(clips.last().copied());
                }
                RenderCommandConfig::ScissorEnd() => {
                    if clips.pop().is_none() {
                        warn!("Unbalanced scissor end from element {:?}", command.id);
                    }
                    set_scissor(clips.last().copied());
                }
            }
        }
        if !clips.is_empty() {
            set_scissor(None);
        }
    }
}

fn draw_rect(bb: &BoundingBox, config: &Rectangle) {
    let color = ply_to_macroquad_color(&config.color);
    let (x, y, w, h) = (bb.x as f32, bb.y as f32, bb.width as f32, bb.height as f32);
    let cr = clamp_radii(&config.corner_radii, w, h);

    if cr.iter().all(|r| *r == 0.0) {
        draw_rectangle(x, y, w, h, color);
        return;
    }
    let [tl, tr, bl, br] = cr;
    // Edges
    draw_rectangle(x + tl, y, w - tl - tr, h - bl.max(br), color);
    draw_rectangle(x, y + tl, w - tr.max(br), h - tl - bl, color);
    draw_rectangle(x + bl, y + tl.max(tr), w - bl - br, h - tl.max(tr), color);
    draw_rectangle(x + tl.max(bl), y + tr, w - tl.max(bl), h - tr - br, color);
    // Corners
    if tl > 0.0 {
        draw_good_circle(x + tl, y + tl, tl, color);
    }
    if tr > 0.0 {
        draw_good_circle(x + w - tr, y + tr, tr, color);
    }
    if bl > 0.0 {
        draw_good_circle(x + bl, y + h - bl, bl, color);
    }
    if br > 0.0 {
        draw_good_circle(x + w - br, y + h - br, br, color);
    }
}

/// Radii in `[top_left, top_right, bottom_left, bottom_right]` order, limited to half the box.
fn clamp_radii(cr: &CornerRadius, width: f32, height: f32) -> [f32; 4] {
    let limit = (width.min(height) / 2.0).max(0.0);
    [cr.top_left, cr.top_right, cr.bottom_left, cr.bottom_right].map(|r| (r as f32).clamp(0.0, limit))
}

fn draw_border(bb: &BoundingBox, config: &Border) {
    let color = ply_to_macroquad_color(&config.color);
    let (x, y, w, h) = (bb.x as f32, bb.y as f32, bb.width as f32, bb.height as f32);
    let BorderWidth {
        left,
        right,
        top,
        bottom,
    } = config.width;
    let (left, right, top, bottom) = (left as f32, right as f32, top as f32, bottom as f32);
    let [tl, tr, bl, br] = clamp_radii(&config.corner_radii, w, h);

    let uniform = left == right && right == top && top == bottom;
    if uniform && [tl, tr, bl, br].iter().all(|r| *r == 0.0) {
        draw_rectangle_lines(x - left, y - left, w + left * 2.0, h + left * 2.0, left * 2.0, color);
        return;
    }

    // Edges sit outside the box.
    if top > 0.0 {
        draw_line(x + tl, y - top / 2.0, x + w - tr, y - top / 2.0, top, color);
    }
    if left > 0.0 {
        draw_line(x - left / 2.0, y + tl, x - left / 2.0, y + h - bl, left, color);
    }
    if bottom > 0.0 {
        draw_line(x + bl, y + h + bottom / 2.0, x + w - br, y + h + bottom / 2.0, bottom, color);
    }
    if right > 0.0 {
        draw_line(x + w + right / 2.0, y + tr, x + w + right / 2.0, y + h - br, right, color);
    }

    // Corners
    if tl > 0.0 {
        draw_arc(x + tl, y + tl, arc_points(tl, left.max(top)), tl, 180.0, left, 90.0, color);
    }
    if tr > 0.0 {
        draw_arc(x + w - tr, y + tr, arc_points(tr, top.max(right)), tr, 270.0, top, 90.0, color);
    }
    if bl > 0.0 {
        draw_arc(x + bl, y + h - bl, arc_points(bl, left.max(bottom)), bl, 90.0, bottom, 90.0, color);
    }
    if br > 0.0 {
        draw_arc(x + w - br, y + h - br, arc_points(br, bottom.max(right)), br, 0.0, right, 90.0, color);
    }
}

fn draw_text(bb: &BoundingBox, config: &Text, fonts: &MacroquadFonts) {
    let font = fonts.get(config.font_id);
    if font.is_none() {
        warn!("Unknown font id {}, drawing with the default font", config.font_id.0);
    }
    let metrics = fonts.line_metrics(config.font_id, config.font_size);
    let line_height = if config.line_height > 0.0 {
        config.line_height
    } else {
        metrics.height()
    };
    let params = TextParams {
        font,
        font_size: config.font_size as u16,
        color: ply_to_macroquad_color(&config.color),
        ..Default::default()
    };

    for (row, line) in config.text.split('\n').enumerate() {
        let baseline = bb.y + row as f64 * line_height + metrics.ascent;
        if config.letter_spacing == 0.0 {
            draw_text_ex(line, bb.x as f32, baseline as f32, params.clone());
            continue;
        }
        let mut x = bb.x;
        let mut buffer = [0u8; 4];
        for (ch, advance) in line.chars().zip(fonts.glyph_advances(line, config.font_id, config.font_size)) {
            draw_text_ex(ch.encode_utf8(&mut buffer), x as f32, baseline as f32, params.clone());
            x += advance + config.letter_spacing;
        }
    }
}

const KEYS: [(KeyCode, Key); 18] = [
    (KeyCode::Tab, Key::Tab),
    (KeyCode::Enter, Key::Enter),
    (KeyCode::Escape, Key::Escape),
    (KeyCode::Space, Key::Space),
    (KeyCode::Backspace, Key::Backspace),
    (KeyCode::Delete, Key::Delete),
    (KeyCode::Left, Key::Left),
    (KeyCode::Right, Key::Right),
    (KeyCode::Up, Key::Up),
    (KeyCode::Down, Key::Down),
    (KeyCode::Home, Key::Home),
    (KeyCode::End, Key::End),
    (KeyCode::PageUp, Key::PageUp),
    (KeyCode::PageDown, Key::PageDown),
    (KeyCode::LeftShift, Key::Shift),
    (KeyCode::LeftControl, Key::Control),
    (KeyCode::LeftAlt, Key::Alt),
    (KeyCode::LeftSuper, Key::Super),
];

const MODIFIER_TWINS: [(KeyCode, Key); 4] = [
    (KeyCode::RightShift, Key::Shift),
    (KeyCode::RightControl, Key::Control),
    (KeyCode::RightAlt, Key::Alt),
    (KeyCode::RightSuper, Key::Super),
];

/// Samples macroquad's input for this frame.
pub fn poll_input() -> InputState {
    let mut input = InputState::new();
    let (x, y) = mouse_position();
    input.pointer(x as f64, y as f64);

    for (button, ours) in [
        (MqMouseButton::Left, MouseButton::Left),
        (MqMouseButton::Right, MouseButton::Right),
        (MqMouseButton::Middle, MouseButton::Middle),
    ] {
        if is_mouse_button_down(button) {
            input.button_down(ours);
        }
    }

    let (dx, dy) = mouse_wheel();
    input.wheel(dx as f64, dy as f64);

    for (code, key) in KEYS.iter().chain(MODIFIER_TWINS.iter()) {
        if is_key_down(*code) {
            input.key_down(*key);
        }
    }

    while let Some(ch) = get_char_pressed() {
        if !ch.is_control() {
            input.text.push(ch);
        }
    }
    input
}

/// The system clipboard, through miniquad.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroquadClipboard;

impl Clipboard for MacroquadClipboard {
    fn get_text(&mut self) -> Option<String> {
        macroquad::miniquad::window::clipboard_get()
    }

    fn set_text(&mut self, text: &str) {
        macroquad::miniquad::window::clipboard_set(text);
    }
}
