#![allow(dead_code)]

use ply_core::prelude::*;

/// Every glyph advances half the font size; lines are one font size tall.
pub struct FixedMetrics;

impl FontMetrics for FixedMetrics {
    fn glyph_advances(&self, text: &str, _font: FontId, font_size: f64) -> Vec<f64> {
        text.chars().map(|_| font_size * 0.5).collect()
    }

    fn line_metrics(&self, _font: FontId, font_size: f64) -> LineMetrics {
        LineMetrics {
            ascent: font_size * 0.75,
            descent: font_size * 0.25,
            line_gap: 0.0,
        }
    }
}

pub fn engine(width: f64, height: f64) -> Ply {
    Ply::new(EngineConfig::new(Dimensions::new(width, height)))
}

/// Builds, lays out and commits one frame.
pub fn run<'h>(
    ply: &mut Ply,
    input: InputState,
    dt: f64,
    build: impl FnOnce(&mut Ui<'_, 'h>) -> Result<()>,
) -> Result<FrameOutput> {
    let mut ui = ply.begin_frame(input, dt);
    build(&mut ui)?;
    ui.end_frame()
}

pub fn idle() -> InputState {
    InputState::new()
}

pub fn hover(x: f64, y: f64) -> InputState {
    let mut input = InputState::new();
    input.pointer(x, y);
    input
}

pub fn press(x: f64, y: f64) -> InputState {
    let mut input = hover(x, y);
    input.button_down(MouseButton::Left);
    input
}

pub fn events_for(output: &FrameOutput, id: Id) -> Vec<Event> {
    output
        .events
        .iter()
        .filter(|fired| fired.id == id)
        .map(|fired| fired.event.clone())
        .collect()
}

/// Installs a test subscriber so `RUST_LOG=ply_core=trace` shows engine logs.
pub fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
