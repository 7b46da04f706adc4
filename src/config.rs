use crate::layout::FlowDirection;
use crate::math::Dimensions;
use crate::unit::ScalingContext;

const DEFAULT_MAX_ELEMENT_COUNT: usize = 8192;
const DEFAULT_DRAG_THRESHOLD: f64 = 3.0;
const DEFAULT_STALE_FRAME_LIMIT: u64 = 120;

/// Engine-wide settings. Changes take effect at the next `begin_frame`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Size of the implicit root container.
    pub viewport: Dimensions,
    pub scaling: ScalingContext,
    /// Pointer travel, in pixels, before a press turns into a drag.
    pub drag_threshold: f64,
    /// Frames an identity may go undeclared before its node, animations and
    /// focus are evicted. `None` keeps them until [`crate::Ply::forget`].
    pub stale_frame_limit: Option<u64>,
    pub root_direction: FlowDirection,
    pub max_element_count: usize,
    /// Pressing where no interactable element is drops focus.
    pub blur_on_empty_press: bool,
}

impl EngineConfig {
    pub fn new(viewport: Dimensions) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    #[inline]
    pub fn viewport(&mut self, viewport: Dimensions) -> &mut Self {
        self.viewport = viewport;
        self
    }

    #[inline]
    pub fn points_to_pixels(&mut self, factor: f64) -> &mut Self {
        self.scaling.points_to_pixels = factor;
        self
    }

    #[inline]
    pub fn drag_threshold(&mut self, pixels: f64) -> &mut Self {
        self.drag_threshold = pixels.max(0.0);
        self
    }

    #[inline]
    pub fn stale_frame_limit(&mut self, frames: Option<u64>) -> &mut Self {
        self.stale_frame_limit = frames;
        self
    }

    #[inline]
    pub fn root_direction(&mut self, direction: FlowDirection) -> &mut Self {
        self.root_direction = direction;
        self
    }

    #[inline]
    pub fn max_element_count(&mut self, count: usize) -> &mut Self {
        self.max_element_count = count;
        self
    }

    #[inline]
    pub fn blur_on_empty_press(&mut self, enabled: bool) -> &mut Self {
        self.blur_on_empty_press = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Dimensions::new(800.0, 600.0),
            scaling: ScalingContext::default(),
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            stale_frame_limit: Some(DEFAULT_STALE_FRAME_LIMIT),
            root_direction: FlowDirection::Row,
            max_element_count: DEFAULT_MAX_ELEMENT_COUNT,
            blur_on_empty_press: true,
        }
    }
}
