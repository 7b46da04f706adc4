use crate::color::Color;
use crate::events::ElementFlags;
use crate::id::Id;
use crate::layout::LayoutConfig;
use crate::text::TextConfig;
use crate::transition::{AnimatedValue, PropertyTag, Transition, TransitionTable};
use crate::unit::UnitValue;

/// Per-corner radii. Decorative only: passed through to the renderer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CornerRadius {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_left: f64,
    pub bottom_right: f64,
}

impl CornerRadius {
    pub const fn all(radius: f64) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_left: radius,
            bottom_right: radius,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.top_left == 0.0 && self.top_right == 0.0 && self.bottom_left == 0.0 && self.bottom_right == 0.0
    }

    fn to_quad(self) -> [f64; 4] {
        [self.top_left, self.top_right, self.bottom_left, self.bottom_right]
    }

    fn from_quad([top_left, top_right, bottom_left, bottom_right]: [f64; 4]) -> Self {
        Self {
            top_left: top_left.max(0.0),
            top_right: top_right.max(0.0),
            bottom_left: bottom_left.max(0.0),
            bottom_right: bottom_right.max(0.0),
        }
    }
}

impl From<f64> for CornerRadius {
    /// Creates a corner radius with the same value for all corners.
    fn from(value: f64) -> Self {
        Self::all(value)
    }
}

impl From<(f64, f64, f64, f64)> for CornerRadius {
    /// Creates corner radii from a tuple in CSS order: (top-left, top-right, bottom-right, bottom-left).
    fn from((tl, tr, br, bl): (f64, f64, f64, f64)) -> Self {
        Self {
            top_left: tl,
            top_right: tr,
            bottom_left: bl,
            bottom_right: br,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BorderWidth {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl BorderWidth {
    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.right == 0.0 && self.top == 0.0 && self.bottom == 0.0
    }

    fn to_quad(self) -> [f64; 4] {
        [self.left, self.right, self.top, self.bottom]
    }

    fn from_quad([left, right, top, bottom]: [f64; 4]) -> Self {
        Self {
            left: left.max(0.0),
            right: right.max(0.0),
            top: top.max(0.0),
            bottom: bottom.max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BorderConfig {
    pub color: Color,
    pub width: BorderWidth,
}

/// Builder for configuring border properties using a closure.
pub struct BorderBuilder {
    pub(crate) config: BorderConfig,
}

impl BorderBuilder {
    /// Sets the border color.
    #[inline]
    pub fn color(&mut self, color: impl Into<Color>) -> &mut Self {
        self.config.color = color.into();
        self
    }

    /// Set the same border width for all sides.
    #[inline]
    pub fn all(&mut self, width: f64) -> &mut Self {
        self.config.width = BorderWidth {
            left: width,
            right: width,
            top: width,
            bottom: width,
        };
        self
    }

    #[inline]
    pub fn left(&mut self, width: f64) -> &mut Self {
        self.config.width.left = width;
        self
    }

    #[inline]
    pub fn right(&mut self, width: f64) -> &mut Self {
        self.config.width.right = width;
        self
    }

    #[inline]
    pub fn top(&mut self, width: f64) -> &mut Self {
        self.config.width.top = width;
        self
    }

    #[inline]
    pub fn bottom(&mut self, width: f64) -> &mut Self {
        self.config.width.bottom = width;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub content: String,
    pub config: TextConfig,
}

/// Everything one builder call declared for one frame, minus callbacks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementDeclaration {
    pub layout: LayoutConfig,
    pub background_color: Color,
    pub border: BorderConfig,
    pub corner_radius: CornerRadius,
    pub text: Option<TextElement>,
    pub transitions: Vec<(PropertyTag, Transition)>,
    pub flags: ElementFlags,
}

impl ElementDeclaration {
    /// Registers a transition, replacing any earlier one for the same property.
    pub(crate) fn set_transition(&mut self, property: PropertyTag, transition: Transition) {
        match self.transitions.iter_mut().find(|(tag, _)| *tag == property) {
            Some((_, existing)) => *existing = transition,
            None => self.transitions.push((property, transition)),
        }
    }

    /// Replaces every declared value that has a transition with its eased value.
    pub(crate) fn apply_transitions(&mut self, id: Id, table: &mut TransitionTable, dt: f64, frame: u64) {
        let transitions = core::mem::take(&mut self.transitions);
        for (property, transition) in &transitions {
            let mut ease = |value: AnimatedValue| table.animate(id, *property, value, transition, dt, frame);
            match property {
                PropertyTag::BackgroundColor => {
                    let eased = ease(self.background_color.into());
                    self.background_color = eased.as_color().unwrap_or(self.background_color);
                }
                PropertyTag::BorderColor => {
                    let eased = ease(self.border.color.into());
                    self.border.color = eased.as_color().unwrap_or(self.border.color);
                }
                PropertyTag::TextColor => {
                    if let Some(text) = self.text.as_mut() {
                        let eased = ease(text.config.color.into());
                        text.config.color = eased.as_color().unwrap_or(text.config.color);
                    }
                }
                PropertyTag::CornerRadius => {
                    if let Some(quad) = ease(self.corner_radius.to_quad().into()).as_quad() {
                        self.corner_radius = CornerRadius::from_quad(quad);
                    }
                }
                PropertyTag::BorderWidth => {
                    if let Some(quad) = ease(self.border.width.to_quad().into()).as_quad() {
                        self.border.width = BorderWidth::from_quad(quad);
                    }
                }
                PropertyTag::Width => ease_unit(&mut self.layout.width, &mut ease),
                PropertyTag::Height => ease_unit(&mut self.layout.height, &mut ease),
                PropertyTag::Left => ease_offset(&mut self.layout.offsets.left, &mut ease),
                PropertyTag::Right => ease_offset(&mut self.layout.offsets.right, &mut ease),
                PropertyTag::Top => ease_offset(&mut self.layout.offsets.top, &mut ease),
                PropertyTag::Bottom => ease_offset(&mut self.layout.offsets.bottom, &mut ease),
                PropertyTag::Custom(_) => {}
            }
        }
        self.transitions = transitions;
    }
}

fn ease_unit(value: &mut UnitValue, ease: &mut impl FnMut(AnimatedValue) -> AnimatedValue) {
    if let Some(eased) = ease(value.clone().into()).into_unit() {
        *value = eased;
    }
}

fn ease_offset(value: &mut Option<UnitValue>, ease: &mut impl FnMut(AnimatedValue) -> AnimatedValue) {
    if let Some(value) = value.as_mut() {
        ease_unit(value, ease);
    }
}
