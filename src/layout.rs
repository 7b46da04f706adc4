use crate::align::{CrossAlign, MainAlign};
use crate::unit::UnitValue;

/// Defines the layout direction for arranging flow children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FlowDirection {
    /// Arranges elements from left to right.
    #[default]
    Row,
    /// Arranges elements from top to bottom.
    Column,
}

impl FlowDirection {
    pub(crate) fn is_row(self) -> bool {
        self == FlowDirection::Row
    }
}

/// Pixel insets for each side of an element, used for padding and margin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edges {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Edges {
    /// Creates a new `Edges` with individual values for each side.
    pub const fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Sets the same value for all sides.
    pub const fn all(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Sets left and right. Top and bottom are `0`.
    pub const fn horizontal(value: f64) -> Self {
        Self::new(value, value, 0.0, 0.0)
    }

    /// Sets top and bottom. Left and right are `0`.
    pub const fn vertical(value: f64) -> Self {
        Self::new(0.0, 0.0, value, value)
    }

    /// Sum of both sides along an axis.
    pub(crate) fn along(&self, x_axis: bool) -> f64 {
        if x_axis {
            self.left + self.right
        } else {
            self.top + self.bottom
        }
    }

    /// The leading side (left or top) along an axis.
    pub(crate) fn start(&self, x_axis: bool) -> f64 {
        if x_axis {
            self.left
        } else {
            self.top
        }
    }
}

impl From<f64> for Edges {
    fn from(value: f64) -> Self {
        Self::all(value)
    }
}

impl From<(f64, f64, f64, f64)> for Edges {
    /// Creates edges from a tuple in CSS order: (top, right, bottom, left).
    fn from((top, right, bottom, left): (f64, f64, f64, f64)) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

/// Whether an element takes part in its parent's flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Position {
    #[default]
    Flow,
    /// Self-directed: placed by its offsets relative to the parent's content
    /// box and ignored by sibling flow accounting.
    Absolute,
}

/// Offsets of a self-directed element from the edges of its parent's content box.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offsets {
    pub left: Option<UnitValue>,
    pub right: Option<UnitValue>,
    pub top: Option<UnitValue>,
    pub bottom: Option<UnitValue>,
}

/// Everything the solver reads from one element's declaration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutConfig {
    pub width: UnitValue,
    pub height: UnitValue,
    pub min_width: Option<UnitValue>,
    pub min_height: Option<UnitValue>,
    pub max_width: Option<UnitValue>,
    pub max_height: Option<UnitValue>,
    pub padding: Edges,
    pub margin: Edges,
    pub gap: f64,
    pub direction: FlowDirection,
    pub main_align: MainAlign,
    pub cross_align: CrossAlign,
    pub position: Position,
    pub offsets: Offsets,
    /// Paint order among siblings. Only meaningful for self-directed elements.
    pub z_index: i16,
    /// Children are clipped to this element's box, for drawing and hit-testing.
    pub clip: bool,
}

impl LayoutConfig {
    pub(crate) fn size(&self, x_axis: bool) -> &UnitValue {
        if x_axis {
            &self.width
        } else {
            &self.height
        }
    }

    pub(crate) fn min(&self, x_axis: bool) -> Option<&UnitValue> {
        if x_axis {
            self.min_width.as_ref()
        } else {
            self.min_height.as_ref()
        }
    }

    pub(crate) fn max(&self, x_axis: bool) -> Option<&UnitValue> {
        if x_axis {
            self.max_width.as_ref()
        } else {
            self.max_height.as_ref()
        }
    }

    pub(crate) fn is_absolute(&self) -> bool {
        self.position == Position::Absolute
    }
}

/// Builder for configuring layout properties using a closure.
pub struct LayoutBuilder {
    pub(crate) config: LayoutConfig,
}

impl LayoutBuilder {
    /// Sets the spacing between flow children.
    #[inline]
    pub fn gap(&mut self, gap: f64) -> &mut Self {
        self.config.gap = gap.max(0.0);
        self
    }

    /// Sets where leftover main-axis space goes and how children sit across it.
    #[inline]
    pub fn align(&mut self, main: MainAlign, cross: CrossAlign) -> &mut Self {
        self.config.main_align = main;
        self.config.cross_align = cross;
        self
    }

    /// Sets the flow direction.
    #[inline]
    pub fn direction(&mut self, direction: FlowDirection) -> &mut Self {
        self.config.direction = direction;
        self
    }

    /// Sets padding values for the layout.
    #[inline]
    pub fn padding(&mut self, padding: impl Into<Edges>) -> &mut Self {
        self.config.padding = padding.into();
        self
    }

    /// Sets the space kept around this element inside its parent's flow.
    #[inline]
    pub fn margin(&mut self, margin: impl Into<Edges>) -> &mut Self {
        self.config.margin = margin.into();
        self
    }

    #[inline]
    pub fn min_width(&mut self, value: impl Into<UnitValue>) -> &mut Self {
        self.config.min_width = Some(value.into());
        self
    }

    #[inline]
    pub fn min_height(&mut self, value: impl Into<UnitValue>) -> &mut Self {
        self.config.min_height = Some(value.into());
        self
    }

    #[inline]
    pub fn max_width(&mut self, value: impl Into<UnitValue>) -> &mut Self {
        self.config.max_width = Some(value.into());
        self
    }

    #[inline]
    pub fn max_height(&mut self, value: impl Into<UnitValue>) -> &mut Self {
        self.config.max_height = Some(value.into());
        self
    }

    /// Clips children to this element's bounds.
    #[inline]
    pub fn clip(&mut self) -> &mut Self {
        self.config.clip = true;
        self
    }
}

/// Builder for self-directed placement, using a closure.
pub struct AbsoluteBuilder {
    pub(crate) config: LayoutConfig,
}

impl AbsoluteBuilder {
    #[inline]
    pub fn left(&mut self, value: impl Into<UnitValue>) -> &mut Self {
        self.config.offsets.left = Some(value.into());
        self
    }

    #[inline]
    pub fn right(&mut self, value: impl Into<UnitValue>) -> &mut Self {
        self.config.offsets.right = Some(value.into());
        self
    }

    #[inline]
    pub fn top(&mut self, value: impl Into<UnitValue>) -> &mut Self {
        self.config.offsets.top = Some(value.into());
        self
    }

    #[inline]
    pub fn bottom(&mut self, value: impl Into<UnitValue>) -> &mut Self {
        self.config.offsets.bottom = Some(value.into());
        self
    }

    /// Sets the paint order among siblings. Higher values are drawn later and hit first.
    #[inline]
    pub fn z_index(&mut self, z_index: i16) -> &mut Self {
        self.config.z_index = z_index;
        self
    }
}
