//! The Ply prelude: a single import for everyday builder code.
//!
//! ```rust
//! use ply_core::prelude::*;
//! ```

// Core types
pub use crate::{ElementBuilder, FrameOutput, IdScope, Ply, Ui};
pub use crate::config::EngineConfig;
pub use crate::errors::{Error, Result};
pub use crate::id::{Id, Key};
pub use crate::math::{BoundingBox, Dimensions, Vector2};
pub use crate::color::Color;

// Units and their macros
pub use crate::unit::{ScalingContext, UnitValue};
pub use crate::{pct, pt, px, stretch};

// Alignment, type only
pub use crate::align::{CrossAlign, MainAlign};

// FlowDirection, globbed
pub use crate::layout::FlowDirection::{self, *};
pub use crate::layout::Edges;

pub use crate::elements::{BorderWidth, CornerRadius};
pub use crate::text::{FontId, FontMetrics, LineMetrics};

// Animation
pub use crate::easing::Easing;
pub use crate::transition::{AnimatedValue, PropertyTag, Transition};

// Input and events
pub use crate::events::{DragEvent, ElementFlags, Event, FiredEvent, InteractionState};
pub use crate::input::{InputState, Key as KeyboardKey, MouseButton};
pub use crate::clipboard::{Clipboard, MemoryClipboard};

// macroquad collaborators, feature-gated
#[cfg(feature = "macroquad")]
pub use crate::renderer::{poll_input, MacroquadClipboard, MacroquadFonts, MacroquadRenderer};
