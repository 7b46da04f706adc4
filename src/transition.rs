//! Property transitions keyed by element identity.
//!
//! Each `(Id, PropertyTag)` pair owns a [`TransitionState`] that eases the
//! displayed value toward the latest declared target. When the target changes
//! while an animation is still running, elapsed time is kept and the baseline
//! is re-solved from the last sampled output, so the displayed value continues
//! from exactly where it was.

use rustc_hash::FxHashMap;

use crate::color::Color;
use crate::easing::Easing;
use crate::id::{hash_key, Id, Key};
use crate::unit::UnitValue;

/// Which style property of an element is being animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyTag {
    BackgroundColor,
    BorderColor,
    TextColor,
    CornerRadius,
    BorderWidth,
    Width,
    Height,
    Left,
    Right,
    Top,
    Bottom,
    /// Caller-owned values animated through `Ui::animate`.
    Custom(u64),
}

impl PropertyTag {
    pub fn custom(name: &str) -> Self {
        PropertyTag::Custom(hash_key(0, &Key::new(name)).raw())
    }
}

/// A value the engine knows how to blend.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimatedValue {
    Scalar(f64),
    Color(Color),
    Unit(UnitValue),
    /// Four independent scalars, such as per-corner radii or per-side widths.
    Quad([f64; 4]),
}

impl AnimatedValue {
    /// Blends toward `other`. Values of different kinds do not blend.
    pub fn lerp(&self, other: &AnimatedValue, t: f64) -> Option<AnimatedValue> {
        match (self, other) {
            (AnimatedValue::Scalar(a), AnimatedValue::Scalar(b)) => Some(AnimatedValue::Scalar(a + (b - a) * t)),
            (AnimatedValue::Color(a), AnimatedValue::Color(b)) => Some(AnimatedValue::Color(a.lerp(*b, t))),
            (AnimatedValue::Unit(a), AnimatedValue::Unit(b)) => {
                Some(AnimatedValue::Unit(UnitValue::lerp(a.clone(), b.clone(), t)))
            }
            (AnimatedValue::Quad(a), AnimatedValue::Quad(b)) => {
                Some(AnimatedValue::Quad(core::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)))
            }
            _ => None,
        }
    }

    fn same_kind(&self, other: &AnimatedValue) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            AnimatedValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            AnimatedValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn into_unit(self) -> Option<UnitValue> {
        match self {
            AnimatedValue::Unit(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_quad(&self) -> Option<[f64; 4]> {
        match self {
            AnimatedValue::Quad(q) => Some(*q),
            _ => None,
        }
    }
}

impl From<f64> for AnimatedValue {
    fn from(value: f64) -> Self {
        AnimatedValue::Scalar(value)
    }
}

impl From<Color> for AnimatedValue {
    fn from(value: Color) -> Self {
        AnimatedValue::Color(value)
    }
}

impl From<[f64; 4]> for AnimatedValue {
    fn from(value: [f64; 4]) -> Self {
        AnimatedValue::Quad(value)
    }
}

impl From<UnitValue> for AnimatedValue {
    fn from(value: UnitValue) -> Self {
        AnimatedValue::Unit(value)
    }
}

/// How a property moves toward a new declared value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transition {
    /// Seconds.
    pub duration: f64,
    pub easing: Easing,
    /// Displayed value on the first frame an identity is seen. Without it the
    /// property starts settled at its declared value.
    pub from: Option<AnimatedValue>,
}

impl Transition {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            easing: Easing::Linear,
            from: None,
        }
    }

    #[inline]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[inline]
    pub fn from(mut self, value: impl Into<AnimatedValue>) -> Self {
        self.from = Some(value.into());
        self
    }
}

/// Past this eased fraction a retarget restarts from the current output
/// instead of solving a baseline, which would blow up as `1 / (1 - e)`.
const RESTART_FRACTION: f64 = 0.9999;

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionState {
    pub target: AnimatedValue,
    /// Value the current segment blends from. After a mid-flight retarget this
    /// is solved so the blend passes through the last output.
    pub baseline: AnimatedValue,
    /// Last sampled, displayed value.
    pub output: AnimatedValue,
    /// Seconds, always within `0..=duration`.
    pub elapsed: f64,
    pub duration: f64,
    pub easing: Easing,
    pub(crate) last_frame: u64,
}

impl TransitionState {
    fn settled(value: AnimatedValue, transition: &Transition, frame: u64) -> Self {
        Self {
            target: value.clone(),
            baseline: value.clone(),
            output: value,
            elapsed: transition.duration,
            duration: transition.duration,
            easing: transition.easing,
            last_frame: frame,
        }
    }

    fn entering(from: AnimatedValue, target: AnimatedValue, transition: &Transition, frame: u64) -> Self {
        Self {
            target,
            baseline: from.clone(),
            output: from,
            elapsed: 0.0,
            duration: transition.duration,
            easing: transition.easing,
            last_frame: frame,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn eased_fraction(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.easing.apply(self.elapsed / self.duration)
        }
    }

    fn retarget(&mut self, target: AnimatedValue, transition: &Transition) {
        self.duration = transition.duration;
        self.easing = transition.easing;
        self.elapsed = self.elapsed.min(self.duration);

        let fraction = self.eased_fraction();
        let continued = if self.is_finished() || fraction > RESTART_FRACTION {
            None
        } else {
            // baseline * (1 - e) + target * e == output
            self.output
                .lerp(&target, -fraction / (1.0 - fraction))
                .map(|baseline| match baseline {
                    AnimatedValue::Unit(unit) => AnimatedValue::Unit(unit.flattened()),
                    other => other,
                })
        };
        match continued {
            Some(baseline) => self.baseline = baseline,
            None => {
                self.baseline = self.output.clone();
                self.elapsed = 0.0;
            }
        }
        self.target = target;
    }

    fn tick(&mut self, dt: f64) {
        self.elapsed = (self.elapsed + dt.max(0.0)).clamp(0.0, self.duration);
        self.output = if self.is_finished() {
            self.target.clone()
        } else {
            self.baseline
                .lerp(&self.target, self.eased_fraction())
                .unwrap_or_else(|| self.target.clone())
        };
    }
}

/// Every live transition, keyed by element identity and property.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    states: FxHashMap<(Id, PropertyTag), TransitionState>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `target` for `(id, property)`, advances by `dt` seconds and
    /// returns the value to display this frame. Time advances once per
    /// `frame`; later calls in the same frame only retarget.
    pub fn animate(
        &mut self,
        id: Id,
        property: PropertyTag,
        target: AnimatedValue,
        transition: &Transition,
        dt: f64,
        frame: u64,
    ) -> AnimatedValue {
        let mut advance = true;
        let state = self
            .states
            .entry((id, property))
            .and_modify(|state| {
                advance = state.last_frame != frame;
                if !state.target.same_kind(&target) {
                    *state = TransitionState::settled(target.clone(), transition, frame);
                } else if state.target != target {
                    tracing::trace!(?id, ?property, "transition retargeted");
                    state.retarget(target.clone(), transition);
                } else if state.duration != transition.duration || state.easing != transition.easing {
                    state.duration = transition.duration;
                    state.easing = transition.easing;
                    state.elapsed = state.elapsed.min(state.duration);
                }
            })
            .or_insert_with(|| match &transition.from {
                Some(from) if from.same_kind(&target) && *from != target => {
                    TransitionState::entering(from.clone(), target.clone(), transition, frame)
                }
                _ => TransitionState::settled(target.clone(), transition, frame),
            });
        state.last_frame = frame;
        state.tick(if advance { dt } else { 0.0 });
        state.output.clone()
    }

    pub fn get(&self, id: Id, property: PropertyTag) -> Option<&TransitionState> {
        self.states.get(&(id, property))
    }

    /// True while any property of `id` has not reached its target.
    pub fn is_animating(&self, id: Id) -> bool {
        self.states
            .iter()
            .any(|((owner, _), state)| *owner == id && !state.is_finished())
    }

    pub fn clear(&mut self, id: Id) {
        self.states.retain(|(owner, _), _| *owner != id);
    }

    /// Drops transitions not declared within the last `limit` frames.
    pub(crate) fn evict_stale(&mut self, frame: u64, limit: u64) -> usize {
        let before = self.states.len();
        self.states
            .retain(|_, state| frame.saturating_sub(state.last_frame) <= limit);
        before - self.states.len()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
