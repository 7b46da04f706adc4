//! Lengths with mixed absolute and relative units.
//!
//! A [`UnitValue`] is declared every frame by builder calls. Most kinds resolve
//! to pixels on their own given a reference extent; [`UnitValue::Stretch`] and
//! [`UnitValue::Auto`] only mean something inside the layout solver.
//!
//! Interpolation is kept symbolic: [`UnitValue::lerp`] produces a
//! [`UnitValue::Lerp`] that remembers both ends and the blend factor. It is
//! resolved by resolving each end on its own and blending the pixel results,
//! so `Pixels -> Percentage` is as well defined as `Pixels -> Pixels`.

use crate::errors::{Error, Result};

/// Converts declared units into device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalingContext {
    /// How many pixels one [`UnitValue::Points`] unit covers.
    pub points_to_pixels: f64,
}

impl ScalingContext {
    pub const fn new(points_to_pixels: f64) -> Self {
        Self { points_to_pixels }
    }
}

impl Default for ScalingContext {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitValue {
    /// Sized by content, measured by the solver.
    #[default]
    Auto,
    Pixels(f64),
    /// Percentage of the reference extent, `50.0` meaning half.
    Percentage(f64),
    /// Share of the free space left in a flow parent, weighted.
    Stretch(f64),
    /// Scaled by [`ScalingContext::points_to_pixels`].
    Points(f64),
    /// A blend between two values that is still in progress.
    Lerp(Box<Interpolation>),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interpolation {
    pub from: UnitValue,
    pub to: UnitValue,
    pub t: f64,
}

impl UnitValue {
    /// Blends `from` toward `to`. The result is always an interpolating value,
    /// so it never compares equal to either end, even at `t == 0`.
    pub fn lerp(from: UnitValue, to: UnitValue, t: f64) -> UnitValue {
        UnitValue::Lerp(Box::new(Interpolation { from, to, t }))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            UnitValue::Auto => "Auto",
            UnitValue::Pixels(_) => "Pixels",
            UnitValue::Percentage(_) => "Percentage",
            UnitValue::Stretch(_) => "Stretch",
            UnitValue::Points(_) => "Points",
            UnitValue::Lerp(_) => "Lerp",
        }
    }

    pub fn is_interpolating(&self) -> bool {
        matches!(self, UnitValue::Lerp(_))
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, UnitValue::Auto)
    }

    /// Weight of a bare stretch value. Interpolations that merely contain a
    /// stretch end are not weighted; the solver sizes them like fixed values.
    pub fn stretch_weight(&self) -> Option<f64> {
        match self {
            UnitValue::Stretch(weight) => Some(*weight),
            _ => None,
        }
    }

    /// True if resolving this value needs the reference extent.
    pub fn depends_on_reference(&self) -> bool {
        match self {
            UnitValue::Percentage(p) => *p != 0.0,
            UnitValue::Stretch(_) => true,
            UnitValue::Lerp(lerp) => {
                (lerp.t != 1.0 && lerp.from.depends_on_reference())
                    || (lerp.t != 0.0 && lerp.to.depends_on_reference())
            }
            _ => false,
        }
    }

    /// True if resolving this value needs the node's intrinsic size.
    pub fn depends_on_content(&self) -> bool {
        match self {
            UnitValue::Auto => true,
            UnitValue::Lerp(lerp) => lerp.from.depends_on_content() || lerp.to.depends_on_content(),
            _ => false,
        }
    }

    /// Resolves to pixels against `reference_extent`.
    ///
    /// Fails with [`Error::InvalidUnitKind`] for `Auto` and `Stretch`, including
    /// interpolations that have either at one end.
    pub fn to_pixels(&self, reference_extent: f64, scaling: &ScalingContext) -> Result<f64> {
        match self {
            UnitValue::Pixels(v) => Ok(*v),
            UnitValue::Points(v) => Ok(v * scaling.points_to_pixels),
            UnitValue::Percentage(v) => Ok(v / 100.0 * reference_extent),
            UnitValue::Stretch(_) | UnitValue::Auto => Err(Error::InvalidUnitKind {
                kind: self.kind_name(),
            }),
            UnitValue::Lerp(lerp) => {
                let from = lerp.from.to_pixels(reference_extent, scaling)?;
                let to = lerp.to.to_pixels(reference_extent, scaling)?;
                Ok(blend(from, to, lerp.t))
            }
        }
    }

    /// Solver-side resolution. `Auto` takes the measured `intrinsic` size and a
    /// `Stretch` end of an interpolation fills the whole reference extent.
    pub(crate) fn resolve(&self, reference_extent: f64, scaling: &ScalingContext, intrinsic: f64) -> f64 {
        match self {
            UnitValue::Auto => intrinsic,
            UnitValue::Stretch(_) => reference_extent,
            UnitValue::Pixels(v) => *v,
            UnitValue::Points(v) => v * scaling.points_to_pixels,
            UnitValue::Percentage(v) => v / 100.0 * reference_extent,
            UnitValue::Lerp(lerp) => blend(
                lerp.from.resolve(reference_extent, scaling, intrinsic),
                lerp.to.resolve(reference_extent, scaling, intrinsic),
                lerp.t,
            ),
        }
    }
}

fn blend(from: f64, to: f64, t: f64) -> f64 {
    from * (1.0 - t) + to * t
}

impl UnitValue {
    /// Rewrites a tree of interpolations as a blend with at most one leaf per
    /// kind. The result resolves to the same pixels for any reference extent,
    /// scaling and intrinsic size.
    pub(crate) fn flattened(&self) -> UnitValue {
        let mut terms = Terms::default();
        terms.add(self, 1.0);
        terms.rebuild().unwrap_or_else(|| self.clone())
    }
}

/// Linear form of a unit value. Concrete kinds fold their weight into the
/// amount; `Stretch` and `Auto` keep theirs, since they stand for one extent.
#[derive(Debug, Default)]
struct Terms {
    pixels: f64,
    percentage: f64,
    points: f64,
    stretch: f64,
    auto: f64,
}

impl Terms {
    fn add(&mut self, value: &UnitValue, weight: f64) {
        match value {
            UnitValue::Auto => self.auto += weight,
            UnitValue::Stretch(_) => self.stretch += weight,
            UnitValue::Pixels(v) => self.pixels += weight * v,
            UnitValue::Percentage(v) => self.percentage += weight * v,
            UnitValue::Points(v) => self.points += weight * v,
            UnitValue::Lerp(lerp) => {
                self.add(&lerp.from, weight * (1.0 - lerp.t));
                self.add(&lerp.to, weight * lerp.t);
            }
        }
    }

    /// Weights of the leaves of any interpolation sum to one, so a `Pixels(0)`
    /// leaf soaks up whatever the other leaves leave over.
    fn rebuild(self) -> Option<UnitValue> {
        let kinds: [(f64, fn(f64) -> UnitValue); 3] = [
            (self.pixels, UnitValue::Pixels),
            (self.percentage, UnitValue::Percentage),
            (self.points, UnitValue::Points),
        ];
        let concrete: Vec<(f64, fn(f64) -> UnitValue)> =
            kinds.into_iter().filter(|(amount, _)| *amount != 0.0).collect();
        let count = concrete.len() as f64;

        let mut parts = Vec::with_capacity(4);
        let mut spare = 1.0 - self.stretch - self.auto;
        if !concrete.is_empty() {
            let leaves = concrete.into_iter().map(|(amount, kind)| kind(amount * count));
            parts.push((blend_evenly(leaves)?, 1.0));
            spare -= 1.0;
        }
        if spare != 0.0 {
            parts.push((UnitValue::Pixels(0.0), spare));
        }
        if self.stretch != 0.0 {
            parts.push((UnitValue::Stretch(1.0), self.stretch));
        }
        if self.auto != 0.0 {
            parts.push((UnitValue::Auto, self.auto));
        }

        let mut order = Vec::with_capacity(parts.len());
        if !running_order(&parts, &mut order, 0.0) {
            return None;
        }
        let mut order = order.into_iter();
        let (first, mut total) = parts.get(order.next()?)?.clone();
        let mut value = first;
        for index in order {
            let (leaf, weight) = &parts[index];
            total += weight;
            value = UnitValue::lerp(value, leaf.clone(), weight / total);
        }
        Some(value)
    }
}

/// Equal-weight blend of `leaves`.
fn blend_evenly(leaves: impl Iterator<Item = UnitValue>) -> Option<UnitValue> {
    leaves
        .enumerate()
        .fold(None, |value, (index, leaf)| match value {
            None => Some(leaf),
            Some(value) => Some(UnitValue::lerp(value, leaf, 1.0 / (index + 1) as f64)),
        })
}

/// Picks an order of `parts` in which no running weight before the last is
/// zero, so every blend factor is finite.
fn running_order(parts: &[(UnitValue, f64)], order: &mut Vec<usize>, sum: f64) -> bool {
    if order.len() == parts.len() {
        return true;
    }
    for index in 0..parts.len() {
        if order.contains(&index) {
            continue;
        }
        let next = sum + parts[index].1;
        if next == 0.0 {
            continue;
        }
        order.push(index);
        if running_order(parts, order, next) {
            return true;
        }
        order.pop();
    }
    false
}

impl From<f64> for UnitValue {
    fn from(pixels: f64) -> Self {
        UnitValue::Pixels(pixels)
    }
}

/// Shorthand for [`UnitValue::Pixels`].
#[macro_export]
macro_rules! px {
    ($val:expr) => {
        $crate::unit::UnitValue::Pixels($val as f64)
    };
}

/// Shorthand for [`UnitValue::Percentage`]. `pct!(50)` is half the reference.
#[macro_export]
macro_rules! pct {
    ($val:expr) => {
        $crate::unit::UnitValue::Percentage($val as f64)
    };
}

/// Shorthand for [`UnitValue::Points`].
#[macro_export]
macro_rules! pt {
    ($val:expr) => {
        $crate::unit::UnitValue::Points($val as f64)
    };
}

/// Shorthand for [`UnitValue::Stretch`]. Defaults to weight `1` if omitted.
#[macro_export]
macro_rules! stretch {
    ($weight:expr) => {
        $crate::unit::UnitValue::Stretch($weight as f64)
    };
    () => {
        $crate::stretch!(1.0)
    };
}
