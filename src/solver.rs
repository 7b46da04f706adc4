//! The layout solver.
//!
//! Works on a flat arena of [`LayoutNode`]s that borrow the frame's
//! declarations. Solving runs in two passes:
//!
//! 1. **Measure** (bottom-up): text is measured up front. Content sizes of
//!    containers are computed on demand and memoised, only for axes the
//!    parent does not size from outside. This is where a relative child of a
//!    content-sized parent is reported as a cycle.
//! 2. **Place** (top-down): flow children are split into fixed and stretch
//!    sized, free space is shared by weight, and everything is positioned
//!    along the main axis and aligned across it. Self-directed children are
//!    placed against their parent's content box afterwards.
//!
//! Corner radii, border widths and colors never enter the box-model math.

use crate::align::CrossAlign;
use crate::elements::TextElement;
use crate::errors::{Error, Result};
use crate::layout::LayoutConfig;
use crate::math::{BoundingBox, Dimensions};
use crate::text::{measure_text, FontMetrics};
use crate::unit::{ScalingContext, UnitValue};

/// One element as the solver sees it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutNode<'a> {
    pub(crate) label: &'a str,
    pub(crate) layout: &'a LayoutConfig,
    pub(crate) text: Option<&'a TextElement>,
    /// Arena indices, in declaration order.
    pub(crate) children: &'a [usize],
}

/// A step of the paint walk. `Open` draws the node itself; everything between
/// an `Open` and its `Close` belongs to its subtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PaintStep {
    Open {
        index: usize,
        /// Intersection of every clipping ancestor.
        clip: Option<BoundingBox>,
    },
    Close {
        index: usize,
    },
}

fn axis_name(x_axis: bool) -> &'static str {
    if x_axis {
        "horizontal"
    } else {
        "vertical"
    }
}

fn start_of(rect: &BoundingBox, x_axis: bool) -> f64 {
    if x_axis {
        rect.x
    } else {
        rect.y
    }
}

pub(crate) struct Solver<'a> {
    nodes: &'a [LayoutNode<'a>],
    scaling: ScalingContext,
    metrics: Option<&'a dyn FontMetrics>,
    /// Memoized content sizes, `[width, height]`.
    intrinsic: Vec<[Option<f64>; 2]>,
    rects: Vec<BoundingBox>,
}

impl<'a> Solver<'a> {
    pub(crate) fn new(
        nodes: &'a [LayoutNode<'a>],
        scaling: ScalingContext,
        metrics: Option<&'a dyn FontMetrics>,
    ) -> Self {
        Self {
            nodes,
            scaling,
            metrics,
            intrinsic: vec![[None; 2]; nodes.len()],
            rects: vec![BoundingBox::default(); nodes.len()],
        }
    }

    /// Lays out the subtree under `root`, which is given `viewport` at the origin.
    pub(crate) fn solve(mut self, root: usize, viewport: Dimensions) -> Result<Vec<BoundingBox>> {
        self.measure()?;
        self.rects[root] = BoundingBox::new(0.0, 0.0, viewport.width.max(0.0), viewport.height.max(0.0));
        self.place(root)?;
        Ok(self.rects)
    }

    /// Surfaces missing text resources even where a stretched axis would
    /// never ask for the text's size.
    fn measure(&mut self) -> Result<()> {
        for index in (0..self.nodes.len()).rev() {
            if self.nodes[index].text.is_some() {
                self.text_size(index)?;
            }
        }
        Ok(())
    }

    fn text_size(&self, index: usize) -> Result<Dimensions> {
        let node = self.nodes[index];
        let Some(text) = node.text else {
            return Ok(Dimensions::default());
        };
        let metrics = self.metrics.ok_or_else(|| Error::MissingRequiredResource {
            label: node.label.to_owned(),
            resource: "a font metrics provider",
        })?;
        let font = text.config.font_id.ok_or_else(|| Error::MissingRequiredResource {
            label: node.label.to_owned(),
            resource: "a font id",
        })?;
        Ok(measure_text(metrics, &text.content, font, &text.config))
    }

    /// Content size plus padding along one axis.
    fn intrinsic(&mut self, index: usize, x_axis: bool) -> Result<f64> {
        let slot = usize::from(!x_axis);
        if let Some(size) = self.intrinsic[index][slot] {
            return Ok(size);
        }

        let node = self.nodes[index];
        let layout = node.layout;
        let content = if node.text.is_some() {
            self.text_size(index)?.along(x_axis)
        } else {
            let along_main = layout.direction.is_row() == x_axis;
            let mut total: f64 = 0.0;
            let mut count = 0usize;
            for &child in node.children {
                let child_layout = self.nodes[child].layout;
                if child_layout.is_absolute() {
                    continue;
                }
                let size = self.contribution(index, child, x_axis)? + child_layout.margin.along(x_axis);
                total = if along_main { total + size } else { total.max(size) };
                count += 1;
            }
            if along_main && count > 1 {
                total += layout.gap * (count - 1) as f64;
            }
            total
        };

        let size = (content + layout.padding.along(x_axis)).max(0.0);
        self.intrinsic[index][slot] = Some(size);
        Ok(size)
    }

    /// How much room `child` asks of a parent that is sized by its content.
    fn contribution(&mut self, parent: usize, child: usize, x_axis: bool) -> Result<f64> {
        let node = self.nodes[child];
        let size = node.layout.size(x_axis);
        let base = if size.stretch_weight().is_some() {
            0.0
        } else if size.depends_on_reference() {
            return Err(Error::LayoutCycleDetected {
                label: self.nodes[parent].label.to_owned(),
                child: node.label.to_owned(),
                axis: axis_name(x_axis),
            });
        } else {
            let intrinsic = self.intrinsic_if_needed(child, x_axis, size)?;
            size.resolve(0.0, &self.scaling, intrinsic)
        };
        self.constrain(child, x_axis, base, None)
    }

    fn intrinsic_if_needed(&mut self, index: usize, x_axis: bool, unit: &UnitValue) -> Result<f64> {
        if unit.depends_on_content() {
            self.intrinsic(index, x_axis)
        } else {
            Ok(0.0)
        }
    }

    /// Applies max then min, so min wins, then clamps to zero. Bounds that need
    /// a reference are skipped when there is none.
    fn constrain(&mut self, index: usize, x_axis: bool, value: f64, reference: Option<f64>) -> Result<f64> {
        let layout = self.nodes[index].layout;
        let mut value = value;
        if let Some(max) = self.bound(index, x_axis, layout.max(x_axis), reference)? {
            value = value.min(max);
        }
        if let Some(min) = self.bound(index, x_axis, layout.min(x_axis), reference)? {
            value = value.max(min);
        }
        Ok(value.max(0.0))
    }

    fn bound(
        &mut self,
        index: usize,
        x_axis: bool,
        unit: Option<&UnitValue>,
        reference: Option<f64>,
    ) -> Result<Option<f64>> {
        let Some(unit) = unit else {
            return Ok(None);
        };
        if unit.depends_on_reference() && reference.is_none() {
            return Ok(None);
        }
        let intrinsic = self.intrinsic_if_needed(index, x_axis, unit)?;
        Ok(Some(unit.resolve(reference.unwrap_or(0.0), &self.scaling, intrinsic)))
    }

    fn resolved(&mut self, index: usize, x_axis: bool, reference: f64) -> Result<f64> {
        let size = self.nodes[index].layout.size(x_axis);
        let intrinsic = self.intrinsic_if_needed(index, x_axis, size)?;
        let value = size.resolve(reference, &self.scaling, intrinsic);
        self.constrain(index, x_axis, value, Some(reference))
    }

    fn place(&mut self, index: usize) -> Result<()> {
        let node = self.nodes[index];
        let layout = node.layout;
        let rect = self.rects[index];
        let content = BoundingBox::new(
            rect.x + layout.padding.left,
            rect.y + layout.padding.top,
            (rect.width - layout.padding.along(true)).max(0.0),
            (rect.height - layout.padding.along(false)).max(0.0),
        );

        let (absolute, flow): (Vec<usize>, Vec<usize>) = node
            .children
            .iter()
            .partition(|&&child| self.nodes[child].layout.is_absolute());

        self.place_flow(layout, &content, &flow)?;
        for &child in &absolute {
            self.place_absolute(child, &content)?;
        }
        for &child in node.children {
            self.place(child)?;
        }
        Ok(())
    }

    fn place_flow(&mut self, parent: &LayoutConfig, content: &BoundingBox, flow: &[usize]) -> Result<()> {
        if flow.is_empty() {
            return Ok(());
        }
        let main_x = parent.direction.is_row();
        let main_extent = content.dimensions().along(main_x);
        let cross_extent = content.dimensions().along(!main_x);
        let gaps = parent.gap * (flow.len() - 1) as f64;

        let mut sizes = vec![0.0; flow.len()];
        let mut weights: Vec<Option<f64>> = vec![None; flow.len()];
        let mut claimed = gaps;
        for (slot, &child) in flow.iter().enumerate() {
            let layout = self.nodes[child].layout;
            claimed += layout.margin.along(main_x);
            match layout.size(main_x).stretch_weight() {
                Some(weight) => weights[slot] = Some(weight.max(0.0)),
                None => {
                    sizes[slot] = self.resolved(child, main_x, main_extent)?;
                    claimed += sizes[slot];
                }
            }
        }

        let free = (main_extent - claimed).max(0.0);
        let total_weight: f64 = weights.iter().flatten().sum();
        for (slot, &child) in flow.iter().enumerate() {
            if let Some(weight) = weights[slot] {
                let share = if total_weight > 0.0 {
                    free * weight / total_weight
                } else {
                    0.0
                };
                sizes[slot] = self.constrain(child, main_x, share, Some(main_extent))?;
            }
        }

        let used: f64 = gaps
            + flow
                .iter()
                .zip(&sizes)
                .map(|(&child, size)| size + self.nodes[child].layout.margin.along(main_x))
                .sum::<f64>();
        let mut cursor = start_of(content, main_x) + parent.main_align.offset(main_extent - used);

        for (slot, &child) in flow.iter().enumerate() {
            let layout = self.nodes[child].layout;
            let main_pos = cursor + layout.margin.start(main_x);
            cursor = main_pos + sizes[slot] + layout.margin.along(main_x) - layout.margin.start(main_x) + parent.gap;

            let available = (cross_extent - layout.margin.along(!main_x)).max(0.0);
            let cross = layout.size(!main_x);
            let cross_size = if (cross.is_auto() && parent.cross_align == CrossAlign::Stretch)
                || cross.stretch_weight().is_some()
            {
                self.constrain(child, !main_x, available, Some(cross_extent))?
            } else {
                self.resolved(child, !main_x, cross_extent)?
            };
            let cross_pos = start_of(content, !main_x)
                + layout.margin.start(!main_x)
                + parent.cross_align.offset(available, cross_size);

            self.rects[child] = if main_x {
                BoundingBox::new(main_pos, cross_pos, sizes[slot], cross_size)
            } else {
                BoundingBox::new(cross_pos, main_pos, cross_size, sizes[slot])
            };
        }
        Ok(())
    }

    fn place_absolute(&mut self, child: usize, content: &BoundingBox) -> Result<()> {
        let layout = self.nodes[child].layout;
        let mut placed = [(0.0, 0.0); 2];
        for (slot, x_axis) in [true, false].into_iter().enumerate() {
            let extent = content.dimensions().along(x_axis);
            let (start, end) = if x_axis {
                (&layout.offsets.left, &layout.offsets.right)
            } else {
                (&layout.offsets.top, &layout.offsets.bottom)
            };
            let offset = |unit: &Option<UnitValue>| {
                unit.as_ref()
                    .map(|unit| unit.resolve(extent, &self.scaling, 0.0))
            };
            let (start, end) = (offset(start), offset(end));

            let declared = layout.size(x_axis);
            let size = match (start, end) {
                (Some(s), Some(e)) if declared.is_auto() => self.constrain(child, x_axis, extent - s - e, Some(extent))?,
                _ if declared.stretch_weight().is_some() => self.constrain(child, x_axis, extent, Some(extent))?,
                _ => self.resolved(child, x_axis, extent)?,
            };
            let position = match (start, end) {
                (Some(s), _) => start_of(content, x_axis) + s,
                (None, Some(e)) => start_of(content, x_axis) + extent - e - size,
                (None, None) => start_of(content, x_axis),
            };
            placed[slot] = (position, size);
        }
        self.rects[child] = BoundingBox::new(placed[0].0, placed[1].0, placed[0].1, placed[1].1);
        Ok(())
    }
}

/// Paint walk: parents before children, siblings in declaration order
/// stable-sorted by z-index. Later steps are on top.
pub(crate) fn paint_order(nodes: &[LayoutNode<'_>], rects: &[BoundingBox], root: usize) -> Vec<PaintStep> {
    let mut steps = Vec::with_capacity(nodes.len() * 2);
    walk(nodes, rects, root, None, &mut steps);
    steps
}

fn walk(
    nodes: &[LayoutNode<'_>],
    rects: &[BoundingBox],
    index: usize,
    clip: Option<BoundingBox>,
    steps: &mut Vec<PaintStep>,
) {
    steps.push(PaintStep::Open { index, clip });
    let node = nodes[index];
    let child_clip = if node.layout.clip {
        let rect = rects[index];
        Some(clip.map_or(rect, |outer| outer.intersect(&rect)))
    } else {
        clip
    };
    let mut children = node.children.to_vec();
    children.sort_by_key(|&child| {
        let layout = nodes[child].layout;
        if layout.is_absolute() {
            layout.z_index
        } else {
            0
        }
    });
    for child in children {
        walk(nodes, rects, child, child_clip, steps);
    }
    steps.push(PaintStep::Close { index });
}
