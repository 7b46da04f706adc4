pub mod align;
pub mod clipboard;
pub mod color;
pub mod config;
pub mod easing;
pub mod elements;
pub mod errors;
pub mod events;
pub mod id;
pub mod input;
pub mod layout;
pub mod math;
pub mod prelude;
pub mod render_commands;
#[cfg(feature = "macroquad")]
pub mod renderer;
pub mod text;
pub mod transition;
pub mod unit;

mod solver;

use core::panic::Location;

use rustc_hash::{FxHashMap, FxHashSet};

pub use color::Color;
pub use config::EngineConfig;
pub use errors::{Error, Result};
pub use id::{Id, Key};
pub use math::{BoundingBox, Dimensions, Vector2};

use align::CrossAlign;
use clipboard::{Clipboard, MemoryClipboard};
use elements::{BorderBuilder, CornerRadius, ElementDeclaration, TextElement};
use events::{
    DispatchOptions, Dispatcher, DragEvent, ElementFlags, FiredEvent, FocusRequest, Handlers,
    HitTarget, InteractionState,
};
use id::{hash_key, IdStack, ROOT_LABEL};
use input::{FrameInput, InputState, InputTracker};
use layout::{AbsoluteBuilder, LayoutBuilder, LayoutConfig, Position};
use render_commands::RenderCommand;
use solver::{LayoutNode, PaintStep, Solver};
use text::{FontMetrics, TextConfig};
use transition::{AnimatedValue, PropertyTag, Transition, TransitionState, TransitionTable};
use unit::UnitValue;

const ROOT: usize = 0;
const TEXT_LABEL: &str = "Ply__Text";

/// What the last committed frame knew about one element.
#[derive(Debug, Clone)]
struct Node {
    label: String,
    parent: Option<Id>,
    children: Vec<Id>,
    rect: BoundingBox,
    flags: ElementFlags,
    interaction: InteractionState,
}

/// The engine context. Owns everything that outlives a frame: the committed
/// node table, animation state, focus and the input levels edges are derived
/// from.
pub struct Ply {
    config: EngineConfig,
    font_metrics: Option<Box<dyn FontMetrics>>,
    clipboard: Box<dyn Clipboard>,
    nodes: FxHashMap<Id, Node>,
    transitions: TransitionTable,
    dispatcher: Dispatcher,
    input: InputTracker,
    /// Frame each identity was last declared in.
    last_seen: FxHashMap<Id, u64>,
    pointer_over: Vec<Id>,
    clicked: FxHashSet<Id>,
    frame: u64,
}

impl Default for Ply {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Ply {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            font_metrics: None,
            clipboard: Box::new(MemoryClipboard::new()),
            nodes: FxHashMap::default(),
            transitions: TransitionTable::new(),
            dispatcher: Dispatcher::default(),
            input: InputTracker::default(),
            last_seen: FxHashMap::default(),
            pointer_over: Vec::new(),
            clicked: FxHashSet::default(),
            frame: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    pub fn set_viewport(&mut self, viewport: Dimensions) {
        self.config.viewport = viewport;
    }

    /// Text elements can only be sized once a metrics provider is set.
    pub fn set_font_metrics(&mut self, metrics: impl FontMetrics + 'static) {
        self.font_metrics = Some(Box::new(metrics));
    }

    pub fn set_clipboard(&mut self, clipboard: impl Clipboard + 'static) {
        self.clipboard = Box::new(clipboard);
    }

    pub fn clipboard(&mut self) -> &mut dyn Clipboard {
        &mut *self.clipboard
    }

    /// Number of frames committed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Identity of a top-level element declared with [`Ui::keyed`].
    pub fn id<'k>(&self, key: impl Into<Key<'k>>) -> Id {
        hash_key(Id::root().0, &key.into())
    }

    /// Starts building a frame. Nothing is committed until [`Ui::end_frame`]
    /// succeeds; dropping the returned scope discards the frame.
    pub fn begin_frame<'h>(&mut self, input: InputState, delta_time: f64) -> Ui<'_, 'h> {
        let number = self.frame;
        let frame_input = self.input.resolve(&input);
        let root = Declared {
            id: Id::root(),
            label: ROOT_LABEL.to_owned(),
            parent: None,
            children: Vec::new(),
            declaration: root_declaration(&self.config),
            handlers: Handlers::default(),
        };
        let mut seen = FxHashMap::default();
        seen.insert(
            root.id,
            KeyRecord {
                scope: Id(0),
                label: ROOT_LABEL.to_owned(),
                index: None,
                line: None,
            },
        );
        tracing::trace!(frame = number, "frame begun");

        Ui {
            frame: Frame {
                ids: IdStack::new(Id::root()),
                elements: vec![root],
                open: vec![ROOT],
                seen,
                error: None,
                staged: None,
                focus_request: None,
                input,
                frame_input,
                delta_time: if delta_time.is_finite() { delta_time.max(0.0) } else { 0.0 },
                number,
                ended: false,
            },
            ply: self,
        }
    }

    /// The element's rectangle as of the last committed frame.
    pub fn bounding_box(&self, id: Id) -> Option<BoundingBox> {
        self.nodes.get(&id).map(|node| node.rect)
    }

    pub fn interaction(&self, id: Id) -> InteractionState {
        self.nodes
            .get(&id)
            .map(|node| node.interaction)
            .unwrap_or_default()
    }

    pub fn is_hovered(&self, id: Id) -> bool {
        self.interaction(id).contains(InteractionState::HOVERED)
    }

    pub fn is_active(&self, id: Id) -> bool {
        self.interaction(id).contains(InteractionState::ACTIVE)
    }

    /// True if the last committed frame fired a click on `id`.
    pub fn is_clicked(&self, id: Id) -> bool {
        self.clicked.contains(&id)
    }

    pub fn focused(&self) -> Option<Id> {
        self.dispatcher.focused()
    }

    pub fn is_focused(&self, id: Id) -> bool {
        self.focused() == Some(id)
    }

    pub fn pointer_over(&self, id: Id) -> bool {
        self.pointer_over.contains(&id)
    }

    /// Interactable elements under the pointer, bottom-most first.
    pub fn pointer_over_ids(&self) -> &[Id] {
        &self.pointer_over
    }

    pub fn parent(&self, id: Id) -> Option<Id> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: Id) -> Option<&[Id]> {
        self.nodes.get(&id).map(|node| node.children.as_slice())
    }

    pub fn label(&self, id: Id) -> Option<&str> {
        self.nodes.get(&id).map(|node| node.label.as_str())
    }

    pub fn flags(&self, id: Id) -> Option<ElementFlags> {
        self.nodes.get(&id).map(|node| node.flags)
    }

    /// Elements in the last committed frame, root included.
    pub fn element_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn transition(&self, id: Id, property: PropertyTag) -> Option<&TransitionState> {
        self.transitions.get(id, property)
    }

    pub fn is_animating(&self, id: Id) -> bool {
        self.transitions.is_animating(id)
    }

    /// Moves focus to `id` on the next committed frame, provided it is then
    /// declared focusable.
    pub fn set_focus(&mut self, id: Id) {
        self.dispatcher.request_focus(FocusRequest::Focus(id));
    }

    pub fn clear_focus(&mut self) {
        self.dispatcher.request_focus(FocusRequest::Clear);
    }

    /// Drops everything kept for `id`: its node, animations, focus and press.
    pub fn forget(&mut self, id: Id) {
        self.nodes.remove(&id);
        self.transitions.clear(id);
        self.dispatcher.forget(id);
        self.last_seen.remove(&id);
        self.clicked.remove(&id);
        self.pointer_over.retain(|over| *over != id);
    }

    pub fn clear_transitions(&mut self, id: Id) {
        self.transitions.clear(id);
    }

    fn evict_stale(&mut self, number: u64) {
        let Some(limit) = self.config.stale_frame_limit else {
            return;
        };
        let transitions = self.transitions.evict_stale(number, limit);
        let mut evicted = Vec::new();
        self.last_seen.retain(|id, seen| {
            let keep = number.saturating_sub(*seen) <= limit;
            if !keep {
                evicted.push(*id);
            }
            keep
        });
        for id in &evicted {
            self.dispatcher.forget(*id);
        }
        if transitions > 0 || !evicted.is_empty() {
            tracing::debug!(
                frame = number,
                identities = evicted.len(),
                transitions,
                "evicted stale state"
            );
        }
    }
}

fn root_declaration(config: &EngineConfig) -> ElementDeclaration {
    ElementDeclaration {
        layout: LayoutConfig {
            width: UnitValue::Pixels(config.viewport.width),
            height: UnitValue::Pixels(config.viewport.height),
            direction: config.root_direction,
            cross_align: CrossAlign::Start,
            ..Default::default()
        },
        flags: ElementFlags::empty(),
        ..Default::default()
    }
}

/// What a successful frame hands back.
#[derive(Debug, Clone, Default)]
pub struct FrameOutput {
    /// Draw primitives in paint order.
    pub render_commands: Vec<RenderCommand>,
    /// Every event fired this frame, in dispatch order. Handlers registered
    /// through the builder have already run.
    pub events: Vec<FiredEvent>,
}

/// How an identity was produced, kept to tell duplicates from collisions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct KeyRecord {
    scope: Id,
    label: String,
    index: Option<u32>,
    line: Option<u32>,
}

struct Declared<'h> {
    id: Id,
    label: String,
    parent: Option<usize>,
    children: Vec<usize>,
    declaration: ElementDeclaration,
    handlers: Handlers<'h>,
}

struct Frame<'h> {
    ids: IdStack,
    /// Arena in declaration order; index 0 is the root.
    elements: Vec<Declared<'h>>,
    open: Vec<usize>,
    seen: FxHashMap<Id, KeyRecord>,
    /// First builder error; the frame cannot commit once set.
    error: Option<Error>,
    /// Copy of the transition table, taken on first use.
    staged: Option<TransitionTable>,
    /// Focus change asked for while building; applied only if the frame commits.
    focus_request: Option<FocusRequest>,
    input: InputState,
    frame_input: FrameInput,
    delta_time: f64,
    number: u64,
    ended: bool,
}

/// One frame being built. Derefs to [`Ply`] for queries against the last
/// committed frame.
pub struct Ui<'p, 'h> {
    ply: &'p mut Ply,
    frame: Frame<'h>,
}

impl core::ops::Deref for Ui<'_, '_> {
    type Target = Ply;

    fn deref(&self) -> &Self::Target {
        self.ply
    }
}

impl Drop for Ui<'_, '_> {
    fn drop(&mut self) {
        if !self.frame.ended {
            tracing::debug!(
                frame = self.frame.number,
                "frame dropped without end_frame, nothing committed"
            );
        }
    }
}

impl<'p, 'h> Ui<'p, 'h> {
    /// Starts declaring an element keyed by `label` and the caller's line.
    #[track_caller]
    pub fn element(&mut self, label: &str) -> ElementBuilder<'_, 'p, 'h> {
        let line = Location::caller().line();
        ElementBuilder::new(self, label.to_owned(), None, Some(line))
    }

    /// Starts declaring an element keyed only by `key`, so its identity can be
    /// recomputed elsewhere.
    pub fn keyed<'k>(&mut self, key: impl Into<Key<'k>>) -> ElementBuilder<'_, 'p, 'h> {
        let key = key.into();
        ElementBuilder::new(self, key.label.to_owned(), key.index, key.line)
    }

    /// Declares a text leaf in the open element. It takes no input.
    #[track_caller]
    pub fn text(
        &mut self,
        content: impl Into<String>,
        config: impl FnOnce(&mut TextConfig) -> &mut TextConfig,
    ) -> Result<Id> {
        let line = Location::caller().line();
        let sibling = self.open_index();
        let index = self.frame.elements[sibling].children.len() as u32;
        ElementBuilder::new(self, TEXT_LABEL.to_owned(), Some(index), Some(line))
            .text(content, config)
            .disabled()
            .empty()
    }

    /// Pushes an extra identity scope until the returned guard drops.
    pub fn push_id<'k>(&mut self, key: impl Into<Key<'k>>) -> IdScope<'_, 'p, 'h> {
        let id = self.frame.ids.resolve(&key.into());
        self.frame.ids.push(id);
        IdScope { ui: self }
    }

    pub fn with_id<'k, R>(&mut self, key: impl Into<Key<'k>>, f: impl FnOnce(&mut Ui<'p, 'h>) -> R) -> R {
        let mut scope = self.push_id(key);
        f(&mut *scope)
    }

    /// Identity new elements are currently hashed under.
    pub fn current_id(&self) -> Id {
        self.frame.ids.current()
    }

    pub fn input(&self) -> &InputState {
        &self.frame.input
    }

    pub fn delta_time(&self) -> f64 {
        self.frame.delta_time
    }

    /// Moves focus to `id` when this frame commits, provided it is declared
    /// focusable. Overrides a request queued on [`Ply`] before the frame.
    pub fn set_focus(&mut self, id: Id) {
        self.frame.focus_request = Some(FocusRequest::Focus(id));
    }

    pub fn clear_focus(&mut self) {
        self.frame.focus_request = Some(FocusRequest::Clear);
    }

    /// Eases a caller-owned scalar, keyed by `name` under the current scope.
    pub fn animate(&mut self, name: &str, value: f64, transition: &Transition) -> f64 {
        self.animate_value(PropertyTag::custom(name), value, transition)
            .as_scalar()
            .unwrap_or(value)
    }

    /// Eases any animatable value under the current scope.
    pub fn animate_value(
        &mut self,
        property: PropertyTag,
        value: impl Into<AnimatedValue>,
        transition: &Transition,
    ) -> AnimatedValue {
        let owner = self.frame.ids.current();
        let (dt, number) = (self.frame.delta_time, self.frame.number);
        let ply = &*self.ply;
        let table = self
            .frame
            .staged
            .get_or_insert_with(|| ply.transitions.clone());
        table.animate(owner, property, value.into(), transition, dt, number)
    }

    /// Runs animation, layout, dispatch and render generation, then commits.
    /// On error nothing is committed and no handler runs.
    pub fn end_frame(mut self) -> Result<FrameOutput> {
        self.frame.ended = true;
        let number = self.frame.number;
        if let Some(error) = self.frame.error.take() {
            tracing::warn!(frame = number, %error, "frame aborted, nothing committed");
            return Err(error);
        }
        let ply = &mut *self.ply;
        let frame = &mut self.frame;

        let mut transitions = frame
            .staged
            .take()
            .unwrap_or_else(|| ply.transitions.clone());
        for element in frame.elements.iter_mut().skip(1) {
            element
                .declaration
                .apply_transitions(element.id, &mut transitions, frame.delta_time, number);
        }
        let focus_request = frame.focus_request.take();

        let elements = &frame.elements;
        let nodes: Vec<LayoutNode<'_>> = elements
            .iter()
            .map(|element| LayoutNode {
                label: &element.label,
                layout: &element.declaration.layout,
                text: element.declaration.text.as_ref(),
                children: &element.children,
            })
            .collect();
        let solved = Solver::new(&nodes, ply.config.scaling, ply.font_metrics.as_deref())
            .solve(ROOT, ply.config.viewport);
        let rects = match solved {
            Ok(rects) => rects,
            Err(error) => {
                tracing::warn!(frame = number, %error, "layout failed, nothing committed");
                return Err(error);
            }
        };
        let steps = solver::paint_order(&nodes, &rects, ROOT);

        let targets: Vec<HitTarget> = steps
            .iter()
            .filter_map(|step| match *step {
                PaintStep::Open { index, clip } if index != ROOT => {
                    let element = &elements[index];
                    Some(HitTarget {
                        id: element.id,
                        parent: element.parent.map(|parent| elements[parent].id),
                        rect: rects[index],
                        clip,
                        flags: element.declaration.flags,
                        wants_scroll: element.handlers.wants_scroll(),
                    })
                }
                _ => None,
            })
            .collect();
        let options = DispatchOptions {
            drag_threshold: ply.config.drag_threshold,
            blur_on_empty_press: ply.config.blur_on_empty_press,
        };
        let (dispatcher, dispatch) = match focus_request {
            Some(request) => {
                let mut requested = ply.dispatcher.clone();
                requested.request_focus(request);
                requested.dispatch(&targets, &frame.frame_input, options)
            }
            None => ply.dispatcher.dispatch(&targets, &frame.frame_input, options),
        };
        let render_commands = render_commands::generate(&steps, &rects, |index| {
            (elements[index].id, &elements[index].declaration)
        });
        drop(nodes);

        let index_of: FxHashMap<Id, usize> = frame
            .elements
            .iter()
            .enumerate()
            .map(|(index, element)| (element.id, index))
            .collect();
        for fired in &dispatch.events {
            if let Some(&index) = index_of.get(&fired.id) {
                frame.elements[index].handlers.dispatch(&fired.event);
            }
        }

        // Commit.
        let elements = &frame.elements;
        ply.nodes = elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                let node = Node {
                    label: element.label.clone(),
                    parent: element.parent.map(|parent| elements[parent].id),
                    children: element.children.iter().map(|&child| elements[child].id).collect(),
                    rect: rects[index],
                    flags: element.declaration.flags,
                    interaction: dispatch
                        .interactions
                        .get(&element.id)
                        .copied()
                        .unwrap_or_default(),
                };
                (element.id, node)
            })
            .collect();
        for element in elements {
            ply.last_seen.insert(element.id, number);
        }
        ply.transitions = transitions;
        ply.dispatcher = dispatcher;
        ply.input.commit(&frame.input, &frame.frame_input);
        ply.pointer_over = dispatch.pointer_over;
        ply.clicked = dispatch
            .events
            .iter()
            .filter(|fired| matches!(fired.event, events::Event::Click { .. }))
            .map(|fired| fired.id)
            .collect();
        ply.frame = number + 1;
        ply.evict_stale(number);

        tracing::debug!(
            frame = number,
            elements = elements.len() - 1,
            events = dispatch.events.len(),
            commands = render_commands.len(),
            "frame committed"
        );
        Ok(FrameOutput {
            render_commands,
            events: dispatch.events,
        })
    }

    fn open_index(&self) -> usize {
        self.frame.open.last().copied().unwrap_or(ROOT)
    }

    fn fail(&mut self, error: Error) -> Error {
        if self.frame.error.is_none() {
            tracing::warn!(frame = self.frame.number, %error, "builder error, frame will not commit");
            self.frame.error = Some(error.clone());
        }
        error
    }

    fn open_element(
        &mut self,
        label: String,
        index: Option<u32>,
        line: Option<u32>,
        declaration: ElementDeclaration,
        handlers: Handlers<'h>,
    ) -> Result<Id> {
        if let Some(error) = &self.frame.error {
            return Err(error.clone());
        }
        let max = self.ply.config.max_element_count;
        if self.frame.elements.len() > max {
            return Err(self.fail(Error::CapacityExceeded { max }));
        }

        let scope = self.frame.ids.current();
        let id = hash_key(
            scope.0,
            &Key {
                label: &label,
                index,
                line,
            },
        );
        let record = KeyRecord {
            scope,
            label,
            index,
            line,
        };
        if let Some(existing) = self.frame.seen.get(&id) {
            let error = if *existing == record {
                Error::DuplicateIdentity {
                    id,
                    label: record.label,
                }
            } else {
                Error::IdentityCollision {
                    id,
                    label: record.label,
                    existing: existing.label.clone(),
                }
            };
            return Err(self.fail(error));
        }
        let label = record.label.clone();
        self.frame.seen.insert(id, record);

        let parent = self.open_index();
        let index = self.frame.elements.len();
        self.frame.elements[parent].children.push(index);
        self.frame.elements.push(Declared {
            id,
            label,
            parent: Some(parent),
            children: Vec::new(),
            declaration,
            handlers,
        });
        self.frame.ids.push(id);
        self.frame.open.push(index);
        Ok(id)
    }

    fn close_element(&mut self) {
        if self.frame.open.len() > 1 {
            self.frame.open.pop();
        }
        self.frame.ids.pop();
    }
}

/// Closes the open element on every exit path out of `children`.
struct ElementScope<'s, 'p, 'h> {
    ui: &'s mut Ui<'p, 'h>,
}

impl<'p, 'h> core::ops::Deref for ElementScope<'_, 'p, 'h> {
    type Target = Ui<'p, 'h>;

    fn deref(&self) -> &Self::Target {
        self.ui
    }
}

impl core::ops::DerefMut for ElementScope<'_, '_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ui
    }
}

impl Drop for ElementScope<'_, '_, '_> {
    fn drop(&mut self) {
        self.ui.close_element();
    }
}

/// An identity scope from [`Ui::push_id`]; pops when dropped.
pub struct IdScope<'s, 'p, 'h> {
    ui: &'s mut Ui<'p, 'h>,
}

impl<'p, 'h> core::ops::Deref for IdScope<'_, 'p, 'h> {
    type Target = Ui<'p, 'h>;

    fn deref(&self) -> &Self::Target {
        self.ui
    }
}

impl core::ops::DerefMut for IdScope<'_, '_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ui
    }
}

impl Drop for IdScope<'_, '_, '_> {
    fn drop(&mut self) {
        self.ui.frame.ids.pop();
    }
}

/// An element being declared. Finish it with [`children`](Self::children) or
/// [`empty`](Self::empty).
#[must_use = "an element is only declared once `children` or `empty` is called"]
pub struct ElementBuilder<'u, 'p, 'h> {
    ui: &'u mut Ui<'p, 'h>,
    label: String,
    index: Option<u32>,
    line: Option<u32>,
    declaration: ElementDeclaration,
    handlers: Handlers<'h>,
}

impl<'u, 'p, 'h> ElementBuilder<'u, 'p, 'h> {
    fn new(ui: &'u mut Ui<'p, 'h>, label: String, index: Option<u32>, line: Option<u32>) -> Self {
        Self {
            ui,
            label,
            index,
            line,
            declaration: ElementDeclaration::default(),
            handlers: Handlers::default(),
        }
    }

    /// Disambiguates siblings declared from one call site, e.g. in a loop.
    #[inline]
    pub fn index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    #[inline]
    pub fn width(mut self, width: impl Into<UnitValue>) -> Self {
        self.declaration.layout.width = width.into();
        self
    }

    #[inline]
    pub fn height(mut self, height: impl Into<UnitValue>) -> Self {
        self.declaration.layout.height = height.into();
        self
    }

    #[inline]
    pub fn layout(mut self, f: impl FnOnce(&mut LayoutBuilder) -> &mut LayoutBuilder) -> Self {
        let mut builder = LayoutBuilder {
            config: core::mem::take(&mut self.declaration.layout),
        };
        f(&mut builder);
        self.declaration.layout = builder.config;
        self
    }

    /// Takes the element out of its parent's flow and places it by offsets.
    #[inline]
    pub fn absolute(mut self, f: impl FnOnce(&mut AbsoluteBuilder) -> &mut AbsoluteBuilder) -> Self {
        let mut builder = AbsoluteBuilder {
            config: core::mem::take(&mut self.declaration.layout),
        };
        f(&mut builder);
        self.declaration.layout = builder.config;
        self.declaration.layout.position = Position::Absolute;
        self
    }

    #[inline]
    pub fn background_color(mut self, color: impl Into<Color>) -> Self {
        self.declaration.background_color = color.into();
        self
    }

    #[inline]
    pub fn corner_radius(mut self, radius: impl Into<CornerRadius>) -> Self {
        self.declaration.corner_radius = radius.into();
        self
    }

    #[inline]
    pub fn border(mut self, f: impl FnOnce(&mut BorderBuilder) -> &mut BorderBuilder) -> Self {
        let mut builder = BorderBuilder {
            config: self.declaration.border,
        };
        f(&mut builder);
        self.declaration.border = builder.config;
        self
    }

    /// Gives the element text content, sized through the font metrics provider.
    #[inline]
    pub fn text(
        mut self,
        content: impl Into<String>,
        f: impl FnOnce(&mut TextConfig) -> &mut TextConfig,
    ) -> Self {
        let mut config = TextConfig::new();
        f(&mut config);
        self.declaration.text = Some(TextElement {
            content: content.into(),
            config,
        });
        self
    }

    /// Eases `property` toward each newly declared value.
    #[inline]
    pub fn transition(mut self, property: PropertyTag, transition: Transition) -> Self {
        self.declaration.set_transition(property, transition);
        self
    }

    #[inline]
    pub fn interactable(mut self, enabled: bool) -> Self {
        self.declaration.flags.set(ElementFlags::INTERACTABLE, enabled);
        self
    }

    #[inline]
    pub fn focusable(mut self, enabled: bool) -> Self {
        self.declaration.flags.set(ElementFlags::FOCUSABLE, enabled);
        self
    }

    /// Neither interactable nor focusable: invisible to hit-testing.
    #[inline]
    pub fn disabled(mut self) -> Self {
        self.declaration.flags = ElementFlags::empty();
        self
    }

    pub fn on_click(mut self, f: impl FnMut(Vector2) + 'h) -> Self {
        self.handlers.on_click = Some(Box::new(f));
        self
    }

    pub fn on_hover_enter(mut self, f: impl FnMut() + 'h) -> Self {
        self.handlers.on_hover_enter = Some(Box::new(f));
        self
    }

    pub fn on_hover_leave(mut self, f: impl FnMut() + 'h) -> Self {
        self.handlers.on_hover_leave = Some(Box::new(f));
        self
    }

    pub fn on_drag(mut self, f: impl FnMut(&DragEvent) + 'h) -> Self {
        self.handlers.on_drag = Some(Box::new(f));
        self
    }

    /// Also makes the element catch wheel input bubbling up from its children.
    pub fn on_scroll(mut self, f: impl FnMut(Vector2) + 'h) -> Self {
        self.handlers.on_scroll = Some(Box::new(f));
        self
    }

    pub fn on_key(mut self, f: impl FnMut(input::Key, bool) + 'h) -> Self {
        self.handlers.on_key = Some(Box::new(f));
        self
    }

    pub fn on_text(mut self, f: impl FnMut(char) + 'h) -> Self {
        self.handlers.on_text = Some(Box::new(f));
        self
    }

    pub fn on_focus_change(mut self, f: impl FnMut(bool) + 'h) -> Self {
        self.handlers.on_focus_change = Some(Box::new(f));
        self
    }

    /// Declares the element and builds its children inside it.
    pub fn children(self, f: impl FnOnce(&mut Ui<'p, 'h>) -> Result<()>) -> Result<Id> {
        let ElementBuilder {
            ui,
            label,
            index,
            line,
            declaration,
            handlers,
        } = self;
        let id = ui.open_element(label, index, line, declaration, handlers)?;
        let result = {
            let mut scope = ElementScope { ui: &mut *ui };
            f(&mut *scope)
        };
        match result {
            Ok(()) => Ok(id),
            Err(error) => Err(ui.fail(error)),
        }
    }

    /// Declares the element with no children.
    pub fn empty(self) -> Result<Id> {
        let ElementBuilder {
            ui,
            label,
            index,
            line,
            declaration,
            handlers,
        } = self;
        let id = ui.open_element(label, index, line, declaration, handlers)?;
        ui.close_element();
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::px;
    use crate::text::test_support::MonospaceMetrics;

    fn engine() -> Ply {
        Ply::new(EngineConfig::new(Dimensions::new(200.0, 100.0)))
    }

    #[test]
    fn hash_collisions_are_told_apart_from_duplicates() {
        let mut ply = engine();
        let mut ui = ply.begin_frame(InputState::new(), 0.0);
        let id = hash_key(Id::root().0, &Key::new("real"));
        ui.frame.seen.insert(
            id,
            KeyRecord {
                scope: Id::root(),
                label: "impostor".to_owned(),
                index: None,
                line: None,
            },
        );
        let error = ui.keyed("real").empty().unwrap_err();
        assert_eq!(
            error,
            Error::IdentityCollision {
                id,
                label: "real".to_owned(),
                existing: "impostor".to_owned(),
            }
        );
        assert_eq!(ui.end_frame().unwrap_err(), error);
    }

    #[test]
    fn scope_is_closed_when_children_fail() {
        let mut ply = engine();
        let mut ui = ply.begin_frame(InputState::new(), 0.0);
        let result = ui.element("outer").children(|ui| {
            ui.element("inner").children(|_| Err(Error::InvalidUnitKind { kind: "Stretch" }))?;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(ui.frame.open, vec![ROOT]);
        assert_eq!(ui.frame.ids.depth(), 1);
        assert_eq!(ui.current_id(), Id::root());
    }

    #[test]
    fn ignored_errors_still_abort_the_frame() {
        let mut ply = engine();
        let mut ui = ply.begin_frame(InputState::new(), 0.0);
        for _ in 0..2 {
            let _ = ui.element("twin").empty();
        }
        assert!(matches!(ui.end_frame(), Err(Error::DuplicateIdentity { .. })));
        assert_eq!(ply.frame_count(), 0);
    }

    #[test]
    fn dropping_the_frame_commits_nothing() {
        let mut ply = engine();
        {
            let mut ui = ply.begin_frame(InputState::new(), 0.0);
            ui.keyed("panel").width(px!(50)).empty().unwrap();
        }
        assert_eq!(ply.frame_count(), 0);
        assert_eq!(ply.bounding_box(ply.id("panel")), None);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut ply = engine();
        ply.config_mut().max_element_count(2);
        let mut ui = ply.begin_frame(InputState::new(), 0.0);
        ui.keyed(("slot", 0)).empty().unwrap();
        ui.keyed(("slot", 1)).empty().unwrap();
        let error = ui.keyed(("slot", 2)).empty().unwrap_err();
        assert_eq!(error, Error::CapacityExceeded { max: 2 });
    }

    #[test]
    fn push_id_scopes_children() {
        let mut ply = engine();
        let mut ui = ply.begin_frame(InputState::new(), 0.0);
        let first = ui.with_id("a", |ui| ui.keyed("item").empty()).unwrap();
        let second = ui.with_id("b", |ui| ui.keyed("item").empty()).unwrap();
        assert_ne!(first, second);
        assert_eq!(ui.current_id(), Id::root());
        ui.end_frame().unwrap();
        assert_eq!(ply.parent(first), Some(Id::root()));
    }

    #[test]
    fn text_leaves_are_sized_and_inert() {
        let mut ply = engine();
        ply.set_font_metrics(MonospaceMetrics);
        let mut ui = ply.begin_frame(InputState::new(), 0.0);
        let mut label = Id::default();
        let row = ui
            .keyed("row")
            .children(|ui| {
                label = ui.text("hello", |t| t.font(text::FontId(0)).font_size(10.0))?;
                Ok(())
            })
            .unwrap();
        ui.end_frame().unwrap();
        assert_eq!(ply.bounding_box(label), Some(BoundingBox::new(0.0, 0.0, 25.0, 10.0)));
        assert_eq!(ply.flags(label), Some(ElementFlags::empty()));
        assert_eq!(ply.children(row), Some(&[label][..]));
        assert_eq!(ply.label(label), Some(TEXT_LABEL));
    }

    #[test]
    fn animate_is_keyed_by_scope_and_staged() {
        let mut ply = engine();
        let linear = Transition::new(1.0);

        let mut ui = ply.begin_frame(InputState::new(), 0.0);
        assert_eq!(ui.animate("offset", 0.0, &linear), 0.0);
        ui.end_frame().unwrap();

        let mut ui = ply.begin_frame(InputState::new(), 0.25);
        assert_eq!(ui.animate("offset", 100.0, &linear), 25.0);
        drop(ui);
        let state = ply.transition(Id::root(), PropertyTag::custom("offset")).unwrap();
        assert_eq!(state.output, AnimatedValue::Scalar(0.0));
    }
}
