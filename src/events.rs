//! Hit-testing and event dispatch.
//!
//! The [`Dispatcher`] owns the cross-frame interaction state (hover, press,
//! drag and focus). Each frame it is handed the committed rectangles in paint
//! order and the edge-resolved input, and produces the next dispatcher state
//! together with the events to fire. Nothing is mutated in place, so a frame
//! that fails before commit leaves interaction state untouched.

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::id::Id;
use crate::input::{FrameInput, Key};
use crate::math::{BoundingBox, Vector2};

bitflags! {
    /// Interaction state of one element, as of the last committed frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct InteractionState: u8 {
        const HOVERED = 1;
        const ACTIVE = 1 << 1;
        const FOCUSED = 1 << 2;
    }
}

bitflags! {
    /// What an element may take part in. An element with neither flag is
    /// disabled and invisible to the dispatcher.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ElementFlags: u8 {
        /// Hit-tested: can be hovered, pressed, clicked, dragged and scrolled.
        const INTERACTABLE = 1;
        /// Can own keyboard focus.
        const FOCUSABLE = 1 << 1;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        ElementFlags::INTERACTABLE
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEvent {
    /// Where the press that started the drag happened.
    pub start: Vector2,
    /// Movement since the previous drag event.
    pub delta: Vector2,
    /// Movement since `start`.
    pub total: Vector2,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Click { position: Vector2 },
    HoverEnter,
    HoverLeave,
    Drag(DragEvent),
    Scroll { delta: Vector2 },
    Key { key: Key, pressed: bool },
    Text { ch: char },
    FocusChange { focused: bool },
}

/// An event together with the element it was dispatched to.
#[derive(Debug, Clone, PartialEq)]
pub struct FiredEvent {
    pub id: Id,
    pub event: Event,
}

/// Callbacks registered on one element for one frame.
#[derive(Default)]
pub struct Handlers<'h> {
    pub(crate) on_click: Option<Box<dyn FnMut(Vector2) + 'h>>,
    pub(crate) on_hover_enter: Option<Box<dyn FnMut() + 'h>>,
    pub(crate) on_hover_leave: Option<Box<dyn FnMut() + 'h>>,
    pub(crate) on_drag: Option<Box<dyn FnMut(&DragEvent) + 'h>>,
    pub(crate) on_scroll: Option<Box<dyn FnMut(Vector2) + 'h>>,
    pub(crate) on_key: Option<Box<dyn FnMut(Key, bool) + 'h>>,
    pub(crate) on_text: Option<Box<dyn FnMut(char) + 'h>>,
    pub(crate) on_focus_change: Option<Box<dyn FnMut(bool) + 'h>>,
}

impl Handlers<'_> {
    /// Invokes the handler matching `event`, if one is registered.
    pub(crate) fn dispatch(&mut self, event: &Event) -> bool {
        match event {
            Event::Click { position } => call(&mut self.on_click, |f| f(*position)),
            Event::HoverEnter => call(&mut self.on_hover_enter, |f| f()),
            Event::HoverLeave => call(&mut self.on_hover_leave, |f| f()),
            Event::Drag(drag) => call(&mut self.on_drag, |f| f(drag)),
            Event::Scroll { delta } => call(&mut self.on_scroll, |f| f(*delta)),
            Event::Key { key, pressed } => call(&mut self.on_key, |f| f(*key, *pressed)),
            Event::Text { ch } => call(&mut self.on_text, |f| f(*ch)),
            Event::FocusChange { focused } => call(&mut self.on_focus_change, |f| f(*focused)),
        }
    }

    pub(crate) fn wants_scroll(&self) -> bool {
        self.on_scroll.is_some()
    }
}

fn call<F: ?Sized>(handler: &mut Option<Box<F>>, invoke: impl FnOnce(&mut F)) -> bool {
    match handler {
        Some(handler) => {
            invoke(&mut **handler);
            true
        }
        None => false,
    }
}

impl core::fmt::Debug for Handlers<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Handlers")
            .field("on_click", &self.on_click.is_some())
            .field("on_hover_enter", &self.on_hover_enter.is_some())
            .field("on_hover_leave", &self.on_hover_leave.is_some())
            .field("on_drag", &self.on_drag.is_some())
            .field("on_scroll", &self.on_scroll.is_some())
            .field("on_key", &self.on_key.is_some())
            .field("on_text", &self.on_text.is_some())
            .field("on_focus_change", &self.on_focus_change.is_some())
            .finish()
    }
}

/// One laid-out element as the dispatcher sees it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HitTarget {
    pub(crate) id: Id,
    pub(crate) parent: Option<Id>,
    pub(crate) rect: BoundingBox,
    /// Intersection of every clipping ancestor, if any.
    pub(crate) clip: Option<BoundingBox>,
    pub(crate) flags: ElementFlags,
    pub(crate) wants_scroll: bool,
}

impl HitTarget {
    fn contains(&self, point: Vector2) -> bool {
        self.rect.contains(point) && self.clip.map_or(true, |clip| clip.contains(point))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FocusRequest {
    Focus(Id),
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    id: Id,
    origin: Vector2,
    last: Vector2,
    dragging: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Dispatch {
    pub(crate) events: Vec<FiredEvent>,
    pub(crate) interactions: FxHashMap<Id, InteractionState>,
    /// Every interactable element under the pointer, in paint order.
    pub(crate) pointer_over: Vec<Id>,
}

impl Dispatch {
    fn fire(&mut self, id: Id, event: Event) {
        tracing::trace!(?id, ?event, "event");
        self.events.push(FiredEvent { id, event });
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DispatchOptions {
    pub(crate) drag_threshold: f64,
    pub(crate) blur_on_empty_press: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Dispatcher {
    hovered: Option<Id>,
    press: Option<Press>,
    focused: Option<Id>,
    focus_request: Option<FocusRequest>,
}

impl Dispatcher {
    pub(crate) fn focused(&self) -> Option<Id> {
        self.focused
    }

    /// Queued until the next committed frame, where it is validated against
    /// that frame's flags.
    pub(crate) fn request_focus(&mut self, request: FocusRequest) {
        self.focus_request = Some(request);
    }

    /// Drops every reference to `id`. No events are fired.
    pub(crate) fn forget(&mut self, id: Id) {
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        if self.press.is_some_and(|press| press.id == id) {
            self.press = None;
        }
        if self.focused == Some(id) {
            self.focused = None;
        }
        if self.focus_request == Some(FocusRequest::Focus(id)) {
            self.focus_request = None;
        }
    }

    /// `targets` must be in paint order: later entries are on top.
    pub(crate) fn dispatch(
        &self,
        targets: &[HitTarget],
        input: &FrameInput,
        options: DispatchOptions,
    ) -> (Dispatcher, Dispatch) {
        let mut next = self.clone();
        let mut out = Dispatch::default();
        let by_id: FxHashMap<Id, &HitTarget> = targets.iter().map(|t| (t.id, t)).collect();

        let under: Vec<&HitTarget> = match input.pointer {
            Some(pointer) => targets
                .iter()
                .filter(|t| t.flags.contains(ElementFlags::INTERACTABLE) && t.contains(pointer))
                .collect(),
            None => Vec::new(),
        };
        out.pointer_over = under.iter().map(|t| t.id).collect();
        let topmost = under.last().copied();

        // Focus owners that were disabled this frame lose focus.
        if let Some(focused) = next.focused {
            if by_id
                .get(&focused)
                .is_some_and(|t| !t.flags.contains(ElementFlags::FOCUSABLE))
            {
                next.change_focus(None, &mut out);
            }
        }
        match next.focus_request.take() {
            Some(FocusRequest::Focus(id)) => {
                if by_id
                    .get(&id)
                    .is_some_and(|t| t.flags.contains(ElementFlags::FOCUSABLE))
                {
                    next.change_focus(Some(id), &mut out);
                }
            }
            Some(FocusRequest::Clear) => next.change_focus(None, &mut out),
            None => {}
        }

        let hovered = topmost.map(|t| t.id);
        if hovered != next.hovered {
            if let Some(previous) = next.hovered {
                out.fire(previous, Event::HoverLeave);
            }
            if let Some(current) = hovered {
                out.fire(current, Event::HoverEnter);
            }
            next.hovered = hovered;
        }

        // A press whose owner vanished or became inert is cancelled.
        if let Some(press) = next.press {
            if !by_id
                .get(&press.id)
                .is_some_and(|t| t.flags.contains(ElementFlags::INTERACTABLE))
            {
                next.press = None;
            }
        }

        if input.primary.pressed_this_frame() {
            next.press = match (topmost, input.pointer) {
                (Some(target), Some(pointer)) => Some(Press {
                    id: target.id,
                    origin: pointer,
                    last: pointer,
                    dragging: false,
                }),
                _ => {
                    if options.blur_on_empty_press {
                        next.change_focus(None, &mut out);
                    }
                    None
                }
            };
        } else if input.primary.is_down() {
            if let (Some(press), Some(pointer)) = (next.press.as_mut(), input.pointer) {
                let total = pointer - press.origin;
                let started = !press.dragging && total.length() > options.drag_threshold;
                press.dragging |= started;
                let delta = pointer - press.last;
                if press.dragging && (started || !delta.is_zero()) {
                    let drag = DragEvent {
                        start: press.origin,
                        delta,
                        total,
                    };
                    let id = press.id;
                    out.fire(id, Event::Drag(drag));
                }
                press.last = pointer;
            }
        } else if input.primary.released_this_frame() {
            if let (Some(press), Some(pointer)) = (next.press.take(), input.pointer) {
                if let Some(target) = by_id.get(&press.id).filter(|t| t.contains(pointer)) {
                    if target.flags.contains(ElementFlags::FOCUSABLE) {
                        next.change_focus(Some(target.id), &mut out);
                    }
                    out.fire(target.id, Event::Click { position: pointer });
                }
            }
        } else {
            next.press = None;
        }

        if !input.wheel.is_zero() {
            if let Some(target) = topmost {
                let receiver = scroll_receiver(target, &by_id);
                out.fire(receiver, Event::Scroll { delta: input.wheel });
            }
        }

        if let Some(focused) = next.focused.filter(|id| by_id.contains_key(id)) {
            for key in &input.keys_pressed {
                out.fire(focused, Event::Key { key: *key, pressed: true });
            }
            for key in &input.keys_released {
                out.fire(focused, Event::Key { key: *key, pressed: false });
            }
            for ch in &input.text {
                out.fire(focused, Event::Text { ch: *ch });
            }
        }

        if let Some(id) = next.hovered {
            *out.interactions.entry(id).or_default() |= InteractionState::HOVERED;
        }
        if let (Some(press), Some(pointer)) = (next.press, input.pointer) {
            if input.primary.is_down() && by_id.get(&press.id).is_some_and(|t| t.contains(pointer)) {
                *out.interactions.entry(press.id).or_default() |= InteractionState::ACTIVE;
            }
        }
        if let Some(id) = next.focused {
            *out.interactions.entry(id).or_default() |= InteractionState::FOCUSED;
        }

        (next, out)
    }

    fn change_focus(&mut self, focused: Option<Id>, out: &mut Dispatch) {
        if self.focused == focused {
            return;
        }
        if let Some(previous) = self.focused {
            out.fire(previous, Event::FocusChange { focused: false });
        }
        if let Some(current) = focused {
            out.fire(current, Event::FocusChange { focused: true });
        }
        self.focused = focused;
    }
}

/// Scroll goes to the nearest element, starting at the hit one, that handles it.
fn scroll_receiver(hit: &HitTarget, by_id: &FxHashMap<Id, &HitTarget>) -> Id {
    let mut current = Some(hit);
    while let Some(target) = current {
        if target.wants_scroll {
            return target.id;
        }
        current = target.parent.and_then(|parent| by_id.get(&parent).copied());
    }
    hit.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerState;

    const OPTIONS: DispatchOptions = DispatchOptions {
        drag_threshold: 3.0,
        blur_on_empty_press: true,
    };

    fn target(id: u64, parent: Option<u64>, rect: (f64, f64, f64, f64), flags: ElementFlags) -> HitTarget {
        HitTarget {
            id: Id(id),
            parent: parent.map(Id),
            rect: BoundingBox::new(rect.0, rect.1, rect.2, rect.3),
            clip: None,
            flags,
            wants_scroll: false,
        }
    }

    fn frame(pointer: (f64, f64), primary: PointerState) -> FrameInput {
        FrameInput {
            pointer: Some(Vector2::new(pointer.0, pointer.1)),
            primary,
            ..Default::default()
        }
    }

    fn events_for(dispatch: &Dispatch, id: u64) -> Vec<Event> {
        dispatch
            .events
            .iter()
            .filter(|e| e.id == Id(id))
            .map(|e| e.event.clone())
            .collect()
    }

    #[test]
    fn topmost_interactable_wins() {
        let targets = [
            target(1, None, (0.0, 0.0, 100.0, 100.0), ElementFlags::INTERACTABLE),
            target(2, Some(1), (10.0, 10.0, 50.0, 50.0), ElementFlags::INTERACTABLE),
            target(3, Some(1), (10.0, 10.0, 50.0, 50.0), ElementFlags::empty()),
        ];
        let (next, out) = Dispatcher::default().dispatch(&targets, &frame((20.0, 20.0), PointerState::Released), OPTIONS);
        assert_eq!(out.pointer_over, vec![Id(1), Id(2)]);
        assert_eq!(events_for(&out, 2), vec![Event::HoverEnter]);
        assert_eq!(out.interactions.get(&Id(2)), Some(&InteractionState::HOVERED));
        assert_eq!(next.hovered, Some(Id(2)));
        assert!(events_for(&out, 3).is_empty());
    }

    #[test]
    fn clip_hides_overflowing_parts() {
        let mut clipped = target(1, None, (0.0, 0.0, 100.0, 100.0), ElementFlags::INTERACTABLE);
        clipped.clip = Some(BoundingBox::new(0.0, 0.0, 50.0, 50.0));
        let (_, out) = Dispatcher::default().dispatch(&[clipped], &frame((75.0, 75.0), PointerState::Released), OPTIONS);
        assert!(out.pointer_over.is_empty());
    }

    #[test]
    fn click_needs_press_and_release_inside() {
        let targets = [target(1, None, (0.0, 0.0, 10.0, 10.0), ElementFlags::INTERACTABLE)];
        let d = Dispatcher::default();
        let (d, out) = d.dispatch(&targets, &frame((5.0, 5.0), PointerState::PressedThisFrame), OPTIONS);
        assert!(out.interactions[&Id(1)].contains(InteractionState::ACTIVE));
        let (d, out) = d.dispatch(&targets, &frame((5.0, 5.0), PointerState::ReleasedThisFrame), OPTIONS);
        assert!(events_for(&out, 1).contains(&Event::Click {
            position: Vector2::new(5.0, 5.0)
        }));

        let (d, _) = d.dispatch(&targets, &frame((5.0, 5.0), PointerState::PressedThisFrame), OPTIONS);
        let (_, out) = d.dispatch(&targets, &frame((50.0, 5.0), PointerState::ReleasedThisFrame), OPTIONS);
        assert!(events_for(&out, 1).is_empty());
    }

    #[test]
    fn drag_starts_past_threshold() {
        let targets = [target(1, None, (0.0, 0.0, 100.0, 100.0), ElementFlags::INTERACTABLE)];
        let d = Dispatcher::default();
        let (d, _) = d.dispatch(&targets, &frame((10.0, 10.0), PointerState::PressedThisFrame), OPTIONS);
        let (d, out) = d.dispatch(&targets, &frame((12.0, 10.0), PointerState::Pressed), OPTIONS);
        assert!(out.events.is_empty());
        let (d, out) = d.dispatch(&targets, &frame((20.0, 10.0), PointerState::Pressed), OPTIONS);
        assert_eq!(
            events_for(&out, 1),
            vec![Event::Drag(DragEvent {
                start: Vector2::new(10.0, 10.0),
                delta: Vector2::new(8.0, 0.0),
                total: Vector2::new(10.0, 0.0),
            })]
        );
        let (_, out) = d.dispatch(&targets, &frame((20.0, 10.0), PointerState::Pressed), OPTIONS);
        assert!(out.events.is_empty());
    }

    #[test]
    fn focus_moves_on_click_of_focusable_only() {
        let focusable = ElementFlags::INTERACTABLE | ElementFlags::FOCUSABLE;
        let targets = [
            target(1, None, (0.0, 0.0, 10.0, 10.0), focusable),
            target(2, None, (20.0, 0.0, 10.0, 10.0), ElementFlags::INTERACTABLE),
        ];
        let d = Dispatcher::default();
        let (d, _) = d.dispatch(&targets, &frame((5.0, 5.0), PointerState::PressedThisFrame), OPTIONS);
        let (d, out) = d.dispatch(&targets, &frame((5.0, 5.0), PointerState::ReleasedThisFrame), OPTIONS);
        assert_eq!(d.focused(), Some(Id(1)));
        assert!(events_for(&out, 1).contains(&Event::FocusChange { focused: true }));

        let (d, _) = d.dispatch(&targets, &frame((25.0, 5.0), PointerState::PressedThisFrame), OPTIONS);
        let (d, _) = d.dispatch(&targets, &frame((25.0, 5.0), PointerState::ReleasedThisFrame), OPTIONS);
        assert_eq!(d.focused(), Some(Id(1)));

        let (d, out) = d.dispatch(&targets, &frame((90.0, 90.0), PointerState::PressedThisFrame), OPTIONS);
        assert_eq!(d.focused(), None);
        assert_eq!(events_for(&out, 1), vec![Event::FocusChange { focused: false }]);
    }

    #[test]
    fn keys_and_text_go_to_focus() {
        let targets = [target(1, None, (0.0, 0.0, 10.0, 10.0), ElementFlags::FOCUSABLE)];
        let mut d = Dispatcher::default();
        d.request_focus(FocusRequest::Focus(Id(1)));
        let mut input = frame((50.0, 50.0), PointerState::Released);
        input.keys_pressed = vec![Key::Enter];
        input.text = vec!['x'];
        let (d, out) = d.dispatch(&targets, &input, OPTIONS);
        assert_eq!(
            events_for(&out, 1),
            vec![
                Event::FocusChange { focused: true },
                Event::Key {
                    key: Key::Enter,
                    pressed: true
                },
                Event::Text { ch: 'x' },
            ]
        );

        let disabled = [target(1, None, (0.0, 0.0, 10.0, 10.0), ElementFlags::empty())];
        let (d, _) = d.dispatch(&disabled, &input, OPTIONS);
        assert_eq!(d.focused(), None);
    }

    #[test]
    fn scroll_bubbles_to_handler() {
        let mut outer = target(1, None, (0.0, 0.0, 100.0, 100.0), ElementFlags::INTERACTABLE);
        outer.wants_scroll = true;
        let inner = target(2, Some(1), (0.0, 0.0, 50.0, 50.0), ElementFlags::INTERACTABLE);
        let mut input = frame((10.0, 10.0), PointerState::Released);
        input.wheel = Vector2::new(0.0, -3.0);
        let (_, out) = Dispatcher::default().dispatch(&[outer, inner], &input, OPTIONS);
        assert_eq!(
            events_for(&out, 1),
            vec![Event::Scroll {
                delta: Vector2::new(0.0, -3.0)
            }]
        );
    }

    #[test]
    fn handlers_run_by_kind() {
        let clicked = core::cell::Cell::new(None);
        let mut handlers = Handlers {
            on_click: Some(Box::new(|p: Vector2| clicked.set(Some(p)))),
            ..Default::default()
        };
        assert!(handlers.dispatch(&Event::Click {
            position: Vector2::new(1.0, 2.0)
        }));
        assert!(!handlers.dispatch(&Event::HoverEnter));
        drop(handlers);
        assert_eq!(clicked.get(), Some(Vector2::new(1.0, 2.0)));
    }
}
