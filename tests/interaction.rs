mod common;

use std::cell::{Cell, RefCell};

use common::{engine, events_for, hover, idle, init_tracing, press, run};
use ply_core::prelude::*;

#[test]
fn inert_overlay_does_not_swallow_input() {
    init_tracing();
    let mut ply = engine(200.0, 100.0);
    let clicks = Cell::new(0);
    let ghost_hovers = Cell::new(0);
    let scene = |ply: &mut Ply, input: InputState| {
        run(ply, input, 0.0, |ui| {
            ui.keyed("below")
                .width(px!(100))
                .height(px!(100))
                .on_click(|_| clicks.set(clicks.get() + 1))
                .empty()?;
            ui.keyed("ghost")
                .width(px!(100))
                .height(px!(100))
                .absolute(|a| a.left(px!(0)).top(px!(0)))
                .interactable(false)
                .on_hover_enter(|| ghost_hovers.set(ghost_hovers.get() + 1))
                .empty()?;
            Ok(())
        })
        .unwrap()
    };

    scene(&mut ply, hover(50.0, 50.0));
    let below = ply.id("below");
    assert!(ply.is_hovered(below));
    assert_eq!(ply.pointer_over_ids(), &[below]);

    scene(&mut ply, press(50.0, 50.0));
    assert!(ply.is_active(below));
    scene(&mut ply, hover(50.0, 50.0));
    assert!(ply.is_clicked(below));
    assert!(!ply.is_hovered(ply.id("ghost")));

    assert_eq!(clicks.get(), 1);
    assert_eq!(ghost_hovers.get(), 0);
}

#[test]
fn click_fires_on_release_inside_only() {
    let mut ply = engine(200.0, 100.0);
    fn build(ui: &mut Ui<'_, '_>) -> Result<()> {
        ui.keyed("button").width(px!(50)).height(px!(50)).empty()?;
        Ok(())
    }
    let button = ply.id("button");

    let output = run(&mut ply, press(10.0, 10.0), 0.0, build).unwrap();
    assert_eq!(events_for(&output, button), vec![Event::HoverEnter]);
    assert!(ply.is_active(button));
    assert!(!ply.is_clicked(button));

    let output = run(&mut ply, hover(10.0, 10.0), 0.0, build).unwrap();
    assert_eq!(
        events_for(&output, button),
        vec![Event::Click {
            position: Vector2::new(10.0, 10.0)
        }]
    );
    assert!(ply.is_clicked(button));
    assert!(!ply.is_active(button));

    run(&mut ply, press(10.0, 10.0), 0.0, build).unwrap();
    let output = run(&mut ply, hover(150.0, 50.0), 0.0, build).unwrap();
    assert_eq!(events_for(&output, button), vec![Event::HoverLeave]);
    assert!(!ply.is_clicked(button));
}

#[test]
fn drag_reports_step_and_total_movement() {
    let mut ply = engine(200.0, 100.0);
    let drags = RefCell::new(Vec::new());
    let clicked = Cell::new(false);
    for input in [
        press(10.0, 10.0),
        press(12.0, 10.0),
        press(20.0, 10.0),
        press(25.0, 15.0),
        hover(25.0, 15.0),
    ] {
        run(&mut ply, input, 1.0 / 60.0, |ui| {
            ui.keyed("handle")
                .width(px!(100))
                .height(px!(100))
                .on_drag(|drag| drags.borrow_mut().push(*drag))
                .on_click(|_| clicked.set(true))
                .empty()?;
            Ok(())
        })
        .unwrap();
    }

    let start = Vector2::new(10.0, 10.0);
    assert_eq!(
        drags.into_inner(),
        vec![
            DragEvent {
                start,
                delta: Vector2::new(8.0, 0.0),
                total: Vector2::new(10.0, 0.0),
            },
            DragEvent {
                start,
                delta: Vector2::new(5.0, 5.0),
                total: Vector2::new(15.0, 5.0),
            },
        ]
    );
    assert!(clicked.get());
}

#[test]
fn focus_follows_clicks_and_receives_keys() {
    let mut ply = engine(200.0, 100.0);
    let received = RefCell::new(Vec::new());
    let frame = |ply: &mut Ply, input: InputState| {
        run(ply, input, 0.0, |ui| {
            ui.keyed("field")
                .width(px!(100))
                .height(px!(50))
                .focusable(true)
                .on_key(|key, pressed| received.borrow_mut().push(Event::Key { key, pressed }))
                .on_text(|ch| received.borrow_mut().push(Event::Text { ch }))
                .on_focus_change(|focused| received.borrow_mut().push(Event::FocusChange { focused }))
                .empty()?;
            Ok(())
        })
        .unwrap()
    };
    let field = ply.id("field");

    let mut typing = hover(10.0, 10.0);
    typing.key_down(KeyboardKey::Enter).text("hi");
    frame(&mut ply, typing.clone());
    assert_eq!(ply.focused(), None);

    frame(&mut ply, press(10.0, 10.0));
    frame(&mut ply, hover(10.0, 10.0));
    assert_eq!(ply.focused(), Some(field));
    assert!(ply.interaction(field).contains(InteractionState::FOCUSED));

    frame(&mut ply, typing);
    frame(&mut ply, hover(10.0, 10.0));
    let output = frame(&mut ply, press(150.0, 80.0));
    assert_eq!(ply.focused(), None);
    assert_eq!(events_for(&output, field), vec![Event::HoverLeave, Event::FocusChange { focused: false }]);

    assert_eq!(
        received.into_inner(),
        vec![
            Event::FocusChange { focused: true },
            Event::Key {
                key: KeyboardKey::Enter,
                pressed: true
            },
            Event::Text { ch: 'h' },
            Event::Text { ch: 'i' },
            Event::Key {
                key: KeyboardKey::Enter,
                pressed: false
            },
            Event::FocusChange { focused: false },
        ]
    );
}

#[test]
fn empty_press_keeps_focus_when_blur_is_off() {
    let mut ply = engine(200.0, 100.0);
    ply.config_mut().blur_on_empty_press(false);
    fn build(ui: &mut Ui<'_, '_>) -> Result<()> {
        ui.keyed("field").width(px!(100)).height(px!(50)).focusable(true).empty()?;
        Ok(())
    }
    run(&mut ply, press(10.0, 10.0), 0.0, build).unwrap();
    run(&mut ply, hover(10.0, 10.0), 0.0, build).unwrap();
    run(&mut ply, press(150.0, 80.0), 0.0, build).unwrap();
    assert_eq!(ply.focused(), Some(ply.id("field")));
}

#[test]
fn scroll_bubbles_to_the_nearest_handler() {
    let mut ply = engine(200.0, 100.0);
    let scrolled = Cell::new(Vector2::ZERO);
    let mut list = Id::default();
    let mut row = Id::default();
    let mut input = hover(10.0, 10.0);
    input.wheel(0.0, -3.0);

    let output = run(&mut ply, input, 0.0, |ui| {
        list = ui
            .keyed("list")
            .width(px!(200))
            .height(px!(100))
            .layout(|l| l.direction(Column))
            .on_scroll(|delta| scrolled.set(scrolled.get() + delta))
            .children(|ui| {
                row = ui.keyed("row").height(px!(20)).empty()?;
                Ok(())
            })?;
        Ok(())
    })
    .unwrap();

    assert_eq!(scrolled.get(), Vector2::new(0.0, -3.0));
    assert_eq!(events_for(&output, row), vec![Event::HoverEnter]);
    assert_eq!(
        events_for(&output, list),
        vec![Event::Scroll {
            delta: Vector2::new(0.0, -3.0)
        }]
    );
    assert_eq!(ply.pointer_over_ids(), &[list, row]);
}

#[test]
fn programmatic_focus_needs_a_focusable_target() {
    let mut ply = engine(200.0, 100.0);
    let frame = |ply: &mut Ply, input_focusable: bool| {
        run(ply, idle(), 0.0, |ui| {
            ui.keyed("plain").width(px!(50)).height(px!(50)).empty()?;
            ui.keyed("input")
                .width(px!(50))
                .height(px!(50))
                .focusable(input_focusable)
                .empty()?;
            Ok(())
        })
        .unwrap()
    };
    let (plain, input) = (ply.id("plain"), ply.id("input"));
    frame(&mut ply, true);

    ply.set_focus(plain);
    frame(&mut ply, true);
    assert_eq!(ply.focused(), None);

    ply.set_focus(input);
    let output = frame(&mut ply, true);
    assert_eq!(ply.focused(), Some(input));
    assert!(ply.is_focused(input));
    assert_eq!(events_for(&output, input), vec![Event::FocusChange { focused: true }]);

    let output = frame(&mut ply, false);
    assert_eq!(ply.focused(), None);
    assert_eq!(events_for(&output, input), vec![Event::FocusChange { focused: false }]);
}

#[test]
fn focus_set_inside_the_frame_applies_to_it() {
    let mut ply = engine(200.0, 100.0);
    let output = run(&mut ply, idle(), 0.0, |ui| {
        let id = ui.keyed("search").width(px!(80)).height(px!(20)).focusable(true).empty()?;
        ui.set_focus(id);
        Ok(())
    })
    .unwrap();

    let search = ply.id("search");
    assert_eq!(ply.focused(), Some(search));
    assert_eq!(events_for(&output, search), vec![Event::FocusChange { focused: true }]);

    ply.clear_focus();
    run(&mut ply, idle(), 0.0, |ui| {
        ui.keyed("search").width(px!(80)).height(px!(20)).focusable(true).empty()?;
        Ok(())
    })
    .unwrap();
    assert_eq!(ply.focused(), None);
}
