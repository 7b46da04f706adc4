mod common;

use std::cell::Cell;

use common::{engine, hover, idle, press, run};
use ply_core::prelude::*;

#[test]
fn repeated_key_in_a_loop_is_rejected() {
    let mut ply = engine(200.0, 100.0);
    let error = run(&mut ply, idle(), 0.0, |ui| {
        for _ in 0..3 {
            ui.element("row").height(px!(10)).empty()?;
        }
        Ok(())
    })
    .unwrap_err();
    assert!(matches!(error, Error::DuplicateIdentity { ref label, .. } if label == "row"));
    assert_eq!(ply.frame_count(), 0);

    run(&mut ply, idle(), 0.0, |ui| {
        for i in 0..3 {
            ui.element("row").index(i).height(px!(10)).empty()?;
        }
        Ok(())
    })
    .unwrap();
    assert_eq!(ply.frame_count(), 1);
    assert_eq!(ply.element_count(), 4);
}

#[test]
fn keyed_identity_is_stable_across_frames() {
    let mut ply = engine(200.0, 100.0);
    let mut seen = Vec::new();
    for width in [40.0, 60.0] {
        run(&mut ply, idle(), 0.0, |ui| {
            ui.keyed("sidebar").children(|ui| {
                seen.push(ui.keyed(("item", 2)).width(px!(width)).empty()?);
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();
    }
    assert_eq!(seen[0], seen[1]);
    assert_ne!(seen[0], ply.id(("item", 2)));
    assert_eq!(ply.parent(seen[0]), Some(ply.id("sidebar")));
    assert_eq!(ply.label(seen[0]), Some("item"));
}

fn panel(ply: &mut Ply, width: f64, dt: f64) -> BoundingBox {
    run(ply, idle(), dt, |ui| {
        ui.keyed("panel")
            .width(px!(width))
            .height(px!(10))
            .transition(PropertyTag::Width, Transition::new(1.0))
            .empty()?;
        Ok(())
    })
    .unwrap();
    ply.bounding_box(ply.id("panel")).unwrap()
}

#[test]
fn retarget_continues_from_the_displayed_value() {
    let mut ply = engine(400.0, 100.0);
    assert_eq!(panel(&mut ply, 0.0, 0.5).width, 0.0);
    assert_eq!(panel(&mut ply, 100.0, 0.5).width, 50.0);
    assert!(ply.is_animating(ply.id("panel")));

    // Reversing mid-flight must not jump.
    assert_eq!(panel(&mut ply, 0.0, 0.0).width, 50.0);
    assert_eq!(panel(&mut ply, 0.0, 0.25).width, 25.0);
    assert_eq!(panel(&mut ply, 0.0, 0.25).width, 0.0);
    assert!(!ply.is_animating(ply.id("panel")));
}

#[test]
fn zero_delta_time_is_idempotent() {
    let mut ply = engine(200.0, 100.0);
    let mut frame = |color: Color, dt: f64| {
        run(&mut ply, idle(), dt, |ui| {
            ui.keyed("swatch")
                .width(px!(50))
                .height(px!(50))
                .background_color(color)
                .transition(PropertyTag::BackgroundColor, Transition::new(1.0).easing(Easing::QuadInOut))
                .empty()?;
            Ok(())
        })
        .unwrap()
        .render_commands
    };

    let red = Color::rgb(255.0, 0.0, 0.0);
    let blue = Color::rgb(0.0, 0.0, 255.0);
    frame(red, 0.0);
    let moving = frame(blue, 0.4);
    assert_eq!(frame(blue, 0.0), moving);
    assert_eq!(frame(blue, 0.0), moving);
    assert_ne!(frame(blue, 0.1), moving);
}

#[test]
fn enter_animation_starts_from_the_declared_origin() {
    let mut ply = engine(200.0, 100.0);
    let build = |ply: &mut Ply, dt: f64| {
        run(ply, idle(), dt, |ui| {
            ui.keyed("toast")
                .width(px!(100))
                .height(px!(20))
                .transition(PropertyTag::Width, Transition::new(1.0).from(px!(0)))
                .empty()?;
            Ok(())
        })
        .unwrap();
        ply.bounding_box(ply.id("toast")).unwrap().width
    };

    assert_eq!(build(&mut ply, 0.25), 25.0);
    let toast = ply.id("toast");
    let state = ply.transition(toast, PropertyTag::Width).unwrap();
    assert_eq!(state.elapsed, 0.25);
    assert_eq!(build(&mut ply, 0.25), 50.0);
    assert_eq!(build(&mut ply, 1.0), 100.0);
    assert!(!ply.is_animating(toast));
}

#[test]
fn custom_values_animate_under_the_current_scope() {
    let mut ply = engine(200.0, 100.0);
    let mut sample = |target: f64, dt: f64| {
        let mut value = 0.0;
        run(&mut ply, idle(), dt, |ui| {
            ui.keyed("meter").children(|ui| {
                value = ui.animate("fill", target, &Transition::new(2.0));
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();
        value
    };

    assert_eq!(sample(0.0, 0.0), 0.0);
    assert_eq!(sample(1.0, 1.0), 0.5);
    assert_eq!(sample(1.0, 1.0), 1.0);
}

#[test]
fn reading_a_value_twice_in_a_frame_advances_it_once() {
    let mut ply = engine(200.0, 100.0);
    let mut sample = |target: f64, dt: f64| {
        let mut values = Vec::new();
        run(&mut ply, idle(), dt, |ui| {
            values.push(ui.animate("fill", target, &Transition::new(2.0)));
            values.push(ui.animate("fill", target, &Transition::new(2.0)));
            Ok(())
        })
        .unwrap();
        values
    };

    assert_eq!(sample(0.0, 0.0), [0.0, 0.0]);
    assert_eq!(sample(1.0, 1.0), [0.5, 0.5]);
    assert_eq!(sample(1.0, 0.5), [0.75, 0.75]);
}

#[test]
fn aborted_frame_keeps_the_committed_state() {
    let mut ply = engine(200.0, 100.0);
    let clicks = Cell::new(0);
    run(&mut ply, idle(), 0.0, |ui| {
        ui.keyed("box")
            .width(px!(40))
            .height(px!(40))
            .transition(PropertyTag::Width, Transition::new(1.0))
            .empty()?;
        Ok(())
    })
    .unwrap();
    run(&mut ply, press(10.0, 10.0), 0.0, |ui| {
        ui.keyed("box")
            .width(px!(40))
            .height(px!(40))
            .transition(PropertyTag::Width, Transition::new(1.0))
            .empty()?;
        Ok(())
    })
    .unwrap();
    let id = ply.id("box");
    let before = ply.transition(id, PropertyTag::Width).cloned();

    let error = run(&mut ply, hover(10.0, 10.0), 0.5, |ui| {
        ui.keyed("box")
            .width(px!(120))
            .height(px!(40))
            .transition(PropertyTag::Width, Transition::new(1.0))
            .on_click(|_| clicks.set(clicks.get() + 1))
            .empty()?;
        ui.keyed("box").empty()?;
        Ok(())
    })
    .unwrap_err();

    assert!(matches!(error, Error::DuplicateIdentity { .. }));
    assert_eq!(clicks.get(), 0);
    assert_eq!(ply.frame_count(), 2);
    assert_eq!(ply.bounding_box(id), Some(BoundingBox::new(0.0, 0.0, 40.0, 40.0)));
    assert_eq!(ply.transition(id, PropertyTag::Width).cloned(), before);
    assert!(ply.is_active(id));

    // The press survives the aborted frame, so the release still clicks.
    run(&mut ply, hover(10.0, 10.0), 0.0, |ui| {
        ui.keyed("box")
            .width(px!(40))
            .height(px!(40))
            .on_click(|_| clicks.set(clicks.get() + 1))
            .empty()?;
        Ok(())
    })
    .unwrap();
    assert_eq!(clicks.get(), 1);
}

#[test]
fn focus_asked_for_in_an_uncommitted_frame_is_dropped() {
    let mut ply = engine(200.0, 100.0);
    fn build(ui: &mut Ui<'_, '_>) -> Result<Id> {
        ui.keyed("field").width(px!(50)).height(px!(20)).focusable(true).empty()
    }
    run(&mut ply, idle(), 0.0, |ui| build(ui).map(drop)).unwrap();
    let field = ply.id("field");

    let mut ui = ply.begin_frame(idle(), 0.0);
    build(&mut ui).unwrap();
    ui.set_focus(field);
    drop(ui);

    let error = run(&mut ply, idle(), 0.0, |ui| {
        let id = build(ui)?;
        ui.set_focus(id);
        build(ui)?;
        Ok(())
    })
    .unwrap_err();
    assert!(matches!(error, Error::DuplicateIdentity { .. }));

    run(&mut ply, idle(), 0.0, |ui| build(ui).map(drop)).unwrap();
    assert_eq!(ply.focused(), None);
    assert!(!ply.is_focused(field));
}

#[test]
fn undeclared_state_is_evicted_after_the_limit() {
    let mut ply = engine(200.0, 100.0);
    ply.config_mut().stale_frame_limit(Some(2));
    run(&mut ply, idle(), 0.0, |ui| {
        let id = ui
            .keyed("field")
            .width(px!(50))
            .height(px!(20))
            .focusable(true)
            .transition(PropertyTag::Width, Transition::new(1.0))
            .empty()?;
        ui.set_focus(id);
        Ok(())
    })
    .unwrap();
    let field = ply.id("field");
    assert_eq!(ply.focused(), Some(field));

    for frame in 1..=2 {
        run(&mut ply, idle(), 0.1, |_| Ok(())).unwrap();
        assert_eq!(ply.frame_count(), frame + 1);
        assert_eq!(ply.bounding_box(field), None);
        assert_eq!(ply.focused(), Some(field));
        assert!(ply.transition(field, PropertyTag::Width).is_some());
    }

    run(&mut ply, idle(), 0.1, |_| Ok(())).unwrap();
    assert_eq!(ply.focused(), None);
    assert!(ply.transition(field, PropertyTag::Width).is_none());
}

#[test]
fn without_a_limit_state_lives_until_forgotten() {
    let mut ply = engine(200.0, 100.0);
    ply.config_mut().stale_frame_limit(None);
    let build = |ply: &mut Ply, declare: bool| {
        run(ply, idle(), 0.0, |ui| {
            if declare {
                let id = ui
                    .keyed("field")
                    .width(px!(50))
                    .height(px!(20))
                    .focusable(true)
                    .transition(PropertyTag::BackgroundColor, Transition::new(1.0))
                    .empty()?;
                ui.set_focus(id);
            }
            Ok(())
        })
        .unwrap();
    };
    build(&mut ply, true);
    let field = ply.id("field");
    for _ in 0..5 {
        build(&mut ply, false);
    }
    assert_eq!(ply.focused(), Some(field));
    assert!(ply.transition(field, PropertyTag::BackgroundColor).is_some());

    ply.forget(field);
    assert_eq!(ply.focused(), None);
    assert!(ply.transition(field, PropertyTag::BackgroundColor).is_none());
    assert_eq!(ply.bounding_box(field), None);
}

#[test]
fn clear_transitions_snaps_to_the_declared_value() {
    let mut ply = engine(400.0, 100.0);
    panel(&mut ply, 0.0, 0.0);
    assert_eq!(panel(&mut ply, 200.0, 0.5).width, 100.0);
    ply.clear_transitions(ply.id("panel"));
    assert_eq!(panel(&mut ply, 200.0, 0.0).width, 200.0);
}
