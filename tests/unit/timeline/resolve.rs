use super::*;
use crate::{
    animation::stagger::{Stagger, StaggerFrom},
    scene::surface::{Scene, VisualElement},
    timeline::dsl::{SequenceBuilder, tween},
};

fn scene() -> Scene {
    let mut s = Scene::new()
        .with_element(VisualElement::new("core").with("opacity", 0.0).with("r", 2.0))
        .with_element(VisualElement::new("halo").with("opacity", 0.0));
    for i in 0..4 {
        s.insert(VisualElement::new(format!("line-{i}")).with("opacity", 0.0));
    }
    s
}

fn id(s: &str) -> ElementId {
    ElementId::new(s)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn sequential_tweens_follow_each_other() {
    let def = SequenceBuilder::new("seq")
        .tween(tween("core", 1.0).to("opacity", 1.0).ease(Ease::Linear))
        .tween(tween("halo", 2.0).to("opacity", 1.0).ease(Ease::Linear))
        .tween(tween("core", 0.5).to("r", 6.0).at(Position::Overlap(0.5)))
        .tween(tween("halo", 0.5).to("opacity", 0.2).at(Position::Gap(1.0)))
        .build()
        .unwrap();
    let tl = Timeline::resolve(&def, &scene(), OverlapPolicy::default()).unwrap();

    let halo = tl.channel(&id("halo"), "opacity").unwrap();
    assert!(close(halo.segments[0].start, 1.0));
    assert!(close(halo.segments[0].end, 3.0));
    let r = tl.channel(&id("core"), "r").unwrap();
    assert!(close(r.segments[0].start, 2.5));
    assert!(close(halo.segments[1].start, 4.0));
    assert!(close(tl.active_duration, 4.5));
}

#[test]
fn with_previous_shares_start() {
    let def = SequenceBuilder::new("with")
        .tween(tween("core", 1.0).to("opacity", 1.0).at(Position::at(2.0)))
        .tween(tween("halo", 3.0).to("opacity", 1.0).at(Position::WithPrevious))
        .build()
        .unwrap();
    let tl = Timeline::resolve(&def, &scene(), OverlapPolicy::default()).unwrap();
    assert!(close(tl.channel(&id("halo"), "opacity").unwrap().segments[0].start, 2.0));
    assert!(close(tl.active_duration, 5.0));
}

#[test]
fn marker_offsets_resolve_against_declaring_transition() {
    let def = SequenceBuilder::new("markers")
        .tween(tween(vec!["line-0", "line-1"], 1.0).to("opacity", 1.0))
        .tween(tween("core", 1.5).to("opacity", 1.0).label("solidify"))
        .marker("lines-done")
        .tween(
            tween("halo", 1.0)
                .to("opacity", 1.0)
                .at(Position::marker("solidify", 0.5)),
        )
        .tween(
            tween("core", 0.5)
                .to("r", 8.0)
                .at(Position::marker("lines-done", -0.25)),
        )
        .build()
        .unwrap();
    let tl = Timeline::resolve(&def, &scene(), OverlapPolicy::default()).unwrap();

    let solidify = tl.marker("solidify").unwrap();
    assert!(close(solidify, 1.0));
    assert!(close(tl.marker("lines-done").unwrap(), 2.5));
    let halo = tl.channel(&id("halo"), "opacity").unwrap();
    assert!(close(halo.segments[0].start, solidify + 0.5));
    let r = tl.channel(&id("core"), "r").unwrap();
    assert!(close(r.segments[0].start, 2.25));
}

#[test]
fn redeclared_marker_overwrites_position_but_keeps_order() {
    let def = SequenceBuilder::new("again")
        .marker_at("a", Position::at(1.0))
        .marker_at("b", Position::at(2.0))
        .marker_at("a", Position::at(5.0))
        .build()
        .unwrap();
    let tl = Timeline::resolve(&def, &scene(), OverlapPolicy::default()).unwrap();
    let names: Vec<_> = tl.markers.keys().cloned().collect();
    assert_eq!(names, ["a", "b"]);
    assert!(close(tl.marker("a").unwrap(), 5.0));
}

#[test]
fn unknown_marker_fails_construction() {
    let def = SequenceBuilder::new("missing")
        .tween(
            tween("core", 1.0)
                .to("opacity", 1.0)
                .at(Position::marker("doesNotExist", 0.0)),
        )
        .build()
        .unwrap();
    let err = Timeline::resolve(&def, &scene(), OverlapPolicy::default()).unwrap_err();
    assert!(matches!(err, StagehandError::Construction(_)));
    assert!(err.to_string().contains("doesNotExist"));
}

#[test]
fn forward_marker_reference_fails_construction() {
    let def = SequenceBuilder::new("forward")
        .tween(
            tween("core", 1.0)
                .to("opacity", 1.0)
                .at(Position::marker("later", 0.0)),
        )
        .tween(tween("halo", 1.0).to("opacity", 1.0).label("later"))
        .build()
        .unwrap();
    assert!(matches!(
        Timeline::resolve(&def, &scene(), OverlapPolicy::default()),
        Err(StagehandError::Construction(_))
    ));
}

#[test]
fn unknown_element_or_property_fails_construction() {
    let def = SequenceBuilder::new("ghost")
        .tween(tween("ghost", 1.0).to("opacity", 1.0))
        .build()
        .unwrap();
    assert!(matches!(
        Timeline::resolve(&def, &scene(), OverlapPolicy::default()),
        Err(StagehandError::Construction(_))
    ));

    let def = SequenceBuilder::new("prop")
        .tween(tween("halo", 1.0).to("cx", 10.0))
        .build()
        .unwrap();
    let err = Timeline::resolve(&def, &scene(), OverlapPolicy::default()).unwrap_err();
    assert!(err.to_string().contains("no rest value"));
}

#[test]
fn reverse_stagger_starts_far_end_last() {
    let lines = vec!["line-0", "line-1", "line-2", "line-3"];
    let def = SequenceBuilder::new("stagger")
        .tween(
            tween(lines.clone(), 0.5)
                .to("opacity", 1.0)
                .stagger(Stagger::amount(2.0).from(StaggerFrom::End)),
        )
        .build()
        .unwrap();
    let tl = Timeline::resolve(&def, &scene(), OverlapPolicy::default()).unwrap();

    let starts: Vec<f64> = lines
        .iter()
        .map(|l| tl.channel(&id(l), "opacity").unwrap().segments[0].start)
        .collect();
    assert!(close(starts[3], 0.0));
    assert!(starts.windows(2).all(|w| w[0] > w[1]));
    assert!(close(starts[0], 3.0 / 4.0 * 2.0));
    assert!(close(tl.active_duration, 1.5 + 0.5));
}

#[test]
fn duration_includes_trailing_pause() {
    let def = SequenceBuilder::new("pause")
        .tween(tween("core", 2.0).to("opacity", 1.0))
        .repeat_delay(1.5)
        .build()
        .unwrap();
    let tl = Timeline::resolve(&def, &scene(), OverlapPolicy::default()).unwrap();
    assert!(close(tl.active_duration, 2.0));
    assert!(close(tl.duration(), 3.5));
}

#[test]
fn chained_segments_start_from_previous_target() {
    let def = SequenceBuilder::new("chain")
        .tween(tween("core", 1.0).to("opacity", 0.8).ease(Ease::Linear))
        .tween(tween("core", 1.0).to("opacity", 0.2).ease(Ease::Linear))
        .build()
        .unwrap();
    let tl = Timeline::resolve(&def, &scene(), OverlapPolicy::default()).unwrap();
    let ch = tl.channel(&id("core"), "opacity").unwrap();
    assert!(close(ch.segments[0].from, 0.0));
    assert!(close(ch.segments[1].from, 0.8));
    assert!(close(ch.sample(0.5), 0.4));
    assert!(close(ch.sample(1.5), 0.5));
    assert!(close(ch.sample(10.0), 0.2));
    assert!(close(ch.sample(-1.0), 0.0));
}

#[test]
fn set_jumps_at_its_start() {
    let def = SequenceBuilder::new("set")
        .set("halo", [("opacity", 1.0)], Position::at(1.0))
        .build()
        .unwrap();
    let tl = Timeline::resolve(&def, &scene(), OverlapPolicy::default()).unwrap();
    let ch = tl.channel(&id("halo"), "opacity").unwrap();
    assert_eq!(ch.sample(0.999), 0.0);
    assert_eq!(ch.sample(1.0), 1.0);
}

fn overlapping() -> SequenceDef {
    SequenceBuilder::new("overlap")
        .tween(
            tween("core", 2.0)
                .to("opacity", 1.0)
                .ease(Ease::Linear)
                .at(Position::at(0.0)),
        )
        .tween(
            tween("core", 2.0)
                .to("opacity", 0.0)
                .ease(Ease::Linear)
                .at(Position::at(1.0)),
        )
        .build()
        .unwrap()
}

#[test]
fn overlap_last_declared_wins_by_default() {
    let tl = Timeline::resolve(&overlapping(), &scene(), OverlapPolicy::LastDeclaredWins).unwrap();
    let ch = tl.channel(&id("core"), "opacity").unwrap();
    // Second tween takes over at t=1 from 0.5 toward 0.
    assert!(close(ch.segments[1].from, 0.5));
    assert!(close(ch.sample(0.5), 0.5 * 0.5));
    assert!(close(ch.sample(2.0), 0.25));
    assert!(close(ch.sample(3.0), 0.0));
}

#[test]
fn overlap_declared_earlier_loses_even_if_it_starts_later() {
    let def = SequenceBuilder::new("order")
        .tween(
            tween("core", 1.0)
                .to("opacity", 0.0)
                .ease(Ease::Linear)
                .at(Position::at(1.0)),
        )
        .tween(
            tween("core", 4.0)
                .to("opacity", 1.0)
                .ease(Ease::Linear)
                .at(Position::at(0.0)),
        )
        .build()
        .unwrap();
    let tl = Timeline::resolve(&def, &scene(), OverlapPolicy::LastDeclaredWins).unwrap();
    let ch = tl.channel(&id("core"), "opacity").unwrap();
    assert!(close(ch.sample(1.5), 1.5 / 4.0));
    assert!(close(ch.sample(4.0), 1.0));
}

#[test]
fn overlap_rejected_under_strict_policy() {
    let err = Timeline::resolve(&overlapping(), &scene(), OverlapPolicy::Reject).unwrap_err();
    assert!(matches!(err, StagehandError::Construction(_)));
}

#[test]
fn back_to_back_segments_are_not_overlaps() {
    let def = SequenceBuilder::new("touching")
        .tween(tween("core", 1.0).to("opacity", 1.0))
        .tween(tween("core", 1.0).to("opacity", 0.0))
        .set("core", [("opacity", 0.5)], Position::at(0.5))
        .build()
        .unwrap();
    assert!(Timeline::resolve(&def, &scene(), OverlapPolicy::Reject).is_ok());
}

#[test]
fn sample_is_deterministic_and_end_values_hold() {
    let def = SequenceBuilder::new("det")
        .tween(tween(vec!["line-0", "line-1", "line-2"], 0.7).to("opacity", 1.0).stagger(Stagger::each(0.3)))
        .tween(tween("core", 1.0).to("r", 9.0).ease(Ease::OutBack))
        .build()
        .unwrap();
    let tl = Timeline::resolve(&def, &scene(), OverlapPolicy::default()).unwrap();
    for t in [0.0, 0.31, 0.9, 1.77, 2.5] {
        assert_eq!(tl.sample(t), tl.sample(t));
    }
    for v in tl.end_values() {
        let expected = if v.property == "r" { 9.0 } else { 1.0 };
        assert!(close(v.value, expected), "{v:?}");
    }
    assert!(tl.rest_values().iter().all(|v| v.value == 0.0 || v.value == 2.0));
    assert_eq!(tl.first_transition_start(), Some(0.0));
}

#[test]
fn resolved_timeline_serializes() {
    let def = SequenceBuilder::new("json")
        .tween(tween("core", 1.0).to("opacity", 1.0).label("glow"))
        .build()
        .unwrap();
    let tl = Timeline::resolve(&def, &scene(), OverlapPolicy::default()).unwrap();
    let v = serde_json::to_value(&tl).unwrap();
    assert_eq!(v["markers"]["glow"], 0.0);
    assert_eq!(v["channels"][0]["segments"][0]["end"], 1.0);
    assert_eq!(v["channels"][0]["segments"][0]["ease"], "out_quad");
}
