use super::*;
use crate::{
    scene::{
        geometry::GeometrySpec,
        surface::{Scene, VisualElement},
    },
    timeline::dsl::{SequenceBuilder, tween},
};

fn scene() -> Scene {
    Scene::new()
        .with_element(VisualElement::new("wave").with("opacity", 0.0).with("y", 0.0))
        .with_element(VisualElement::new("field").with("opacity", 1.0))
}

#[test]
fn summary_lists_end_state_with_caption() {
    let def = SequenceBuilder::new("collapse")
        .tween(tween("wave", 1.0).to("opacity", 1.0))
        .tween(tween("field", 0.5).to("opacity", 0.25))
        .caption("The wave settles into the field.")
        .build()
        .unwrap();
    let summary = StaticSummary::for_definition(&def, &scene(), &MountOpts::default());

    assert_eq!(summary.entries.len(), 2);
    assert_eq!(
        summary.describe(),
        "The wave settles into the field.\nwave.opacity = 1.000\nfield.opacity = 0.250\n"
    );
}

#[test]
fn unresolvable_definition_keeps_caption() {
    let def = SequenceBuilder::new("broken")
        .tween(tween("ghost", 1.0).to("opacity", 1.0))
        .caption("Fallback caption.")
        .build()
        .unwrap();
    let summary = StaticSummary::for_definition(&def, &scene(), &MountOpts::default());
    assert!(summary.entries.is_empty());
    assert_eq!(summary.caption.as_deref(), Some("Fallback caption."));
    assert!(!summary.is_empty());
}

#[test]
fn summary_uses_seeded_geometry() {
    let def = SequenceBuilder::new("drift")
        .geometry(GeometrySpec::new("wave", "y", 10.0, 20.0))
        .tween(tween("wave", 1.0).to("opacity", 1.0))
        .build()
        .unwrap();
    let opts = MountOpts {
        seed: 42,
        ..MountOpts::default()
    };
    let a = StaticSummary::for_definition(&def, &scene(), &opts);
    let b = StaticSummary::for_definition(&def, &scene(), &opts);
    assert_eq!(a, b);
    // Only animated channels are listed.
    assert_eq!(a.entries.len(), 1);
}

#[test]
fn empty_summary_renders_nothing() {
    let summary = StaticSummary::default();
    assert!(summary.is_empty());
    assert_eq!(summary.describe(), "");
}
