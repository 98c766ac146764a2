use super::*;

#[test]
fn parses_relative_forms() {
    assert_eq!(">".parse::<Position>().unwrap(), Position::AfterPrevious);
    assert_eq!("".parse::<Position>().unwrap(), Position::AfterPrevious);
    assert_eq!("<".parse::<Position>().unwrap(), Position::WithPrevious);
    assert_eq!("-=0.3".parse::<Position>().unwrap(), Position::Overlap(0.3));
    assert_eq!("+=1".parse::<Position>().unwrap(), Position::Gap(1.0));
    assert_eq!("2.5".parse::<Position>().unwrap(), Position::Absolute(2.5));
}

#[test]
fn parses_marker_forms() {
    assert_eq!(
        "solidify".parse::<Position>().unwrap(),
        Position::marker("solidify", 0.0)
    );
    assert_eq!(
        "solidify+=0.5".parse::<Position>().unwrap(),
        Position::marker("solidify", 0.5)
    );
    assert_eq!(
        "fade-out-=1.25".parse::<Position>().unwrap(),
        Position::marker("fade-out", -1.25)
    );
}

#[test]
fn rejects_malformed_text() {
    for bad in ["-=abc", "+=", "label+=x", "-1", "two words", "+=-1"] {
        assert!(bad.parse::<Position>().is_err(), "{bad}");
    }
}

#[test]
fn display_round_trips_through_parse() {
    for pos in [
        Position::AfterPrevious,
        Position::WithPrevious,
        Position::Overlap(0.25),
        Position::Gap(2.0),
        Position::Absolute(1.5),
        Position::marker("glow", 0.0),
        Position::marker("glow", 0.5),
        Position::marker("glow", -0.5),
    ] {
        assert_eq!(pos.to_string().parse::<Position>().unwrap(), pos);
    }
}

#[test]
fn serde_accepts_numbers_and_strings() {
    let p: Position = serde_json::from_str("3").unwrap();
    assert_eq!(p, Position::Absolute(3.0));
    let p: Position = serde_json::from_str("\"solidify+=0.5\"").unwrap();
    assert_eq!(p, Position::marker("solidify", 0.5));
    assert!(serde_json::from_str::<Position>("-2").is_err());

    assert_eq!(serde_json::to_string(&Position::Absolute(1.5)).unwrap(), "1.5");
    assert_eq!(serde_json::to_string(&Position::Overlap(0.5)).unwrap(), "\"-=0.5\"");
}
