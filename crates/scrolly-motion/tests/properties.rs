//! Cross-module properties of the descriptor grammars and the scroll math.

use anyhow::{Context, Result};
use indexmap::IndexMap;

use scrolly_config::default_breakpoints;
use scrolly_motion::breakpoint;
use scrolly_motion::{
    AnimValue, AnimationParser, ConfigValue, Geometry, NoConditions, Presets, ProgressState, ResolvedAnimation,
    ScrollConfig, StaggerDistributor, StaggerParser, Thresholds, ValueResolver, WidthConditions, parse_descriptor,
    parse_timeline, to_shorthand,
};

const VH: f64 = 800.0;

fn ten_vh() -> ConfigValue {
    ConfigValue::Text("10vh".into())
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn progress_is_monotone_and_bounded() {
    let configs = [
        "",
        "enter:10vh",
        "enter:20vh;exit:40vh",
        "enter:0.5;distance:300px",
        "enter:100%;exit:100%",
        "distance:0",
    ];
    let geometries = [
        Geometry { top: 0.0, height: 200.0 },
        Geometry { top: 1500.0, height: 437.0 },
        Geometry { top: 3000.0, height: 0.0 },
    ];

    for source in configs {
        let config = ScrollConfig::parse(source);
        for geometry in geometries {
            let thresholds = Thresholds::compute(&config, geometry, VH, &ten_vh());
            let mut previous = f64::NEG_INFINITY;
            let mut scroll = -2000.0;
            while scroll <= 5000.0 {
                let progress = thresholds.progress(scroll);
                assert!(
                    (0.0..=1.0).contains(&progress),
                    "{source:?} {geometry:?}: progress {progress} at {scroll}"
                );
                assert!(progress >= previous, "{source:?} {geometry:?}: dropped at {scroll}");
                previous = progress;
                scroll += 7.0;
            }
        }
    }
}

#[test]
fn distance_falls_back_to_element_height() {
    let config = ScrollConfig::parse("enter:10vh");
    let thresholds = Thresholds::compute(&config, Geometry { top: 1500.0, height: 437.0 }, VH, &ten_vh());
    assert_eq!(thresholds.distance, 437.0);
}

#[test]
fn exit_derives_distance() {
    for source in ["enter:20vh;exit:40vh", "exit:10vh", "enter:120px;exit:0"] {
        let config = ScrollConfig::parse(source);
        let thresholds = Thresholds::compute(&config, Geometry { top: 1200.0, height: 600.0 }, VH, &ten_vh());
        assert_eq!(thresholds.exit_at - thresholds.enter_at, thresholds.distance, "{source}");
    }
}

#[test]
fn timeline_parses_sorted_steps() -> Result<()> {
    let steps = parse_timeline("from:opacity-0;to:opacity-100", &ValueResolver::builtin());
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].at, 0.0);
    assert_eq!(steps[1].at, 1.0);
    assert_eq!(steps[0].properties.get("opacity").and_then(AnimValue::as_f64), Some(0.0));
    let end = steps[1].properties.get("opacity").and_then(AnimValue::as_f64).context("opacity")?;
    assert!(close(end, 1.0));
    Ok(())
}

#[test]
fn stagger_descriptor_example() -> Result<()> {
    let config = StaggerParser::new(ValueResolver::builtin())
        .parse("[>h1]:from:opacity-0|translateY-20;to:opacity-100|translateY-0|stagger-0.2")?;

    assert_eq!(config.selector, ">h1");
    assert_eq!(config.stagger_delay, 0.2);
    let from = &config.animation.from;
    let to = &config.animation.to;
    assert_eq!(from.get("opacity"), Some(&AnimValue::Number(0.0)));
    assert_eq!(from.get("translateY"), Some(&AnimValue::Number(80.0)));
    let opacity = to.get("opacity").and_then(AnimValue::as_f64).context("to opacity")?;
    assert!(close(opacity, 1.0));
    assert_eq!(to.get("translateY"), Some(&AnimValue::Number(0.0)));
    assert!(!to.contains_key("stagger"));
    Ok(())
}

#[test]
fn stagger_completes_and_keeps_index_order() {
    let distributor = StaggerDistributor::new(3, 0.1);
    assert_eq!(distributor.distribute(1.0, false), vec![1.0, 1.0, 1.0]);

    for step in 0..=100 {
        let parent = f64::from(step) / 100.0;
        let children = distributor.distribute(parent, false);
        assert!(children[0] >= children[1], "parent {parent}: {children:?}");
        assert!(children[1] >= children[2], "parent {parent}: {children:?}");
        assert!(children.iter().all(|c| (0.0..=1.0).contains(c)));
    }
}

#[test]
fn undamped_progress_snaps_to_target() {
    for target in [0.0, 0.013, 0.5, 0.999, 1.0] {
        for scrolling in [true, false] {
            let mut state = ProgressState::new(0.0, 0.95);
            state.current = 0.7;
            state.set_target(target);
            assert!(!state.step(scrolling, 16.0));
            assert_eq!(state.current, target);
        }
    }
}

#[test]
fn shorthand_round_trips_for_every_family() -> Result<()> {
    let tokens = [
        ("translateY", "20"),
        ("translateX", "-5"),
        ("opacity", "50"),
        ("scale", "90"),
        ("scaleX", "110"),
        ("rotate", "45"),
        ("rotateZ", "[90deg]"),
        ("skewX", "10"),
        ("blur", "4"),
        ("grayscale", "100"),
        ("perspective", "800"),
        ("letter-spacing", "[2px]"),
        ("color", "red"),
    ];
    let descriptor = tokens
        .iter()
        .map(|(property, token)| format!("{property}-{token}"))
        .collect::<Vec<_>>()
        .join("|");
    let source = format!("from:{descriptor} to:opacity-100");

    let presets = Presets::default();
    let config = AnimationParser::new(ValueResolver::builtin(), &presets)
        .parse(&source, &NoConditions)?
        .context("default variant")?;

    for (property, token) in tokens {
        let value = config.from.get(property).with_context(|| format!("missing {property}"))?;
        assert_eq!(to_shorthand(property, value), token, "{property}");
    }
    Ok(())
}

#[test]
fn desktop_beats_default_regardless_of_order() {
    let desktop_holds = |name: &str| name == "desktop" || name == "default";

    let mut forward = IndexMap::new();
    forward.insert("default".to_string(), "d");
    forward.insert("desktop".to_string(), "D");
    let mut backward = IndexMap::new();
    backward.insert("desktop".to_string(), "D");
    backward.insert("default".to_string(), "d");

    assert_eq!(breakpoint::resolve(&forward, &desktop_holds), Some(&"D"));
    assert_eq!(breakpoint::resolve(&backward, &desktop_holds), Some(&"D"));
    assert_eq!(breakpoint::resolve(&forward, &NoConditions), Some(&"d"));
}

#[test]
fn breakpoint_variant_follows_viewport_width() -> Result<()> {
    let source = "from:opacity-0 to:opacity-100 @desktop:from:scale-50 to:scale-100";
    let mut conditions = WidthConditions::from_queries(&default_breakpoints());
    let presets = Presets::default();

    conditions.set_width(1280.0);
    let wide = match parse_descriptor(source, ValueResolver::builtin(), &presets, &conditions)? {
        Some(ResolvedAnimation::Simple(config)) => config,
        other => anyhow::bail!("expected a simple animation, got {other:?}"),
    };
    assert_eq!(wide.breakpoint, "desktop");
    assert!(wide.from.contains_key("scale"));

    conditions.set_width(600.0);
    let narrow = match parse_descriptor(source, ValueResolver::builtin(), &presets, &conditions)? {
        Some(ResolvedAnimation::Simple(config)) => config,
        other => anyhow::bail!("expected a simple animation, got {other:?}"),
    };
    assert_eq!(narrow.breakpoint, "default");
    assert!(narrow.from.contains_key("opacity"));
    Ok(())
}
