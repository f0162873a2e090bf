//! End-to-end behaviour of the motion manager against an in-memory document.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use scrolly_config::{PresetSource, ScrollyConfig};
use scrolly_motion::theme::THEME_ATTRIBUTE;
use scrolly_motion::{
    AnimValue, ElementDescriptors, ElementId, FnPlugin, Geometry, MemoryDocument, ModuleError, MotionEvent,
    MotionManager, ProgressWidget, ResolvedAnimation, ThemeModule, WidgetCapabilities, WidgetModule,
};

const VH: f64 = 800.0;
const FRAME: f64 = 16.0;

/// With `enter:10vh` an element at top 720 starts its progress at scroll 0.
const TOP: f64 = 720.0;

struct Scene {
    manager: MotionManager,
    doc: MemoryDocument,
    now: f64,
}

impl Scene {
    fn new(manager: MotionManager) -> Self {
        Self {
            manager,
            doc: MemoryDocument::new(1280.0, VH),
            now: 0.0,
        }
    }

    fn add(&mut self, top: f64, height: f64, scroll: &str, animation: Option<&str>) -> ElementId {
        let el = self.doc.add_element("section", Geometry { top, height });
        let mut descriptors = ElementDescriptors::new().scroll(scroll);
        descriptors.animation = animation.map(str::to_string);
        self.manager.track(el, descriptors);
        el
    }

    fn start(&mut self) {
        self.manager.start(&mut self.doc);
        self.frame();
    }

    fn frame(&mut self) -> bool {
        self.now += FRAME;
        let again = self.manager.on_frame(&mut self.doc, self.now);
        self.manager.poll_timers(&mut self.doc, self.now) || again
    }

    fn scroll_to(&mut self, y: f64) -> bool {
        self.doc.set_scroll_y(y);
        let entries = self.doc.intersections(self.manager.tracked());
        self.manager.on_intersection(&entries);
        self.manager.on_scroll(self.now);
        self.frame()
    }

    fn events(&mut self) -> Vec<MotionEvent> {
        self.manager.drain_events().collect()
    }

    fn opacity(&self, el: ElementId) -> Result<f64> {
        let raw = self.doc.style(el, "opacity").context("no opacity written")?;
        Ok(raw.parse()?)
    }
}

#[test]
fn once_elements_freeze_after_leaving() -> Result<()> {
    let mut scene = Scene::new(MotionManager::new(ScrollyConfig::default()));
    let el = scene.add(
        TOP,
        400.0,
        "enter:10vh;exit:40vh;once:true;class:is-in",
        Some("from:opacity-0 to:opacity-100"),
    );
    scene.start();

    scene.scroll_to(100.0);
    assert!(scene.doc.has_class(el, "is-in"));
    scene.scroll_to(900.0);
    assert_eq!(scene.opacity(el)?, 1.0);

    let state = scene.manager.state(el).context("tracked")?;
    assert!(state.frozen);
    assert!(state.has_entered_once);

    let events = scene.events();
    assert_eq!(
        events,
        vec![MotionEvent::ElementEnter { element: el }, MotionEvent::ElementLeave { element: el }]
    );

    scene.scroll_to(100.0);
    scene.scroll_to(50.0);
    assert_eq!(scene.opacity(el)?, 1.0);
    assert!(scene.doc.has_class(el, "is-in"));
    assert!(scene.events().is_empty());
    assert_eq!(scene.manager.metrics().frozen, 1);
    Ok(())
}

#[test]
fn once_elements_keep_entered_state_when_scrolled_back_up() -> Result<()> {
    let mut scene = Scene::new(MotionManager::new(ScrollyConfig::default()));
    let el = scene.add(TOP, 400.0, "enter:10vh;once:true", Some("from:opacity-0 to:opacity-100"));
    let list = scene.add(
        TOP,
        400.0,
        "enter:10vh;once:true",
        Some("[>li]:from:opacity-0;to:opacity-100|stagger-0.1"),
    );
    let items: Vec<_> = (0..3).map(|_| scene.doc.add_child(list, "li")).collect();
    scene.start();

    scene.scroll_to(300.0);
    assert!((scene.opacity(el)? - 0.75).abs() < 1e-9);
    let entered: Vec<f64> = items.iter().map(|item| scene.opacity(*item)).collect::<Result<_>>()?;
    assert!(entered.iter().all(|opacity| *opacity > 0.0), "{entered:?}");

    // Back above the enter point: progress drops to 0 and both freeze.
    scene.scroll_to(0.0);
    assert!(scene.manager.state(el).is_some_and(|s| s.frozen));
    assert!(scene.manager.state(list).is_some_and(|s| s.frozen));
    assert!((scene.opacity(el)? - 0.75).abs() < 1e-9);
    let held: Vec<f64> = items.iter().map(|item| scene.opacity(*item)).collect::<Result<_>>()?;
    assert_eq!(held, entered);

    scene.scroll_to(200.0);
    assert!((scene.opacity(el)? - 0.75).abs() < 1e-9);
    Ok(())
}

#[test]
fn damped_once_element_freezes_at_its_smoothed_progress() -> Result<()> {
    let mut scene = Scene::new(MotionManager::new(ScrollyConfig::default()));
    let el = scene.add(
        TOP,
        400.0,
        "enter:10vh;exit:40vh;once:true;damping:0.2",
        Some("from:opacity-0 to:opacity-100"),
    );
    scene.start();

    scene.scroll_to(100.0);
    let entered = scene.opacity(el)?;
    assert!(entered > 0.0 && entered < 0.25, "{entered}");

    scene.scroll_to(900.0);
    let state = scene.manager.state(el).context("tracked")?;
    assert!(state.frozen);
    let held = scene.opacity(el)?;
    assert!(held > entered && held < 1.0, "jumped to {held}");
    assert!((held - state.progress.current).abs() < 1e-9);
    Ok(())
}

#[test]
fn classes_follow_view_state() {
    let mut scene = Scene::new(MotionManager::new(ScrollyConfig::default()));
    let el = scene.add(TOP, 400.0, "enter:10vh;exit:40vh;class:'is-in shown';leaveClass:is-out", None);
    scene.start();

    scene.scroll_to(100.0);
    assert!(scene.doc.has_class(el, "is-in"));
    assert!(scene.doc.has_class(el, "shown"));
    assert!(!scene.doc.has_class(el, "is-out"));

    scene.scroll_to(900.0);
    assert!(!scene.doc.has_class(el, "is-in"));
    assert!(scene.doc.has_class(el, "is-out"));

    scene.scroll_to(300.0);
    assert!(scene.doc.has_class(el, "is-in"));
    assert!(!scene.doc.has_class(el, "is-out"));
}

#[test]
fn leaving_the_viewport_still_reports_leave() {
    let mut scene = Scene::new(MotionManager::new(ScrollyConfig::default()));
    let el = scene.add(TOP, 400.0, "enter:10vh", None);
    scene.start();

    scene.scroll_to(100.0);
    assert!(scene.manager.state(el).is_some_and(|s| s.in_view));
    scene.events();

    // Far above the enter point the element no longer intersects either.
    scene.scroll_to(-1200.0);
    assert!(scene.manager.state(el).is_some_and(|s| !s.in_view));
    assert_eq!(scene.events(), vec![MotionEvent::ElementLeave { element: el }]);
}

#[test]
fn theme_follows_last_element_in_view() -> Result<()> {
    let manager = MotionManager::builder().module(ThemeModule::new()).build()?;
    let mut scene = Scene::new(manager);
    scene.add(TOP, 400.0, "enter:10vh;exit:40vh;theme:dark", None);
    scene.add(1600.0, 400.0, "enter:10vh;theme:light", None);
    scene.start();
    assert_eq!(scene.manager.theme(), None);

    scene.scroll_to(100.0);
    assert_eq!(scene.manager.theme(), Some("dark"));
    assert_eq!(scene.doc.root_attribute(THEME_ATTRIBUTE), Some("dark"));

    scene.scroll_to(1500.0);
    assert_eq!(scene.manager.theme(), Some("light"));

    scene.scroll_to(100.0);
    assert_eq!(scene.doc.root_attribute(THEME_ATTRIBUTE), Some("dark"));

    let themes: Vec<_> = scene
        .events()
        .into_iter()
        .filter_map(|event| match event {
            MotionEvent::ThemeChange { theme } => Some(theme),
            _ => None,
        })
        .collect();
    assert_eq!(
        themes,
        vec![Some("dark".to_string()), Some("light".to_string()), Some("dark".to_string())]
    );

    scene.manager.stop(&mut scene.doc);
    assert_eq!(scene.doc.root_attribute(THEME_ATTRIBUTE), None);
    Ok(())
}

struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    fn push(&self, call: String) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call);
        }
    }
}

impl ProgressWidget for Recorder {
    fn capabilities(&self) -> WidgetCapabilities {
        WidgetCapabilities::ALL
    }

    fn progress(&mut self, value: f64) -> Result<(), ModuleError> {
        self.push(format!("progress {value}"));
        Ok(())
    }

    fn enter(&mut self) -> Result<(), ModuleError> {
        self.push("enter".to_string());
        Ok(())
    }

    fn leave(&mut self) -> Result<(), ModuleError> {
        Err(ModuleError::failed("chart", "leave not supported"))
    }
}

#[test]
fn widgets_receive_progress_and_enter() -> Result<()> {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let shared = Arc::clone(&calls);
    let factory = move |_: ElementId| -> Option<Box<dyn ProgressWidget>> {
        Some(Box::new(Recorder(Arc::clone(&shared))))
    };

    let manager = MotionManager::builder().module(WidgetModule::new(factory)).build()?;
    let mut scene = Scene::new(manager);
    let el = scene.add(TOP, 400.0, "enter:10vh;exit:40vh;wc:chart", None);
    scene.doc.add_child(el, "chart");
    scene.start();

    scene.scroll_to(100.0);
    // A failing widget does not stop the frame.
    scene.scroll_to(900.0);
    assert!(scene.manager.state(el).is_some_and(|s| !s.in_view));

    let calls = calls.lock().map_err(|_| anyhow::anyhow!("poisoned"))?.clone();
    assert_eq!(calls, ["progress 0.125", "enter", "progress 1"]);
    Ok(())
}

#[test]
fn resize_is_debounced_and_remeasures() -> Result<()> {
    let mut scene = Scene::new(MotionManager::new(ScrollyConfig::default()));
    let el = scene.add(
        TOP,
        400.0,
        "enter:10vh",
        Some("from:opacity-0 to:opacity-100 @desktop:from:scale-50 to:scale-100"),
    );
    scene.start();

    let breakpoint = |scene: &Scene| match &scene.manager.state(el)?.animation {
        Some(ResolvedAnimation::Simple(config)) => Some(config.breakpoint.clone()),
        _ => None,
    };
    assert_eq!(breakpoint(&scene).as_deref(), Some("desktop"));

    scene.doc.set_viewport(600.0, VH);
    scene.doc.set_geometry(el, Geometry { top: 1000.0, height: 400.0 });
    scene.manager.on_resize(100.0);
    scene.manager.on_resize(150.0);
    assert_eq!(scene.manager.next_timer(), Some(350.0));

    assert!(!scene.manager.poll_timers(&mut scene.doc, 300.0));
    assert_eq!(breakpoint(&scene).as_deref(), Some("desktop"));

    assert!(scene.manager.poll_timers(&mut scene.doc, 350.0));
    assert_eq!(breakpoint(&scene).as_deref(), Some("default"));
    let thresholds = scene.manager.state(el).context("tracked")?.thresholds;
    assert_eq!(thresholds.enter_at, 280.0);
    assert_eq!(scene.manager.next_timer(), None);
    Ok(())
}

#[test]
fn momentum_settles_after_scrolling_stops() -> Result<()> {
    let mut scene = Scene::new(MotionManager::new(ScrollyConfig::default()));
    let el = scene.add(
        TOP,
        400.0,
        "enter:10vh;damping:0.2;friction:0.9",
        Some("from:opacity-0 to:opacity-100"),
    );
    scene.start();

    assert!(scene.scroll_to(200.0));
    let first = scene.manager.state(el).context("tracked")?.progress.current;
    assert!(first > 0.0 && first < 0.5, "damped step went to {first}");
    assert!(scene.manager.is_scrolling());

    let mut frames = 0;
    while scene.frame() {
        frames += 1;
        assert!(frames < 2000, "smoothing never settled");
    }
    assert!(!scene.manager.is_scrolling());

    let state = scene.manager.state(el).context("tracked")?;
    assert_eq!(state.progress.current, 0.5);
    assert!(state.progress.is_settled());
    assert!((scene.opacity(el)? - 0.5).abs() < 0.001);
    assert_eq!(scene.manager.metrics().moving, 0);
    Ok(())
}

#[test]
fn plugins_resolve_custom_properties() -> Result<()> {
    let hue = FnPlugin::new("hue", |property: &str, raw: &str| {
        (property == "hue").then(|| AnimValue::Text(format!("{raw}deg")))
    });
    let manager = MotionManager::builder().plugin(hue).build()?;
    let mut scene = Scene::new(manager);
    let el = scene.add(TOP, 400.0, "enter:10vh", Some("from:hue-10|opacity-0 to:hue-90|opacity-100"));
    scene.start();

    assert_eq!(scene.doc.style(el, "hue"), Some("10deg"));
    assert_eq!(scene.doc.style(el, "opacity"), Some("0"));
    Ok(())
}

#[test]
fn presets_expand_from_config() -> Result<()> {
    let mut config = ScrollyConfig::default();
    config.presets.insert(
        "fade".to_string(),
        PresetSource::Descriptor("from:opacity-0;to:opacity-100".to_string()),
    );
    let mut scene = Scene::new(MotionManager::builder().config(config).build()?);
    let el = scene.add(TOP, 400.0, "enter:10vh", Some("preset:fade"));
    scene.start();
    assert_eq!(scene.doc.style(el, "opacity"), Some("0"));

    scene.scroll_to(100.0);
    assert_eq!(scene.doc.style(el, "opacity"), Some("0.25"));
    Ok(())
}

#[test]
fn stagger_drives_children_in_order() -> Result<()> {
    let mut scene = Scene::new(MotionManager::new(ScrollyConfig::default()));
    let el = scene.add(TOP, 400.0, "enter:10vh", Some("[>li]:from:opacity-0;to:opacity-100|stagger-0.1"));
    let items: Vec<_> = (0..3).map(|_| scene.doc.add_child(el, "li")).collect();
    scene.start();

    assert_eq!(scene.manager.state(el).context("tracked")?.children, items);
    for item in &items {
        assert_eq!(scene.opacity(*item)?, 0.0);
    }

    scene.scroll_to(120.0);
    let partial: Vec<f64> = items.iter().map(|item| scene.opacity(*item)).collect::<Result<_>>()?;
    assert!(partial[0] > partial[1] && partial[1] > partial[2], "{partial:?}");

    scene.scroll_to(400.0);
    for item in &items {
        assert_eq!(scene.opacity(*item)?, 1.0);
    }
    Ok(())
}

#[test]
fn untracked_elements_are_left_alone() {
    let mut scene = Scene::new(MotionManager::new(ScrollyConfig::default()));
    let el = scene.add(TOP, 400.0, "enter:10vh", Some("from:opacity-0 to:opacity-100"));
    scene.start();

    assert!(scene.manager.untrack(el).is_some());
    scene.doc.take_style_log();
    scene.scroll_to(200.0);
    assert!(scene.doc.style_log().iter().all(|record| record.element != el));
    assert!(scene.manager.is_empty());
}
