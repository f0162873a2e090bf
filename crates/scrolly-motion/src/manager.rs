//! Scroll animation manager.
//!
//! The `MotionManager` ties the engine together. It handles:
//! - Tracking elements and measuring their thresholds
//! - Collapsing scroll bursts into one frame and debouncing resizes
//! - Advancing progress smoothing and applying interpolated styles
//! - Toggling enter/leave classes and queuing lifecycle events
//! - Driving feature modules
//!
//! The manager never schedules anything itself. The host forwards its
//! notifications and schedules a frame whenever a call returns `true`.
//!
//! # Usage
//!
//! ```ignore
//! use scrolly_motion::{ElementDescriptors, MotionManager, ThemeModule};
//!
//! let mut manager = MotionManager::builder()
//!     .config(config)
//!     .module(ThemeModule::new())
//!     .build()?;
//!
//! manager.track(hero, ElementDescriptors::new().animation("from:opacity-0 to:opacity-100"));
//! manager.start(&mut document);
//!
//! // Host callbacks
//! manager.on_intersection(&[(hero, true)]);
//! if manager.on_scroll(now) {
//!     // request an animation frame, then:
//!     manager.on_frame(&mut document, now);
//! }
//! ```

use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, trace, warn};

use scrolly_config::{PresetSource, PresetValue, ScrollyConfig};

use crate::breakpoint::WidthConditions;
use crate::element::{ElementDescriptors, ElementState};
use crate::error::{BuildError, RegistryError};
use crate::events::{EventQueue, MotionEvent};
use crate::grammar::{self, Presets};
use crate::host::DocumentHost;
use crate::interpolate::interpolate_config;
use crate::module::{ElementUpdate, ElementView, ModuleContext, ModuleSet, MotionModule};
use crate::physics::FRAME_BUDGET_MS;
use crate::plugin::{PluginRegistry, PropertyPlugin};
use crate::stagger::stagger_values;
use crate::style::{apply_one, apply_progress, apply_values};
use crate::theme::ThemeContext;
use crate::threshold::{ConfigValue, DEFAULT_SCROLL_CONFIG, ScrollConfig, Thresholds};
use crate::timeline::parse_timeline;
use crate::transition::transition_style;
use crate::types::{AnimValue, ElementId, ResolvedAnimation, TimelineStep};
use crate::value::ValueResolver;

/// Root attribute carrying the scroll direction (`up`/`down`).
pub const SCROLL_DIRECTION_ATTRIBUTE: &str = "data-scroll-direction";

/// Scroll offset below which the direction always reads `up`.
pub const DIRECTION_THRESHOLD: f64 = 300.0;

/// Smallest progress change written back to the host.
const MIN_APPLY_DIFF: f64 = 0.0001;

/// Snapshot of manager activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MotionMetrics {
    pub tracked: usize,
    /// Elements that resolved an animation or stagger config.
    pub animated: usize,
    pub intersecting: usize,
    pub in_view: usize,
    pub frozen: usize,
    /// Elements whose smoothing has not settled.
    pub moving: usize,
    pub frames: u64,
    pub style_writes: u64,
    pub running: bool,
    pub scrolling: bool,
}

/// Builder for [`MotionManager`].
#[derive(Default)]
pub struct MotionManagerBuilder {
    config: Option<ScrollyConfig>,
    config_file: Option<PathBuf>,
    modules: Vec<Box<dyn MotionModule>>,
    plugins: Vec<Box<dyn PropertyPlugin>>,
    presets: Vec<(String, Vec<TimelineStep>)>,
}

impl fmt::Debug for MotionManagerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionManagerBuilder")
            .field("config", &self.config)
            .field("config_file", &self.config_file)
            .field("modules", &self.modules.iter().map(|m| m.name()).collect::<Vec<_>>())
            .field("plugins", &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("presets", &self.presets.iter().map(|(name, _)| name).collect::<Vec<_>>())
            .finish()
    }
}

impl MotionManagerBuilder {
    pub fn config(mut self, config: ScrollyConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load configuration from a TOML file at build time. Takes precedence
    /// over [`config`](Self::config).
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn module(mut self, module: impl MotionModule + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn plugin(mut self, plugin: impl PropertyPlugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Add a named timeline. Overrides a configured preset of the same name.
    pub fn preset(mut self, name: impl Into<String>, steps: Vec<TimelineStep>) -> Self {
        self.presets.push((name.into(), steps));
        self
    }

    /// Build the manager.
    ///
    /// Fails on an unreadable or structurally invalid config file and on a
    /// duplicate module name. A duplicate plugin is logged and dropped.
    pub fn build(self) -> Result<MotionManager, BuildError> {
        let config = match self.config_file {
            Some(path) => ScrollyConfig::load_from_file(&path)?.config,
            None => self.config.unwrap_or_default(),
        };

        let mut plugins = PluginRegistry::new();
        for plugin in self.plugins {
            if let Err(err) = plugins.register(plugin) {
                debug!(%err, "plugin skipped");
            }
        }

        let mut modules = ModuleSet::new();
        for module in self.modules {
            modules.register(module)?;
        }

        let mut presets = config_presets(&config, &plugins);
        for (name, mut steps) in self.presets {
            steps.sort_by(|a, b| a.at.total_cmp(&b.at));
            presets.insert(name, steps);
        }

        Ok(MotionManager::from_parts(config, plugins, modules, presets))
    }
}

/// Timelines for every configured preset.
fn config_presets(config: &ScrollyConfig, plugins: &PluginRegistry) -> Presets {
    let resolver = ValueResolver::with_plugins(plugins);
    config
        .presets
        .iter()
        .map(|(name, source)| {
            let mut steps = match source {
                PresetSource::Descriptor(text) => parse_timeline(text, &resolver),
                PresetSource::Steps(steps) => steps
                    .iter()
                    .map(|step| TimelineStep {
                        at: step.at,
                        properties: step
                            .properties
                            .iter()
                            .map(|(key, value)| {
                                let value = match value {
                                    PresetValue::Number(n) => AnimValue::Number(*n),
                                    PresetValue::Text(text) => AnimValue::Text(text.clone()),
                                };
                                (key.clone(), value)
                            })
                            .collect(),
                    })
                    .collect(),
            };
            steps.sort_by(|a, b| a.at.total_cmp(&b.at));
            (name.clone(), steps)
        })
        .collect()
}

/// Inputs shared by every element in one frame.
#[derive(Debug, Clone, Copy)]
struct Frame {
    scroll_y: f64,
    scrolling: bool,
    dt_ms: f64,
}

/// Read-only inputs for a measurement pass.
struct Measure<'a> {
    resolver: ValueResolver<'a>,
    presets: &'a Presets,
    conditions: &'a WidthConditions,
    default_enter: &'a ConfigValue,
}

/// Central coordinator for every scroll-driven element.
#[derive(Debug)]
pub struct MotionManager {
    config: ScrollyConfig,
    default_enter: ConfigValue,
    plugins: PluginRegistry,
    presets: Presets,
    conditions: WidthConditions,
    modules: ModuleSet,

    /// Side table of element state, in tracking order.
    elements: IndexMap<ElementId, ElementState>,

    event_queue: EventQueue,
    theme: ThemeContext,

    running: bool,
    /// A frame has been requested and not yet run.
    frame_pending: bool,
    scrolling: bool,
    last_scroll_at: Option<f64>,
    resize_due: Option<f64>,
    last_frame_at: Option<f64>,
    prev_scroll_y: f64,
    direction: Option<&'static str>,

    frames: u64,
    style_writes: u64,
}

impl MotionManager {
    pub fn builder() -> MotionManagerBuilder {
        MotionManagerBuilder::default()
    }

    /// A manager without modules or plugins.
    pub fn new(config: ScrollyConfig) -> Self {
        let presets = config_presets(&config, &PluginRegistry::new());
        Self::from_parts(config, PluginRegistry::new(), ModuleSet::new(), presets)
    }

    fn from_parts(config: ScrollyConfig, plugins: PluginRegistry, modules: ModuleSet, presets: Presets) -> Self {
        let default_enter = ConfigValue::coerce(&config.default_enter);
        let conditions = WidthConditions::from_queries(&config.breakpoints);
        Self {
            config,
            default_enter,
            plugins,
            presets,
            conditions,
            modules,
            elements: IndexMap::new(),
            event_queue: EventQueue::new(),
            theme: ThemeContext::new(),
            running: false,
            frame_pending: false,
            scrolling: false,
            last_scroll_at: None,
            resize_due: None,
            last_frame_at: None,
            prev_scroll_y: 0.0,
            direction: None,
            frames: 0,
            style_writes: 0,
        }
    }

    pub fn config(&self) -> &ScrollyConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// The active page theme.
    pub fn theme(&self) -> Option<&str> {
        self.theme.active()
    }

    pub fn presets(&self) -> &Presets {
        &self.presets
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.names()
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains(name)
    }

    // ========================================================================
    // Elements
    // ========================================================================

    /// Start tracking an element.
    ///
    /// Tracking an already tracked element replaces its descriptors and
    /// re-measures it on the next frame. Elements carrying no descriptor are
    /// ignored. Returns whether the element was newly tracked.
    pub fn track(&mut self, element: ElementId, descriptors: ElementDescriptors) -> bool {
        if descriptors.is_empty() {
            debug!(%element, "no descriptors, not tracking");
            return false;
        }
        match self.elements.get_mut(&element) {
            Some(state) => {
                state.descriptors = descriptors;
                state.measured = false;
                false
            }
            None => {
                trace!(%element, "tracking");
                self.elements.insert(element, ElementState::new(descriptors));
                true
            }
        }
    }

    /// Stop tracking an element and drop its state.
    pub fn untrack(&mut self, element: ElementId) -> Option<ElementState> {
        let state = self.elements.shift_remove(&element)?;
        self.modules.remove_element(element);
        trace!(%element, "untracked");
        Some(state)
    }

    pub fn state(&self, element: ElementId) -> Option<&ElementState> {
        self.elements.get(&element)
    }

    pub fn tracked(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Register a plugin. It applies from the next measurement on.
    pub fn register_plugin(&mut self, plugin: impl PropertyPlugin + 'static) -> Result<(), RegistryError> {
        self.plugins.register(Box::new(plugin))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Initialise modules and measure every tracked element.
    ///
    /// Returns whether the host should schedule a frame.
    pub fn start(&mut self, host: &mut dyn DocumentHost) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.conditions.set_width(host.viewport_width());
        self.prev_scroll_y = host.scroll_y();

        let mut cx = ModuleContext {
            host: &mut *host,
            events: &mut self.event_queue,
            theme: &mut self.theme,
        };
        self.modules.dispatch("init", |m| m.init(&mut cx));

        let measured = self.measure(host, false);
        debug!(
            elements = self.elements.len(),
            measured,
            modules = ?self.modules.names(),
            breakpoints = ?self.conditions.active(),
            "motion started"
        );
        self.request_frame()
    }

    /// Tear down: destroy modules and drop every element's state.
    ///
    /// A frame the host already queued becomes a no-op.
    pub fn stop(&mut self, host: &mut dyn DocumentHost) {
        if !self.running {
            return;
        }
        let mut cx = ModuleContext {
            host,
            events: &mut self.event_queue,
            theme: &mut self.theme,
        };
        self.modules.dispatch("destroy", |m| m.destroy(&mut cx));

        self.elements.clear();
        self.running = false;
        self.frame_pending = false;
        self.scrolling = false;
        self.last_scroll_at = None;
        self.resize_due = None;
        self.last_frame_at = None;
        self.direction = None;
        debug!("motion stopped");
    }

    // ========================================================================
    // Host notifications
    // ========================================================================

    /// Ask for a frame. Returns `false` when one is already pending.
    pub fn request_frame(&mut self) -> bool {
        if !self.running || self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// The page scrolled. Returns whether the host should schedule a frame.
    pub fn on_scroll(&mut self, now_ms: f64) -> bool {
        if !self.running {
            return false;
        }
        self.scrolling = true;
        self.last_scroll_at = Some(now_ms);
        self.request_frame()
    }

    /// The viewport resized. Re-measurement runs once resizing has been quiet
    /// for the configured debounce window; see [`poll_timers`](Self::poll_timers).
    pub fn on_resize(&mut self, now_ms: f64) {
        if self.running {
            self.resize_due = Some(now_ms + self.config.timing.resize_debounce_ms);
        }
    }

    /// Viewport membership changes. Returns whether the host should schedule a frame.
    pub fn on_intersection(&mut self, entries: &[(ElementId, bool)]) -> bool {
        let mut changed = false;
        for (element, intersecting) in entries {
            if let Some(state) = self.elements.get_mut(element) {
                changed |= state.intersecting != *intersecting;
                state.intersecting = *intersecting;
            }
        }
        changed && self.request_frame()
    }

    /// When [`poll_timers`](Self::poll_timers) next has work to do.
    pub fn next_timer(&self) -> Option<f64> {
        let scroll_stop = self
            .last_scroll_at
            .filter(|_| self.scrolling)
            .map(|at| at + self.config.timing.scroll_stop_ms);
        match (scroll_stop, self.resize_due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire due timers: end of scrolling and debounced resize.
    ///
    /// Returns whether the host should schedule a frame.
    pub fn poll_timers(&mut self, host: &mut dyn DocumentHost, now_ms: f64) -> bool {
        if !self.running {
            return false;
        }
        let mut wants_frame = false;

        let scroll_stopped = self
            .last_scroll_at
            .is_some_and(|at| now_ms - at >= self.config.timing.scroll_stop_ms);
        if self.scrolling && scroll_stopped {
            self.scrolling = false;
            let moving = self.elements.values().filter(|s| s.is_moving()).count();
            trace!(moving, "scrolling stopped");
            wants_frame |= moving > 0;
        }

        if self.resize_due.is_some_and(|due| now_ms >= due) {
            self.resize_due = None;
            self.conditions.set_width(host.viewport_width());
            let measured = self.measure(host, false);
            debug!(
                measured,
                width = self.conditions.width(),
                breakpoints = ?self.conditions.active(),
                "re-measured after resize"
            );
            wants_frame = true;
        }

        wants_frame && self.request_frame()
    }

    /// Run one frame.
    ///
    /// Returns whether another frame is needed to let smoothing settle.
    pub fn on_frame(&mut self, host: &mut dyn DocumentHost, now_ms: f64) -> bool {
        if !self.running {
            return false;
        }
        self.frame_pending = false;
        self.frames += 1;

        let dt_ms = self.last_frame_at.map_or(FRAME_BUDGET_MS, |last| now_ms - last);
        self.last_frame_at = Some(now_ms);

        self.measure(host, true);

        let scroll_y = host.scroll_y();
        self.update_direction(host, scroll_y);

        let frame = Frame {
            scroll_y,
            scrolling: self.scrolling,
            dt_ms,
        };
        let mut keep_going = false;
        let mut updated = 0usize;

        for (&element, state) in self.elements.iter_mut() {
            if !state.wants_update() {
                continue;
            }
            updated += 1;
            let (moving, writes) = advance(element, state, frame, host, &mut self.event_queue);
            keep_going |= moving;
            self.style_writes += writes as u64;

            let update = ElementUpdate {
                element,
                progress: state.progress.current,
                in_view: state.in_view,
                scroll: &state.scroll,
            };
            let mut cx = ModuleContext {
                host: &mut *host,
                events: &mut self.event_queue,
                theme: &mut self.theme,
            };
            self.modules.dispatch("update_element", |m| m.update_element(&update, &mut cx));
        }

        if updated > 0 {
            let mut cx = ModuleContext {
                host: &mut *host,
                events: &mut self.event_queue,
                theme: &mut self.theme,
            };
            self.modules.dispatch("frame_end", |m| m.frame_end(&mut cx));
        }

        trace!(updated, keep_going, scroll_y, "frame");
        keep_going && self.request_frame()
    }

    fn update_direction(&mut self, host: &mut dyn DocumentHost, scroll_y: f64) {
        if self.direction.is_some() && scroll_y == self.prev_scroll_y {
            return;
        }
        let direction = if scroll_y >= DIRECTION_THRESHOLD && scroll_y > self.prev_scroll_y {
            "down"
        } else {
            "up"
        };
        self.prev_scroll_y = scroll_y;
        if self.direction != Some(direction) {
            host.set_root_attribute(SCROLL_DIRECTION_ATTRIBUTE, Some(direction));
            self.direction = Some(direction);
        }
    }

    /// Measure tracked elements (only unmeasured ones when `pending_only`).
    fn measure(&mut self, host: &mut dyn DocumentHost, pending_only: bool) -> usize {
        let env = Measure {
            resolver: ValueResolver::with_plugins(&self.plugins),
            presets: &self.presets,
            conditions: &self.conditions,
            default_enter: &self.default_enter,
        };
        let mut measured = 0;

        for (&element, state) in self.elements.iter_mut() {
            if pending_only && state.measured {
                continue;
            }
            let Some(writes) = measure_element(element, state, &env, host) else {
                continue;
            };
            measured += 1;
            self.style_writes += writes as u64;

            let view = ElementView {
                element,
                scroll: &state.scroll,
                animation: state.animation.as_ref(),
            };
            let mut cx = ModuleContext {
                host: &mut *host,
                events: &mut self.event_queue,
                theme: &mut self.theme,
            };
            self.modules.dispatch("parse_element", |m| m.parse_element(&view, &mut cx));
        }
        measured
    }

    // ========================================================================
    // Events and metrics
    // ========================================================================

    /// Drain all pending events, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = MotionEvent> + '_ {
        self.event_queue.drain()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    /// Pending events concerning `element`, without removing them.
    pub fn events_for_element(&self, element: ElementId) -> Vec<&MotionEvent> {
        self.event_queue.events_for_element(element)
    }

    pub fn metrics(&self) -> MotionMetrics {
        let states = self.elements.values();
        MotionMetrics {
            tracked: self.elements.len(),
            animated: states.clone().filter(|s| s.animation.is_some()).count(),
            intersecting: states.clone().filter(|s| s.intersecting).count(),
            in_view: states.clone().filter(|s| s.in_view).count(),
            frozen: states.clone().filter(|s| s.frozen).count(),
            moving: states.filter(|s| s.is_moving()).count(),
            frames: self.frames,
            style_writes: self.style_writes,
            running: self.running,
            scrolling: self.scrolling,
        }
    }
}

// Ensure MotionManager is Send so hosts can move it between threads
static_assertions::assert_impl_all!(MotionManager: Send);

/// Measure one element: thresholds, smoothing coefficients, the active
/// animation variant and stagger children.
///
/// Returns the number of style writes, or `None` when the host has no
/// geometry for the element.
fn measure_element(
    element: ElementId,
    state: &mut ElementState,
    env: &Measure<'_>,
    host: &mut dyn DocumentHost,
) -> Option<usize> {
    let Some(geometry) = host.geometry(element) else {
        warn!(%element, "no geometry, skipping measurement");
        return None;
    };

    let scroll = match (&state.descriptors.scroll, &state.descriptors.animation) {
        (Some(source), _) => ScrollConfig::parse(source),
        (None, Some(_)) => ScrollConfig::parse(DEFAULT_SCROLL_CONFIG),
        (None, None) => ScrollConfig::parse(""),
    };
    state.thresholds = Thresholds::compute(&scroll, geometry, host.viewport_height(), env.default_enter);
    state.progress.damping = scroll.damping;
    state.progress.friction = scroll.friction;
    state.scroll = scroll;

    state.animation = state.descriptors.animation.as_deref().and_then(|source| {
        match grammar::parse_descriptor(source, env.resolver, env.presets, env.conditions) {
            Ok(animation) => animation,
            Err(err) => {
                warn!(%element, %err, "ignoring animation descriptor");
                None
            }
        }
    });

    state.children = match &state.animation {
        Some(ResolvedAnimation::Stagger(config)) => {
            let children = host.select_children(element, &config.selector);
            if children.is_empty() {
                debug!(%element, selector = %config.selector, "stagger selector matched nothing");
            }
            children
        }
        _ => Vec::new(),
    };

    let mut writes = 0;
    if !state.measured {
        writes += apply_initial_state(element, state, host);
        state.measured = true;
    }
    writes += apply_transition(element, state, host);

    debug!(
        %element,
        enter_at = state.thresholds.enter_at,
        exit_at = state.thresholds.exit_at,
        distance = state.thresholds.distance,
        animated = state.animation.is_some(),
        "measured"
    );
    Some(writes)
}

/// The `from` values (or the `at == 0` step) and `--element-progress: 0.000`.
fn apply_initial_state(element: ElementId, state: &ElementState, host: &mut dyn DocumentHost) -> usize {
    let mut writes = 0;
    if let Some(animation) = &state.animation {
        if let Some(initial) = animation.animation().initial_values() {
            writes += match animation {
                ResolvedAnimation::Simple(_) => apply_values(host, element, initial),
                ResolvedAnimation::Stagger(_) => state
                    .children
                    .iter()
                    .map(|child| apply_values(host, *child, initial))
                    .sum(),
            };
        }
    }
    writes + usize::from(apply_progress(host, element, 0.0))
}

fn apply_transition(element: ElementId, state: &ElementState, host: &mut dyn DocumentHost) -> usize {
    let Some(animation) = &state.animation else {
        return 0;
    };
    let transition = transition_style(animation.animation());
    if transition.is_empty() {
        return 0;
    }
    let targets = match animation {
        ResolvedAnimation::Simple(_) => std::slice::from_ref(&element),
        ResolvedAnimation::Stagger(_) => state.children.as_slice(),
    };
    targets
        .iter()
        .filter(|target| apply_one(host, **target, "transition", &transition))
        .count()
}

/// Advance one element by one frame.
///
/// Returns whether smoothing needs another frame and how many styles were written.
fn advance(
    element: ElementId,
    state: &mut ElementState,
    frame: Frame,
    host: &mut dyn DocumentHost,
    events: &mut EventQueue,
) -> (bool, usize) {
    let target = state.thresholds.progress(frame.scroll_y);
    state.progress.set_target(target);
    let mut moving = state.progress.step(frame.scrolling, frame.dt_ms);

    let in_view = state.thresholds.in_view(state.progress.current, frame.scroll_y);
    if in_view {
        if !state.in_view {
            debug!(%element, progress = state.progress.current, "element enter");
            events.push(MotionEvent::ElementEnter { element });
        }
        state.has_entered_once = true;
        toggle_classes(host, element, &state.scroll, true);
    } else {
        if state.in_view {
            debug!(%element, progress = state.progress.current, "element leave");
            events.push(MotionEvent::ElementLeave { element });
        }
        if state.scroll.once && state.has_entered_once {
            state.frozen = true;
            moving = false;
            debug!(%element, "once element frozen");
        } else {
            toggle_classes(host, element, &state.scroll, false);
        }
    }
    state.in_view = in_view;

    // A frozen element keeps its entered state: it may still finish moving
    // forward on the frame it freezes but never rewinds.
    let progress = state.progress.current;
    let changed = state.last_applied.is_none_or(|last| {
        (last - progress).abs() >= MIN_APPLY_DIFF && (!state.frozen || progress > last)
    });
    let mut writes = 0;
    if changed {
        writes += apply_animation(element, state, progress, host);
        writes += usize::from(apply_progress(host, element, progress));
        state.last_applied = Some(progress);
    }
    (moving, writes)
}

fn toggle_classes(host: &mut dyn DocumentHost, element: ElementId, scroll: &ScrollConfig, entered: bool) {
    let (add, remove) = if entered {
        (&scroll.enter_classes, &scroll.leave_classes)
    } else {
        (&scroll.leave_classes, &scroll.enter_classes)
    };
    for class in remove {
        host.remove_class(element, class);
    }
    for class in add {
        host.add_class(element, class);
    }
}

fn apply_animation(element: ElementId, state: &ElementState, progress: f64, host: &mut dyn DocumentHost) -> usize {
    match &state.animation {
        Some(ResolvedAnimation::Simple(config)) => apply_values(host, element, &interpolate_config(config, progress)),
        Some(ResolvedAnimation::Stagger(config)) => state
            .children
            .iter()
            .zip(stagger_values(config, state.children.len(), progress, state.scroll.once))
            .map(|(child, values)| apply_values(host, *child, &values))
            .sum(),
        None => 0,
    }
}
