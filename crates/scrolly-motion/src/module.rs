//! Optional feature modules.
//!
//! A module observes the element lifecycle through hooks that all default to
//! no-ops. Hooks return `Result`; the manager logs a failing hook and keeps
//! going, so one broken module never stalls the others.
//!
//! Two modules ship with the crate:
//! - [`ThemeModule`] drives the shared theme from each element's `theme` key
//! - [`WidgetModule`] forwards progress and enter/leave to embedded widgets

use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{ModuleError, RegistryError};
use crate::events::EventQueue;
use crate::host::DocumentHost;
use crate::theme::ThemeContext;
use crate::threshold::ScrollConfig;
use crate::types::{ElementId, ResolvedAnimation};

/// Shared state a hook may read or write.
pub struct ModuleContext<'a> {
    pub host: &'a mut dyn DocumentHost,
    pub events: &'a mut EventQueue,
    pub theme: &'a mut ThemeContext,
}

/// An element right after measurement.
#[derive(Debug, Clone, Copy)]
pub struct ElementView<'a> {
    pub element: ElementId,
    pub scroll: &'a ScrollConfig,
    pub animation: Option<&'a ResolvedAnimation>,
}

/// An element after a frame update.
#[derive(Debug, Clone, Copy)]
pub struct ElementUpdate<'a> {
    pub element: ElementId,
    /// Progress after smoothing.
    pub progress: f64,
    pub in_view: bool,
    pub scroll: &'a ScrollConfig,
}

/// A named feature module.
pub trait MotionModule: Send {
    fn name(&self) -> &str;

    /// Called once when the manager starts.
    fn init(&mut self, _cx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Called once when the manager stops.
    fn destroy(&mut self, _cx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Called after every measurement of an element.
    fn parse_element(&mut self, _element: &ElementView<'_>, _cx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Called for every element updated in a frame.
    fn update_element(
        &mut self,
        _update: &ElementUpdate<'_>,
        _cx: &mut ModuleContext<'_>,
    ) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Called once at the end of every frame that updated at least one element.
    fn frame_end(&mut self, _cx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Called when an element is untracked.
    fn remove_element(&mut self, _element: ElementId) {}
}

/// Registered modules in registration order, unique by name.
#[derive(Default)]
pub struct ModuleSet {
    modules: Vec<Box<dyn MotionModule>>,
}

impl fmt::Debug for ModuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: Box<dyn MotionModule>) -> Result<(), RegistryError> {
        if self.contains(module.name()) {
            return Err(RegistryError::DuplicateModule(module.name().to_string()));
        }
        debug!(module = module.name(), "module registered");
        self.modules.push(module);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.iter().any(|m| m.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Run `hook` on every module. Failures are logged; returns how many failed.
    pub fn dispatch<F>(&mut self, hook: &'static str, mut call: F) -> usize
    where
        F: FnMut(&mut dyn MotionModule) -> Result<(), ModuleError>,
    {
        let mut failures = 0;
        for module in &mut self.modules {
            if let Err(err) = call(module.as_mut()) {
                warn!(module = module.name(), hook, %err, "module hook failed");
                failures += 1;
            }
        }
        failures
    }

    pub fn remove_element(&mut self, element: ElementId) {
        for module in &mut self.modules {
            module.remove_element(element);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ThemedElement {
    theme: String,
    in_view: bool,
}

/// Keeps the page theme in sync with the themed elements in view.
///
/// The active theme is the theme of the last in-view themed element in
/// discovery order. With none in view the theme is cleared. The choice is
/// made once per frame so a frame never flips the theme back and forth.
#[derive(Debug, Default)]
pub struct ThemeModule {
    elements: IndexMap<ElementId, ThemedElement>,
}

impl ThemeModule {
    pub const NAME: &'static str = "themes";

    pub fn new() -> Self {
        Self::default()
    }

    /// Theme the current set of in-view elements selects.
    pub fn selected_theme(&self) -> Option<&str> {
        self.elements
            .values()
            .rev()
            .find(|e| e.in_view)
            .map(|e| e.theme.as_str())
    }
}

impl MotionModule for ThemeModule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn destroy(&mut self, cx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        self.elements.clear();
        cx.theme.set(None, &mut *cx.host, cx.events);
        Ok(())
    }

    fn parse_element(&mut self, element: &ElementView<'_>, _cx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        match &element.scroll.theme {
            Some(theme) => {
                self.elements
                    .entry(element.element)
                    .and_modify(|e| e.theme = theme.clone())
                    .or_insert_with(|| ThemedElement {
                        theme: theme.clone(),
                        in_view: false,
                    });
            }
            None => {
                self.elements.shift_remove(&element.element);
            }
        }
        Ok(())
    }

    fn update_element(&mut self, update: &ElementUpdate<'_>, _cx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        if let Some(themed) = self.elements.get_mut(&update.element) {
            themed.in_view = update.in_view;
        }
        Ok(())
    }

    fn frame_end(&mut self, cx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        let selected = self.selected_theme().map(str::to_string);
        cx.theme.set(selected.as_deref(), &mut *cx.host, cx.events);
        Ok(())
    }

    fn remove_element(&mut self, element: ElementId) {
        self.elements.shift_remove(&element);
    }
}

/// What a widget can respond to. Checked once when the widget is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetCapabilities {
    pub progress: bool,
    pub enter: bool,
    pub leave: bool,
}

impl WidgetCapabilities {
    pub const ALL: Self = Self {
        progress: true,
        enter: true,
        leave: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.progress || self.enter || self.leave)
    }
}

/// An embedded widget that follows its host element's progress.
pub trait ProgressWidget: Send {
    fn capabilities(&self) -> WidgetCapabilities;

    fn progress(&mut self, _value: f64) -> Result<(), ModuleError> {
        Ok(())
    }

    fn enter(&mut self) -> Result<(), ModuleError> {
        Ok(())
    }

    fn leave(&mut self) -> Result<(), ModuleError> {
        Ok(())
    }
}

/// Produces widgets for matched elements.
pub trait WidgetFactory: Send {
    /// The widget living at `element`, or `None` if it is not a widget.
    fn attach(&mut self, element: ElementId) -> Option<Box<dyn ProgressWidget>>;
}

impl<F> WidgetFactory for F
where
    F: FnMut(ElementId) -> Option<Box<dyn ProgressWidget>> + Send,
{
    fn attach(&mut self, element: ElementId) -> Option<Box<dyn ProgressWidget>> {
        self(element)
    }
}

struct AttachedWidget {
    element: ElementId,
    capabilities: WidgetCapabilities,
    widget: Box<dyn ProgressWidget>,
    last_progress: Option<f64>,
    last_in_view: Option<bool>,
}

impl AttachedWidget {
    fn forward(&mut self, update: &ElementUpdate<'_>) {
        if self.capabilities.progress && self.last_progress != Some(update.progress) {
            self.last_progress = Some(update.progress);
            if let Err(err) = self.widget.progress(update.progress) {
                warn!(widget = %self.element, %err, "widget progress failed");
            }
        }
        if self.last_in_view != Some(update.in_view) {
            self.last_in_view = Some(update.in_view);
            let result = match update.in_view {
                true if self.capabilities.enter => self.widget.enter(),
                false if self.capabilities.leave => self.widget.leave(),
                _ => Ok(()),
            };
            if let Err(err) = result {
                warn!(widget = %self.element, %err, "widget enter/leave failed");
            }
        }
    }
}

/// Forwards element progress to widgets matched by the element's `wc` selectors.
///
/// Widgets are resolved on an element's first measurement and kept until the
/// element is untracked.
pub struct WidgetModule {
    factory: Box<dyn WidgetFactory>,
    widgets: IndexMap<ElementId, Vec<AttachedWidget>>,
}

impl fmt::Debug for WidgetModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetModule")
            .field("elements", &self.widgets.len())
            .field("widgets", &self.widget_count())
            .finish()
    }
}

impl WidgetModule {
    pub const NAME: &'static str = "webcomponents";

    pub fn new(factory: impl WidgetFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            widgets: IndexMap::new(),
        }
    }

    pub fn widget_count(&self) -> usize {
        self.widgets.values().map(Vec::len).sum()
    }

    /// Elements carrying widgets attached under `element`.
    pub fn widgets_of(&self, element: ElementId) -> Vec<ElementId> {
        self.widgets
            .get(&element)
            .map(|attached| attached.iter().map(|w| w.element).collect())
            .unwrap_or_default()
    }
}

impl MotionModule for WidgetModule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn destroy(&mut self, _cx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        self.widgets.clear();
        Ok(())
    }

    fn parse_element(&mut self, element: &ElementView<'_>, cx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        if element.scroll.widgets.is_empty() || self.widgets.contains_key(&element.element) {
            return Ok(());
        }

        let mut attached = Vec::new();
        for selector in &element.scroll.widgets {
            for candidate in cx.host.select_children(element.element, selector) {
                let Some(widget) = self.factory.attach(candidate) else {
                    continue;
                };
                let capabilities = widget.capabilities();
                if capabilities.is_empty() {
                    debug!(widget = %candidate, "widget has no capabilities, skipping");
                    continue;
                }
                attached.push(AttachedWidget {
                    element: candidate,
                    capabilities,
                    widget,
                    last_progress: None,
                    last_in_view: None,
                });
            }
        }

        if !attached.is_empty() {
            debug!(element = %element.element, count = attached.len(), "widgets attached");
            self.widgets.insert(element.element, attached);
        }
        Ok(())
    }

    fn update_element(&mut self, update: &ElementUpdate<'_>, _cx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        if let Some(attached) = self.widgets.get_mut(&update.element) {
            for widget in attached {
                widget.forward(update);
            }
        }
        Ok(())
    }

    fn remove_element(&mut self, element: ElementId) {
        self.widgets.shift_remove(&element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryDocument;
    use crate::theme::THEME_ATTRIBUTE;
    use crate::threshold::Geometry;
    use std::sync::{Arc, Mutex};

    struct Named(&'static str);

    impl MotionModule for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn init(&mut self, _cx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
            Err(ModuleError::failed(self.0, "boom"))
        }
    }

    fn scroll(source: &str) -> ScrollConfig {
        ScrollConfig::parse(source)
    }

    #[test]
    fn test_module_set_rejects_duplicates() {
        let mut set = ModuleSet::new();
        set.register(Box::new(Named("a"))).unwrap();
        assert_eq!(
            set.register(Box::new(Named("a"))),
            Err(RegistryError::DuplicateModule("a".into()))
        );
        set.register(Box::new(ThemeModule::new())).unwrap();
        assert_eq!(set.names(), vec!["a", "themes"]);
    }

    #[test]
    fn test_dispatch_isolates_failures() {
        let mut set = ModuleSet::new();
        set.register(Box::new(Named("bad"))).unwrap();
        set.register(Box::new(ThemeModule::new())).unwrap();

        let mut doc = MemoryDocument::new(1280.0, 800.0);
        let mut events = EventQueue::new();
        let mut theme = ThemeContext::new();
        let mut cx = ModuleContext {
            host: &mut doc,
            events: &mut events,
            theme: &mut theme,
        };
        let mut called = Vec::new();
        let failures = set.dispatch("init", |m| {
            called.push(m.name().to_string());
            m.init(&mut cx)
        });
        assert_eq!(failures, 1);
        assert_eq!(called, vec!["bad", "themes"]);
    }

    #[test]
    fn test_theme_last_in_view_wins() {
        let mut doc = MemoryDocument::new(1280.0, 800.0);
        let a = doc.add_element("section", Geometry::default());
        let b = doc.add_element("section", Geometry::default());
        let mut events = EventQueue::new();
        let mut theme = ThemeContext::new();
        let mut module = ThemeModule::new();

        let dark = scroll("theme:dark");
        let light = scroll("theme:light");
        let mut cx = ModuleContext {
            host: &mut doc,
            events: &mut events,
            theme: &mut theme,
        };
        module
            .parse_element(
                &ElementView {
                    element: a,
                    scroll: &dark,
                    animation: None,
                },
                &mut cx,
            )
            .unwrap();
        module
            .parse_element(
                &ElementView {
                    element: b,
                    scroll: &light,
                    animation: None,
                },
                &mut cx,
            )
            .unwrap();

        for (element, scroll) in [(a, &dark), (b, &light)] {
            let update = ElementUpdate {
                element,
                progress: 0.5,
                in_view: true,
                scroll,
            };
            module.update_element(&update, &mut cx).unwrap();
        }
        module.frame_end(&mut cx).unwrap();
        assert_eq!(cx.theme.active(), Some("light"));

        let update = ElementUpdate {
            element: b,
            progress: 1.0,
            in_view: false,
            scroll: &light,
        };
        module.update_element(&update, &mut cx).unwrap();
        module.frame_end(&mut cx).unwrap();
        assert_eq!(cx.theme.active(), Some("dark"));

        module.remove_element(a);
        module.frame_end(&mut cx).unwrap();
        assert_eq!(cx.theme.active(), None);
        assert_eq!(doc.root_attribute(THEME_ATTRIBUTE), None);
        assert_eq!(events.len(), 3);
    }

    #[derive(Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
        capabilities: WidgetCapabilities,
    }

    impl ProgressWidget for Recorder {
        fn capabilities(&self) -> WidgetCapabilities {
            self.capabilities
        }

        fn progress(&mut self, value: f64) -> Result<(), ModuleError> {
            self.calls.lock().unwrap().push(format!("progress {value}"));
            Ok(())
        }

        fn enter(&mut self) -> Result<(), ModuleError> {
            self.calls.lock().unwrap().push("enter".into());
            Ok(())
        }

        fn leave(&mut self) -> Result<(), ModuleError> {
            self.calls.lock().unwrap().push("leave".into());
            Err(ModuleError::failed("widget", "leave not wired"))
        }
    }

    #[test]
    fn test_widgets_forward_on_change() {
        let mut doc = MemoryDocument::new(1280.0, 800.0);
        let section = doc.add_element("section", Geometry::default());
        let counter = doc.add_child(section, "counter");
        doc.add_child(section, "p");

        let calls = Arc::new(Mutex::new(Vec::new()));
        let factory_calls = calls.clone();
        let mut module = WidgetModule::new(move |_element: ElementId| {
            Some(Box::new(Recorder {
                calls: factory_calls.clone(),
                capabilities: WidgetCapabilities::ALL,
            }) as Box<dyn ProgressWidget>)
        });

        let config = scroll("wc:counter");
        let mut events = EventQueue::new();
        let mut theme = ThemeContext::new();
        let mut cx = ModuleContext {
            host: &mut doc,
            events: &mut events,
            theme: &mut theme,
        };
        let view = ElementView {
            element: section,
            scroll: &config,
            animation: None,
        };
        module.parse_element(&view, &mut cx).unwrap();
        module.parse_element(&view, &mut cx).unwrap();
        assert_eq!(module.widgets_of(section), vec![counter]);

        for (progress, in_view) in [(0.25, true), (0.25, true), (0.5, true), (1.0, false)] {
            let update = ElementUpdate {
                element: section,
                progress,
                in_view,
                scroll: &config,
            };
            module.update_element(&update, &mut cx).unwrap();
        }
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["progress 0.25", "enter", "progress 0.5", "progress 1", "leave"]
        );

        module.remove_element(section);
        assert_eq!(module.widget_count(), 0);
    }

    #[test]
    fn test_widget_without_capabilities_is_skipped() {
        let mut doc = MemoryDocument::new(1280.0, 800.0);
        let section = doc.add_element("section", Geometry::default());
        doc.add_child(section, "counter");

        let mut module = WidgetModule::new(|_element: ElementId| {
            Some(Box::new(Recorder::default()) as Box<dyn ProgressWidget>)
        });
        let config = scroll("wc:counter");
        let mut events = EventQueue::new();
        let mut theme = ThemeContext::new();
        let mut cx = ModuleContext {
            host: &mut doc,
            events: &mut events,
            theme: &mut theme,
        };
        let view = ElementView {
            element: section,
            scroll: &config,
            animation: None,
        };
        module.parse_element(&view, &mut cx).unwrap();
        assert_eq!(module.widget_count(), 0);
    }
}
