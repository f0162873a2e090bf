//! Host document interfaces and an in-memory implementation.
//!
//! The engine never touches a real document. It reads geometry and viewport
//! state through [`DocumentHost`] and writes styles, classes and root
//! attributes through [`StyleSink`]. [`MemoryDocument`] implements both and
//! records every write, which is what tests and the headless driver use.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::StyleError;
use crate::threshold::Geometry;
use crate::types::ElementId;

/// Write side of the host document.
pub trait StyleSink {
    /// Set one style property on an element.
    fn set_style(&mut self, element: ElementId, property: &str, value: &str) -> Result<(), StyleError>;

    fn add_class(&mut self, element: ElementId, class: &str);

    fn remove_class(&mut self, element: ElementId, class: &str);

    /// Set (`Some`) or remove (`None`) an attribute on the document root.
    fn set_root_attribute(&mut self, name: &str, value: Option<&str>);
}

/// Read side of the host document.
pub trait DocumentHost: StyleSink {
    fn viewport_width(&self) -> f64;

    fn viewport_height(&self) -> f64;

    /// Current vertical scroll offset.
    fn scroll_y(&self) -> f64;

    /// Document-relative geometry, or `None` when the element is gone.
    fn geometry(&self, element: ElementId) -> Option<Geometry>;

    /// Elements under `element` matching `selector`, in document order.
    ///
    /// A leading `>` restricts matching to direct children.
    fn select_children(&self, element: ElementId, selector: &str) -> Vec<ElementId>;
}

/// One recorded style write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRecord {
    pub element: ElementId,
    pub property: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
struct MemoryNode {
    parent: Option<ElementId>,
    tag: String,
    classes: Vec<String>,
    geometry: Geometry,
    styles: IndexMap<String, String>,
}

impl MemoryNode {
    /// `tag`, `.class`, `tag.class`, or `*`.
    fn matches(&self, selector: &str) -> bool {
        selector.split(',').map(str::trim).any(|simple| {
            if simple == "*" {
                return true;
            }
            let mut parts = simple.split('.');
            let tag = parts.next().unwrap_or_default();
            !simple.is_empty()
                && (tag.is_empty() || tag == self.tag)
                && parts.all(|class| self.classes.iter().any(|c| c == class))
        })
    }
}

/// In-memory document with a fixed viewport and a scroll position.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: IndexMap<ElementId, MemoryNode>,
    next_id: u64,
    viewport_width: f64,
    viewport_height: f64,
    scroll_y: f64,
    root_attributes: IndexMap<String, String>,
    log: Vec<StyleRecord>,
    rejected: Vec<String>,
}

impl MemoryDocument {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            nodes: IndexMap::new(),
            next_id: 1,
            viewport_width,
            viewport_height,
            scroll_y: 0.0,
            root_attributes: IndexMap::new(),
            log: Vec::new(),
            rejected: Vec::new(),
        }
    }

    fn insert(&mut self, parent: Option<ElementId>, tag: &str, geometry: Geometry) -> ElementId {
        let id = ElementId::from_raw(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            MemoryNode {
                parent,
                tag: tag.to_string(),
                geometry,
                ..Default::default()
            },
        );
        id
    }

    /// Add a top-level element.
    pub fn add_element(&mut self, tag: &str, geometry: Geometry) -> ElementId {
        self.insert(None, tag, geometry)
    }

    /// Add a child element sharing its parent's geometry.
    pub fn add_child(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let geometry = self.nodes.get(&parent).map(|n| n.geometry).unwrap_or_default();
        self.insert(Some(parent), tag, geometry)
    }

    pub fn remove(&mut self, element: ElementId) {
        self.nodes.shift_remove(&element);
    }

    pub fn set_geometry(&mut self, element: ElementId, geometry: Geometry) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.geometry = geometry;
        }
    }

    pub fn set_scroll_y(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y;
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Make every write of `property` fail.
    pub fn reject_property(&mut self, property: &str) {
        self.rejected.push(property.to_string());
    }

    pub fn style(&self, element: ElementId, property: &str) -> Option<&str> {
        self.nodes
            .get(&element)
            .and_then(|n| n.styles.get(property))
            .map(String::as_str)
    }

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.nodes
            .get(&element)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    pub fn classes(&self, element: ElementId) -> &[String] {
        self.nodes
            .get(&element)
            .map(|n| n.classes.as_slice())
            .unwrap_or_default()
    }

    pub fn root_attribute(&self, name: &str) -> Option<&str> {
        self.root_attributes.get(name).map(String::as_str)
    }

    /// Every style write so far, oldest first.
    pub fn style_log(&self) -> &[StyleRecord] {
        &self.log
    }

    /// Take and clear the style log.
    pub fn take_style_log(&mut self) -> Vec<StyleRecord> {
        std::mem::take(&mut self.log)
    }

    /// Viewport intersection of `elements` at the current scroll position,
    /// the way a zero-threshold intersection observer reports it.
    pub fn intersections(&self, elements: impl IntoIterator<Item = ElementId>) -> Vec<(ElementId, bool)> {
        let view_top = self.scroll_y;
        let view_bottom = self.scroll_y + self.viewport_height;
        elements
            .into_iter()
            .map(|id| {
                let visible = self.nodes.get(&id).is_some_and(|n| {
                    n.geometry.top <= view_bottom && n.geometry.top + n.geometry.height >= view_top
                });
                (id, visible)
            })
            .collect()
    }

    fn is_descendant(&self, mut node: ElementId, ancestor: ElementId) -> bool {
        while let Some(parent) = self.nodes.get(&node).and_then(|n| n.parent) {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }
}

impl StyleSink for MemoryDocument {
    fn set_style(&mut self, element: ElementId, property: &str, value: &str) -> Result<(), StyleError> {
        if self.rejected.iter().any(|p| p == property) {
            return Err(StyleError::Rejected {
                property: property.to_string(),
                reason: "property not supported".to_string(),
            });
        }
        let node = self.nodes.get_mut(&element).ok_or(StyleError::Detached)?;
        trace!(%element, property, value, "set style");
        node.styles.insert(property.to_string(), value.to_string());
        self.log.push(StyleRecord {
            element,
            property: property.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(&element) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.classes.retain(|c| c != class);
        }
    }

    fn set_root_attribute(&mut self, name: &str, value: Option<&str>) {
        match value {
            Some(value) => {
                self.root_attributes.insert(name.to_string(), value.to_string());
            }
            None => {
                self.root_attributes.shift_remove(name);
            }
        }
    }
}

impl DocumentHost for MemoryDocument {
    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn geometry(&self, element: ElementId) -> Option<Geometry> {
        self.nodes.get(&element).map(|n| n.geometry)
    }

    fn select_children(&self, element: ElementId, selector: &str) -> Vec<ElementId> {
        let (direct, selector) = match selector.trim().strip_prefix('>') {
            Some(rest) => (true, rest.trim()),
            None => (false, selector.trim()),
        };
        self.nodes
            .iter()
            .filter(|(id, node)| {
                let related = if direct {
                    node.parent == Some(element)
                } else {
                    self.is_descendant(**id, element)
                };
                related && node.matches(selector)
            })
            .map(|(id, _)| *id)
            .collect()
    }
}
