//! Scene files for the headless driver.
//!
//! A scene places elements in a [`MemoryDocument`] and lists the scroll
//! positions to visit:
//!
//! ```toml
//! positions = [0, 200, 400]
//!
//! [viewport]
//! width = 1280
//! height = 800
//!
//! [[elements]]
//! name = "hero"
//! top = 720
//! height = 400
//! scroll = "enter:10vh;exit:40vh"
//! animation = "from:opacity-0 to:opacity-100"
//! children = [{ tag = "li", classes = ["item"], count = 3 }]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;

use scrolly_motion::{ElementDescriptors, ElementId, Geometry, MemoryDocument, StyleSink};

/// Scene used when no `--scene` is given.
pub const DEFAULT_SCENE: &str = r#"
positions = [0, 150, 300, 450, 600, 900, 1400, 1800, 2400]

[viewport]
width = 1280
height = 800

[[elements]]
name = "hero"
top = 720
height = 400
scroll = "enter:10vh;exit:40vh;class:is-visible;theme:dark"
animation = "from:opacity-0|translateY-20 to:opacity-100|translateY-0"

[[elements]]
name = "cards"
top = 1500
height = 600
scroll = "enter:20vh;damping:0.2;friction:0.9;once:true"
animation = "[>li]:from:opacity-0|scale-90;to:opacity-100|scale-100|stagger-0.15"
children = [{ tag = "li", count = 3 }]

[[elements]]
name = "banner"
top = 2400
height = 500
scroll = "theme:light"
animation = "from:rotate-0;via-50%:rotate-15;to:rotate-0 @desktop:from:blur-4 to:blur-0"
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub positions: Vec<f64>,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub elements: Vec<SceneElement>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneElement {
    pub name: String,
    #[serde(default = "default_tag")]
    pub tag: String,
    pub top: f64,
    pub height: f64,
    pub scroll: Option<String>,
    pub animation: Option<String>,
    #[serde(default)]
    pub children: Vec<SceneChild>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneChild {
    pub tag: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_tag() -> String {
    "section".to_string()
}

fn default_count() -> usize {
    1
}

/// A scene loaded into a document.
#[derive(Debug)]
pub struct Stage {
    pub document: MemoryDocument,
    /// Every element and child by display name.
    pub names: IndexMap<ElementId, String>,
    /// Top-level elements with their descriptors, in scene order.
    pub tracked: Vec<(ElementId, ElementDescriptors)>,
}

impl Scene {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid scene")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("failed to read scene {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Build the document described by the scene.
    pub fn stage(&self) -> Stage {
        let mut document = MemoryDocument::new(self.viewport.width, self.viewport.height);
        let mut names = IndexMap::new();
        let mut tracked = Vec::new();

        for element in &self.elements {
            let id = document.add_element(
                &element.tag,
                Geometry {
                    top: element.top,
                    height: element.height,
                },
            );
            names.insert(id, element.name.clone());

            for child in &element.children {
                for index in 0..child.count {
                    let child_id = document.add_child(id, &child.tag);
                    for class in &child.classes {
                        document.add_class(child_id, class);
                    }
                    names.insert(child_id, format!("{}/{}[{index}]", element.name, child.tag));
                }
            }

            let mut descriptors = ElementDescriptors::new();
            descriptors.scroll = element.scroll.clone();
            descriptors.animation = element.animation.clone();
            tracked.push((id, descriptors));
        }

        Stage {
            document,
            names,
            tracked,
        }
    }
}
