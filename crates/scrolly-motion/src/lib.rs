//! Scroll-driven declarative animation engine.
//!
//! Elements carry compact descriptor strings. The engine turns the host's
//! scroll position into a per-element progress in [0, 1] and maps it onto
//! interpolated style values:
//! - **Grammars**: scroll configs, animation and stagger descriptors, timelines
//! - **Thresholds**: where an element's progress starts and ends
//! - **Physics**: damped pursuit while scrolling, momentum afterwards
//! - **Interpolation**: simple from/to pairs and timelines, unit-aware
//! - **Stagger**: one parent progress spread over ordered children
//!
//! # Architecture
//!
//! ```text
//! MotionManager
//!   ├── ElementState side table (thresholds, progress, resolved animation)
//!   ├── PluginRegistry (custom property values)
//!   ├── ModuleSet (themes, widgets, ...)
//!   └── EventQueue (enter / leave / theme change)
//!
//! DocumentHost + StyleSink
//!   └── geometry and viewport in, styles / classes / root attributes out
//! ```

pub mod breakpoint;
pub mod element;
pub mod error;
pub mod events;
pub mod grammar;
pub mod host;
pub mod interpolate;
pub mod manager;
pub mod module;
pub mod physics;
pub mod plugin;
pub mod stagger;
pub mod style;
pub mod theme;
pub mod threshold;
pub mod timeline;
pub mod transition;
pub mod types;
pub mod value;

pub use breakpoint::{BREAKPOINT_ORDER, MediaQuery, NoConditions, ViewportConditions, WidthConditions};
pub use element::{ElementDescriptors, ElementState};
pub use error::{BuildError, ModuleError, ParseError, ParseResult, RegistryError, StyleError};
pub use events::{EventQueue, MotionEvent};
pub use grammar::{AnimationParser, Presets, StaggerParser, TransitionModifiers, parse_descriptor};
pub use host::{DocumentHost, MemoryDocument, StyleRecord, StyleSink};
pub use interpolate::{Interpolate, interpolate_config, interpolate_maps, interpolate_timeline};
pub use manager::{MotionManager, MotionManagerBuilder, MotionMetrics};
pub use module::{
    ElementUpdate, ElementView, ModuleContext, ModuleSet, MotionModule, ProgressWidget, ThemeModule,
    WidgetCapabilities, WidgetFactory, WidgetModule,
};
pub use physics::ProgressState;
pub use plugin::{FnPlugin, PluginRegistry, PropertyPlugin};
pub use stagger::{StaggerDistributor, stagger_values};
pub use style::{apply_values, style_declarations};
pub use theme::ThemeContext;
pub use threshold::{ConfigValue, Geometry, ScrollConfig, Thresholds};
pub use timeline::parse_timeline;
pub use transition::{TransitionSpec, transition_style};
pub use types::{
    AnimValue, AnimationConfig, ElementId, PropertyFamily, PropertyMap, ResolvedAnimation, StaggerConfig,
    TimelineStep,
};
pub use value::{ValueResolver, to_shorthand};

pub use scrolly_config::{ConfigError, ScrollyConfig};
