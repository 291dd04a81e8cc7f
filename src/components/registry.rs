//! Component Descriptor Registry - name → descriptor lookup.
//!
//! Lookup tries the exact name first, then the name with legacy platform
//! prefixes and aliases removed. Unknown names resolve to the fallback
//! descriptor, so a tree can always be built.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::paragraph::ParagraphComponentDescriptor;
use super::root::RootComponentDescriptor;
use super::scroll_view::ScrollViewComponentDescriptor;
use super::unimplemented::UnimplementedViewComponentDescriptor;
use super::view::ViewComponentDescriptor;
use crate::config::ShadowConfig;
use crate::layout::TextMeasureCache;
use crate::shadow::SharedComponentDescriptor;

pub struct ComponentDescriptorRegistry {
    descriptors: RwLock<HashMap<&'static str, SharedComponentDescriptor>>,
    fallback: SharedComponentDescriptor,
}

impl ComponentDescriptorRegistry {
    /// Empty registry with `fallback` for every name.
    pub fn new(fallback: SharedComponentDescriptor) -> Self {
        Self {
            descriptors: RwLock::new(HashMap::new()),
            fallback,
        }
    }

    /// Registry with the built-in components: RootView, View, ScrollView and
    /// Paragraph. Unknown names get an `UnimplementedNativeView`.
    pub fn with_default_components(config: &ShadowConfig) -> Self {
        let registry = Self::new(Arc::new(UnimplementedViewComponentDescriptor));
        let cache = Arc::new(TextMeasureCache::new(config.text_measure_cache_size));
        registry.add(Arc::new(RootComponentDescriptor));
        registry.add(Arc::new(ViewComponentDescriptor));
        registry.add(Arc::new(ScrollViewComponentDescriptor));
        registry.add(Arc::new(ParagraphComponentDescriptor::new(cache)));
        registry
    }

    /// Registers `descriptor` under its component name, replacing any
    /// previous one.
    pub fn add(&self, descriptor: SharedComponentDescriptor) {
        let name = descriptor.component_name();
        if self.descriptors.write().insert(name, descriptor).is_some() {
            debug!(component = name, "replaced component descriptor");
        }
    }

    pub fn remove(&self, component_name: &str) -> Option<SharedComponentDescriptor> {
        self.descriptors.write().remove(component_name)
    }

    /// Registered descriptor for `component_name`, trying the remapped name
    /// second.
    pub fn find(&self, component_name: &str) -> Option<SharedComponentDescriptor> {
        let descriptors = self.descriptors.read();
        descriptors
            .get(component_name)
            .or_else(|| descriptors.get(remap_component_name(component_name)))
            .cloned()
    }

    /// Like [`find`](Self::find) but never fails: unknown names get the
    /// fallback.
    pub fn at(&self, component_name: &str) -> SharedComponentDescriptor {
        self.find(component_name).unwrap_or_else(|| {
            debug!(component = component_name, "no descriptor registered, using fallback");
            Arc::clone(&self.fallback)
        })
    }

    pub fn fallback(&self) -> &SharedComponentDescriptor {
        &self.fallback
    }

    pub fn is_fallback(&self, descriptor: &SharedComponentDescriptor) -> bool {
        Arc::ptr_eq(descriptor, &self.fallback)
    }

    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }

    /// Registered names, sorted.
    pub fn component_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.descriptors.read().keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ComponentDescriptorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptorRegistry")
            .field("components", &self.component_names())
            .field("fallback", &self.fallback.component_name())
            .finish()
    }
}

/// Canonical name for legacy component names.
fn remap_component_name(name: &str) -> &str {
    let name = name
        .strip_prefix("RCT")
        .or_else(|| name.strip_prefix("RK"))
        .unwrap_or(name);
    match name {
        "Text" | "RawText" | "VirtualText" => "Paragraph",
        "AndroidHorizontalScrollView" => "ScrollView",
        other => other,
    }
}
