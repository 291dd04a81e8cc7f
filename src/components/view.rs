//! View: the generic layoutable container.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::layout::YogaStyle;
use crate::shadow::{
    ComponentDescriptor, Props, PropsKind, PropsParserContext, RawProps, ShadowNodeTraits,
};
use crate::types::EdgeInsets;

/// Which of a node and its descendants can be hit-test targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PointerEventsMode {
    #[default]
    Auto = 0,
    /// Neither the node nor its descendants.
    None = 1,
    /// Descendants only.
    BoxNone = 2,
    /// The node only.
    BoxOnly = 3,
}

impl PointerEventsMode {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "auto" => Some(Self::Auto),
            "none" => Some(Self::None),
            "box-none" => Some(Self::BoxNone),
            "box-only" => Some(Self::BoxOnly),
            _ => None,
        }
    }
}

/// Props every layoutable component understands.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewProps {
    pub yoga_style: YogaStyle,
    pub opacity: f32,
    pub pointer_events: PointerEventsMode,
    pub z_index: Option<i32>,
    pub hit_slop: EdgeInsets,
    pub native_id: Option<String>,
    pub collapsable: bool,
}

impl Default for ViewProps {
    fn default() -> Self {
        Self {
            yoga_style: YogaStyle::default(),
            opacity: 1.0,
            pointer_events: PointerEventsMode::Auto,
            z_index: None,
            hit_slop: EdgeInsets::ZERO,
            native_id: None,
            collapsable: true,
        }
    }
}

impl ViewProps {
    pub fn from_raw(raw: &RawProps) -> Self {
        let mut props = Self {
            yoga_style: YogaStyle::from_raw(raw),
            ..Self::default()
        };

        if let Some(opacity) = raw.get_f32("opacity") {
            props.opacity = opacity;
        }
        if let Some(value) = raw.get("pointerEvents") {
            match value.as_str().and_then(PointerEventsMode::parse) {
                Some(mode) => props.pointer_events = mode,
                None => warn!(%value, "unknown pointerEvents value"),
            }
        }
        props.z_index = raw
            .get("zIndex")
            .and_then(Value::as_f64)
            .map(|z| z as i32);
        if let Some(Value::Object(slop)) = raw.get("hitSlop") {
            let edge = |key: &str| slop.get(key).and_then(Value::as_f64).unwrap_or(0.0) as f32;
            props.hit_slop = EdgeInsets::new(edge("left"), edge("top"), edge("right"), edge("bottom"));
        }
        props.native_id = raw.get_str("nativeID").map(str::to_string);
        if let Some(collapsable) = raw.get_bool("collapsable") {
            props.collapsable = collapsable;
        }
        props
    }

    /// Traits implied by these props.
    pub fn derived_traits(&self) -> ShadowNodeTraits {
        let mut traits = ShadowNodeTraits::NONE;
        if self.opacity < 1.0 || self.z_index.is_some() || self.pointer_events != PointerEventsMode::Auto {
            traits |= ShadowNodeTraits::FORMS_STACKING_CONTEXT;
        }
        if traits.contains(ShadowNodeTraits::FORMS_STACKING_CONTEXT)
            || self.native_id.is_some()
            || !self.collapsable
        {
            traits |= ShadowNodeTraits::FORMS_VIEW;
        }
        traits
    }
}

/// Merges `raw` onto `source` and parses the result. An empty update hands
/// back `source`.
pub(crate) fn clone_props_with(
    source: Option<&Arc<Props>>,
    raw: &RawProps,
    kind: impl FnOnce(&RawProps, Option<&Props>) -> PropsKind,
) -> Arc<Props> {
    if let Some(source) = source.filter(|_| raw.is_empty()) {
        return Arc::clone(source);
    }
    let source = source.map(Arc::as_ref);
    let merged = Props::merge_raw(source, raw);
    Arc::new(Props {
        view: ViewProps::from_raw(&merged),
        kind: kind(&merged, source),
        raw: merged,
    })
}

#[derive(Debug, Default)]
pub struct ViewComponentDescriptor;

impl ComponentDescriptor for ViewComponentDescriptor {
    fn component_name(&self) -> &'static str {
        "View"
    }

    fn traits(&self) -> ShadowNodeTraits {
        ShadowNodeTraits::YOGA_LAYOUTABLE
    }

    fn clone_props(
        &self,
        _context: &PropsParserContext,
        source: Option<&Arc<Props>>,
        raw: &RawProps,
    ) -> Arc<Props> {
        clone_props_with(source, raw, |_, _| PropsKind::View)
    }
}
