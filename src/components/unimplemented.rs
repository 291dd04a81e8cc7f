//! Fallback for component names with no registered descriptor.

use std::sync::Arc;

use super::view::clone_props_with;
use crate::shadow::{
    ComponentDescriptor, Props, PropsKind, PropsParserContext, RawProps, ShadowNodeTraits,
};

pub const UNIMPLEMENTED_COMPONENT_NAME: &str = "UnimplementedNativeView";

/// Lays out like a View and remembers the name it was requested under.
#[derive(Debug, Default)]
pub struct UnimplementedViewComponentDescriptor;

impl ComponentDescriptor for UnimplementedViewComponentDescriptor {
    fn component_name(&self) -> &'static str {
        UNIMPLEMENTED_COMPONENT_NAME
    }

    fn traits(&self) -> ShadowNodeTraits {
        ShadowNodeTraits::YOGA_LAYOUTABLE
    }

    fn clone_props(
        &self,
        context: &PropsParserContext,
        source: Option<&Arc<Props>>,
        raw: &RawProps,
    ) -> Arc<Props> {
        clone_props_with(source, raw, |_, source| {
            let component_name = context
                .component_name
                .clone()
                .or_else(|| {
                    source
                        .and_then(Props::unimplemented_component_name)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| UNIMPLEMENTED_COMPONENT_NAME.to_string());
            PropsKind::Unimplemented { component_name }
        })
    }
}
