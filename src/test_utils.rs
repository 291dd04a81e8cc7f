//! Node builders shared by unit tests.

use std::sync::Arc;

use serde_json::Value;

use crate::components::ViewComponentDescriptor;
use crate::shadow::{
    ComponentDescriptorExt, PropsParserContext, ShadowNode, ShadowNodeFamilyFragment,
    ShadowNodeFragment, SharedComponentDescriptor,
};
use crate::types::Tag;

pub const TEST_SURFACE: i32 = 1;

/// Unsealed node of `descriptor`'s component with parsed `props`.
pub fn create_node(
    descriptor: &SharedComponentDescriptor,
    tag: Tag,
    props: Value,
    children: Vec<Arc<ShadowNode>>,
) -> Arc<ShadowNode> {
    let family = descriptor.create_family(
        ShadowNodeFamilyFragment {
            tag,
            surface_id: TEST_SURFACE,
        },
        None,
    );
    let props = descriptor.clone_props(&PropsParserContext::default(), None, &props.into());
    let state = descriptor.create_initial_state(&props, &family);
    descriptor.create_shadow_node(
        ShadowNodeFragment {
            props: Some(props),
            children: Some(Arc::new(children)),
            state,
        },
        family,
    )
}

pub fn view(tag: Tag, props: Value) -> Arc<ShadowNode> {
    view_with_children(tag, props, Vec::new())
}

pub fn view_with_children(tag: Tag, props: Value, children: Vec<Arc<ShadowNode>>) -> Arc<ShadowNode> {
    let descriptor: SharedComponentDescriptor = Arc::new(ViewComponentDescriptor);
    create_node(&descriptor, tag, props, children)
}
