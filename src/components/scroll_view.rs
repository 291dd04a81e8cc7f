//! ScrollView: a view whose content is shifted by a state-held offset.

use std::sync::Arc;

use super::view::clone_props_with;
use crate::shadow::{
    ComponentDescriptor, Props, PropsKind, PropsParserContext, RawProps, ShadowNode,
    ShadowNodeFamily, ShadowNodeTraits, State, StateData,
};
use crate::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollViewState {
    pub content_offset: Point,
}

#[derive(Debug, Default)]
pub struct ScrollViewComponentDescriptor;

impl ComponentDescriptor for ScrollViewComponentDescriptor {
    fn component_name(&self) -> &'static str {
        "ScrollView"
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

    fn create_initial_state(
        &self,
        _props: &Arc<Props>,
        family: &Arc<ShadowNodeFamily>,
    ) -> Option<Arc<State>> {
        Some(self.create_state(family, StateData::ScrollView(ScrollViewState::default())))
    }

    /// Scrolling moves the content up and left.
    fn content_origin_offset(&self, node: &ShadowNode) -> Point {
        match node.state().map(|state| state.data()) {
            Some(StateData::ScrollView(state)) => {
                Point::new(-state.content_offset.x, -state.content_offset.y)
            }
            _ => Point::ZERO,
        }
    }
}
