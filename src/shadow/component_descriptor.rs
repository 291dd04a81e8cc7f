//! Per-component factory and policy.
//!
//! Every node is created and cloned through the descriptor of its component,
//! so a component decides its traits, how raw props are parsed, what initial
//! state it carries and how it measures. Descriptors are stateless from the
//! tree's point of view and shared behind an `Arc`.

use std::sync::Arc;

use super::family::{EventTarget, ShadowNodeFamily, ShadowNodeFamilyFragment};
use super::props::{Props, PropsParserContext, RawProps};
use super::shadow_node::{ShadowNode, ShadowNodeFragment};
use super::state::{State, StateData};
use super::traits::ShadowNodeTraits;
use crate::types::{LayoutConstraints, LayoutContext, Point, Size};

pub type SharedComponentDescriptor = Arc<dyn ComponentDescriptor>;

pub trait ComponentDescriptor: Send + Sync {
    /// Name the descriptor is registered under.
    fn component_name(&self) -> &'static str;

    /// Traits every node of this component has.
    fn traits(&self) -> ShadowNodeTraits;

    /// Traits of a node with these props: the component's own plus the ones
    /// view props imply.
    fn traits_for(&self, props: &Props) -> ShadowNodeTraits {
        self.traits() | props.view.derived_traits()
    }

    fn create_shadow_node(
        &self,
        fragment: ShadowNodeFragment,
        family: Arc<ShadowNodeFamily>,
    ) -> Arc<ShadowNode> {
        let traits = match &fragment.props {
            Some(props) => self.traits_for(props),
            None => self.traits_for(&Props::default()),
        };
        Arc::new(ShadowNode::new(fragment, family, traits))
    }

    fn clone_shadow_node(&self, source: &ShadowNode, fragment: ShadowNodeFragment) -> Arc<ShadowNode> {
        let traits = match &fragment.props {
            Some(props) => self.traits_for(props),
            None => source.traits(),
        };
        Arc::new(ShadowNode::from_source(source, fragment, traits))
    }

    fn append_child(&self, parent: &ShadowNode, child: Arc<ShadowNode>) {
        parent.append_child(child);
    }

    /// Parses `raw` merged onto `source`. An empty update returns `source`
    /// itself.
    fn clone_props(
        &self,
        context: &PropsParserContext,
        source: Option<&Arc<Props>>,
        raw: &RawProps,
    ) -> Arc<Props>;

    fn create_initial_state(
        &self,
        _props: &Arc<Props>,
        _family: &Arc<ShadowNodeFamily>,
    ) -> Option<Arc<State>> {
        None
    }

    /// Always a new box, even for equal data.
    fn create_state(&self, family: &Arc<ShadowNodeFamily>, data: StateData) -> Arc<State> {
        Arc::new(State::new(family, data))
    }

    /// Intrinsic size of a measurable node. Must not touch the tree.
    fn measure_content(
        &self,
        _node: &ShadowNode,
        _context: &LayoutContext,
        _constraints: &LayoutConstraints,
    ) -> Size {
        Size::ZERO
    }

    /// Offset applied to points and frames inside this node's content, such
    /// as a scroll position.
    fn content_origin_offset(&self, _node: &ShadowNode) -> Point {
        Point::ZERO
    }
}

/// Operations that need the descriptor's own `Arc`.
pub trait ComponentDescriptorExt {
    fn create_family(
        &self,
        fragment: ShadowNodeFamilyFragment,
        event_target: Option<EventTarget>,
    ) -> Arc<ShadowNodeFamily>;
}

impl ComponentDescriptorExt for SharedComponentDescriptor {
    fn create_family(
        &self,
        fragment: ShadowNodeFamilyFragment,
        event_target: Option<EventTarget>,
    ) -> Arc<ShadowNodeFamily> {
        Arc::new(ShadowNodeFamily::new(fragment, event_target, Arc::clone(self)))
    }
}
