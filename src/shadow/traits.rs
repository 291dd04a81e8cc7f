//! Capability flags of a shadow node.

bitflags::bitflags! {
    /// What a node can do, fixed when the node is constructed.
    ///
    /// Combine with bitwise OR: `ShadowNodeTraits::YOGA_LAYOUTABLE | ShadowNodeTraits::LEAF_YOGA_NODE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShadowNodeTraits: u32 {
        const NONE = 0;
        /// Root of a surface; carries layout constraints in its props.
        const ROOT_NODE = 1 << 0;
        /// Owns a layout node and takes part in flexbox layout.
        const YOGA_LAYOUTABLE = 1 << 1;
        /// Has no layout children even when it has shadow children.
        const LEAF_YOGA_NODE = 1 << 2;
        /// Sized by `ComponentDescriptor::measure_content`.
        const MEASURABLE_YOGA_NODE = 1 << 3;
        /// Every clone starts with a dirty layout node.
        const DIRTY_YOGA_NODE = 1 << 4;
        const FORMS_STACKING_CONTEXT = 1 << 5;
        const FORMS_VIEW = 1 << 6;
    }
}
