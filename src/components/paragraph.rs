//! Paragraph: a measurable text leaf.

use std::sync::Arc;

use super::view::clone_props_with;
use crate::layout::{TextAttributes, TextMeasureCache};
use crate::shadow::{
    ComponentDescriptor, Props, PropsKind, PropsParserContext, RawProps, ShadowNode,
    ShadowNodeTraits,
};
use crate::types::{LayoutConstraints, LayoutContext, Size};

#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphProps {
    pub text: String,
    pub font_size: f32,
    pub line_height: Option<f32>,
    pub number_of_lines: Option<usize>,
}

impl Default for ParagraphProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 14.0,
            line_height: None,
            number_of_lines: None,
        }
    }
}

impl ParagraphProps {
    pub fn from_raw(raw: &RawProps) -> Self {
        let defaults = Self::default();
        Self {
            text: raw.get_str("text").unwrap_or_default().to_string(),
            font_size: raw.get_f32("fontSize").unwrap_or(defaults.font_size),
            line_height: raw.get_f32("lineHeight"),
            number_of_lines: raw
                .get("numberOfLines")
                .and_then(serde_json::Value::as_u64)
                .map(|n| n as usize),
        }
    }

    /// Attributes with the surface's font scaling applied.
    pub fn text_attributes(&self, font_size_multiplier: f32) -> TextAttributes {
        TextAttributes {
            font_size: self.font_size * font_size_multiplier,
            line_height: self.line_height.map(|height| height * font_size_multiplier),
            max_lines: self.number_of_lines,
        }
    }
}

#[derive(Debug)]
pub struct ParagraphComponentDescriptor {
    cache: Arc<TextMeasureCache>,
}

impl ParagraphComponentDescriptor {
    pub fn new(cache: Arc<TextMeasureCache>) -> Self {
        Self { cache }
    }

    pub fn measure_cache(&self) -> &Arc<TextMeasureCache> {
        &self.cache
    }
}

impl ComponentDescriptor for ParagraphComponentDescriptor {
    fn component_name(&self) -> &'static str {
        "Paragraph"
    }

    fn traits(&self) -> ShadowNodeTraits {
        ShadowNodeTraits::YOGA_LAYOUTABLE
            | ShadowNodeTraits::LEAF_YOGA_NODE
            | ShadowNodeTraits::MEASURABLE_YOGA_NODE
    }

    fn clone_props(
        &self,
        _context: &PropsParserContext,
        source: Option<&Arc<Props>>,
        raw: &RawProps,
    ) -> Arc<Props> {
        clone_props_with(source, raw, |merged, _| {
            PropsKind::Paragraph(ParagraphProps::from_raw(merged))
        })
    }

    fn measure_content(
        &self,
        node: &ShadowNode,
        context: &LayoutContext,
        constraints: &LayoutConstraints,
    ) -> Size {
        let Some(paragraph) = node.props().paragraph_props() else {
            return constraints.clamp(Size::ZERO);
        };
        let attributes = paragraph.text_attributes(context.font_size_multiplier);
        self.cache.measure(&paragraph.text, &attributes, constraints)
    }
}
