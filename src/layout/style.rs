//! Flexbox style of a layout node, parsed from raw props.
//!
//! The style keeps Yoga's model (physical, logical and shorthand edges kept
//! apart, an explicit `direction`) and is converted to a `taffy::Style` for
//! every layout pass once the writing direction is known.

use serde_json::Value;
use taffy::{
    AlignContent, AlignItems, Dimension, Display as TaffyDisplay, FlexDirection as TaffyFlexDirection,
    FlexWrap, JustifyContent, LengthPercentage, LengthPercentageAuto, Overflow as TaffyOverflow,
    Position, Style,
};
use tracing::warn;

use crate::shadow::RawProps;
use crate::types::LayoutDirection;

// =============================================================================
// Lengths
// =============================================================================

/// A style length as written in props.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StyleLength {
    /// Not set; the property's default applies.
    #[default]
    Undefined,
    Auto,
    Points(f32),
    /// Percentage, 0 to 100.
    Percent(f32),
}

impl StyleLength {
    /// Accepts a number, `"auto"`, `"N%"`, a numeric string or `null`.
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Undefined),
            Value::Number(n) => n.as_f64().map(|v| Self::Points(v as f32)),
            Value::String(s) => {
                let s = s.trim();
                if s == "auto" {
                    Some(Self::Auto)
                } else if let Some(percent) = s.strip_suffix('%') {
                    percent.trim().parse::<f32>().ok().map(Self::Percent)
                } else {
                    s.parse::<f32>().ok().map(Self::Points)
                }
            }
            _ => None,
        }
    }

    #[inline]
    pub fn is_defined(self) -> bool {
        !matches!(self, Self::Undefined)
    }

    fn to_dimension(self) -> Dimension {
        match self {
            Self::Undefined | Self::Auto => Dimension::Auto,
            Self::Points(v) => Dimension::Length(v),
            Self::Percent(p) => Dimension::Percent(p / 100.0),
        }
    }

    fn to_length_percentage(self) -> LengthPercentage {
        match self {
            Self::Undefined | Self::Auto => LengthPercentage::Length(0.0),
            Self::Points(v) => LengthPercentage::Length(v),
            Self::Percent(p) => LengthPercentage::Percent(p / 100.0),
        }
    }

    fn to_length_percentage_auto(self, undefined: LengthPercentageAuto) -> LengthPercentageAuto {
        match self {
            Self::Undefined => undefined,
            Self::Auto => LengthPercentageAuto::Auto,
            Self::Points(v) => LengthPercentageAuto::Length(v),
            Self::Percent(p) => LengthPercentageAuto::Percent(p / 100.0),
        }
    }
}

// =============================================================================
// Edges
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Edge {
    Left = 0,
    Top = 1,
    Right = 2,
    Bottom = 3,
    Start = 4,
    End = 5,
    Horizontal = 6,
    Vertical = 7,
    All = 8,
}

/// Values for every edge name. Physical edges are resolved with
/// [`Edges::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges([StyleLength; 9]);

impl Edges {
    #[inline]
    pub fn get(&self, edge: Edge) -> StyleLength {
        self.0[edge as usize]
    }

    #[inline]
    pub fn set(&mut self, edge: Edge, value: StyleLength) {
        self.0[edge as usize] = value;
    }

    /// Value of a physical edge. Logical edges win over physical ones, which
    /// win over `Horizontal`/`Vertical`, which win over `All`.
    pub fn resolve(&self, edge: Edge, rtl: bool) -> StyleLength {
        let (logical, axis) = match edge {
            Edge::Left => (Some(if rtl { Edge::End } else { Edge::Start }), Edge::Horizontal),
            Edge::Right => (Some(if rtl { Edge::Start } else { Edge::End }), Edge::Horizontal),
            Edge::Top | Edge::Bottom => (None, Edge::Vertical),
            other => return self.get(other),
        };
        [logical, Some(edge), Some(axis), Some(Edge::All)]
            .into_iter()
            .flatten()
            .map(|e| self.get(e))
            .find(|value| value.is_defined())
            .unwrap_or_default()
    }

    /// Moves `Left` to `Start` and `Right` to `End`. Returns whether anything
    /// moved.
    pub fn swap_left_and_right(&mut self) -> bool {
        let mut changed = false;
        for (from, to) in [(Edge::Left, Edge::Start), (Edge::Right, Edge::End)] {
            let value = self.get(from);
            if value.is_defined() {
                self.set(to, value);
                self.set(from, StyleLength::Undefined);
                changed = true;
            }
        }
        changed
    }

    fn to_taffy_rect<T>(&self, rtl: bool, convert: impl Fn(StyleLength) -> T) -> taffy::Rect<T> {
        taffy::Rect {
            left: convert(self.resolve(Edge::Left, rtl)),
            right: convert(self.resolve(Edge::Right, rtl)),
            top: convert(self.resolve(Edge::Top, rtl)),
            bottom: convert(self.resolve(Edge::Bottom, rtl)),
        }
    }
}

fn edge_from_suffix(suffix: &str) -> Option<Edge> {
    Some(match suffix {
        "" => Edge::All,
        "Left" => Edge::Left,
        "Top" | "BlockStart" => Edge::Top,
        "Right" => Edge::Right,
        "Bottom" | "BlockEnd" => Edge::Bottom,
        "Start" | "InlineStart" => Edge::Start,
        "End" | "InlineEnd" => Edge::End,
        "Horizontal" | "Inline" => Edge::Horizontal,
        "Vertical" | "Block" => Edge::Vertical,
        _ => return None,
    })
}

// =============================================================================
// Enums
// =============================================================================

macro_rules! style_enum {
    ($(#[$meta:meta])* $name:ident, default $default:ident, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl $name {
            pub fn parse(text: &str) -> Option<Self> {
                match text {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

style_enum!(
    /// Writing direction as written in style. `Inherit` takes the parent's.
    Direction, default Inherit, {
        Inherit => "inherit",
        Ltr => "ltr",
        Rtl => "rtl",
    }
);

style_enum!(FlexDirection, default Column, {
    Column => "column",
    ColumnReverse => "column-reverse",
    Row => "row",
    RowReverse => "row-reverse",
});

style_enum!(Justify, default FlexStart, {
    FlexStart => "flex-start",
    Center => "center",
    FlexEnd => "flex-end",
    SpaceBetween => "space-between",
    SpaceAround => "space-around",
    SpaceEvenly => "space-evenly",
});

style_enum!(Align, default Auto, {
    Auto => "auto",
    FlexStart => "flex-start",
    Center => "center",
    FlexEnd => "flex-end",
    Stretch => "stretch",
    Baseline => "baseline",
    SpaceBetween => "space-between",
    SpaceAround => "space-around",
    SpaceEvenly => "space-evenly",
});

style_enum!(Wrap, default NoWrap, {
    NoWrap => "nowrap",
    Wrap => "wrap",
    WrapReverse => "wrap-reverse",
});

style_enum!(PositionType, default Relative, {
    Static => "static",
    Relative => "relative",
    Absolute => "absolute",
});

style_enum!(Display, default Flex, {
    Flex => "flex",
    None => "none",
});

style_enum!(Overflow, default Visible, {
    Visible => "visible",
    Hidden => "hidden",
    Scroll => "scroll",
});

// =============================================================================
// Style
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct YogaStyle {
    pub direction: Direction,
    pub flex_direction: FlexDirection,
    pub justify_content: Justify,
    pub align_content: Align,
    pub align_items: Align,
    pub align_self: Align,
    pub position_type: PositionType,
    pub flex_wrap: Wrap,
    pub overflow: Overflow,
    pub display: Display,
    pub flex: Option<f32>,
    pub flex_grow: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub flex_basis: StyleLength,
    pub margin: Edges,
    pub position: Edges,
    pub padding: Edges,
    pub border: Edges,
    pub gap: StyleLength,
    pub row_gap: StyleLength,
    pub column_gap: StyleLength,
    pub width: StyleLength,
    pub height: StyleLength,
    pub min_width: StyleLength,
    pub min_height: StyleLength,
    pub max_width: StyleLength,
    pub max_height: StyleLength,
    pub aspect_ratio: Option<f32>,
}

impl Default for YogaStyle {
    fn default() -> Self {
        Self {
            direction: Direction::Inherit,
            flex_direction: FlexDirection::Column,
            justify_content: Justify::FlexStart,
            align_content: Align::FlexStart,
            align_items: Align::Stretch,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            flex_wrap: Wrap::NoWrap,
            overflow: Overflow::Visible,
            display: Display::Flex,
            flex: None,
            flex_grow: None,
            flex_shrink: None,
            flex_basis: StyleLength::Undefined,
            margin: Edges::default(),
            position: Edges::default(),
            padding: Edges::default(),
            border: Edges::default(),
            gap: StyleLength::Undefined,
            row_gap: StyleLength::Undefined,
            column_gap: StyleLength::Undefined,
            width: StyleLength::Undefined,
            height: StyleLength::Undefined,
            min_width: StyleLength::Undefined,
            min_height: StyleLength::Undefined,
            max_width: StyleLength::Undefined,
            max_height: StyleLength::Undefined,
            aspect_ratio: None,
        }
    }
}

impl YogaStyle {
    /// Reads every style key of `raw`. Other keys are ignored.
    pub fn from_raw(raw: &RawProps) -> Self {
        let mut style = Self::default();
        for (key, value) in raw.iter() {
            style.apply(key, value);
        }
        style
    }

    /// Sets one prop. Returns false when `key` is not a style key.
    pub fn apply(&mut self, key: &str, value: &Value) -> bool {
        if let Some((edges, edge)) = self.edge_slot(key) {
            match StyleLength::parse(value) {
                Some(length) => edges.set(edge, length),
                None => warn!(key, %value, "unparsable style length"),
            }
            return true;
        }

        macro_rules! length {
            ($field:ident) => {
                match StyleLength::parse(value) {
                    Some(length) => self.$field = length,
                    None => warn!(key, %value, "unparsable style length"),
                }
            };
        }
        macro_rules! keyword {
            ($field:ident, $ty:ty) => {
                match value {
                    Value::Null => self.$field = <$ty>::default(),
                    _ => match value.as_str().and_then(<$ty>::parse) {
                        Some(parsed) => self.$field = parsed,
                        None => warn!(key, %value, "unknown style keyword"),
                    },
                }
            };
        }
        macro_rules! number {
            ($field:ident) => {
                self.$field = value.as_f64().map(|v| v as f32)
            };
        }

        match key {
            "direction" => keyword!(direction, Direction),
            "flexDirection" => keyword!(flex_direction, FlexDirection),
            "justifyContent" => keyword!(justify_content, Justify),
            "alignContent" => keyword!(align_content, Align),
            "alignItems" => keyword!(align_items, Align),
            "alignSelf" => keyword!(align_self, Align),
            "position" => keyword!(position_type, PositionType),
            "flexWrap" => keyword!(flex_wrap, Wrap),
            "overflow" => keyword!(overflow, Overflow),
            "display" => keyword!(display, Display),
            "flex" => number!(flex),
            "flexGrow" => number!(flex_grow),
            "flexShrink" => number!(flex_shrink),
            "flexBasis" => length!(flex_basis),
            "gap" => length!(gap),
            "rowGap" => length!(row_gap),
            "columnGap" => length!(column_gap),
            "width" => length!(width),
            "height" => length!(height),
            "minWidth" => length!(min_width),
            "minHeight" => length!(min_height),
            "maxWidth" => length!(max_width),
            "maxHeight" => length!(max_height),
            "aspectRatio" => number!(aspect_ratio),
            _ => return false,
        }
        true
    }

    fn edge_slot(&mut self, key: &str) -> Option<(&mut Edges, Edge)> {
        if let Some(suffix) = key.strip_prefix("margin") {
            return edge_from_suffix(suffix).map(|edge| (&mut self.margin, edge));
        }
        if let Some(suffix) = key.strip_prefix("padding") {
            return edge_from_suffix(suffix).map(|edge| (&mut self.padding, edge));
        }
        if let Some(suffix) = key.strip_prefix("inset") {
            return edge_from_suffix(suffix).map(|edge| (&mut self.position, edge));
        }
        if let Some(middle) = key.strip_prefix("border").and_then(|rest| rest.strip_suffix("Width")) {
            return edge_from_suffix(middle).map(|edge| (&mut self.border, edge));
        }
        let edge = match key {
            "left" => Edge::Left,
            "top" => Edge::Top,
            "right" => Edge::Right,
            "bottom" => Edge::Bottom,
            "start" => Edge::Start,
            "end" => Edge::End,
            _ => return None,
        };
        Some((&mut self.position, edge))
    }

    /// Moves physical horizontal edges to logical ones in every edge family.
    pub fn swap_left_and_right(&mut self) -> bool {
        let margin = self.margin.swap_left_and_right();
        let padding = self.padding.swap_left_and_right();
        let border = self.border.swap_left_and_right();
        let position = self.position.swap_left_and_right();
        margin || padding || border || position
    }

    /// Direction of a node with this style under a parent laid out in
    /// `parent`.
    pub fn resolve_direction(&self, parent: LayoutDirection) -> LayoutDirection {
        match self.direction {
            Direction::Ltr => LayoutDirection::LeftToRight,
            Direction::Rtl => LayoutDirection::RightToLeft,
            Direction::Inherit => match parent {
                LayoutDirection::Undefined => LayoutDirection::LeftToRight,
                other => other,
            },
        }
    }

    pub(crate) fn resolved_flex_grow(&self) -> f32 {
        self.flex_grow
            .or_else(|| self.flex.filter(|&flex| flex > 0.0))
            .unwrap_or(0.0)
    }

    pub(crate) fn resolved_flex_shrink(&self) -> f32 {
        self.flex_shrink
            .or_else(|| self.flex.filter(|&flex| flex < 0.0).map(|flex| -flex))
            .unwrap_or(0.0)
    }

    fn resolved_flex_basis(&self) -> Dimension {
        if self.flex_basis.is_defined() {
            self.flex_basis.to_dimension()
        } else if self.flex.is_some_and(|flex| flex > 0.0) {
            Dimension::Length(0.0)
        } else {
            Dimension::Auto
        }
    }

    /// The taffy style for a node laid out in `direction`.
    pub fn to_taffy(&self, direction: LayoutDirection) -> Style {
        let rtl = direction == LayoutDirection::RightToLeft;

        let flex_direction = match (self.flex_direction, rtl) {
            (FlexDirection::Column, _) => TaffyFlexDirection::Column,
            (FlexDirection::ColumnReverse, _) => TaffyFlexDirection::ColumnReverse,
            (FlexDirection::Row, false) | (FlexDirection::RowReverse, true) => TaffyFlexDirection::Row,
            (FlexDirection::RowReverse, false) | (FlexDirection::Row, true) => {
                TaffyFlexDirection::RowReverse
            }
        };

        let column_gap = if self.column_gap.is_defined() { self.column_gap } else { self.gap };
        let row_gap = if self.row_gap.is_defined() { self.row_gap } else { self.gap };

        Style {
            display: match self.display {
                Display::Flex => TaffyDisplay::Flex,
                Display::None => TaffyDisplay::None,
            },
            position: match self.position_type {
                PositionType::Absolute => Position::Absolute,
                PositionType::Static | PositionType::Relative => Position::Relative,
            },
            overflow: taffy::Point {
                x: to_overflow(self.overflow),
                y: to_overflow(self.overflow),
            },

            flex_direction,
            flex_wrap: match self.flex_wrap {
                Wrap::NoWrap => FlexWrap::NoWrap,
                Wrap::Wrap => FlexWrap::Wrap,
                Wrap::WrapReverse => FlexWrap::WrapReverse,
            },
            justify_content: Some(to_justify(self.justify_content)),
            align_items: to_align_items(self.align_items).or(Some(AlignItems::Stretch)),
            align_self: to_align_items(self.align_self),
            align_content: Some(to_align_content(self.align_content)),

            flex_grow: self.resolved_flex_grow(),
            flex_shrink: self.resolved_flex_shrink(),
            flex_basis: self.resolved_flex_basis(),

            size: taffy::Size {
                width: self.width.to_dimension(),
                height: self.height.to_dimension(),
            },
            min_size: taffy::Size {
                width: self.min_width.to_dimension(),
                height: self.min_height.to_dimension(),
            },
            max_size: taffy::Size {
                width: self.max_width.to_dimension(),
                height: self.max_height.to_dimension(),
            },
            aspect_ratio: self.aspect_ratio,

            margin: self
                .margin
                .to_taffy_rect(rtl, |v| v.to_length_percentage_auto(LengthPercentageAuto::Length(0.0))),
            padding: self.padding.to_taffy_rect(rtl, StyleLength::to_length_percentage),
            border: self.border.to_taffy_rect(rtl, StyleLength::to_length_percentage),
            inset: self
                .position
                .to_taffy_rect(rtl, |v| v.to_length_percentage_auto(LengthPercentageAuto::Auto)),

            gap: taffy::Size {
                width: column_gap.to_length_percentage(),
                height: row_gap.to_length_percentage(),
            },

            ..Default::default()
        }
    }
}

fn to_overflow(overflow: Overflow) -> TaffyOverflow {
    match overflow {
        Overflow::Visible => TaffyOverflow::Visible,
        Overflow::Hidden => TaffyOverflow::Hidden,
        Overflow::Scroll => TaffyOverflow::Scroll,
    }
}

fn to_justify(justify: Justify) -> JustifyContent {
    match justify {
        Justify::FlexStart => JustifyContent::FlexStart,
        Justify::Center => JustifyContent::Center,
        Justify::FlexEnd => JustifyContent::FlexEnd,
        Justify::SpaceBetween => JustifyContent::SpaceBetween,
        Justify::SpaceAround => JustifyContent::SpaceAround,
        Justify::SpaceEvenly => JustifyContent::SpaceEvenly,
    }
}

fn to_align_items(align: Align) -> Option<AlignItems> {
    match align {
        Align::Auto => None,
        Align::FlexStart | Align::SpaceBetween | Align::SpaceAround | Align::SpaceEvenly => {
            Some(AlignItems::FlexStart)
        }
        Align::Center => Some(AlignItems::Center),
        Align::FlexEnd => Some(AlignItems::FlexEnd),
        Align::Stretch => Some(AlignItems::Stretch),
        Align::Baseline => Some(AlignItems::Baseline),
    }
}

fn to_align_content(align: Align) -> AlignContent {
    match align {
        Align::Auto | Align::FlexStart | Align::Baseline => AlignContent::FlexStart,
        Align::Center => AlignContent::Center,
        Align::FlexEnd => AlignContent::FlexEnd,
        Align::Stretch => AlignContent::Stretch,
        Align::SpaceBetween => AlignContent::SpaceBetween,
        Align::SpaceAround => AlignContent::SpaceAround,
        Align::SpaceEvenly => AlignContent::SpaceEvenly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn style(value: Value) -> YogaStyle {
        YogaStyle::from_raw(&RawProps::from_value(value))
    }

    #[test]
    fn test_parse_lengths() {
        assert_eq!(StyleLength::parse(&json!(10)), Some(StyleLength::Points(10.0)));
        assert_eq!(StyleLength::parse(&json!("50%")), Some(StyleLength::Percent(50.0)));
        assert_eq!(StyleLength::parse(&json!("auto")), Some(StyleLength::Auto));
        assert_eq!(StyleLength::parse(&json!(null)), Some(StyleLength::Undefined));
        assert_eq!(StyleLength::parse(&json!(true)), None);
    }

    #[test]
    fn test_yoga_defaults() {
        let s = YogaStyle::default();
        assert_eq!(s.flex_direction, FlexDirection::Column);
        assert_eq!(s.align_items, Align::Stretch);
        assert_eq!(s.resolved_flex_shrink(), 0.0);
    }

    #[test]
    fn test_flex_shorthand() {
        let s = style(json!({ "flex": 2 }));
        let taffy = s.to_taffy(LayoutDirection::LeftToRight);
        assert_eq!(taffy.flex_grow, 2.0);
        assert_eq!(taffy.flex_basis, Dimension::Length(0.0));

        let s = style(json!({ "flex": -1 }));
        assert_eq!(s.resolved_flex_shrink(), 1.0);
        assert_eq!(s.resolved_flex_grow(), 0.0);
    }

    #[test]
    fn test_edge_precedence() {
        let s = style(json!({ "margin": 1, "marginHorizontal": 2, "marginLeft": 3, "marginStart": 4 }));
        assert_eq!(s.margin.resolve(Edge::Left, false), StyleLength::Points(4.0));
        assert_eq!(s.margin.resolve(Edge::Right, false), StyleLength::Points(2.0));
        assert_eq!(s.margin.resolve(Edge::Top, false), StyleLength::Points(1.0));
        // Start is the right edge under RTL.
        assert_eq!(s.margin.resolve(Edge::Right, true), StyleLength::Points(4.0));
        assert_eq!(s.margin.resolve(Edge::Left, true), StyleLength::Points(3.0));
    }

    #[test]
    fn test_edge_key_aliases() {
        let s = style(json!({
            "borderLeftWidth": 2,
            "borderWidth": 1,
            "paddingBlock": 5,
            "insetInlineEnd": 7,
            "top": "10%",
        }));
        assert_eq!(s.border.get(Edge::Left), StyleLength::Points(2.0));
        assert_eq!(s.border.get(Edge::All), StyleLength::Points(1.0));
        assert_eq!(s.padding.get(Edge::Vertical), StyleLength::Points(5.0));
        assert_eq!(s.position.get(Edge::End), StyleLength::Points(7.0));
        assert_eq!(s.position.get(Edge::Top), StyleLength::Percent(10.0));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let s = style(json!({ "opacity": 0.5, "testID": "x" }));
        assert_eq!(s, YogaStyle::default());
    }

    #[test]
    fn test_swap_left_and_right() {
        let mut s = style(json!({ "left": 5, "paddingRight": 3 }));
        assert!(s.swap_left_and_right());
        assert_eq!(s.position.get(Edge::Start), StyleLength::Points(5.0));
        assert_eq!(s.position.get(Edge::Left), StyleLength::Undefined);
        assert_eq!(s.padding.get(Edge::End), StyleLength::Points(3.0));
        assert!(!s.swap_left_and_right());
    }

    #[test]
    fn test_rtl_reverses_row() {
        let s = style(json!({ "flexDirection": "row" }));
        assert_eq!(s.to_taffy(LayoutDirection::LeftToRight).flex_direction, TaffyFlexDirection::Row);
        assert_eq!(
            s.to_taffy(LayoutDirection::RightToLeft).flex_direction,
            TaffyFlexDirection::RowReverse
        );
    }

    #[test]
    fn test_percent_is_fraction_in_taffy() {
        let s = style(json!({ "width": "50%", "position": "absolute" }));
        let taffy = s.to_taffy(LayoutDirection::LeftToRight);
        assert_eq!(taffy.size.width, Dimension::Percent(0.5));
        assert_eq!(taffy.position, Position::Absolute);
        assert_eq!(taffy.inset.left, LengthPercentageAuto::Auto);
    }
}
