//! Google Docs `batchUpdate` request bodies.
//!
//! Only the handful of request kinds the converter sends are modelled; field
//! names follow the REST API's camelCase JSON.

use serde::Serialize;
use tracing::debug;

use crate::block::HeadingLevel;
use crate::layout::TextRange;
use crate::style::{ListKind, ParagraphStyle, Rgb, StyleOperation, TextStyle};

pub const DEFAULT_INDENT_PT: f32 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocsOptions {
    /// Indentation per list nesting level, in points
    pub indent_pt: f32,
}

impl Default for DocsOptions {
    fn default() -> Self {
        Self {
            indent_pt: DEFAULT_INDENT_PT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchUpdate {
    pub requests: Vec<Request>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    InsertText(InsertText),
    UpdateParagraphStyle(UpdateParagraphStyle),
    CreateParagraphBullets(CreateParagraphBullets),
    DeleteParagraphBullets(DeleteParagraphBullets),
    UpdateTextStyle(UpdateTextStyle),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertText {
    pub text: String,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_index: usize,
    pub end_index: usize,
}

impl From<TextRange> for Range {
    fn from(range: TextRange) -> Self {
        Self {
            start_index: range.start,
            end_index: range.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParagraphStyle {
    pub range: Range,
    pub paragraph_style: ParagraphStyleFields,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyleFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_style_type: Option<NamedStyleType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_first_line: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_start: Option<Dimension>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NamedStyleType {
    #[serde(rename = "NORMAL_TEXT")]
    NormalText,
    #[serde(rename = "HEADING_1")]
    Heading1,
    #[serde(rename = "HEADING_2")]
    Heading2,
    #[serde(rename = "HEADING_3")]
    Heading3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimension {
    pub magnitude: f32,
    pub unit: Unit,
}

impl Dimension {
    pub fn pt(magnitude: f32) -> Self {
        Self {
            magnitude,
            unit: Unit::Pt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    #[serde(rename = "PT")]
    Pt,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParagraphBullets {
    pub range: Range,
    pub bullet_preset: BulletPreset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BulletPreset {
    #[serde(rename = "BULLET_DISC_CIRCLE_SQUARE")]
    DiscCircleSquare,
    #[serde(rename = "BULLET_CHECKBOX")]
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteParagraphBullets {
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyle {
    pub range: Range,
    pub text_style: TextStyleFields,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyleFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<OptionalColor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptionalColor {
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub rgb_color: Rgb,
}

/// Insert `text` at `index` in the document body.
pub fn insert_text(index: usize, text: impl Into<String>) -> Request {
    Request::InsertText(InsertText {
        text: text.into(),
        location: Location { index },
    })
}

/// Translate style operations into Docs requests, preserving their order.
///
/// The Docs API has no way to create an already-ticked checklist item, so
/// the `checked` flag of checklist operations is not sent.
pub fn to_docs_requests(ops: &[StyleOperation], options: &DocsOptions) -> Vec<Request> {
    let mut requests = Vec::with_capacity(ops.len() * 2);
    let mut ticked = 0;

    for op in ops {
        match op {
            StyleOperation::Paragraph { range, style } => {
                paragraph_requests(*range, *style, &mut requests);
            }
            StyleOperation::List { range, list, depth } => {
                if let ListKind::Checklist { checked: true } = list {
                    ticked += 1;
                }
                list_requests(*range, *list, *depth, options, &mut requests);
            }
            StyleOperation::Text { range, style } => {
                requests.push(text_request(*range, style));
            }
        }
    }

    if ticked > 0 {
        debug!(ticked, "checked checklist items are created unticked");
    }
    requests
}

fn paragraph_requests(range: TextRange, style: ParagraphStyle, out: &mut Vec<Request>) {
    match style {
        ParagraphStyle::Heading(level) => {
            let named = match level {
                HeadingLevel::H1 => NamedStyleType::Heading1,
                HeadingLevel::H2 => NamedStyleType::Heading2,
                HeadingLevel::H3 => NamedStyleType::Heading3,
            };
            out.push(Request::UpdateParagraphStyle(UpdateParagraphStyle {
                range: range.into(),
                paragraph_style: ParagraphStyleFields {
                    named_style_type: Some(named),
                    indent_first_line: Some(Dimension::pt(0.0)),
                    indent_start: Some(Dimension::pt(0.0)),
                },
                fields: "namedStyleType,indentFirstLine,indentStart".to_string(),
            }));
            out.push(Request::DeleteParagraphBullets(DeleteParagraphBullets {
                range: range.into(),
            }));
        }
        ParagraphStyle::Normal => {
            out.push(Request::UpdateParagraphStyle(UpdateParagraphStyle {
                range: range.into(),
                paragraph_style: ParagraphStyleFields {
                    named_style_type: Some(NamedStyleType::NormalText),
                    ..ParagraphStyleFields::default()
                },
                fields: "namedStyleType".to_string(),
            }));
        }
    }
}

fn list_requests(
    range: TextRange,
    list: ListKind,
    depth: usize,
    options: &DocsOptions,
    out: &mut Vec<Request>,
) {
    let bullet_preset = match list {
        ListKind::Bulleted => BulletPreset::DiscCircleSquare,
        ListKind::Checklist { .. } => BulletPreset::Checkbox,
    };
    out.push(Request::CreateParagraphBullets(CreateParagraphBullets {
        range: range.into(),
        bullet_preset,
    }));

    let depth = depth as f32;
    out.push(Request::UpdateParagraphStyle(UpdateParagraphStyle {
        range: range.into(),
        paragraph_style: ParagraphStyleFields {
            named_style_type: None,
            indent_first_line: Some(Dimension::pt(depth * options.indent_pt)),
            indent_start: Some(Dimension::pt((depth + 1.0) * options.indent_pt)),
        },
        fields: "indentFirstLine,indentStart".to_string(),
    }));
}

fn text_request(range: TextRange, style: &TextStyle) -> Request {
    let mut fields = Vec::new();
    if style.bold.is_some() {
        fields.push("bold");
    }
    if style.italic.is_some() {
        fields.push("italic");
    }
    if style.foreground.is_some() {
        fields.push("foregroundColor");
    }

    Request::UpdateTextStyle(UpdateTextStyle {
        range: range.into(),
        text_style: TextStyleFields {
            bold: style.bold,
            italic: style.italic,
            foreground_color: style.foreground.map(|rgb_color| OptionalColor {
                color: Color { rgb_color },
            }),
        },
        fields: fields.join(","),
    })
}
