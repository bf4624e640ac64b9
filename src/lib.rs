mod block;
mod config;
mod error;
mod google;
mod inline;
mod layout;
mod parser;
mod requests;
mod service;
mod style;

pub use block::{Block, BlockKind, HeadingLevel, Span, SpanKind};
pub use config::{Config, ConfigError, FooterRuleKind};
pub use error::{AlignmentError, ConvertError, ServiceError};
pub use google::GoogleDocsClient;
pub use layout::{DOCUMENT_BODY_START, Layout, TextRange, payload, utf16_len};
pub use parser::{FooterRule, ParseOptions, Parsed};
pub use requests::{BatchUpdate, DocsOptions, Request, to_docs_requests};
pub use service::{DocumentHandle, DocumentService, RecordingService};
pub use style::{ListKind, ParagraphStyle, Rgb, StyleOperation, TextStyle, Theme};

use tracing::{debug, info};

/// Parse markdown text into a title and blocks using the default rules.
pub fn parse(markdown: &str) -> Parsed {
    parser::parse(markdown, &ParseOptions::default())
}

/// Parse markdown text with custom rules.
pub fn parse_with(markdown: &str, options: &ParseOptions) -> Parsed {
    parser::parse(markdown, options)
}

/// Build style operations for blocks whose text sits at `offsets`, using the
/// default colours.
pub fn build(
    blocks: &[Block],
    offsets: &[TextRange],
) -> Result<Vec<StyleOperation>, AlignmentError> {
    style::blocks_to_operations(blocks, offsets, &Theme::default())
}

/// Build style operations with custom colours.
pub fn build_with_theme(
    blocks: &[Block],
    offsets: &[TextRange],
    theme: &Theme,
) -> Result<Vec<StyleOperation>, AlignmentError> {
    style::blocks_to_operations(blocks, offsets, theme)
}

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub parse: ParseOptions,
    pub theme: Theme,
    pub layout: Layout,
    /// Overrides the title taken from the first `#` heading
    pub title: Option<String>,
}

impl ConvertOptions {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            parse: config.parse_options()?,
            theme: config.theme()?,
            layout: Layout::default(),
            title: None,
        })
    }
}

/// A finished conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub document_id: String,
    pub url: String,
    pub title: String,
    pub operation_count: usize,
}

/// Convert markdown into a new formatted document on `service`.
///
/// Creates the document, inserts the plain text in one go, then applies all
/// formatting in a single batch. Service failures are passed through as-is.
pub fn convert<S>(
    markdown: &str,
    service: &mut S,
    options: &ConvertOptions,
) -> Result<Converted, ConvertError>
where
    S: DocumentService + ?Sized,
{
    let parsed = parse_with(markdown, &options.parse);
    let title = options.title.clone().unwrap_or(parsed.title);

    let document = service.create(&title).map_err(ConvertError::Create)?;
    info!(url = %document.url, "document created");

    let text = payload(&parsed.blocks);
    if !text.is_empty() {
        debug!(chars = utf16_len(&text), "inserting text");
        service
            .insert_text(&document, options.layout.base_index, &text)
            .map_err(|source| ConvertError::Insert {
                url: document.url.clone(),
                source,
            })?;
    }

    let offsets = options.layout.offsets(&parsed.blocks);
    let ops = build_with_theme(&parsed.blocks, &offsets, &options.theme).map_err(|source| {
        ConvertError::Alignment {
            url: document.url.clone(),
            source,
        }
    })?;

    if !ops.is_empty() {
        debug!(operations = ops.len(), "applying styles");
        service
            .apply_styles(&document, &ops)
            .map_err(|source| ConvertError::Styling {
                url: document.url.clone(),
                source,
            })?;
    }

    Ok(Converted {
        document_id: document.id,
        url: document.url,
        title,
        operation_count: ops.len(),
    })
}
