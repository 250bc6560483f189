mod assembler;
mod borders;
mod config;
mod docx;
mod error;
mod filter;
mod formatting;
mod generate;
mod line;
mod model;
mod styles;
pub mod xml;

pub use assembler::{
    Assembly, AssemblyState, DocumentRequest, create_document, force_continuous_sections,
    resolve_output_path,
};
pub use borders::{clean_decorative_lines, strip_border_elements};
pub use config::{ApiConfig, AppConfig, DEFAULT_FONT_NAME, DEFAULT_FONT_SIZE, StyleConfig};
pub use docx::{DocxDocument, paragraph_text, preview};
pub use error::{Error, Result};
pub use filter::filter_ai_symbols;
pub use formatting::{DocumentFormatter, StyleOverrides, configure_font};
pub use generate::{ChatClient, ContentSource, Dispatcher, GenerationJob, run_job};
pub use line::LineFormatter;
pub use model::{
    Alignment, BorderEdge, Edge, Font, LineRule, LineSpacing, ParagraphFormat, Underline,
    edge_borders,
};
pub use styles::{DEFAULT_STYLE_NAME, StyleDefinition, Styles};
