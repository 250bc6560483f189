use clap::Parser;
use docgen::{AppConfig, ChatClient, DocumentRequest, GenerationJob, configure_font};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docgen", about = "Generate a styled DOCX document from a prompt")]
struct Args {
    /// Topic to send to the model
    #[arg(long, conflicts_with = "content_file", required_unless_present = "content_file")]
    prompt: Option<String>,
    /// Use this text file as the document content instead of calling the API
    #[arg(long)]
    content_file: Option<PathBuf>,
    /// Output DOCX file; a numbered name is picked if it exists
    #[arg(long, short, default_value = "AI生成的文档.docx")]
    output: PathBuf,
    /// Template DOCX whose formatting is reused
    #[arg(long, short)]
    template: Option<PathBuf>,
    /// Font family for the generated text
    #[arg(long)]
    font: Option<String>,
    /// Font size, e.g. "12" or "小四(12)"
    #[arg(long)]
    size: Option<String>,
    #[arg(long)]
    bold: bool,
    #[arg(long)]
    italic: bool,
    /// Separator lines and spacing around generated paragraphs
    #[arg(long)]
    spacing: bool,
    /// Keep markdown-like symbols in the generated text
    #[arg(long)]
    no_filter: bool,
    /// Settings file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = if args.config.exists() {
        match AppConfig::load(&args.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    } else {
        AppConfig::default()
    };

    let font_size = match args.size.as_deref() {
        Some(label) => match configure_font(label) {
            Some(pt) => Some(pt),
            None => {
                eprintln!("Error: invalid font size: {label}");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let request = DocumentRequest {
        font_name: args.font,
        font_size,
        bold: args.bold,
        italic: args.italic,
        template: args.template,
        spacing_enabled: args.spacing,
    };

    let result = match (args.content_file, args.prompt) {
        (Some(path), _) => std::fs::read_to_string(&path)
            .map_err(docgen::Error::from)
            .and_then(|content| {
                docgen::create_document(&content, &args.output, &request, &config.style)
            }),
        (None, Some(prompt)) => {
            let client = ChatClient::new(config.api.clone()).with_symbol_filter(!args.no_filter);
            let job = GenerationJob {
                prompt,
                output: args.output,
                request,
            };
            docgen::run_job(&client, &job, &config.style)
        }
        (None, None) => unreachable!("clap requires --prompt or --content-file"),
    };

    match result {
        Ok(path) => {
            let shown = std::fs::canonicalize(&path).unwrap_or(path);
            println!("Document saved to {}", shown.display());
        }
        Err(e) => {
            eprintln!("Error: {e}");
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            std::process::exit(1);
        }
    }
}
