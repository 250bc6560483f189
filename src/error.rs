use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("style not found: {0}")]
    StyleNotFound(String),

    #[error("cannot load template {path:?}: {source}")]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("document generation failed, check the template format: {source}")]
    Assembly {
        #[source]
        source: Box<Error>,
    },

    #[error("the API returned no content")]
    GenerationEmpty,

    #[error("request failed: {0}")]
    Network(String),

    #[error("not a valid DOCX file: {0}")]
    InvalidDocx(String),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("XML write error: {0}")]
    XmlWrite(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn assembly(source: Error) -> Self {
        Error::Assembly {
            source: Box::new(source),
        }
    }

    pub(crate) fn template_load(path: impl Into<PathBuf>, source: Error) -> Self {
        Error::TemplateLoad {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}
