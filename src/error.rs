use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Object not found: {path}"))]
    PathNotFound { path: String },

    #[snafu(display("Only {actual} bytes available in stream, {requested} requested"))]
    ShortRead { actual: usize, requested: u64 },

    #[snafu(display("Stream pipe closed before the write completed"))]
    PipeClosed,

    #[snafu(display("Failed to read '{path}': {source}"))]
    ReadAllFailed { path: String, source: Box<Error> },

    #[snafu(display("Failed to write gzip object '{path}': {source}"))]
    WriteGzipFailed { path: String, source: Box<Error> },

    #[snafu(display("Failed to read gzip object '{path}': {source}"))]
    ReadGzipFailed { path: String, source: Box<Error> },

    #[snafu(display("Failed to merge into '{dest}': {source}"))]
    MergeFailed { dest: String, source: Box<Error> },

    #[snafu(display("Failed to move '{from}' to '{to}': {source}"))]
    MoveFailed {
        from: String,
        to: String,
        source: Box<Error>,
    },

    #[snafu(display("OpenDAL error: {source}"))]
    OpenDal { source: opendal::Error },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },
}

impl From<opendal::Error> for Error {
    fn from(error: opendal::Error) -> Self {
        Error::OpenDal { source: error }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io { source: error }
    }
}

impl Error {
    /// Walk the chain of contextual wrappers down to the operation-level
    /// cause, e.g. to match `ShortRead` or `PathNotFound` behind a `*Failed`
    /// variant.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::ReadAllFailed { source, .. }
            | Error::WriteGzipFailed { source, .. }
            | Error::ReadGzipFailed { source, .. }
            | Error::MergeFailed { source, .. }
            | Error::MoveFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
