use std::path::PathBuf;

/// Environment failures outside the document itself.
///
/// Problems inside a document are never errors: they are diagnostics on the
/// returned model.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The source provider could not produce the document text.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension names no supported tree notation.
    #[error("unsupported source format for {}: expected .yaml, .yml or .json", .0.display())]
    UnsupportedFormat(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_path() {
        let err = CompileError::UnsupportedFormat(PathBuf::from("w.toml"));
        assert_eq!(
            err.to_string(),
            "unsupported source format for w.toml: expected .yaml, .yml or .json"
        );

        let err = CompileError::Read {
            path: PathBuf::from("w.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "cannot read w.yaml: gone");
        assert!(std::error::Error::source(&err).is_some());
    }
}
