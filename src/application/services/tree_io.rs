//! Tree input/output service
//!
//! Reads prefix notation from files or streams and writes the printer formats.

use std::io::{self, Read, Write};
use std::path::Path;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{parse_prefix, print_tree, Notation, ParseOptions, Tree};

/// Service for reading trees and writing their notations.
pub struct TreeService {
    options: ParseOptions,
}

impl TreeService {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse one tree from in-memory text.
    pub fn parse(&self, text: &str) -> ApplicationResult<Tree> {
        Ok(parse_prefix(text, &self.options)?)
    }

    /// Read a stream to its end and parse it.
    #[instrument(level = "debug", skip(self, reader))]
    pub fn read(&self, reader: &mut dyn Read, source: &str) -> ApplicationResult<Tree> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("read tree from {source}"),
                source: Box::new(e),
            })?;
        debug!(bytes = text.len(), "input read");
        self.parse(&text)
    }

    /// Read and parse a file.
    #[instrument(level = "debug", skip(self))]
    pub fn read_file(&self, path: &Path) -> ApplicationResult<Tree> {
        let text = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ApplicationError::InputNotFound(path.to_path_buf()))
            }
            other => other.with_path_context("read tree", path)?,
        };
        self.parse(&text)
    }

    /// Write `tree` once per notation, one line each, then flush `out`.
    pub fn write_notations(
        &self,
        tree: &Tree,
        notations: &[Notation],
        out: &mut dyn Write,
    ) -> io::Result<()> {
        for notation in notations {
            print_tree(tree, *notation, out)?;
        }
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, ParseError};
    use std::io::Cursor;

    #[test]
    fn given_stream_when_read_then_parsed() {
        let service = TreeService::new(ParseOptions::default());
        let mut input = Cursor::new("(1 nil (2 nil nil ))\n");
        let tree = service.read(&mut input, "stdin").unwrap();
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn given_missing_file_then_input_not_found() {
        let service = TreeService::new(ParseOptions::default());
        let err = service
            .read_file(Path::new("/definitely/not/here.tree"))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::InputNotFound(_)));
    }

    #[test]
    fn given_malformed_text_then_domain_parse_error() {
        let service = TreeService::new(ParseOptions::default());
        let err = service.parse("(1 nil").unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::Parse(ParseError::UnterminatedNode { .. }))
        ));
    }

    #[test]
    fn given_notations_then_one_line_each() {
        let service = TreeService::new(ParseOptions::default());
        let tree = service.parse("(1 nil nil )").unwrap();
        let mut out = Vec::new();
        service
            .write_notations(&tree, &Notation::ALL, &mut out)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "(1 nil nil )\n(nil nil 1 )\n(nil 1 nil )\n"
        );
    }

    #[test]
    fn given_buffered_sink_then_notations_are_flushed() {
        let service = TreeService::new(ParseOptions::default());
        let tree = service.parse("(2 (1 nil nil )nil )").unwrap();
        let mut out = io::BufWriter::new(Vec::new());
        service
            .write_notations(&tree, &[Notation::Infix], &mut out)
            .unwrap();
        assert!(out.buffer().is_empty());
        assert_eq!(out.get_ref().as_slice(), b"((nil 1 nil )2 nil )\n");
    }
}
