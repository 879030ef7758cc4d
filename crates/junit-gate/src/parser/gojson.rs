//! Record decoding for `go test -json` streams

use crate::result::ParseError;
use serde::Deserialize;

/// One `test2json` record; output and build-output records carry text
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Record {
    #[serde(default)]
    pub(crate) action: String,
    #[serde(default)]
    pub(crate) package: String,
    #[serde(default)]
    pub(crate) import_path: String,
    #[serde(default)]
    pub(crate) output: Option<String>,
}

impl Record {
    pub(crate) fn is_output(&self) -> bool {
        self.action == "output"
    }

    /// Compiler output, emitted as records by Go 1.24+
    pub(crate) fn is_build_output(&self) -> bool {
        self.action == "build-output"
    }

    /// Package a build-output record belongs to
    ///
    /// `example.com/x [example.com/x.test]` -> `example.com/x`
    pub(crate) fn build_package(&self) -> &str {
        if self.import_path.is_empty() {
            return &self.package;
        }
        self.import_path
            .split_once(" [")
            .map_or(self.import_path.as_str(), |(package, _)| package)
    }

    /// Output text split into lines without terminators
    pub(crate) fn output_lines(&self) -> impl Iterator<Item = &str> {
        self.output
            .as_deref()
            .unwrap_or_default()
            .split_terminator('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
    }
}

/// Decode a line; `None` means the line is not JSON and should be read as text
pub(crate) fn decode(line: &str, number: usize) -> Result<Option<Record>, ParseError> {
    if !line.trim_start().starts_with('{') {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|source| ParseError::Json {
            line: number,
            source,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_output_record() {
        let record = decode(
            r#"{"Time":"2024-03-01T12:00:00Z","Action":"output","Package":"example.com/pkg","Test":"TestA","Output":"=== RUN   TestA\n"}"#,
            1,
        )
        .unwrap()
        .unwrap();
        assert!(record.is_output());
        assert_eq!(record.package, "example.com/pkg");
        assert_eq!(record.output_lines().collect::<Vec<_>>(), vec!["=== RUN   TestA"]);
    }

    #[test]
    fn test_decode_pass_record() {
        let record = decode(
            r#"{"Action":"pass","Package":"example.com/pkg","Elapsed":0.25}"#,
            2,
        )
        .unwrap()
        .unwrap();
        assert!(!record.is_output());
        assert_eq!(record.output_lines().count(), 0);
    }

    #[test]
    fn test_decode_build_output_record() {
        let record = decode(
            r#"{"ImportPath":"example.com/broken [example.com/broken.test]","Action":"build-output","Output":"./x.go:1:1: syntax error\n"}"#,
            4,
        )
        .unwrap()
        .unwrap();
        assert!(record.is_build_output());
        assert!(!record.is_output());
        assert_eq!(record.build_package(), "example.com/broken");
    }

    #[test]
    fn test_build_package_without_test_suffix() {
        let record = decode(
            r##"{"ImportPath":"example.com/lib","Action":"build-output","Output":"# example.com/lib\n"}"##,
            5,
        )
        .unwrap()
        .unwrap();
        assert_eq!(record.build_package(), "example.com/lib");
    }

    #[test]
    fn test_plain_text_is_not_json() {
        assert!(decode("# example.com/broken", 3).unwrap().is_none());
    }

    #[test]
    fn test_malformed_record_names_line() {
        let err = decode(r#"{"Action":"output","#, 9).unwrap_err();
        assert!(matches!(err, ParseError::Json { line: 9, .. }));
    }
}
