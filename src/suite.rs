use anyhow::{Context, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Url;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;
use winnow::ascii::multispace0;
use winnow::token::{literal, one_of, take_till, take_while};
use winnow::{ModalResult, Parser};

/// Escapes what `encodeURIComponent` escapes, so Jasmine's
/// `decodeURIComponent` reads the `?spec=` filter back unchanged.
const SPEC_FILTER: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Parses `describe("Name"` / `describe 'Name'` and returns `Name`.
fn describe_declaration<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    let (_, _, _, name, _) = (
        literal("describe"),
        multispace0,
        take_while(1.., ['(', '"', '\'']),
        take_till(0.., ['"', '\'', ')']),
        one_of(['"', '\'', ')']),
    )
        .parse_next(input)?;
    Ok(name)
}

/// Returns the first suite name declared on `line`, if any.
pub fn suite_name_in_line(line: &str) -> Option<&str> {
    line.match_indices("describe").find_map(|(idx, _)| {
        let mut input = &line[idx..];
        describe_declaration(&mut input).ok()
    })
}

/// Scans `file` for the first `describe` declaration.
///
/// The top-level suite of a spec file is usually declared first, so the
/// first match is used as the Jasmine `?spec=` filter.
pub fn suite_filter(file: &Path) -> Result<Option<String>> {
    let handle =
        File::open(file).with_context(|| format!("Failed to open spec file {}", file.display()))?;

    for line in BufReader::new(handle).lines() {
        let line = line.with_context(|| format!("Failed to read spec file {}", file.display()))?;
        if let Some(name) = suite_name_in_line(&line) {
            debug!("📋 Suite filter for {}: {}", file.display(), name);
            return Ok(Some(name.to_string()));
        }
    }

    debug!("📋 No suite declaration in {}", file.display());
    Ok(None)
}

/// Builds the runner URL for a spec file.
///
/// The spec directory itself runs every suite, so it maps to the bare base
/// URL, as does a file without a `describe` declaration.
pub fn suite_url(base_url: &str, file: &Path, spec_dir: &Path) -> Result<Url> {
    let mut url =
        Url::parse(base_url).with_context(|| format!("Invalid jasmine_url: {}", base_url))?;

    if file == spec_dir {
        return Ok(url);
    }

    if let Some(name) = suite_filter(file)? {
        let filter = utf8_percent_encode(&name, SPEC_FILTER);
        url.set_query(Some(&format!("spec={}", filter)));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn spec_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_suite_name_variants() {
        assert_eq!(suite_name_in_line("describe(\"Calculator\", function() {"), Some("Calculator"));
        assert_eq!(suite_name_in_line("describe('Router', () => {"), Some("Router"));
        assert_eq!(suite_name_in_line("describe 'Models.User', ->"), Some("Models.User"));
        assert_eq!(suite_name_in_line("  describe (\"Spaced out\","), Some("Spaced out"));
        assert_eq!(suite_name_in_line("it('does things', function() {"), None);
        assert_eq!(suite_name_in_line("// describes nothing"), None);
    }

    #[test]
    fn test_second_occurrence_on_line_is_found() {
        assert_eq!(
            suite_name_in_line("// describe here; describe('Real', function() {"),
            Some("Real")
        );
    }

    #[test]
    fn test_first_declaration_wins() {
        let file = spec_file(
            "// helpers\n\
             describe('Outer', function() {\n\
             \x20 describe('Inner', function() {\n",
        );
        assert_eq!(suite_filter(file.path()).unwrap(), Some("Outer".to_string()));
    }

    #[test]
    fn test_no_declaration_is_none() {
        let file = spec_file("var x = 1;\n");
        assert_eq!(suite_filter(file.path()).unwrap(), None);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(suite_filter(Path::new("/nonexistent/spec/foo_spec.js")).is_err());
    }

    #[test]
    fn test_suite_url_encodes_filter() {
        let file = spec_file("describe(\"Shopping cart\", function() {\n");
        let url = suite_url(
            "http://localhost:8888/jasmine",
            file.path(),
            Path::new("spec/javascripts"),
        )
        .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8888/jasmine?spec=Shopping%20cart");
    }

    #[test]
    fn test_suite_url_escapes_reserved_characters() {
        let file = spec_file("describe('100% coverage & more', function() {\n");
        let url = suite_url(
            "http://localhost:8888/jasmine",
            file.path(),
            Path::new("spec/javascripts"),
        )
        .unwrap();
        assert_eq!(url.query(), Some("spec=100%25%20coverage%20%26%20more"));
    }

    #[test]
    fn test_suite_url_keeps_unreserved_characters() {
        let file = spec_file("describe(\"Models.User_admin-v2~*!\", function() {\n");
        let url = suite_url(
            "http://localhost:8888/jasmine",
            file.path(),
            Path::new("spec/javascripts"),
        )
        .unwrap();
        assert_eq!(url.query(), Some("spec=Models.User_admin-v2~*!"));
    }

    #[test]
    fn test_suite_url_for_spec_dir_runs_everything() {
        let dir = tempfile::tempdir().unwrap();
        let url = suite_url("http://localhost:8888/jasmine", dir.path(), dir.path()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8888/jasmine");
    }

    #[test]
    fn test_suite_url_without_filter() {
        let file = spec_file("beforeEach(function() {});\n");
        let url = suite_url(
            "http://localhost:8888/jasmine",
            file.path(),
            Path::new("spec/javascripts"),
        )
        .unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_invalid_base_url() {
        let file = spec_file("describe('A', function() {\n");
        assert!(suite_url("not a url", file.path(), Path::new("spec")).is_err());
    }
}
