use serde_json::Value as JsonValue;
use thiserror::Error;

/// Default fence line surrounding a YAML frontmatter block.
pub const DEFAULT_DELIMITER: &str = "---";

/// Options controlling frontmatter extraction (the gray-matter knobs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterOptions {
    /// Fence line opening and closing the block.
    pub delimiter: String,
}

impl Default for FrontmatterOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

/// Result returned after extracting frontmatter from an MDX document.
#[derive(Debug)]
pub struct FrontmatterExtraction {
    /// Parsed frontmatter as a JSON value.
    pub value: JsonValue,
    /// Byte offset inside the original document where the body begins.
    pub body_start: usize,
}

impl FrontmatterExtraction {
    fn empty() -> Self {
        Self {
            value: JsonValue::Object(Default::default()),
            body_start: 0,
        }
    }
}

/// Errors emitted while parsing or extracting frontmatter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Unclosed YAML fence (e.g., missing terminating `---`).
    #[error("Unterminated YAML frontmatter block: expected closing '{0}'")]
    Unterminated(String),
    /// YAML failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Extracts YAML frontmatter fenced by the default `---` delimiter.
pub fn extract_frontmatter(input: &str) -> Result<FrontmatterExtraction, FrontmatterError> {
    extract_frontmatter_with(input, &FrontmatterOptions::default())
}

/// Extracts YAML frontmatter using the given options.
pub fn extract_frontmatter_with(
    input: &str,
    options: &FrontmatterOptions,
) -> Result<FrontmatterExtraction, FrontmatterError> {
    match find_yaml_block(input, &options.delimiter)? {
        Some((block, body_start)) => {
            let value = parse_yaml_block(&block)?;
            Ok(FrontmatterExtraction { value, body_start })
        }
        None => Ok(FrontmatterExtraction::empty()),
    }
}

fn parse_yaml_block(block: &str) -> Result<JsonValue, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(JsonValue::Object(Default::default()));
    }

    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    let json_value =
        serde_json::to_value(yaml_value).map_err(|err| FrontmatterError::Parse(err.to_string()))?;

    match json_value {
        JsonValue::Null => Ok(JsonValue::Object(Default::default())),
        JsonValue::Object(_) => Ok(json_value),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

fn find_yaml_block(
    input: &str,
    delimiter: &str,
) -> Result<Option<(String, usize)>, FrontmatterError> {
    let (without_bom, bom_len) = strip_bom(input);
    let mut cursor = 0usize;

    loop {
        let Some((line, next_cursor)) = next_line(without_bom, cursor) else {
            return Ok(None);
        };
        if line.trim().is_empty() {
            cursor = next_cursor;
            continue;
        }
        if !is_fence(line, delimiter) {
            return Ok(None);
        }

        let block_start = next_cursor;
        let mut scan_cursor = next_cursor;
        loop {
            match next_line(without_bom, scan_cursor) {
                Some((block_line, next_line_cursor)) => {
                    if is_fence(block_line, delimiter) {
                        let raw_block = &without_bom[block_start..scan_cursor];
                        let trimmed = raw_block.trim_end_matches(['\r', '\n']);
                        let body_index = bom_len + next_line_cursor;
                        return Ok(Some((trimmed.to_string(), body_index)));
                    }
                    scan_cursor = next_line_cursor;
                }
                None => return Err(FrontmatterError::Unterminated(delimiter.to_string())),
            }
        }
    }
}

fn strip_bom(input: &str) -> (&str, usize) {
    if let Some(stripped) = input.strip_prefix('\u{feff}') {
        (stripped, '\u{feff}'.len_utf8())
    } else {
        (input, 0)
    }
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }

    let bytes = &input.as_bytes()[start..];
    if let Some(pos) = bytes.iter().position(|b| *b == b'\n') {
        let line_end = start + pos;
        Some((&input[start..line_end], line_end + 1))
    } else {
        Some((&input[start..], input.len()))
    }
}

fn is_fence(line: &str, delimiter: &str) -> bool {
    line.trim_end_matches('\r') == delimiter
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(input: &str) -> FrontmatterExtraction {
        extract_frontmatter(input).expect("frontmatter extraction should succeed")
    }

    #[test]
    fn returns_empty_when_no_frontmatter() {
        let result = extract("# Title\nBody");
        assert_eq!(result.body_start, 0);
        assert_eq!(result.value, JsonValue::Object(Default::default()));
    }

    #[test]
    fn parses_basic_yaml() {
        let input = "---\ntitle: Example\ntags:\n  - rust\n  - docs\n---\n# Content";
        let result = extract(input);
        assert_eq!(result.body_start, input.find("# Content").unwrap());
        assert_eq!(
            result.value.get("title").and_then(JsonValue::as_str),
            Some("Example")
        );
    }

    #[test]
    fn handles_empty_block() {
        let input = "---\n---\n# Body";
        let result = extract(input);
        assert_eq!(result.value, JsonValue::Object(Default::default()));
        assert_eq!(result.body_start, input.find("# Body").unwrap());
    }

    #[test]
    fn skips_bom_and_leading_blank_lines() {
        let input = "\u{feff}\n   \n---\nfoo: bar\n---\nBody";
        let result = extract(input);
        assert_eq!(
            result.value.get("foo").and_then(JsonValue::as_str),
            Some("bar")
        );
        assert_eq!(result.body_start, input.find("Body").unwrap());
    }

    #[test]
    fn custom_delimiter() {
        let options = FrontmatterOptions {
            delimiter: "+++".to_string(),
        };
        let input = "+++\ntitle: Toml-ish fence\n+++\nBody";
        let result = extract_frontmatter_with(input, &options).unwrap();
        assert_eq!(
            result.value.get("title").and_then(JsonValue::as_str),
            Some("Toml-ish fence")
        );

        // The default fence is not recognised once a custom one is configured.
        let result = extract_frontmatter_with("---\na: 1\n---\nBody", &options).unwrap();
        assert_eq!(result.body_start, 0);
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let input = "---\ninvalid: [unterminated\n---\n";
        let err = extract_frontmatter(input).unwrap_err();
        assert!(matches!(err, FrontmatterError::Parse(_)), "{err:?}");
    }

    #[test]
    fn errors_on_unterminated_block() {
        let err = extract_frontmatter("---\ntitle: test").unwrap_err();
        assert!(matches!(err, FrontmatterError::Unterminated(_)));
    }

    #[test]
    fn errors_on_non_mapping_root() {
        let err = extract_frontmatter("---\n- a\n- b\n---\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::InvalidRootType));
    }
}
