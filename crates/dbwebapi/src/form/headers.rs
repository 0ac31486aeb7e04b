//! Part headers of a multipart/form-data body

use axum::http::{HeaderMap, HeaderName};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};

use crate::{Error, Result};

/// `Content-Disposition` of one body part.
///
/// Parameter values are kept as sent, quotes included; callers unquote
/// them with [`unquote_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    pub disposition_type: String,
    pub name: Option<String>,
    pub file_name: Option<String>,
}

impl ContentDisposition {
    /// Parse a header value such as `form-data; name="a"; filename="b.txt"`
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let mut segments = split_parameters(value).into_iter();
        let disposition_type = segments.next()?.trim();
        if disposition_type.is_empty() {
            return None;
        }

        let mut name = None;
        let mut file_name = None;
        for segment in segments {
            let Some((key, raw)) = segment.split_once('=') else {
                continue;
            };
            let raw = raw.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "name" => name = Some(raw),
                "filename" => file_name = Some(raw),
                _ => {}
            }
        }

        Some(Self {
            disposition_type: disposition_type.to_ascii_lowercase(),
            name,
            file_name,
        })
    }
}

/// Header fields describing one body part
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartHeaders {
    pub content_disposition: Option<ContentDisposition>,
    pub content_type: Option<String>,
}

impl PartHeaders {
    #[must_use]
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        // Browsers send non-ASCII file names as raw UTF-8
        let text = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
                .map(str::to_string)
        };

        Self {
            content_disposition: text(CONTENT_DISPOSITION)
                .as_deref()
                .and_then(ContentDisposition::parse),
            content_type: text(CONTENT_TYPE),
        }
    }

    fn disposition(&self) -> Result<&ContentDisposition> {
        self.content_disposition
            .as_ref()
            .ok_or(Error::InvalidArgument("headers.content_disposition"))
    }

    /// Declared file name, unquoted. `None` for plain form fields.
    pub fn file_name(&self) -> Result<Option<&str>> {
        Ok(unquote_token(self.disposition()?.file_name.as_deref()))
    }

    /// Declared form field name, unquoted
    pub fn form_field_name(&self) -> Result<Option<&str>> {
        Ok(unquote_token(self.disposition()?.name.as_deref()))
    }
}

/// Strip one pair of surrounding double quotes.
///
/// Absent or empty input yields `None`; `"\"\""` yields `Some("")`.
#[must_use]
pub fn unquote_token(token: Option<&str>) -> Option<&str> {
    let token = token.filter(|t| !t.is_empty())?;
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        Some(&token[1..token.len() - 1])
    } else {
        Some(token)
    }
}

/// Split on `;` outside quoted strings
fn split_parameters(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                segments.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);
    segments
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_unquote_token() {
        assert_eq!(unquote_token(Some("\"abc\"")), Some("abc"));
        assert_eq!(unquote_token(Some("abc")), Some("abc"));
        assert_eq!(unquote_token(Some("\"\"")), Some(""));
        assert_eq!(unquote_token(Some("")), None);
        assert_eq!(unquote_token(None), None);
    }

    #[test]
    fn test_unquote_token_single_quote_char() {
        assert_eq!(unquote_token(Some("\"")), Some("\""));
        assert_eq!(unquote_token(Some("\"abc")), Some("\"abc"));
    }

    #[test]
    fn test_parse_file_part() {
        let cd = ContentDisposition::parse(r#"form-data; name="file1"; filename="a.bin""#).unwrap();
        assert_eq!(cd.disposition_type, "form-data");
        assert_eq!(cd.name.as_deref(), Some("\"file1\""));
        assert_eq!(cd.file_name.as_deref(), Some("\"a.bin\""));
    }

    #[test]
    fn test_parse_keeps_semicolon_inside_quotes() {
        let cd = ContentDisposition::parse(r#"form-data; name="x"; filename="a;b.txt""#).unwrap();
        assert_eq!(cd.file_name.as_deref(), Some("\"a;b.txt\""));
    }

    #[test]
    fn test_parse_unquoted_and_case_insensitive_keys() {
        let cd = ContentDisposition::parse("Form-Data; NAME=plain").unwrap();
        assert_eq!(cd.disposition_type, "form-data");
        assert_eq!(cd.name.as_deref(), Some("plain"));
        assert!(cd.file_name.is_none());
    }

    #[test]
    fn test_parse_empty() {
        assert!(ContentDisposition::parse("").is_none());
        assert!(ContentDisposition::parse("  ; name=a").is_none());
    }

    #[test]
    fn test_part_headers_from_header_map() {
        let mut map = HeaderMap::new();
        map.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static(r#"form-data; name="doc"; filename="r.pdf""#),
        );
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));

        let headers = PartHeaders::from_header_map(&map);
        assert_eq!(headers.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(headers.file_name().unwrap(), Some("r.pdf"));
        assert_eq!(headers.form_field_name().unwrap(), Some("doc"));
    }

    #[test]
    fn test_part_headers_utf8_file_name() {
        let mut map = HeaderMap::new();
        let raw = r#"form-data; name="cv"; filename="résumé.pdf""#;
        map.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_bytes(raw.as_bytes()).unwrap(),
        );

        let headers = PartHeaders::from_header_map(&map);
        assert_eq!(headers.file_name().unwrap(), Some("résumé.pdf"));
        assert_eq!(headers.form_field_name().unwrap(), Some("cv"));
    }

    #[test]
    fn test_missing_content_disposition_is_argument_error() {
        let headers = PartHeaders::default();
        assert!(headers.file_name().unwrap_err().is_argument_error());
        assert!(headers.form_field_name().unwrap_err().is_argument_error());
    }

    #[test]
    fn test_plain_field_has_no_file_name() {
        let headers = PartHeaders {
            content_disposition: ContentDisposition::parse(r#"form-data; name="a""#),
            content_type: None,
        };
        assert_eq!(headers.file_name().unwrap(), None);
    }
}
