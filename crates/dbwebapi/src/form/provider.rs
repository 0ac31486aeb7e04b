//! Memory-backed multipart stream provider

use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;

use super::form_data::FormData;
use super::headers::PartHeaders;
use crate::types::InputFieldView;
use crate::{Error, Result};

/// The multipart request body enclosing the parts being captured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentContent {
    content_type: String,
}

impl ParentContent {
    /// Parent of a `multipart/*` request; `None` for any other content type
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|value| {
                value
                    .get(..10)
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case("multipart/"))
            })
            .map(|value| Self {
                content_type: value.to_string(),
            })
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// Where a multipart parser writes each body part
pub trait MultipartStreamProvider {
    /// Buffer receiving the body of the part described by `headers`
    fn capture_stream(
        &mut self,
        parent: Option<&ParentContent>,
        headers: Option<PartHeaders>,
    ) -> Result<&mut Vec<u8>>;

    /// Declared file name of the part, unquoted; `None` for plain fields
    fn resolve_local_name(&self, headers: Option<&PartHeaders>) -> Result<Option<String>>;
}

/// Record of one captured file part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartFileData {
    pub headers: PartHeaders,
    pub local_file_name: String,
}

#[derive(Debug)]
struct UploadedPart {
    headers: PartHeaders,
    buffer: Vec<u8>,
}

impl UploadedPart {
    fn field_name(&self) -> &str {
        self.headers
            .form_field_name()
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}

/// One value produced by [`MemoryStreamProvider::get_all_input_data`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputValue<'a> {
    Text(&'a str),
    Null,
    Binary(&'a [u8]),
}

impl InputValue<'_> {
    #[must_use]
    pub fn to_view(&self, name: &str) -> InputFieldView {
        let name = name.to_string();
        match *self {
            Self::Text(value) => InputFieldView::Text {
                name,
                value: value.to_string(),
            },
            Self::Null => InputFieldView::Null { name },
            Self::Binary(bytes) => InputFieldView::Binary {
                name,
                size: bytes.len(),
            },
        }
    }
}

/// Keeps uploaded files in memory instead of spooling them to disk.
///
/// One provider serves one request. Parts declaring a file name get their
/// own buffer; every other part is written to a scratch buffer and must be
/// recorded in [`FormData`] by the caller.
#[derive(Debug, Default)]
pub struct MemoryStreamProvider {
    form_data: FormData,
    uploads: Vec<UploadedPart>,
    file_data: Vec<MultipartFileData>,
    scratch: Vec<u8>,
}

impl MemoryStreamProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn form_data(&self) -> &FormData {
        &self.form_data
    }

    pub const fn form_data_mut(&mut self) -> &mut FormData {
        &mut self.form_data
    }

    /// Captured file parts, in arrival order
    #[must_use]
    pub fn file_data(&self) -> &[MultipartFileData] {
        &self.file_data
    }

    /// Drain the scratch buffer of the last untracked part
    pub fn take_scratch(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.scratch)
    }

    /// All inputs as (field name, value): text fields first, every value of
    /// a repeated field in order, then file uploads with their bytes.
    ///
    /// Borrows the provider, so it can be called any number of times.
    pub fn get_all_input_data(&self) -> impl Iterator<Item = (&str, InputValue<'_>)> {
        let fields = self.form_data.iter().flat_map(|(key, values)| {
            let entries: Box<dyn Iterator<Item = InputValue<'_>> + '_> = match values {
                Some(values) => Box::new(values.iter().map(|v| InputValue::Text(v))),
                None => Box::new(std::iter::once(InputValue::Null)),
            };
            entries.map(move |value| (key, value))
        });

        let uploads = self
            .uploads
            .iter()
            .map(|part| (part.field_name(), InputValue::Binary(&part.buffer)));

        fields.chain(uploads)
    }
}

impl MultipartStreamProvider for MemoryStreamProvider {
    fn capture_stream(
        &mut self,
        parent: Option<&ParentContent>,
        headers: Option<PartHeaders>,
    ) -> Result<&mut Vec<u8>> {
        if parent.is_none() {
            return Err(Error::InvalidArgument("parent"));
        }
        let headers = headers.ok_or(Error::InvalidArgument("headers"))?;

        let Some(local_file_name) = headers.file_name()?.map(str::to_string) else {
            self.scratch.clear();
            return Ok(&mut self.scratch);
        };

        self.file_data.push(MultipartFileData {
            headers: headers.clone(),
            local_file_name,
        });
        self.uploads.push(UploadedPart {
            headers,
            buffer: Vec::new(),
        });

        let index = self.uploads.len() - 1;
        Ok(&mut self.uploads[index].buffer)
    }

    fn resolve_local_name(&self, headers: Option<&PartHeaders>) -> Result<Option<String>> {
        let headers = headers.ok_or(Error::InvalidArgument("headers"))?;
        Ok(headers.file_name()?.map(str::to_string))
    }
}
