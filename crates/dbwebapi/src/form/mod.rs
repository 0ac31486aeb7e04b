//! Memory-backed multipart/form-data collection

mod form_data;
mod headers;
mod multipart;
mod provider;

pub use form_data::FormData;
pub use headers::{ContentDisposition, PartHeaders, unquote_token};
pub use multipart::read_multipart;
pub use provider::{
    InputValue, MemoryStreamProvider, MultipartFileData, MultipartStreamProvider, ParentContent,
};
