use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};

#[derive(MultipartForm)]
/// Multipart upload of one client document plus its metadata fields.
pub struct UploadDocumentForm {
    pub client_id: Text<String>,
    pub case_number: Option<Text<String>>,
    pub description: Option<Text<String>>,
    #[multipart(limit = "10MB")]
    pub file: TempFile,
}
