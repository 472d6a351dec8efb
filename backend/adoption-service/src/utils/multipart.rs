/// Buffered reading of small multipart uploads
use crate::error::{AppError, Result};
use actix_multipart::Multipart;
use futures_util::StreamExt;
use std::collections::HashMap;

/// Cap for plain text fields
const MAX_TEXT_FIELD_BYTES: usize = 4 * 1024;

/// Cap on parts per request, known or not
const MAX_PARTS: usize = 8;

#[derive(Debug)]
pub struct UploadedFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    pub files: HashMap<String, UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadedFile {
    pub fn is_image(&self) -> bool {
        self.content_type
            .parse::<mime::Mime>()
            .map(|m| m.type_() == mime::IMAGE)
            .unwrap_or(false)
    }
}

impl MultipartForm {
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }
}

/// Parts a handler reads. Anything else is drained and dropped.
#[derive(Debug, Clone, Copy)]
pub struct FormSchema {
    pub files: &'static [&'static str],
    pub fields: &'static [&'static str],
}

impl FormSchema {
    /// Upper bound on bytes read across the whole body
    fn body_budget(&self, max_file_bytes: usize) -> usize {
        max_file_bytes
            .saturating_mul(self.files.len())
            .saturating_add(MAX_TEXT_FIELD_BYTES.saturating_mul(self.fields.len().max(1)))
    }
}

/// Read `payload` according to `schema`.
///
/// Files are capped at `max_file_bytes` each and only the first part for a
/// name is kept. The body as a whole, unknown parts included, may not exceed
/// what the schema can hold or carry more than `MAX_PARTS` parts.
pub async fn read_form(
    mut payload: Multipart,
    schema: FormSchema,
    max_file_bytes: usize,
) -> Result<MultipartForm> {
    let budget = schema.body_budget(max_file_bytes);
    let mut form = MultipartForm::default();
    let mut total = 0usize;
    let mut parts = 0usize;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("invalid multipart body: {}", e)))?;

        parts += 1;
        if parts > MAX_PARTS {
            return Err(AppError::PayloadTooLarge(format!(
                "more than {} form parts",
                MAX_PARTS
            )));
        }

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|m| m.essence_str().to_string());

        let wanted = match &file_name {
            Some(_) => schema.files.contains(&name.as_str()) && !form.files.contains_key(&name),
            None => schema.fields.contains(&name.as_str()) && !form.fields.contains_key(&name),
        };
        let limit = if file_name.is_some() {
            max_file_bytes
        } else {
            MAX_TEXT_FIELD_BYTES
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::BadRequest(format!("error reading upload: {}", e)))?;
            total += chunk.len();
            if total > budget {
                return Err(AppError::PayloadTooLarge(format!(
                    "request body exceeds {} bytes",
                    budget
                )));
            }
            if !wanted {
                continue;
            }
            if bytes.len() + chunk.len() > limit {
                return Err(AppError::PayloadTooLarge(format!(
                    "field '{}' exceeds {} bytes",
                    name, limit
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if !wanted {
            tracing::debug!(field = %name, "skipping unexpected multipart part");
            continue;
        }

        match file_name {
            Some(file_name) => {
                form.files.insert(
                    name,
                    UploadedFile {
                        bytes,
                        file_name,
                        content_type: content_type
                            .unwrap_or_else(|| "application/octet-stream".to_string()),
                    },
                );
            }
            None => {
                let value = String::from_utf8(bytes).map_err(|_| {
                    AppError::BadRequest(format!("field '{}' is not valid UTF-8", name))
                })?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str) -> UploadedFile {
        UploadedFile {
            bytes: vec![1, 2, 3],
            file_name: "upload".to_string(),
            content_type: content_type.to_string(),
        }
    }

    #[test]
    fn test_is_image() {
        assert!(file("image/png").is_image());
        assert!(file("image/webp").is_image());
        assert!(!file("application/octet-stream").is_image());
        assert!(!file("not a mime").is_image());
    }

    #[test]
    fn test_body_budget() {
        let search = FormSchema {
            files: &["image"],
            fields: &["topK"],
        };
        assert_eq!(search.body_budget(1000), 1000 + MAX_TEXT_FIELD_BYTES);

        let upload = FormSchema {
            files: &["file"],
            fields: &[],
        };
        assert_eq!(upload.body_budget(1000), 1000 + MAX_TEXT_FIELD_BYTES);
        assert_eq!(upload.body_budget(usize::MAX), usize::MAX);
    }

    #[test]
    fn test_blank_fields_are_absent() {
        let mut form = MultipartForm::default();
        form.fields.insert("topK".to_string(), " 12 ".to_string());
        form.fields.insert("note".to_string(), "   ".to_string());

        assert_eq!(form.field("topK"), Some("12"));
        assert_eq!(form.field("note"), None);
        assert_eq!(form.field("missing"), None);
    }
}
