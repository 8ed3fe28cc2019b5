use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::products::QuantityType;
use crate::error::{AppError, AppResult};
use crate::pagination::PageRequest;
use crate::routes::params::Pagination;

/// One uploaded file from a product form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The fields of a product create/update form, as submitted.
///
/// `price` and `details` stay as raw text here; the product service validates and
/// decodes them so that the same rules apply to every caller.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub quantity: i32,
    pub quantity_type: Option<QuantityType>,
    pub category_id: Option<Uuid>,
    pub info: Option<String>,
    /// JSON-encoded list of detail-field definitions.
    pub details: Option<String>,
    /// JSON-encoded list of already-stored image URLs to keep (updates only).
    pub existing_images: Option<String>,
    pub images: Vec<ImageUpload>,
}

impl ProductForm {
    /// Apply one text part of a multipart form. Unknown field names are ignored.
    pub fn set_text_field(&mut self, name: &str, value: String) -> AppResult<()> {
        match name {
            "name" => self.name = value,
            "description" => self.description = Some(value),
            "price" => self.price = value,
            // A malformed count is treated as zero, matching an empty input box.
            "quantity" => self.quantity = value.trim().parse().unwrap_or(0),
            "quantityType" | "quantity_type" => {
                self.quantity_type = match value.trim() {
                    "" => None,
                    "limited" => Some(QuantityType::Limited),
                    "unlimited" => Some(QuantityType::Unlimited),
                    other => {
                        return Err(AppError::BadRequest(format!(
                            "Invalid quantity type: {other}"
                        )));
                    }
                }
            }
            "categoryId" | "category_id" => {
                let raw = value.trim();
                self.category_id = if raw.is_empty() {
                    None
                } else {
                    Some(
                        Uuid::parse_str(raw)
                            .map_err(|_| AppError::BadRequest("Invalid category id".into()))?,
                    )
                };
            }
            "info" => self.info = Some(value),
            "details" => self.details = Some(value),
            "existingImages" | "existing_images" => self.existing_images = Some(value),
            other => tracing::debug!(field = other, "ignoring unknown product form field"),
        }
        Ok(())
    }

    /// Queue an uploaded file. Empty parts (no file chosen) are dropped.
    pub fn push_image(&mut self, file_name: Option<&str>, bytes: Vec<u8>) {
        if bytes.is_empty() {
            return;
        }
        self.images.push(ImageUpload {
            file_name: file_name.unwrap_or("upload").to_string(),
            bytes,
        });
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteImageRequest {
    pub url: String,
}

impl ProductListQuery {
    pub fn page_request(&self) -> PageRequest {
        Pagination::new(self.page, self.per_page).normalize()
    }
}
