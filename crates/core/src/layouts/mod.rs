//! Built-in page layouts and their completion schemas.

pub mod project_details;
pub mod website_content;
