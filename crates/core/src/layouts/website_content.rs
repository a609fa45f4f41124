//! Public website copy, edited per page.
//!
//! Each page is one record fetched from `/website-content/<page>`. Image
//! fields hold the storage path returned by the upload endpoint.

use serde::{Deserialize, Serialize};

use crate::completion::{CompletionEntry, CompletionSchema};
use crate::error::CoreError;
use crate::field::{EditorLayout, FieldDescriptor, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPage {
    Home,
    About,
}

impl ContentPage {
    pub const ALL: &'static [Self] = &[Self::Home, Self::About];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::About => "about",
        }
    }

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|page| page.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown content page '{s}'")))
    }

    /// Upload folder for this page's images.
    pub fn image_folder(self) -> String {
        format!("website/{}", self.as_str())
    }
}

pub fn layout(page: ContentPage) -> Result<EditorLayout, CoreError> {
    let sections = match page {
        ContentPage::Home => vec![
            Section::new(
                "hero",
                "Hero",
                vec![
                    FieldDescriptor::text("hero.headline", "Headline"),
                    FieldDescriptor::multiline("hero.subheadline", "Subheadline"),
                    FieldDescriptor::text("hero.cta_label", "Button label"),
                    FieldDescriptor::image("hero.image", "Background image"),
                ],
            ),
            Section::new(
                "featured",
                "Featured Speakers",
                vec![
                    FieldDescriptor::text("featured.title", "Section title"),
                    FieldDescriptor::multiline("featured.intro", "Intro"),
                    FieldDescriptor::checkbox("featured.visible", "Show on homepage"),
                ],
            ),
            Section::new(
                "testimonial",
                "Testimonial",
                vec![
                    FieldDescriptor::multiline("testimonial.quote", "Quote"),
                    FieldDescriptor::text("testimonial.author", "Author"),
                    FieldDescriptor::image("testimonial.logo", "Company logo"),
                ],
            ),
        ],
        ContentPage::About => vec![
            Section::new(
                "story",
                "Our Story",
                vec![
                    FieldDescriptor::text("story.title", "Title"),
                    FieldDescriptor::multiline("story.body", "Body"),
                    FieldDescriptor::image("story.image", "Image"),
                ],
            ),
            Section::new(
                "team",
                "Team",
                vec![
                    FieldDescriptor::text("team.title", "Title"),
                    FieldDescriptor::multiline("team.intro", "Intro"),
                    FieldDescriptor::image("team.photo", "Team photo"),
                ],
            ),
        ],
    };
    EditorLayout::new(sections)
}

pub fn completion_schema(page: ContentPage) -> CompletionSchema {
    let entries = match page {
        ContentPage::Home => vec![
            CompletionEntry::critical("hero.headline"),
            CompletionEntry::critical("hero.image"),
            CompletionEntry::optional("hero.subheadline"),
            CompletionEntry::optional("featured.title"),
            CompletionEntry::optional("testimonial.quote"),
        ],
        ContentPage::About => vec![
            CompletionEntry::critical("story.title"),
            CompletionEntry::critical("story.body"),
            CompletionEntry::optional("story.image"),
            CompletionEntry::optional("team.photo"),
        ],
    };
    CompletionSchema::new(entries)
}
