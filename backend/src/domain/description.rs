//! Template-based listing descriptions.
//!
//! Artisans ask for a starter description while drafting a listing. The
//! generator picks one of a few fixed templates and suggests tags; there is
//! no model inference involved.

use rand::Rng;
use serde::Serialize;
use utoipa::ToSchema;

/// Title used when the artisan has not named the item yet.
pub const DEFAULT_ITEM_TITLE: &str = "handcrafted item";

const BASE_TAGS: [&str; 4] = ["handmade", "traditional", "authentic", "heritage"];
const TRAILING_TAGS: [&str; 2] = ["artisan-crafted", "unique"];

/// Tags shorter than this many characters are dropped.
const MIN_TAG_LEN: usize = 3;

/// Validation errors for description requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DescriptionRequestError {
    #[error("Category and materials are required")]
    MissingInput,
}

/// Inputs accepted by [`generate_description`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionRequest {
    category: String,
    materials: String,
    title: String,
}

impl DescriptionRequest {
    /// Validate the inputs. `category` and `materials` are required.
    pub fn try_new(
        category: &str,
        materials: &str,
        title: Option<&str>,
    ) -> Result<Self, DescriptionRequestError> {
        let category = category.trim();
        let materials = materials.trim();
        if category.is_empty() || materials.is_empty() {
            return Err(DescriptionRequestError::MissingInput);
        }
        let title = title
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_ITEM_TITLE);
        Ok(Self {
            category: category.to_owned(),
            materials: materials.to_owned(),
            title: title.to_owned(),
        })
    }
}

/// Generated copy and tag suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDescription {
    pub description: String,
    pub suggested_tags: Vec<String>,
}

fn render(template: usize, category: &str, materials: &str, title: &str) -> String {
    match template {
        0 => format!(
            "Exquisite handcrafted {category} made with premium {materials}. This unique piece \
             showcases traditional artistry combined with contemporary appeal. Each item is \
             meticulously crafted using time-honored techniques passed down through generations."
        ),
        1 => format!(
            "Beautiful {category} featuring intricate details and authentic craftsmanship. \
             Created from high-quality {materials} with careful attention to traditional \
             methods. This piece represents the perfect fusion of cultural heritage and modern \
             aesthetics."
        ),
        2 => format!(
            "Stunning {title} crafted with traditional techniques using premium {materials}. \
             This {category} exemplifies the artisan's skill and dedication to preserving \
             cultural craftsmanship. Each piece tells a story of heritage and artistic excellence."
        ),
        _ => format!(
            "Handmade {category} that combines traditional artistry with contemporary design. \
             Crafted from {materials} using ancient techniques, this piece represents authentic \
             craftsmanship at its finest."
        ),
    }
}

/// Number of templates the generator chooses between.
pub const TEMPLATE_COUNT: usize = 4;

/// Fill a randomly chosen template and suggest tags.
///
/// # Examples
/// ```
/// use karigari::domain::{DescriptionRequest, generate_description};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let request = DescriptionRequest::try_new("Pottery", "Terracotta, glaze", None).unwrap();
/// let generated = generate_description(&request, &mut SmallRng::seed_from_u64(7));
/// assert!(generated.suggested_tags.contains(&"terracotta".to_owned()));
/// ```
pub fn generate_description(
    request: &DescriptionRequest,
    rng: &mut impl Rng,
) -> GeneratedDescription {
    let category = request.category.to_lowercase();
    let template = rng.gen_range(0..TEMPLATE_COUNT);
    let description = render(template, &category, &request.materials, &request.title);

    let first_material = request
        .materials
        .to_lowercase()
        .split(',')
        .next()
        .map(|material| material.trim().to_owned())
        .unwrap_or_default();
    let suggested_tags = BASE_TAGS
        .iter()
        .map(|tag| (*tag).to_owned())
        .chain([category, first_material])
        .chain(TRAILING_TAGS.iter().map(|tag| (*tag).to_owned()))
        .filter(|tag| tag.chars().count() >= MIN_TAG_LEN)
        .collect();

    GeneratedDescription {
        description,
        suggested_tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::SmallRng};
    use rstest::rstest;

    #[rstest]
    #[case("", "clay")]
    #[case("Pottery", "  ")]
    fn missing_inputs_are_rejected(#[case] category: &str, #[case] materials: &str) {
        assert_eq!(
            DescriptionRequest::try_new(category, materials, None),
            Err(DescriptionRequestError::MissingInput)
        );
    }

    #[rstest]
    fn tags_follow_category_and_first_material() {
        let request =
            DescriptionRequest::try_new("Home Decor", " Teak wood , brass", Some("Lamp"))
                .expect("valid request");
        let generated = generate_description(&request, &mut SmallRng::seed_from_u64(1));
        assert_eq!(
            generated.suggested_tags,
            vec![
                "handmade",
                "traditional",
                "authentic",
                "heritage",
                "home decor",
                "teak wood",
                "artisan-crafted",
                "unique",
            ]
        );
    }

    #[rstest]
    fn short_tags_are_dropped() {
        let request = DescriptionRequest::try_new("Art", "ox", None).expect("valid request");
        let generated = generate_description(&request, &mut SmallRng::seed_from_u64(3));
        assert!(generated.suggested_tags.contains(&"art".to_owned()));
        assert!(!generated.suggested_tags.contains(&"ox".to_owned()));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn every_template_mentions_the_materials(#[case] template: usize) {
        let text = render(template, "jewelry", "silver", "Anklet");
        assert!(text.contains("silver"));
    }

    #[rstest]
    fn default_title_is_used_in_the_title_template() {
        let request = DescriptionRequest::try_new("Jewelry", "silver", Some("  "))
            .expect("valid request");
        let text = render(2, "jewelry", "silver", &request.title);
        assert!(text.contains(DEFAULT_ITEM_TITLE));
    }
}
