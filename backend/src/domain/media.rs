//! Accepted image formats and stored image names.

use std::fmt;

use uuid::Uuid;

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
/// Most images accepted in one upload request.
pub const MAX_IMAGES_PER_UPLOAD: usize = 6;
/// Public path prefix stored images are served from.
pub const PRODUCT_IMAGE_PATH: &str = "/uploads/products";

const STORED_PREFIX: &str = "product-";

/// Image encodings accepted for product photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    /// Resolve a file extension, ignoring case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Resolve a MIME type such as `image/png`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Resolve an upload from its file name and declared content type.
    ///
    /// Both must name the same accepted format.
    ///
    /// # Examples
    /// ```
    /// use karigari::domain::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::from_upload("vase.JPG", "image/jpeg"), Some(ImageFormat::Jpeg));
    /// assert_eq!(ImageFormat::from_upload("vase.png", "image/jpeg"), None);
    /// assert_eq!(ImageFormat::from_upload("vase.gif", "image/gif"), None);
    /// ```
    pub fn from_upload(file_name: &str, content_type: &str) -> Option<Self> {
        let (_, extension) = file_name.rsplit_once('.')?;
        let by_extension = Self::from_extension(extension)?;
        let by_type = Self::from_content_type(content_type)?;
        (by_extension == by_type).then_some(by_extension)
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }
}

/// File name of a stored product image, `product-<uuid>.<ext>`.
///
/// Parsing rejects anything else, which keeps path traversal out of the
/// storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredImageName {
    id: Uuid,
    format: ImageFormat,
}

impl StoredImageName {
    /// A fresh random name for `format`.
    pub fn generate(format: ImageFormat) -> Self {
        Self {
            id: Uuid::new_v4(),
            format,
        }
    }

    /// Parse a name previously produced by [`StoredImageName::generate`].
    pub fn parse(raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix(STORED_PREFIX)?;
        let (id, extension) = rest.rsplit_once('.')?;
        let format = ImageFormat::from_extension(extension)?;
        if format.extension() != extension {
            return None;
        }
        let id = Uuid::try_parse(id).ok()?;
        Some(Self { id, format })
    }

    pub const fn format(&self) -> ImageFormat {
        self.format
    }

    /// Public URI the image is served from.
    pub fn public_path(&self) -> String {
        format!("{PRODUCT_IMAGE_PATH}/{self}")
    }
}

impl fmt::Display for StoredImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{STORED_PREFIX}{}.{}",
            self.id.as_hyphenated(),
            self.format.extension()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn generated_names_parse_back() {
        let name = StoredImageName::generate(ImageFormat::Webp);
        let parsed = StoredImageName::parse(&name.to_string()).expect("parseable name");
        assert_eq!(parsed, name);
        assert!(name.public_path().starts_with("/uploads/products/product-"));
        assert!(name.public_path().ends_with(".webp"));
    }

    #[rstest]
    #[case("../etc/passwd")]
    #[case("product-../../secret.png")]
    #[case("product-not-a-uuid.png")]
    #[case("product-67e55044-10b1-426f-9247-bb680e5fe0c8.gif")]
    #[case("product-67e55044-10b1-426f-9247-bb680e5fe0c8.jpeg")]
    #[case("photo-67e55044-10b1-426f-9247-bb680e5fe0c8.png")]
    fn foreign_names_are_rejected(#[case] raw: &str) {
        assert!(StoredImageName::parse(raw).is_none());
    }

    #[rstest]
    #[case("a.jpeg", "image/jpeg", Some(ImageFormat::Jpeg))]
    #[case("a.webp", "image/webp", Some(ImageFormat::Webp))]
    #[case("noextension", "image/png", None)]
    #[case("a.png", "application/octet-stream", None)]
    fn uploads_need_matching_extension_and_type(
        #[case] file: &str,
        #[case] content_type: &str,
        #[case] expected: Option<ImageFormat>,
    ) {
        assert_eq!(ImageFormat::from_upload(file, content_type), expected);
    }
}
