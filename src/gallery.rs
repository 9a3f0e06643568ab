use crate::config::ModalConfig;
use crate::host::ModalHost;

/// Normalizes a signed position into `0..len`, cycling in both directions.
///
/// Returns `None` for an empty gallery.
pub fn wrap_index(index: isize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let len = isize::try_from(len).ok()?;
    usize::try_from(index.rem_euclid(len)).ok()
}

/// Gallery images in document order, fixed when the controller attaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryIndex<N> {
    images: Vec<N>,
}

impl<N: Clone + PartialEq> GalleryIndex<N> {
    pub fn scan<H: ModalHost<Node = N>>(host: &H, config: &ModalConfig) -> Self {
        Self {
            images: host.query_all(&config.gallery_image_selector),
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&N> {
        self.images.get(index)
    }

    pub fn position(&self, image: &N) -> Option<usize> {
        self.images.iter().position(|candidate| candidate == image)
    }

    pub fn iter(&self) -> impl Iterator<Item = &N> {
        self.images.iter()
    }
}

/// What the modal shows for one image.
///
/// Gallery-derived items are built with [`GalleryItem::read`] every time they are needed,
/// so edits to the page after attach are always reflected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem<N> {
    pub image: Option<N>,
    pub band: String,
    pub album: String,
    pub year: String,
    pub description: String,
    pub index: Option<usize>,
}

impl<N> Default for GalleryItem<N> {
    fn default() -> Self {
        Self {
            image: None,
            band: String::new(),
            album: String::new(),
            year: String::new(),
            description: String::new(),
            index: None,
        }
    }
}

impl<N: Clone> GalleryItem<N> {
    pub fn new(image: N) -> Self {
        Self {
            image: Some(image),
            ..Self::default()
        }
    }

    pub fn with_band(mut self, band: impl Into<String>) -> Self {
        self.band = band.into();
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Projects an image element and its enclosing container into an item.
    pub fn read<H: ModalHost<Node = N>>(
        host: &H,
        config: &ModalConfig,
        image: &N,
        index: usize,
    ) -> Self {
        let container = host.closest(image, &config.container_selector);
        let field = |selector: &str| {
            container
                .as_ref()
                .and_then(|container| host.query_within(container, selector))
                .map(|node| host.text_content(&node).trim().to_string())
                .unwrap_or_default()
        };

        Self {
            image: Some(image.clone()),
            band: field(&config.band_selector),
            album: field(&config.album_selector),
            year: field(&config.year_selector),
            description: host
                .attribute(image, &config.description_attr)
                .unwrap_or_default(),
            index: Some(index),
        }
    }

    /// `"{album} — {band}"`, with absent parts left empty.
    pub fn alt_text(&self) -> String {
        format!("{} — {}", self.album, self.band)
    }
}
