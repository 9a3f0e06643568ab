use crate::selector::parse_selector_groups;
use crate::{Error, Result};

/// Names the page markup the controller binds to.
///
/// Ids are looked up document-wide; control selectors are resolved inside the overlay;
/// metadata selectors are resolved inside each gallery container. The defaults match the
/// album page markup:
///
/// ```html
/// <div id="modalOverlay" class="modal-overlay" aria-hidden="true">
///   <div class="modal-content">
///     <button class="modal-close">&times;</button>
///     <button class="modal-prev">&lsaquo;</button>
///     <img id="modalImage" src="" alt="">
///     <h2 id="modalTitle"></h2> <p id="modalBand"></p> <p id="modalYear"></p>
///     <p id="modalDesc"></p> <div id="modalExtra"></div>
///     <button class="modal-next">&rsaquo;</button>
///   </div>
/// </div>
/// <div class="album-container">
///   <img src="paranoid.jpg" data-desc="...">
///   <p class="band-name">Black Sabbath</p>
///   <p class="album-name">Paranoid</p>
///   <p class="album-year">1970</p>
/// </div>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalConfig {
    pub overlay_id: String,
    pub image_id: String,
    pub title_id: String,
    pub band_id: String,
    pub year_id: String,
    pub description_id: String,
    pub extra_id: String,
    pub close_selector: String,
    pub prev_selector: String,
    pub next_selector: String,
    pub gallery_image_selector: String,
    pub container_selector: String,
    pub band_selector: String,
    pub album_selector: String,
    pub year_selector: String,
    pub description_attr: String,
    pub open_class: String,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            overlay_id: "modalOverlay".into(),
            image_id: "modalImage".into(),
            title_id: "modalTitle".into(),
            band_id: "modalBand".into(),
            year_id: "modalYear".into(),
            description_id: "modalDesc".into(),
            extra_id: "modalExtra".into(),
            close_selector: ".modal-close".into(),
            prev_selector: ".modal-prev".into(),
            next_selector: ".modal-next".into(),
            gallery_image_selector: ".album-container img".into(),
            container_selector: ".album-container".into(),
            band_selector: ".band-name".into(),
            album_selector: ".album-name".into(),
            year_selector: ".album-year".into(),
            description_attr: "data-desc".into(),
            open_class: "open".into(),
        }
    }
}

impl ModalConfig {
    pub fn with_overlay_id(mut self, id: impl Into<String>) -> Self {
        self.overlay_id = id.into();
        self
    }

    pub fn with_gallery_image_selector(mut self, selector: impl Into<String>) -> Self {
        self.gallery_image_selector = selector.into();
        self
    }

    pub fn with_container_selector(mut self, selector: impl Into<String>) -> Self {
        self.container_selector = selector.into();
        self
    }

    /// Rejects empty names and selectors outside the supported subset.
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("overlay_id", &self.overlay_id),
            ("image_id", &self.image_id),
            ("title_id", &self.title_id),
            ("band_id", &self.band_id),
            ("year_id", &self.year_id),
            ("description_id", &self.description_id),
            ("extra_id", &self.extra_id),
            ("description_attr", &self.description_attr),
            ("open_class", &self.open_class),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{field} must not be empty")));
            }
            if value.chars().any(char::is_whitespace) {
                return Err(Error::InvalidConfig(format!(
                    "{field} must not contain whitespace: {value:?}"
                )));
            }
        }

        for selector in [
            &self.close_selector,
            &self.prev_selector,
            &self.next_selector,
            &self.gallery_image_selector,
            &self.container_selector,
            &self.band_selector,
            &self.album_selector,
            &self.year_selector,
        ] {
            parse_selector_groups(selector)?;
        }
        Ok(())
    }
}
