use super::*;

#[test]
fn attach_marks_overlay_hidden_and_images_clickable() -> Result<()> {
    let h = gallery_harness()?;
    assert!(h.is_active());
    h.assert_attr("#modalOverlay", "aria-hidden", Some("true"))?;
    h.assert_has_class("#modalOverlay", "open", false)?;
    h.assert_attr("#cover-paranoid", "style", Some("cursor: pointer;"))?;
    h.assert_attr("#cover-vol4", "style", Some("cursor: pointer;"))?;
    // Three images, close, prev, next, overlay and the document keydown.
    assert_eq!(h.listener_count(), 8);
    assert_eq!(h.modal_state(), Some(ModalState::default()));
    Ok(())
}

#[test]
fn clicking_a_cover_fills_and_shows_the_modal() -> Result<()> {
    let mut h = gallery_harness()?;
    h.click("#cover-paranoid")?;

    h.assert_has_class("#modalOverlay", "open", true)?;
    h.assert_attr("#modalOverlay", "aria-hidden", Some("false"))?;
    h.assert_attr("#modalImage", "src", Some("/covers/paranoid.jpg"))?;
    h.assert_attr("#modalImage", "alt", Some("Paranoid — Black Sabbath"))?;
    h.assert_text("#modalTitle", "Paranoid")?;
    h.assert_text("#modalBand", "Black Sabbath")?;
    h.assert_text("#modalYear", "1970")?;
    h.assert_text("#modalDesc", "Second studio album.")?;
    assert_eq!(h.body_style("overflow"), "hidden");
    assert!(h.active_element_matches(".modal-close")?);

    let state = h.modal_state().expect("modal attached");
    assert!(state.is_open());
    assert_eq!(state.current_index(), Some(0));
    Ok(())
}

#[test]
fn open_clears_the_extra_slot() -> Result<()> {
    let mut h = gallery_harness()?;
    h.assert_text("#modalExtra", "left over")?;
    h.click("#cover-reality")?;
    h.assert_text("#modalExtra", "")?;
    assert_eq!(h.dump_dom("#modalExtra")?, r#"<div id="modalExtra"></div>"#);
    assert!(h.assert_exists("#modalExtra .stale").is_err());
    Ok(())
}

#[test]
fn cover_without_description_shows_empty_description() -> Result<()> {
    let mut h = gallery_harness()?;
    h.click("#cover-paranoid")?;
    h.assert_text("#modalDesc", "Second studio album.")?;
    h.click("#cover-reality")?;
    h.assert_text("#modalDesc", "")?;
    h.assert_text("#modalTitle", "Master of Reality")?;
    Ok(())
}

#[test]
fn close_button_hides_modal_and_restores_page() -> Result<()> {
    let mut h = gallery_harness()?;
    h.click("#cover-vol4")?;
    h.click(".modal-close")?;

    h.assert_has_class("#modalOverlay", "open", false)?;
    h.assert_attr("#modalOverlay", "aria-hidden", Some("true"))?;
    h.assert_attr("#modalImage", "src", Some(""))?;
    assert_eq!(h.body_style("overflow"), "");
    assert_eq!(h.modal_state(), Some(ModalState::default()));
    // Metadata text is left as it was.
    h.assert_text("#modalTitle", "Vol. 4")?;
    Ok(())
}

#[test]
fn close_twice_is_idempotent() -> Result<()> {
    let mut h = gallery_harness()?;
    h.click("#cover-paranoid")?;
    h.click(".modal-close")?;
    h.click(".modal-close")?;

    h.assert_has_class("#modalOverlay", "open", false)?;
    h.assert_attr("#modalOverlay", "aria-hidden", Some("true"))?;
    assert_eq!(h.modal_state(), Some(ModalState::default()));
    Ok(())
}

#[test]
fn backdrop_click_closes_but_content_click_does_not() -> Result<()> {
    let mut h = gallery_harness()?;
    h.click("#cover-paranoid")?;

    h.click(".modal-content")?;
    h.click("#modalTitle")?;
    h.click("#modalImage")?;
    h.assert_has_class("#modalOverlay", "open", true)?;
    assert_eq!(current_index(&h), Some(0));

    h.click("#modalOverlay")?;
    h.assert_has_class("#modalOverlay", "open", false)?;
    assert_eq!(current_index(&h), None);
    Ok(())
}

#[test]
fn metadata_is_read_when_opening_not_when_attaching() -> Result<()> {
    let mut h = gallery_harness()?;
    h.set_text(".album-container .album-name", "Paranoid (Deluxe)")?;
    h.set_attribute("#cover-paranoid", "data-desc", "Remastered.")?;
    h.click("#cover-paranoid")?;

    h.assert_text("#modalTitle", "Paranoid (Deluxe)")?;
    h.assert_text("#modalDesc", "Remastered.")?;
    h.assert_attr("#modalImage", "alt", Some("Paranoid (Deluxe) — Black Sabbath"))?;
    Ok(())
}
