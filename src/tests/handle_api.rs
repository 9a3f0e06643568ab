use super::*;

#[test]
fn handle_opens_with_explicit_metadata() -> Result<()> {
    let mut h = gallery_harness()?;
    {
        let mut modal = h.album_modal().expect("overlay present");
        assert_eq!(modal.gallery_len(), 3);
        modal.open(
            Some("#cover-vol4"),
            GalleryItem::default()
                .with_album("Snowblind")
                .with_band("Sabbath")
                .with_year("1972"),
        )?;
        let state = modal.state();
        assert!(state.is_open());
        assert_eq!(state.current_index(), None);
    }

    h.assert_text("#modalTitle", "Snowblind")?;
    h.assert_text("#modalBand", "Sabbath")?;
    h.assert_text("#modalYear", "1972")?;
    // No explicit description falls back to the image attribute.
    h.assert_text("#modalDesc", "Recorded in Los Angeles.")?;
    h.assert_attr("#modalImage", "src", Some("/covers/vol4.jpg"))?;
    h.assert_attr("#modalImage", "alt", Some("Snowblind — Sabbath"))?;
    h.assert_attr("#modalOverlay", "aria-hidden", Some("false"))?;
    Ok(())
}

#[test]
fn explicit_description_wins_over_the_image_attribute() -> Result<()> {
    let mut h = gallery_harness()?;
    h.album_modal().expect("overlay present").open(
        Some("#cover-paranoid"),
        GalleryItem::default().with_description("Liner notes."),
    )?;
    h.assert_text("#modalDesc", "Liner notes.")?;
    h.assert_text("#modalTitle", "")?;
    h.assert_attr("#modalImage", "alt", Some(" — "))?;
    Ok(())
}

#[test]
fn unpositioned_open_ignores_prev_and_next() -> Result<()> {
    let mut h = gallery_harness()?;
    {
        let mut modal = h.album_modal().expect("overlay present");
        modal.open(None, GalleryItem::default().with_album("Loose track"))?;
        modal.show_next();
        modal.show_prev();
        assert_eq!(modal.state().current_index(), None);
        assert!(modal.state().is_open());
    }
    h.assert_text("#modalTitle", "Loose track")?;
    h.assert_attr("#modalImage", "src", Some(""))?;

    h.press_key("ArrowRight")?;
    assert_eq!(current_index(&h), None);
    Ok(())
}

#[test]
fn positioned_open_enables_navigation() -> Result<()> {
    let mut h = gallery_harness()?;
    {
        let mut modal = h.album_modal().expect("overlay present");
        modal.open(None, GalleryItem::default().with_index(1))?;
        modal.show_next();
        assert_eq!(modal.state().current_index(), Some(2));
    }
    h.assert_text("#modalTitle", "Vol. 4")?;
    Ok(())
}

#[test]
fn open_keeps_the_index_when_none_is_given() -> Result<()> {
    let mut h = gallery_harness()?;
    h.click("#cover-reality")?;
    h.album_modal()
        .expect("overlay present")
        .open(None, GalleryItem::default().with_album("Interlude"))?;

    assert_eq!(current_index(&h), Some(1));
    h.assert_text("#modalTitle", "Interlude")?;
    h.assert_attr("#modalImage", "src", Some("/covers/reality.jpg"))?;
    Ok(())
}

#[test]
fn show_at_wraps_out_of_range_positions() -> Result<()> {
    let mut h = gallery_harness()?;
    let mut modal = h.album_modal().expect("overlay present");

    modal.show_at(-1);
    assert_eq!(modal.state().current_index(), Some(2));
    modal.show_at(4);
    assert_eq!(modal.state().current_index(), Some(1));
    modal.show_at(-6);
    assert_eq!(modal.state().current_index(), Some(0));
    modal.show_at(3);
    assert_eq!(modal.state().current_index(), Some(0));
    assert!(modal.state().is_open());
    Ok(())
}

#[test]
fn handle_close_matches_the_close_button() -> Result<()> {
    let mut h = gallery_harness()?;
    h.click("#cover-paranoid")?;
    {
        let mut modal = h.album_modal().expect("overlay present");
        modal.close();
        modal.close();
        assert_eq!(modal.state(), ModalState::default());
    }
    h.assert_has_class("#modalOverlay", "open", false)?;
    h.assert_attr("#modalImage", "src", Some(""))?;
    assert_eq!(h.body_style("overflow"), "");
    Ok(())
}

#[test]
fn open_with_unknown_image_selector_fails_without_side_effects() -> Result<()> {
    let mut h = gallery_harness()?;
    let result = h
        .album_modal()
        .expect("overlay present")
        .open(Some("#cover-missing"), GalleryItem::default().with_album("Ghost"));
    assert_eq!(result, Err(Error::SelectorNotFound("#cover-missing".into())));
    assert_eq!(h.modal_state(), Some(ModalState::default()));
    h.assert_text("#modalTitle", "")?;
    Ok(())
}
