use super::*;

mod handle_api;
mod open_close_lifecycle;

const GALLERY_HTML: &str = r#"
<body>
  <section class="gallery">
    <div class="album-container">
      <img id="cover-paranoid" src="/covers/paranoid.jpg" data-desc="Second studio album.">
      <p class="band-name"> Black Sabbath </p>
      <p class="album-name">Paranoid</p>
      <p class="album-year">1970</p>
    </div>
    <div class="album-container">
      <img id="cover-reality" src="/covers/reality.jpg">
      <p class="band-name">Black Sabbath</p>
      <p class="album-name">Master of Reality</p>
      <p class="album-year">1971</p>
    </div>
    <div class="album-container">
      <img id="cover-vol4" src="/covers/vol4.jpg" data-desc="Recorded in Los Angeles.">
      <p class="band-name">Black Sabbath</p>
      <p class="album-name">Vol. 4</p>
      <p class="album-year">1972</p>
    </div>
  </section>
  <div id="modalOverlay" class="modal-overlay">
    <div class="modal-content">
      <button class="modal-close" type="button">Close</button>
      <button class="modal-prev" type="button">Prev</button>
      <img id="modalImage" src="" alt="">
      <h2 id="modalTitle"></h2>
      <p id="modalBand"></p>
      <p id="modalYear"></p>
      <p id="modalDesc"></p>
      <div id="modalExtra"><span class="stale">left over</span></div>
      <button class="modal-next" type="button">Next</button>
    </div>
  </div>
</body>
"#;

fn gallery_harness() -> Result<Harness> {
    Harness::from_html(GALLERY_HTML)
}

fn current_index(h: &Harness) -> Option<usize> {
    h.modal_state().and_then(|state| state.current_index())
}
