use album_lightbox::{GalleryItem, Harness, ModalState, wrap_index};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};

const MODAL_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/modal_property_test.txt";
const DEFAULT_MODAL_PROPTEST_CASES: u32 = 128;
const MAX_GALLERY: usize = 6;

#[derive(Clone, Debug)]
enum UserAction {
    ClickCover(usize),
    ClickClose,
    ClickPrev,
    ClickNext,
    ClickBackdrop,
    ClickContent,
    PressKey(&'static str),
    ShowAt(isize),
    OpenDetached(Option<usize>),
    CloseViaHandle,
}

fn env_proptest_cases(var_name: &str, default_cases: u32) -> u32 {
    std::env::var(var_name)
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default_cases)
}

fn modal_proptest_cases() -> u32 {
    env_proptest_cases("ALBUM_LIGHTBOX_PROPTEST_CASES", DEFAULT_MODAL_PROPTEST_CASES)
}

fn gallery_page(len: usize) -> String {
    let covers: String = (0..len)
        .map(|i| {
            format!(
                r#"<div class="album-container"><img id="cover-{i}" src="{i}.jpg" data-desc="desc {i}"><p class="band-name">band {i}</p><p class="album-name">album {i}</p><p class="album-year">{year}</p></div>"#,
                year = 1970 + i
            )
        })
        .collect();
    format!(
        r#"<body>{covers}<div id="modalOverlay"><div class="modal-content"><button class="modal-close">x</button><button class="modal-prev">p</button><img id="modalImage" src=""><h2 id="modalTitle"></h2><p id="modalBand"></p><p id="modalYear"></p><p id="modalDesc"></p><div id="modalExtra"></div><button class="modal-next">n</button></div></div></body>"#
    )
}

fn harness(len: usize) -> Result<Harness, TestCaseError> {
    let mut h = Harness::from_html(&gallery_page(len))
        .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
    h.set_trace_stderr(false);
    Ok(h)
}

fn check(result: album_lightbox::Result<()>) -> TestCaseResult {
    result.map_err(|err| TestCaseError::fail(format!("{err}")))
}

fn user_action_strategy(len: usize) -> BoxedStrategy<UserAction> {
    prop_oneof![
        4 => (0..len).prop_map(UserAction::ClickCover),
        1 => Just(UserAction::ClickClose),
        3 => Just(UserAction::ClickPrev),
        3 => Just(UserAction::ClickNext),
        1 => Just(UserAction::ClickBackdrop),
        1 => Just(UserAction::ClickContent),
        4 => prop_oneof![
            Just("ArrowLeft"),
            Just("ArrowRight"),
            Just("Escape"),
            Just("Enter"),
        ]
        .prop_map(UserAction::PressKey),
        2 => (-20isize..20).prop_map(UserAction::ShowAt),
        1 => proptest::option::of(0..len).prop_map(UserAction::OpenDetached),
        1 => Just(UserAction::CloseViaHandle),
    ]
    .boxed()
}

fn scenario_strategy() -> BoxedStrategy<(usize, Vec<UserAction>)> {
    (1..=MAX_GALLERY)
        .prop_flat_map(|len| (Just(len), vec(user_action_strategy(len), 1..=32)))
        .boxed()
}

/// Reference model of the modal state after `action`.
fn expected_state(state: ModalState, len: usize, action: &UserAction) -> (bool, Option<usize>) {
    let (open, index) = (state.is_open(), state.current_index());
    let step = |delta: isize| match index {
        Some(current) => (true, wrap_index(current as isize + delta, len)),
        None => (open, index),
    };
    match action {
        UserAction::ClickCover(i) => (true, Some(*i)),
        UserAction::ClickClose | UserAction::ClickBackdrop | UserAction::CloseViaHandle => {
            (false, None)
        }
        UserAction::ClickContent => (open, index),
        UserAction::ClickPrev => step(-1),
        UserAction::ClickNext => step(1),
        UserAction::PressKey(key) if open => match *key {
            "Escape" => (false, None),
            "ArrowLeft" => step(-1),
            "ArrowRight" => step(1),
            _ => (open, index),
        },
        UserAction::PressKey(_) => (open, index),
        UserAction::ShowAt(i) => (true, wrap_index(*i, len)),
        UserAction::OpenDetached(Some(i)) => (true, Some(*i)),
        UserAction::OpenDetached(None) => (true, index),
    }
}

fn run_action(h: &mut Harness, action: &UserAction) -> TestCaseResult {
    match action {
        UserAction::ClickCover(i) => check(h.click(&format!("#cover-{i}"))),
        UserAction::ClickClose => check(h.click(".modal-close")),
        UserAction::ClickPrev => check(h.click(".modal-prev")),
        UserAction::ClickNext => check(h.click(".modal-next")),
        UserAction::ClickBackdrop => check(h.click("#modalOverlay")),
        UserAction::ClickContent => check(h.click(".modal-content")),
        UserAction::PressKey(key) => check(h.press_key(key).map(|_| ())),
        UserAction::ShowAt(i) => {
            let Some(mut modal) = h.album_modal() else {
                return Err(TestCaseError::fail("modal handle missing"));
            };
            modal.show_at(*i);
            Ok(())
        }
        UserAction::OpenDetached(index) => {
            let Some(mut modal) = h.album_modal() else {
                return Err(TestCaseError::fail("modal handle missing"));
            };
            let mut item = GalleryItem::default().with_album("detached");
            item.index = *index;
            check(modal.open(None, item))
        }
        UserAction::CloseViaHandle => {
            let Some(mut modal) = h.album_modal() else {
                return Err(TestCaseError::fail("modal handle missing"));
            };
            modal.close();
            Ok(())
        }
    }
}

fn assert_page_consistent(h: &Harness, state: ModalState, len: usize) -> TestCaseResult {
    let hidden = h
        .attr("#modalOverlay", "aria-hidden")
        .map_err(|err| TestCaseError::fail(format!("{err}")))?;
    prop_assert_eq!(hidden.as_deref(), Some(if state.is_open() { "false" } else { "true" }));
    check(h.assert_has_class("#modalOverlay", "open", state.is_open()))?;
    prop_assert_eq!(
        h.body_style("overflow"),
        if state.is_open() { "hidden" } else { "" }
    );
    if !state.is_open() {
        prop_assert_eq!(state.current_index(), None);
        check(h.assert_attr("#modalImage", "src", Some("")))?;
    }
    if let Some(index) = state.current_index() {
        prop_assert!(index < len, "index {index} out of range for {len}");
    }
    Ok(())
}

fn assert_sequence_matches_model(len: usize, actions: &[UserAction]) -> TestCaseResult {
    let mut h = harness(len)?;

    for (step, action) in actions.iter().enumerate() {
        let before = h
            .modal_state()
            .ok_or_else(|| TestCaseError::fail("modal not attached"))?;
        let expected = expected_state(before, len, action);

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            run_action(&mut h, action)
        }));
        match outcome {
            Err(_) => {
                prop_assert!(false, "action panicked at step {step}: {action:?}, actions={actions:?}");
            }
            Ok(result) => result?,
        }

        let after = h
            .modal_state()
            .ok_or_else(|| TestCaseError::fail("modal not attached"))?;
        prop_assert_eq!(
            (after.is_open(), after.current_index()),
            expected,
            "state diverged at step {} after {:?}",
            step,
            action
        );
        assert_page_consistent(&h, after, len)?;
    }
    Ok(())
}

fn show_at_title(h: &mut Harness, index: isize) -> Result<String, TestCaseError> {
    let Some(mut modal) = h.album_modal() else {
        return Err(TestCaseError::fail("modal handle missing"));
    };
    modal.show_at(index);
    h.text("#modalTitle")
        .map_err(|err| TestCaseError::fail(format!("{err}")))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: modal_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(MODAL_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn random_interactions_follow_the_state_model((len, actions) in scenario_strategy()) {
        assert_sequence_matches_model(len, &actions)?;
    }

    #[test]
    fn show_at_is_periodic_in_gallery_length(
        len in 1..=MAX_GALLERY,
        index in -50isize..50,
        laps in -3isize..=3,
    ) {
        let mut h = harness(len)?;
        let base = show_at_title(&mut h, index)?;
        let shifted = show_at_title(&mut h, index + laps * len as isize)?;
        prop_assert_eq!(&base, &shifted);
        let expected = wrap_index(index, len).map(|i| format!("album {i}"));
        prop_assert_eq!(Some(base), expected);
    }

    #[test]
    fn next_cycles_back_to_the_start(len in 1..=MAX_GALLERY, start in 0..MAX_GALLERY) {
        let start = start % len;
        let mut h = harness(len)?;
        check(h.click(&format!("#cover-{start}")))?;
        for _ in 0..len {
            check(h.click(".modal-next"))?;
        }
        prop_assert_eq!(h.modal_state().and_then(|s| s.current_index()), Some(start));
        for _ in 0..len {
            check(h.press_key("ArrowLeft").map(|_| ()))?;
        }
        prop_assert_eq!(h.modal_state().and_then(|s| s.current_index()), Some(start));
        check(h.assert_text("#modalTitle", &format!("album {start}")))?;
    }
}
