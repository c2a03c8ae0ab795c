use folio_core::{update, AppState, Msg};

#[test]
fn update_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn tick_is_noop() {
    let state = AppState::new();
    let (mut next, effects) = update(state.clone(), Msg::Tick);

    assert_eq!(state, next);
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}

fn search(query: &str) -> Msg {
    Msg::SearchRequested {
        query: query.to_string(),
        suggestions: false,
    }
}

#[test]
fn dispatch_journal_covers_only_the_latest_update() {
    let mut state = AppState::new();
    for n in 0..50 {
        let (next, _) = update(state, search(&format!("q{n}")));
        state = next;
    }
    assert_eq!(state.take_dispatched().len(), 1);

    let (mut next, _) = update(state.clone(), search("q49"));
    assert!(next.take_dispatched().is_empty());
}

#[test]
fn dispatch_journal_is_ignored_by_equality() {
    let (state, _) = update(AppState::new(), search("kyrie"));
    let mut drained = state.clone();
    assert!(!drained.take_dispatched().is_empty());

    assert_eq!(state, drained);
}
