use super::*;

#[test]
fn cursor_wraps_both_ways() {
    let mut app = App::new(3, true);
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.next();
    app.next();
    assert_eq!(app.selected, 2);
}

#[test]
fn top_and_bottom() {
    let mut app = App::new(5, true);
    app.bottom();
    assert_eq!(app.selected, 4);
    app.top();
    assert_eq!(app.selected, 0);
}

#[test]
fn set_selected_is_clamped() {
    let mut app = App::new(4, true);
    app.set_selected(10);
    assert_eq!(app.selected, 3);
}

#[test]
fn scroll_stops_at_the_edges() {
    let mut app = App::new(4, true);
    app.scroll(-3);
    assert_eq!(app.selected, 0);
    app.scroll(2);
    assert_eq!(app.selected, 2);
    app.scroll(9);
    assert_eq!(app.selected, 3);
}

#[test]
fn follow_moves_cursor_to_playing_track() {
    let mut app = App::new(4, true);
    app.sync_follow(2);
    assert_eq!(app.selected, 2);

    app.follow_playback_off();
    app.sync_follow(3);
    assert_eq!(app.selected, 2);
}

#[test]
fn pending_follow_waits_for_playback_to_arrive() {
    let mut app = App::new(4, true);
    app.set_selected(3);
    app.set_pending_follow_index(3);

    // Engine still reports the old track.
    app.sync_follow(1);
    assert_eq!(app.selected, 3);
    assert_eq!(app.pending_follow_index, Some(3));

    app.sync_follow(3);
    assert_eq!(app.pending_follow_index, None);
    app.sync_follow(0);
    assert_eq!(app.selected, 0);
}

#[test]
fn toggle_follow_clears_pending_index() {
    let mut app = App::new(2, true);
    app.set_pending_follow_index(1);
    app.toggle_follow_playback();
    assert!(!app.follow_playback);
    assert_eq!(app.pending_follow_index, None);
    app.toggle_follow_playback();
    assert!(app.follow_playback);
}

#[test]
fn status_line_set_and_clear() {
    let mut app = App::new(1, false);
    app.set_status("track 9 is out of range");
    assert_eq!(app.status.as_deref(), Some("track 9 is out of range"));
    app.clear_status();
    assert!(app.status.is_none());
}
