use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, Focus};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    FocusNext,
    MoveUp,
    MoveDown,
    PageDown,
    PageUp,
    CarouselLeft,
    CarouselRight,
    /// Open the selection: channel detail or genre slots
    Select,
    Back,
    LoadMore,
    Subscribe,
    Preview,
    OpenDetailsPage,
    ToggleQueue,
    ToggleSubscription,
    ViewAllGenre,
    Rate(u8),
    PointerMoved(u16, u16),
    ScrollRows(i32),
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Tab, _) => Action::FocusNext,
        (KeyCode::Esc, _) => Action::Back,

        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => Action::MoveDown,
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => Action::MoveUp,
        (KeyCode::Char('d'), KeyModifiers::CONTROL) | (KeyCode::PageDown, _) => Action::PageDown,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) | (KeyCode::PageUp, _) => Action::PageUp,

        // carousel arrows work from any panel
        (KeyCode::Char('h'), KeyModifiers::NONE) | (KeyCode::Left, _) => Action::CarouselLeft,
        (KeyCode::Char('l'), KeyModifiers::NONE) | (KeyCode::Right, _) => Action::CarouselRight,

        (KeyCode::Enter, _) => Action::Select,
        (KeyCode::Char('m'), KeyModifiers::NONE) => Action::LoadMore,
        (KeyCode::Char('a'), KeyModifiers::NONE) => Action::Subscribe,
        (KeyCode::Char('w'), KeyModifiers::NONE) => Action::Preview,
        (KeyCode::Char('o'), KeyModifiers::NONE) => Action::OpenDetailsPage,
        (KeyCode::Char(' '), _) if app.focus == Focus::Detail => Action::ToggleQueue,
        (KeyCode::Char('s'), KeyModifiers::NONE) if app.focus == Focus::Detail => {
            Action::ToggleSubscription
        }
        (KeyCode::Char('v'), KeyModifiers::NONE) if app.focus == Focus::Genres => Action::ViewAllGenre,
        (KeyCode::Char(c @ '0'..='5'), KeyModifiers::NONE) => Action::Rate(c as u8 - b'0'),
        _ => Action::None,
    }
}

/// Map pointer activity; wheel scrolling moves the listing by one card
pub fn handle_mouse_event(mouse: MouseEvent, app: &App) -> Action {
    let rows = app.pager.config().item_height as i32;
    match mouse.kind {
        MouseEventKind::Moved => Action::PointerMoved(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => Action::ScrollRows(rows),
        MouseEventKind::ScrollUp => Action::ScrollRows(-rows),
        MouseEventKind::Down(MouseButton::Left) => Action::Select,
        _ => Action::None,
    }
}

/// Apply an action to the app state
pub fn apply_action(app: &mut App, action: Action) {
    match action {
        Action::Quit => app.should_quit = true,
        Action::FocusNext => app.focus_next(),
        Action::MoveUp => app.move_up(),
        Action::MoveDown => app.move_down(),
        Action::PageDown => app.page_down(),
        Action::PageUp => app.page_up(),
        Action::CarouselLeft => app.carousel_left(),
        Action::CarouselRight => app.carousel_right(),
        Action::Select => match app.focus {
            Focus::Listing => app.open_detail(),
            Focus::Genres => app.select_genre(),
            Focus::Featured => {
                if let Some(channel) = app.visible_featured().first() {
                    let url = app.absolute_url(&channel.details_url);
                    app.open_url(url);
                }
            }
            Focus::Detail => app.toggle_queue(),
        },
        Action::Back => {
            if app.detail.is_some() {
                app.close_detail();
            } else {
                app.clear_status();
            }
        }
        Action::LoadMore => app.load_more(),
        Action::Subscribe => app.subscribe(),
        Action::Preview => app.open_preview(),
        Action::OpenDetailsPage => app.open_details_page(),
        Action::ToggleQueue => app.toggle_queue(),
        Action::ToggleSubscription => app.toggle_subscription(),
        Action::ViewAllGenre => app.open_genre_listing(),
        Action::Rate(star) => app.rate(star),
        Action::PointerMoved(x, y) => app.pointer_moved(x, y),
        Action::ScrollRows(rows) => app.scroll_by(rows),
        Action::None => {}
    }
}
