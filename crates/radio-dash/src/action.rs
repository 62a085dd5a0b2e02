//! Action enum — user intents produced by key and mouse handlers.

use radio_core::dashboard::DashboardCommand;

/// Focusable panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    ChannelList,
    Playlist,
    Schedule,
}

/// Components produce Actions; the App applies them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Dashboard ────────────────────────────────────────────────────────────
    /// Forwarded to the dashboard loop unchanged.
    Send(DashboardCommand),
    SelectChannel(String),

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),

    // ── Filter ───────────────────────────────────────────────────────────────
    OpenFilter,
    CloseFilter,

    // ── UI ───────────────────────────────────────────────────────────────────
    CopyStreamLink,
    ToggleKeys,
    Quit,
}
