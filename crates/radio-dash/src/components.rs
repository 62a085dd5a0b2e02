pub mod channel_list;
pub mod header;
pub mod playlist_panel;
pub mod schedule_panel;
