//! App — terminal event loop.
//!
//! - `App` owns the panes and `AppState`.
//! - Terminal input and dashboard events arrive on one `AppMessage` channel.
//! - Each frame is drawn, then the loop awaits the next message.
//! - Panes return `Action`s; commands for the dashboard loop go out on `cmd_tx`.

use std::io;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use radio_core::dashboard::{DashboardCommand, DashboardEvent};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{
        channel_list::ChannelList,
        header::{Header, HEADER_HEIGHT},
        playlist_panel::PlaylistPanel,
        schedule_panel::SchedulePanel,
    },
    focus::FocusRing,
    theme::C_BG,
    widgets::{
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
};

const VOLUME_STEP: f32 = 0.05;
const INPUT_POLL: Duration = Duration::from_millis(100);
const CHANNEL_PANE_WIDTH: u16 = 26;
const SCHEDULE_PANE_HEIGHT: u16 = 13;

pub enum AppMessage {
    Input(Event),
    Dashboard(DashboardEvent),
}

#[derive(Default, Clone, Copy)]
struct PaneAreas {
    channel_list: Rect,
    playlist: Rect,
    schedule: Rect,
}

pub struct App {
    state: AppState,
    cmd_tx: mpsc::Sender<DashboardCommand>,
    header: Header,
    channel_list: ChannelList,
    playlist: PlaylistPanel,
    schedule: SchedulePanel,
    focus: FocusRing,
    toast: ToastManager,
    pane_areas: PaneAreas,
    show_keys: bool,
    should_quit: bool,
}

/// Keys that work from any pane.  In filter mode only Ctrl-C is global so
/// typed characters (space included) reach the filter.
pub fn global_action(key: KeyEvent, mode: InputMode) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }
    if mode == InputMode::Filter {
        return None;
    }
    let action = match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char(' ') => Action::Send(DashboardCommand::TogglePlay),
        KeyCode::Char('m') => Action::Send(DashboardCommand::ToggleMute),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
            Action::Send(DashboardCommand::StepVolume(VOLUME_STEP))
        }
        KeyCode::Char('-') | KeyCode::Left => {
            Action::Send(DashboardCommand::StepVolume(-VOLUME_STEP))
        }
        KeyCode::Char('v') => Action::Send(DashboardCommand::CycleVolume),
        KeyCode::Char('s') => Action::Send(DashboardCommand::Stop),
        KeyCode::Char('r') => Action::Send(DashboardCommand::Refresh),
        KeyCode::Char('y') => Action::CopyStreamLink,
        KeyCode::Char('K') => Action::ToggleKeys,
        KeyCode::Tab => Action::FocusNext,
        KeyCode::BackTab => Action::FocusPrev,
        KeyCode::Char('1') => Action::FocusPane(ComponentId::ChannelList),
        KeyCode::Char('2') => Action::FocusPane(ComponentId::Playlist),
        KeyCode::Char('3') => Action::FocusPane(ComponentId::Schedule),
        _ => return None,
    };
    Some(action)
}

fn hit(r: Rect, col: u16, row: u16) -> bool {
    r.width > 0 && r.height > 0 && col >= r.x && col < r.right() && row >= r.y && row < r.bottom()
}

impl App {
    pub fn new(channel: &str, cmd_tx: mpsc::Sender<DashboardCommand>) -> Self {
        Self {
            state: AppState::new(channel),
            cmd_tx,
            header: Header,
            channel_list: ChannelList::new(),
            playlist: PlaylistPanel::new(),
            schedule: SchedulePanel,
            focus: FocusRing::new(vec![
                ComponentId::ChannelList,
                ComponentId::Playlist,
                ComponentId::Schedule,
            ]),
            toast: ToastManager::default(),
            pane_areas: PaneAreas::default(),
            show_keys: true,
            should_quit: false,
        }
    }

    pub async fn run(mut self, events_rx: broadcast::Receiver<DashboardEvent>) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        debug!("app: terminal ready, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal, events_rx).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        mut events_rx: broadcast::Receiver<DashboardEvent>,
    ) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<AppMessage>(1024);

        // ── Background task: keyboard/mouse ───────────────────────────────────
        let input_tx = tx.clone();
        // Polls with a timeout so the thread notices the app has gone and the
        // runtime can shut down without waiting for one more keypress.
        tokio::task::spawn_blocking(move || {
            while !input_tx.is_closed() {
                match event::poll(INPUT_POLL) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(_) => break,
                }
                let Ok(ev) = event::read() else { break };
                if input_tx.blocking_send(AppMessage::Input(ev)).is_err() {
                    break;
                }
            }
        });

        // ── Background task: dashboard broadcast → AppMessage ─────────────────
        tokio::spawn(async move {
            loop {
                match events_rx.recv().await {
                    Ok(ev) => {
                        if tx.send(AppMessage::Dashboard(ev)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("app: dashboard events lagged by {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let mut toast_tick = tokio::time::interval(Duration::from_millis(250));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut needs_redraw = true;
        while !self.should_quit {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
                needs_redraw = false;
            }

            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    self.handle_message(msg).await;
                    // Drain what is already queued before drawing again.
                    while let Ok(next) = rx.try_recv() {
                        self.handle_message(next).await;
                    }
                    needs_redraw = true;
                }
                _ = toast_tick.tick() => {
                    needs_redraw = self.toast.tick();
                }
            }
        }

        info!("app: quitting");
        let _ = self.cmd_tx.send(DashboardCommand::Shutdown).await;
        Ok(())
    }

    async fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Input(Event::Key(key)) => {
                for action in self.handle_key(key) {
                    self.apply_action(action).await;
                }
            }
            AppMessage::Input(Event::Mouse(mouse)) => {
                for action in self.handle_mouse(mouse) {
                    self.apply_action(action).await;
                }
            }
            AppMessage::Input(_) => {}
            AppMessage::Dashboard(ev) => self.on_dashboard_event(ev),
        }
    }

    fn on_dashboard_event(&mut self, ev: DashboardEvent) {
        if let Some(msg) = self.state.apply(ev) {
            self.toast.error(msg);
        }
        self.channel_list.on_state_changed(&self.state);
        self.playlist.on_state_changed(&self.state);
        self.schedule.on_state_changed(&self.state);
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if let Some(action) = global_action(key, self.state.input_mode) {
            return vec![action];
        }
        let s = &self.state;
        match self.focus.current() {
            Some(ComponentId::ChannelList) => self.channel_list.handle_key(key, s),
            Some(ComponentId::Playlist) => self.playlist.handle_key(key, s),
            Some(ComponentId::Schedule) => self.schedule.handle_key(key, s),
            None => vec![],
        }
    }

    /// Focus follows the click; the pane under the pointer gets the event.
    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        if !matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        ) {
            return vec![];
        }
        let areas = self.pane_areas;
        let (col, row) = (event.column, event.row);
        let s = &self.state;

        let (id, mut actions) = if hit(areas.channel_list, col, row) {
            (
                self.channel_list.id(),
                self.channel_list.handle_mouse(event, areas.channel_list, s),
            )
        } else if hit(areas.playlist, col, row) {
            (
                self.playlist.id(),
                self.playlist.handle_mouse(event, areas.playlist, s),
            )
        } else if hit(areas.schedule, col, row) {
            (
                self.schedule.id(),
                self.schedule.handle_mouse(event, areas.schedule, s),
            )
        } else {
            return vec![];
        };
        if !self.focus.is_focused(id) && self.state.input_mode == InputMode::Normal {
            actions.insert(0, Action::FocusPane(id));
        }
        actions
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    async fn apply_action(&mut self, action: Action) {
        match action {
            Action::Send(cmd) => self.send(cmd).await,
            Action::SelectChannel(channel) => {
                if channel != self.state.channel {
                    self.toast.info(format!("tuning to {}", channel));
                    self.send(DashboardCommand::ChangeChannel(channel)).await;
                }
            }
            Action::FocusNext => self.focus.next(),
            Action::FocusPrev => self.focus.prev(),
            Action::FocusPane(id) => self.focus.set(id),
            Action::OpenFilter => self.state.input_mode = InputMode::Filter,
            Action::CloseFilter => self.state.input_mode = InputMode::Normal,
            Action::CopyStreamLink => self.copy_stream_link(),
            Action::ToggleKeys => self.show_keys = !self.show_keys,
            Action::Quit => self.should_quit = true,
        }
    }

    async fn send(&self, cmd: DashboardCommand) {
        debug!("app: -> {:?}", cmd);
        if self.cmd_tx.send(cmd).await.is_err() {
            warn!("app: dashboard loop is gone");
        }
    }

    fn copy_stream_link(&mut self) {
        let link = self.state.links.ogg_m3u.clone();
        if link.is_empty() {
            self.toast.warning("no stream link yet");
            return;
        }
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(link.clone())) {
            Ok(()) => self.toast.success(format!("copied: {}", link)),
            Err(e) => {
                warn!("clipboard error: {}", e);
                self.toast.error(format!("clipboard error: {}", e));
            }
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let keys_h = if self.show_keys { 1 } else { 0 };
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(keys_h),
            ])
            .split(area);

        self.header.draw(frame, outer[0], &self.state);
        status_bar::draw_separator(frame, outer[1]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(CHANNEL_PANE_WIDTH), Constraint::Min(20)])
            .split(outer[2]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(SCHEDULE_PANE_HEIGHT)])
            .split(body[1]);

        self.pane_areas = PaneAreas {
            channel_list: body[0],
            playlist: right[0],
            schedule: right[1],
        };
        let s = &self.state;
        self.channel_list.draw(
            frame,
            body[0],
            self.focus.is_focused(ComponentId::ChannelList),
            s,
        );
        self.playlist
            .draw(frame, right[0], self.focus.is_focused(ComponentId::Playlist), s);
        self.schedule
            .draw(frame, right[1], self.focus.is_focused(ComponentId::Schedule), s);

        status_bar::draw_log_bar(frame, outer[3], s.logs.back().map(String::as_str));
        if self.show_keys {
            status_bar::draw_keys_bar(frame, outer[4], s.input_mode);
        }

        self.toast.draw(frame, area);
    }
}
