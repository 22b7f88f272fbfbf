use std::time::Instant;

use lugia_core::{
    filter_conversations, ChatMessage, ChatModel, Config, ConversationEntry, ConversationId,
    Deletion, RequestSequence, RequestToken, StoreError,
};
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::ListState;
use tracing::{debug, info, warn};

use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::theme::Theme;
use crate::ui::MessageCache;
use crate::worker::{Command, SessionWorker, TaskOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Conversations,
    Search,
    Chat,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Error,
    Info,
}

/// Dismissible notice shown above the chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub theme: Theme,
    pub sidebar_collapsed: bool,
    pub banner: Option<Banner>,

    // Conversation list
    pub conversations: Vec<ConversationEntry>,
    pub conversation_state: ListState,
    pub page: u32,
    pub list_loading: bool,
    pub pending_delete: Option<ConversationId>,

    // Search (debounced filter over the loaded page)
    pub search_input: String,
    pub search_filter: String,
    pub search_debounce: Debouncer,

    // Chat state
    pub current: Option<ConversationId>,
    pub history_loading: bool,
    pub sending: bool,
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars
    pub chat_scroll: u16,
    pub chat_height: u16,      // Height of chat area for scroll calculations
    pub chat_total_lines: u16, // Wrapped line count from the last render
    pub follow_bottom: bool,

    // Animation state
    pub tick_count: u32,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Model picker state
    pub show_model_picker: bool,
    pub model_picker_state: ListState,
    pub selected_model: String,

    // Panel areas for mouse hit-testing (updated during render)
    pub list_area: Option<Rect>,
    pub chat_area: Option<Rect>,

    // Only appended to or replaced; replacing bumps the generation
    messages: Vec<ChatMessage>,
    messages_generation: u64,
    message_cache: MessageCache,

    worker: SessionWorker,
    list_requests: RequestSequence,
    history_requests: RequestSequence,
    send_requests: RequestSequence,
}

impl App {
    pub fn new(worker: SessionWorker, config: &Config) -> Self {
        let theme = config
            .theme
            .as_deref()
            .and_then(Theme::from_str)
            .unwrap_or_default();
        let selected_model = config
            .default_model
            .clone()
            .unwrap_or_else(|| ChatModel::default().as_str().to_string());

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: FocusPane::Input,
            theme,
            sidebar_collapsed: false,
            banner: None,

            conversations: Vec::new(),
            conversation_state: ListState::default(),
            page: 1,
            list_loading: false,
            pending_delete: None,

            search_input: String::new(),
            search_filter: String::new(),
            search_debounce: Debouncer::new(SEARCH_DEBOUNCE),

            current: None,
            history_loading: false,
            sending: false,
            input: String::new(),
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_total_lines: 0,
            follow_bottom: true,

            tick_count: 0,
            animation_frame: 0,

            show_model_picker: false,
            model_picker_state: ListState::default(),
            selected_model,

            list_area: None,
            chat_area: None,

            messages: Vec::new(),
            messages_generation: 0,
            message_cache: MessageCache::default(),

            worker,
            list_requests: RequestSequence::new(),
            history_requests: RequestSequence::new(),
            send_requests: RequestSequence::new(),
        }
    }

    // Background operations

    /// Resume the stored conversation (or start one) and load the list
    pub fn start(&mut self) {
        let token = self.begin_history_change();
        self.worker.submit(Command::Restore { token });
    }

    pub fn refresh_conversations(&mut self) {
        let token = self.list_requests.next();
        self.list_loading = true;
        self.worker.submit(Command::List {
            token,
            page: self.page,
        });
    }

    pub fn next_page(&mut self) {
        if self.conversations.is_empty() {
            return;
        }
        self.page += 1;
        self.refresh_conversations();
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
            self.refresh_conversations();
        }
    }

    pub fn new_conversation(&mut self) {
        let token = self.begin_history_change();
        self.worker.submit(Command::Create { token });
    }

    pub fn switch_to_highlighted(&mut self) {
        let Some(id) = self.highlighted_conversation().cloned() else {
            return;
        };
        if self.current.as_ref() == Some(&id) && !self.history_loading {
            return;
        }

        let token = self.begin_history_change();
        self.worker.submit(Command::Switch { token, id });
    }

    /// Re-fetch the messages of whatever the session has selected
    pub fn reload_history(&mut self) {
        if self.current.is_none() && !self.history_loading {
            return;
        }

        let token = self.begin_history_change();
        self.worker.submit(Command::Reload { token });
    }

    /// First call arms the delete, a second call on the same conversation
    /// performs it
    pub fn delete_highlighted(&mut self) {
        let Some(id) = self.highlighted_conversation().cloned() else {
            return;
        };

        if self.pending_delete.as_ref() != Some(&id) {
            self.show_info(format!("Press d again to delete {}", id.label()));
            self.pending_delete = Some(id);
            return;
        }

        self.pending_delete = None;
        self.banner = None;
        // Deleting the open conversation replaces what the chat shows; any
        // other delete must not supersede a pending history change
        let token = if self.current.as_ref() == Some(&id) {
            self.begin_history_change()
        } else {
            self.history_requests.current()
        };
        self.worker.submit(Command::Delete { token, id });
    }

    pub fn cancel_pending_delete(&mut self) {
        if self.pending_delete.take().is_some() {
            self.banner = None;
        }
    }

    /// Send the input box contents. Only one send may be in flight.
    pub fn send_message(&mut self) {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return;
        }
        if self.sending {
            self.show_info("Still waiting for the previous reply");
            return;
        }
        if self.history_loading {
            self.show_info("Wait for the conversation to finish loading");
            return;
        }
        if self.current.is_none() {
            self.show_info("No conversation selected yet; press n to start one");
            return;
        }

        self.push_message(ChatMessage::user(text.clone()));
        self.input.clear();
        self.input_cursor = 0;
        self.sending = true;
        self.scroll_chat_to_bottom();

        let token = self.send_requests.next();
        let model = self.selected_model.clone();
        self.worker.submit(Command::Send { token, model, text });
    }

    /// Anything that replaces the displayed conversation makes earlier
    /// history loads and pending replies stale
    fn begin_history_change(&mut self) -> RequestToken {
        self.history_loading = true;
        self.send_requests.invalidate();
        self.sending = false;
        self.history_requests.next()
    }

    // Completed operations

    pub fn apply(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Restored {
                token,
                selected,
                result,
            } => {
                if !self.history_requests.is_current(token) {
                    debug!("discarding stale restore");
                    return;
                }
                self.history_loading = false;
                self.follow_selection(selected);
                match result {
                    Ok(messages) => self.show_messages(messages),
                    Err(err) => self.show_error("Could not open a conversation", &err),
                }
                self.refresh_conversations();
            }
            TaskOutcome::Listed { token, page, result } => {
                if !self.list_requests.is_current(token) {
                    debug!(page, "discarding stale conversation list");
                    return;
                }
                self.list_loading = false;
                match result {
                    Ok(entries) if entries.is_empty() && page > 1 => {
                        // Ran past the last page; stay where we were
                        self.page = page - 1;
                        self.show_info("No more conversations");
                    }
                    Ok(entries) => self.set_conversations(entries),
                    Err(err) => self.show_error("Could not load conversations", &err),
                }
            }
            TaskOutcome::Created {
                token,
                selected,
                result,
            } => {
                if !self.history_requests.is_current(token) {
                    debug!("discarding stale create");
                    return;
                }
                self.history_loading = false;
                self.follow_selection(selected);
                match result {
                    Ok(_) => {
                        self.show_messages(Vec::new());
                        self.page = 1;
                    }
                    Err(err) => self.show_error("Could not create a conversation", &err),
                }
                self.refresh_conversations();
            }
            TaskOutcome::HistoryLoaded {
                token,
                selected,
                result,
            } => {
                if !self.history_requests.is_current(token) {
                    debug!(conversation = ?selected, "discarding stale history");
                    return;
                }
                self.history_loading = false;
                self.follow_selection(selected);
                match result {
                    Ok(messages) => self.show_messages(messages),
                    Err(err) => self.show_error("Could not open conversation", &err),
                }
            }
            TaskOutcome::Deleted {
                token,
                id,
                selected,
                result,
            } => {
                // A newer history change will report the selection itself
                if self.history_requests.is_current(token) {
                    self.history_loading = false;
                    self.follow_selection(selected);
                }
                match result {
                    Ok(Deletion::Other) => info!(conversation = %id, "conversation deleted"),
                    Ok(Deletion::Replaced(replacement)) => {
                        info!(conversation = %id, %replacement, "open conversation deleted and replaced");
                        self.page = 1;
                    }
                    Ok(Deletion::ReplacementFailed(err)) => {
                        let context = format!(
                            "Deleted {}, but could not start a new conversation (press n to retry)",
                            id.label()
                        );
                        self.show_error(&context, &err);
                    }
                    Err(err) => self.show_error("Could not delete conversation", &err),
                }
                self.refresh_conversations();
            }
            TaskOutcome::Replied { token, result } => {
                if !self.send_requests.is_current(token) {
                    debug!("discarding reply for a conversation no longer shown");
                    return;
                }
                self.sending = false;
                match result {
                    Ok(reply) => {
                        self.push_message(ChatMessage::assistant(reply));
                        self.scroll_chat_to_bottom();
                        // Chatting moves this conversation to the top of the list
                        self.page = 1;
                        self.refresh_conversations();
                    }
                    Err(err) => self.show_error("Message not delivered", &err),
                }
            }
        }
    }

    /// Point the view at the session's selection. Messages shown for any
    /// other conversation are dropped.
    fn follow_selection(&mut self, selected: Option<ConversationId>) {
        if self.current == selected {
            return;
        }
        debug!(from = ?self.current, to = ?selected, "selection changed");
        self.current = selected;
        self.show_messages(Vec::new());
        self.mark_selected();
    }

    fn show_messages(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
        self.messages_generation += 1;
        self.scroll_chat_to_bottom();
    }

    fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Display lines for the history; each message is formatted once per
    /// history generation and theme
    pub fn message_lines(&mut self) -> &[Line<'static>] {
        self.message_cache
            .lines(&self.messages, self.messages_generation, self.theme)
    }

    fn set_conversations(&mut self, entries: Vec<ConversationEntry>) {
        let highlighted = self.highlighted_conversation().cloned();
        self.conversations = entries;
        self.mark_selected();

        // Keep the highlight on the same conversation when it is still listed
        let visible = self.visible_conversations();
        let index = highlighted
            .and_then(|id| visible.iter().position(|entry| entry.id == id))
            .or_else(|| visible.iter().position(|entry| entry.selected))
            .or(if visible.is_empty() { None } else { Some(0) });
        self.conversation_state.select(index);
    }

    /// The listing's flags reflect the selection at request time
    fn mark_selected(&mut self) {
        for entry in &mut self.conversations {
            entry.selected = self.current.as_ref() == Some(&entry.id);
        }
    }

    // Banner

    pub fn show_error(&mut self, context: &str, err: &StoreError) {
        warn!(error = %err, "{}", context);
        self.banner = Some(Banner {
            kind: BannerKind::Error,
            message: format!("{}: {}", context, err),
        });
    }

    pub fn show_info(&mut self, message: impl Into<String>) {
        self.banner = Some(Banner {
            kind: BannerKind::Info,
            message: message.into(),
        });
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    // Conversation list navigation

    pub fn visible_conversations(&self) -> Vec<&ConversationEntry> {
        filter_conversations(&self.conversations, &self.search_filter)
    }

    pub fn highlighted_conversation(&self) -> Option<&ConversationId> {
        let visible = self.visible_conversations();
        self.conversation_state
            .selected()
            .and_then(|i| visible.get(i).map(|entry| &entry.id))
    }

    pub fn conversation_nav_down(&mut self) {
        let len = self.visible_conversations().len();
        if len > 0 {
            let i = self.conversation_state.selected().unwrap_or(0);
            self.conversation_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn conversation_nav_up(&mut self) {
        let i = self.conversation_state.selected().unwrap_or(0);
        self.conversation_state.select(Some(i.saturating_sub(1)));
    }

    pub fn conversation_nav_first(&mut self) {
        if !self.visible_conversations().is_empty() {
            self.conversation_state.select(Some(0));
        }
    }

    pub fn conversation_nav_last(&mut self) {
        let len = self.visible_conversations().len();
        if len > 0 {
            self.conversation_state.select(Some(len - 1));
        }
    }

    // Search

    pub fn search_changed(&mut self, now: Instant) {
        self.search_debounce.schedule(now);
    }

    /// Apply the typed query right away, skipping the debounce
    pub fn apply_search_now(&mut self) {
        self.search_debounce.cancel();
        self.apply_search();
    }

    fn apply_search(&mut self) {
        if self.search_filter == self.search_input {
            return;
        }
        self.search_filter = self.search_input.clone();
        let len = self.visible_conversations().len();
        self.conversation_state
            .select(if len == 0 { None } else { Some(0) });
    }

    pub fn clear_search(&mut self) {
        self.search_input.clear();
        self.apply_search_now();
    }

    // Periodic work

    pub fn tick(&mut self, now: Instant) {
        self.tick_count = self.tick_count.wrapping_add(1);
        if (self.sending || self.history_loading) && self.tick_count % 3 == 0 {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if self.search_debounce.fire(now) {
            self.apply_search();
        }
    }

    // Chat scrolling

    pub fn scroll_chat_to_bottom(&mut self) {
        self.follow_bottom = true;
    }

    fn max_chat_scroll(&self) -> u16 {
        self.chat_total_lines.saturating_sub(self.chat_height)
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max_scroll = self.max_chat_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max_scroll);
        self.follow_bottom = self.chat_scroll >= max_scroll;
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_bottom = false;
    }

    pub fn scroll_chat_top(&mut self) {
        self.chat_scroll = 0;
        self.follow_bottom = false;
    }

    // View toggles

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        if let Err(err) = Config::save_theme(self.theme.as_str()) {
            warn!(error = %err, "could not save theme");
        }
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        if self.sidebar_collapsed
            && matches!(self.focus, FocusPane::Conversations | FocusPane::Search)
        {
            self.focus = FocusPane::Chat;
            self.input_mode = InputMode::Normal;
        }
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match (self.focus, self.sidebar_collapsed) {
            (FocusPane::Conversations | FocusPane::Search, _) => FocusPane::Chat,
            (FocusPane::Chat, _) => FocusPane::Input,
            (FocusPane::Input, true) => FocusPane::Chat,
            (FocusPane::Input, false) => FocusPane::Conversations,
        };
    }

    // Model picker

    pub fn open_model_picker(&mut self) {
        let models = ChatModel::all();
        let current = models
            .iter()
            .position(|m| m.as_str() == self.selected_model)
            .unwrap_or(0);
        self.model_picker_state.select(Some(current));
        self.show_model_picker = true;
    }

    pub fn model_picker_nav_down(&mut self) {
        let len = ChatModel::all().len();
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn model_picker_nav_up(&mut self) {
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_model(&mut self) {
        if let Some(model) = self
            .model_picker_state
            .selected()
            .and_then(|i| ChatModel::all().get(i).copied())
        {
            self.selected_model = model.as_str().to_string();
            info!(model = %self.selected_model, "model selected");
            if let Err(err) = Config::save_default_model(&self.selected_model) {
                warn!(error = %err, "could not save default model");
            }
        }
        self.show_model_picker = false;
    }

    // Title helpers

    pub fn chat_title(&self) -> String {
        match &self.current {
            Some(id) => format!(" {} | {} ", id.label(), self.selected_model),
            None => format!(" No conversation | {} ", self.selected_model),
        }
    }

    pub fn list_title(&self) -> String {
        if self.search_filter.is_empty() {
            format!(" Conversations (page {}) ", self.page)
        } else {
            let shown = self.visible_conversations().len();
            format!(" Conversations (page {}, {} of {}) ", self.page, shown, self.conversations.len())
        }
    }
}
