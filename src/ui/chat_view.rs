use crate::ui::message_row::{message_row, typing_row};
use crate::utils::run_async_to_main;
use gtk4 as gtk;
use gtk4::prelude::*;
use recon_assistant::api::{ChatClient, ChatTransport, TransportError};
use recon_assistant::app::AppConfig;
use recon_assistant::assistant::{Assistant, Notice, ViewState};
use recon_assistant::clock::SystemClock;
use recon_assistant::conversation::{MessageStore, Sender};
use recon_assistant::storage::{KeyValueStore, SqliteStore};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// The AI Assistant page: header, message list or suggestions, input row.
pub struct ChatView {
    root: gtk::Box,
    overlay: adw::ToastOverlay,
    assistant: RefCell<Assistant>,
    client: RefCell<Option<ChatClient>>,
    deferred: RefCell<Option<AppConfig>>,
    messages_box: gtk::Box,
    scroller: gtk::ScrolledWindow,
    entry: gtk::Entry,
    send_btn: gtk::Button,
    clear_btn: gtk::Button,
    status: gtk::Label,
}

fn build_client(config: &AppConfig) -> Option<ChatClient> {
    let endpoint = match config.endpoint_url() {
        Ok(url) => url,
        Err(e) => {
            log::error!("{e}");
            return None;
        }
    };
    match ChatClient::new(endpoint, config.request_timeout()) {
        Ok(client) => Some(client),
        Err(e) => {
            log::error!("Could not build HTTP client: {e}");
            None
        }
    }
}

fn open_backend(config: &AppConfig) -> Option<Box<dyn KeyValueStore>> {
    if !config.persist_history {
        return None;
    }
    match SqliteStore::open_default() {
        Ok(backend) => Some(Box::new(backend)),
        Err(e) => {
            log::warn!("History will not be saved: {e}");
            None
        }
    }
}

fn build_store(config: &AppConfig) -> MessageStore {
    match open_backend(config) {
        Some(backend) => MessageStore::hydrate(backend),
        None => MessageStore::in_memory(),
    }
}

impl ChatView {
    pub fn new(config: &AppConfig, overlay: &adw::ToastOverlay) -> Rc<Self> {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        // Header
        let header = gtk::Box::new(gtk::Orientation::Horizontal, 12);
        header.append(&adw::Avatar::new(40, Some("AI Assistant"), true));
        let titles = gtk::Box::new(gtk::Orientation::Vertical, 2);
        titles.set_hexpand(true);
        let title = gtk::Label::new(Some("AI Assistant"));
        title.add_css_class("title-3");
        title.set_halign(gtk::Align::Start);
        let subtitle = gtk::Label::new(Some("Ask questions about your Ozone cluster"));
        subtitle.add_css_class("dim-label");
        subtitle.set_halign(gtk::Align::Start);
        let status = gtk::Label::new(Some("Checking assistant…"));
        status.add_css_class("caption");
        status.set_halign(gtk::Align::Start);
        titles.append(&title);
        titles.append(&subtitle);
        titles.append(&status);
        header.append(&titles);
        let clear_btn = gtk::Button::with_label("Clear");
        clear_btn.add_css_class("destructive-action");
        clear_btn.set_valign(gtk::Align::Center);
        header.append(&clear_btn);
        root.append(&header);

        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .hscrollbar_policy(gtk::PolicyType::Never)
            .build();
        let messages_box = gtk::Box::new(gtk::Orientation::Vertical, 6);
        messages_box.set_margin_top(6);
        messages_box.set_margin_bottom(6);
        scroller.set_child(Some(&messages_box));
        root.append(&scroller);

        // Input row
        let input_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let entry = gtk::Entry::new();
        entry.set_hexpand(true);
        entry.set_placeholder_text(Some("Ask a question about your Ozone cluster..."));
        let send_btn = gtk::Button::with_label("Send");
        send_btn.add_css_class("suggested-action");
        input_row.append(&entry);
        input_row.append(&send_btn);
        root.append(&input_row);

        let assistant = Assistant::new(build_store(config), Arc::new(SystemClock));
        let view = Rc::new(Self {
            root,
            overlay: overlay.clone(),
            assistant: RefCell::new(assistant),
            client: RefCell::new(build_client(config)),
            deferred: RefCell::new(None),
            messages_box,
            scroller,
            entry,
            send_btn,
            clear_btn,
            status,
        });

        {
            let weak = Rc::downgrade(&view);
            view.send_btn.connect_clicked(move |_| {
                if let Some(view) = weak.upgrade() {
                    view.submit_entry();
                }
            });
        }
        {
            let weak = Rc::downgrade(&view);
            view.entry.connect_activate(move |_| {
                if let Some(view) = weak.upgrade() {
                    view.submit_entry();
                }
            });
        }
        {
            let weak = Rc::downgrade(&view);
            view.clear_btn.connect_clicked(move |_| {
                if let Some(view) = weak.upgrade() {
                    view.clear();
                }
            });
        }

        view.refresh();
        view.check_health();
        view
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    /// Applies new settings to the live page. The conversation is kept; a
    /// change that arrives while a reply is pending waits for it to settle.
    pub fn reconfigure(self: &Rc<Self>, config: &AppConfig) {
        let persist_changed = {
            let assistant = self.assistant.borrow();
            if assistant.is_busy() {
                log::debug!("Deferring settings change until the pending reply settles");
                *self.deferred.borrow_mut() = Some(config.clone());
                return;
            }
            assistant.is_persistent() != config.persist_history
        };
        if persist_changed {
            let backend = open_backend(config);
            if let Err(e) = self.assistant.borrow_mut().replace_backend(backend) {
                log::warn!("Storage change refused: {e}");
            }
        }
        *self.client.borrow_mut() = build_client(config);
        self.status.set_label("Checking assistant…");
        self.check_health();
        self.refresh();
    }

    fn toast(&self, notice: Notice) {
        self.overlay.add_toast(adw::Toast::new(notice.text()));
    }

    fn submit_entry(self: &Rc<Self>) {
        let text = self.entry.text().to_string();
        self.submit(&text);
    }

    fn submit(self: &Rc<Self>, query: &str) {
        let query = match self.assistant.borrow_mut().begin(query) {
            Ok(query) => query,
            Err(e) => {
                log::debug!("Ignoring submit: {e}");
                return;
            }
        };
        self.entry.set_text("");
        self.refresh();

        let client = self.client.borrow().clone();
        let Some(client) = client else {
            self.settle(Err(TransportError::NotConfigured));
            return;
        };
        let weak = Rc::downgrade(self);
        run_async_to_main(
            async move { client.send(&query).await },
            move |outcome| {
                if let Some(view) = weak.upgrade() {
                    view.settle(outcome);
                }
            },
        );
    }

    fn settle(self: &Rc<Self>, outcome: Result<String, TransportError>) {
        self.assistant.borrow_mut().settle(outcome);
        self.refresh();
        self.entry.grab_focus();
        let deferred = self.deferred.borrow_mut().take();
        if let Some(config) = deferred {
            self.reconfigure(&config);
        }
    }

    fn clear(self: &Rc<Self>) {
        let notice = self.assistant.borrow_mut().clear();
        if let Some(notice) = notice {
            self.refresh();
            self.toast(notice);
        }
    }

    fn copy(&self, index: usize) {
        let text = self.assistant.borrow().copy_text(index);
        let notice = match (text, gtk::gdk::Display::default()) {
            (Some(text), Some(display)) => {
                display.clipboard().set_text(&text);
                Notice::Copied
            }
            _ => Notice::CopyFailed,
        };
        self.toast(notice);
    }

    fn check_health(self: &Rc<Self>) {
        let client = self.client.borrow().clone();
        let Some(client) = client else {
            self.status.set_label("No valid assistant endpoint configured");
            return;
        };
        let weak = Rc::downgrade(self);
        run_async_to_main(async move { client.health().await }, move |res| {
            let Some(view) = weak.upgrade() else { return };
            match res {
                Ok(health) if health.is_ok() => view.status.set_label("Assistant online"),
                Ok(health) => {
                    log::warn!("Assistant reports {}: {:?}", health.status, health.message);
                    view.status.set_label("Assistant unreachable");
                }
                Err(e) => {
                    log::warn!("Health check failed: {e}");
                    view.status.set_label("Assistant unreachable");
                }
            }
        });
    }

    fn refresh(self: &Rc<Self>) {
        while let Some(child) = self.messages_box.first_child() {
            self.messages_box.remove(&child);
        }

        let assistant = self.assistant.borrow();
        let busy = assistant.state() == ViewState::AwaitingReply;

        if let Some(suggestions) = assistant.suggestions() {
            self.messages_box.append(&self.empty_state(suggestions, busy));
        } else {
            let now = assistant.clock().now();
            for (index, message) in assistant.messages().iter().enumerate() {
                let on_copy: Option<Box<dyn Fn()>> = match message.sender {
                    Sender::Bot => {
                        let weak = Rc::downgrade(self);
                        Some(Box::new(move || {
                            if let Some(view) = weak.upgrade() {
                                view.copy(index);
                            }
                        }))
                    }
                    Sender::User => None,
                };
                self.messages_box.append(&message_row(message, now, on_copy));
            }
        }
        if busy {
            self.messages_box.append(&typing_row());
        }

        self.entry.set_sensitive(!busy);
        self.send_btn.set_sensitive(!busy);
        self.clear_btn.set_visible(!assistant.is_empty());
        self.clear_btn.set_sensitive(!busy);
        drop(assistant);

        let adj = self.scroller.vadjustment();
        glib::idle_add_local_once(move || adj.set_value(adj.upper()));
    }

    fn empty_state(self: &Rc<Self>, suggestions: &[&'static str], busy: bool) -> gtk::Widget {
        let page = adw::StatusPage::builder()
            .icon_name("dialog-question-symbolic")
            .title("Welcome to Ozone AI Assistant")
            .description(
                "I can help you understand your cluster's health, datanodes, containers, and more.",
            )
            .vexpand(true)
            .build();

        let chips = gtk::FlowBox::new();
        chips.set_selection_mode(gtk::SelectionMode::None);
        chips.set_max_children_per_line(3);
        chips.set_column_spacing(8);
        chips.set_row_spacing(8);
        for &question in suggestions {
            let chip = gtk::Button::with_label(question);
            chip.add_css_class("pill");
            chip.set_sensitive(!busy);
            let weak = Rc::downgrade(self);
            chip.connect_clicked(move |_| {
                if let Some(view) = weak.upgrade() {
                    view.submit(question);
                }
            });
            chips.insert(&chip, -1);
        }

        let quick = gtk::Box::new(gtk::Orientation::Vertical, 12);
        let heading = gtk::Label::new(Some("Quick Questions"));
        heading.add_css_class("heading");
        quick.append(&heading);
        quick.append(&chips);
        page.set_child(Some(&quick));
        page.upcast()
    }
}
