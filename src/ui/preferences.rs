use adw::prelude::*;
use gtk4 as gtk;
use recon_assistant::api::ChatClient;
use recon_assistant::app::{normalize_url, AppConfig};
use std::rc::Rc;

pub fn show_preferences_window<F>(parent: &adw::ApplicationWindow, on_saved: F)
where
    F: Fn(AppConfig) + 'static,
{
    let window = adw::Window::builder()
        .transient_for(parent)
        .modal(true)
        .title("Assistant Settings")
        .default_width(460)
        .default_height(300)
        .resizable(false)
        .build();

    let toast_overlay = adw::ToastOverlay::new();

    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);

    let title = gtk::Label::new(Some("Connect to the assistant backend"));
    title.add_css_class("title-2");
    title.set_halign(gtk::Align::Start);
    root.append(&title);

    let current = AppConfig::load_file();

    let endpoint_entry = gtk::Entry::new();
    endpoint_entry.set_placeholder_text(Some("Chat endpoint (e.g. http://localhost:5001/chat)"));
    endpoint_entry.set_text(&current.endpoint);
    endpoint_entry.set_hexpand(true);
    root.append(&endpoint_entry);

    let persist_row = gtk::Box::new(gtk::Orientation::Horizontal, 8);
    let persist_label = gtk::Label::new(Some("Keep conversation history"));
    persist_label.set_hexpand(true);
    persist_label.set_halign(gtk::Align::Start);
    let persist_switch = gtk::Switch::new();
    persist_switch.set_active(current.persist_history);
    persist_row.append(&persist_label);
    persist_row.append(&persist_switch);
    root.append(&persist_row);

    let status = gtk::Label::new(None);
    status.add_css_class("dim-label");
    status.set_halign(gtk::Align::Start);
    root.append(&status);

    let save_btn = gtk::Button::with_label("Save");
    save_btn.add_css_class("suggested-action");
    save_btn.set_halign(gtk::Align::End);
    root.append(&save_btn);

    toast_overlay.set_child(Some(&root));
    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    container.append(&adw::HeaderBar::new());
    container.append(&toast_overlay);
    window.set_content(Some(&container));

    let on_saved = Rc::new(on_saved);
    let on_save = {
        let window = window.clone();
        let overlay = toast_overlay.clone();
        let endpoint_entry = endpoint_entry.clone();
        let persist_switch = persist_switch.clone();
        let save_btn = save_btn.clone();
        move || {
            let config = AppConfig {
                endpoint: normalize_url(&endpoint_entry.text()),
                persist_history: persist_switch.is_active(),
                ..current.clone()
            };
            let url = match config.endpoint_url() {
                Ok(url) => url,
                Err(e) => {
                    overlay.add_toast(adw::Toast::new(&e.to_string()));
                    return;
                }
            };
            let client = match ChatClient::new(url, config.request_timeout()) {
                Ok(client) => client,
                Err(e) => {
                    overlay.add_toast(adw::Toast::new(&e.to_string()));
                    return;
                }
            };

            status.set_label("Checking endpoint…");
            save_btn.set_sensitive(false);

            let status = status.clone();
            let save_btn = save_btn.clone();
            let overlay = overlay.clone();
            let window = window.clone();
            let on_saved = on_saved.clone();
            crate::utils::run_async_to_main(async move { client.health().await }, move |res| {
                // Settings are kept even when the backend is down right now.
                let message = match &res {
                    Ok(health) if health.is_ok() => "Connected",
                    Ok(_) => "Saved (assistant reports an error)",
                    Err(_) => "Saved (assistant unreachable)",
                };
                log::info!("Endpoint check for {}: {message}", config.endpoint);
                status.set_label(message);
                save_btn.set_sensitive(true);
                if let Err(e) = config.save() {
                    overlay.add_toast(adw::Toast::new(&format!("Failed to save settings: {e}")));
                    return;
                }
                on_saved(config);
                window.close();
            });
        }
    };

    let on_save: Rc<dyn Fn()> = Rc::new(on_save);
    {
        let on_save = on_save.clone();
        save_btn.connect_clicked(move |_| (on_save)());
    }
    {
        let on_save = on_save.clone();
        endpoint_entry.connect_activate(move |_| (on_save)());
    }

    window.present();
}
