use crate::ui::chat_view::ChatView;
use crate::ui::sidebar::Sidebar;
use adw::prelude::*;
use adw::Application;
use gtk4 as gtk;
use recon_assistant::app::AppConfig;
use recon_assistant::routes::{navigable, resolve, Page, HOME};
use std::rc::Rc;

fn placeholder_page(page: Page) -> gtk::Widget {
    let description = match page {
        Page::NotFound => "The page you requested does not exist.",
        _ => "This page is served by the Recon web console.",
    };
    adw::StatusPage::builder()
        .icon_name("dialog-information-symbolic")
        .title(page.title())
        .description(description)
        .build()
        .upcast()
}


pub fn show_main_window(app: &Application) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Recon")
        .default_width(1024)
        .default_height(720)
        .build();

    let overlay = adw::ToastOverlay::new();

    let split = adw::Flap::builder()
        .reveal_flap(true)
        .locked(true)
        .modal(false)
        .build();

    let sidebar = Rc::new(Sidebar::new());
    split.set_flap(Some(&sidebar.widget()));

    let stack = gtk::Stack::new();
    stack.set_transition_type(gtk::StackTransitionType::Crossfade);
    for route in navigable().filter(|r| r.page != Page::AiAssistant) {
        stack.add_named(&placeholder_page(route.page), Some(route.page.id()));
    }
    stack.add_named(&placeholder_page(Page::NotFound), Some(Page::NotFound.id()));

    let config = AppConfig::load();
    log::info!("Using assistant endpoint {}", config.endpoint);
    let chat = ChatView::new(&config, &overlay);
    stack.add_named(&chat.widget(), Some(Page::AiAssistant.id()));

    split.set_content(Some(&stack));
    overlay.set_child(Some(&split));

    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let title = gtk::Label::new(Some("Recon"));
    header.set_title_widget(Some(&title));

    let prefs_btn = gtk::Button::from_icon_name("emblem-system-symbolic");
    prefs_btn.set_tooltip_text(Some("Assistant settings"));
    header.pack_end(&prefs_btn);
    container.append(&header);
    container.append(&overlay);
    window.set_content(Some(&container));

    let navigate: Rc<dyn Fn(&str)> = {
        let stack = stack.clone();
        let sidebar = sidebar.clone();
        let title = title.clone();
        Rc::new(move |path: &str| {
            let page = resolve(path);
            log::debug!("Navigating to {path} ({page:?})");
            stack.set_visible_child_name(page.id());
            sidebar.select(page);
            title.set_label(page.title());
        })
    };
    {
        let navigate = navigate.clone();
        sidebar.connect_navigate(move |path| navigate(path));
    }
    navigate(HOME);

    {
        let window = window.clone();
        let overlay = overlay.clone();
        prefs_btn.connect_clicked(move |_| {
            let overlay = overlay.clone();
            let chat = chat.clone();
            let navigate = navigate.clone();
            crate::ui::preferences::show_preferences_window(&window, move |config| {
                let config = config.with_env_override(|key| std::env::var(key).ok());
                chat.reconfigure(&config);
                navigate(HOME);
                overlay.add_toast(adw::Toast::new("Assistant settings saved"));
            });
        });
    }

    window.present();
}
