use gtk4 as gtk;
use gtk4::prelude::*;
use recon_assistant::routes::{navigable, Page, Route};

pub struct Sidebar {
    root: gtk::Box,
    list: gtk::ListBox,
    routes: Vec<&'static Route>,
}

impl Sidebar {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        let title = gtk::Label::new(Some("Recon"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let list = gtk::ListBox::new();
        list.add_css_class("navigation-sidebar");
        root.append(&list);

        let routes: Vec<_> = navigable().collect();
        for route in &routes {
            let row = gtk::ListBoxRow::new();
            let label = gtk::Label::new(Some(route.page.title()));
            label.set_margin_top(8);
            label.set_margin_bottom(8);
            label.set_margin_start(8);
            label.set_margin_end(8);
            label.set_halign(gtk::Align::Start);
            row.set_child(Some(&label));
            list.append(&row);
        }

        Self { root, list, routes }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    /// Calls `f` with the route path whenever a row is activated.
    pub fn connect_navigate<F: Fn(&'static str) + 'static>(&self, f: F) {
        let routes = self.routes.clone();
        self.list.connect_row_activated(move |_, row| {
            if let Some(route) = usize::try_from(row.index()).ok().and_then(|i| routes.get(i)) {
                f(route.path);
            }
        });
    }

    pub fn select(&self, page: Page) {
        let index = self.routes.iter().position(|r| r.page == page);
        let row = index
            .and_then(|i| i32::try_from(i).ok())
            .and_then(|i| self.list.row_at_index(i));
        self.list.select_row(row.as_ref());
    }
}
