use chrono::{DateTime, Utc};
use gtk4 as gtk;
use gtk4::prelude::*;
use recon_assistant::clock::relative_time;
use recon_assistant::conversation::{Message, Sender};
use recon_assistant::markdown::{render, Fragment};

/// Pango markup for rendered fragments. All text is escaped, so backend
/// replies can never inject markup of their own.
pub fn to_pango_markup(fragments: &[Fragment]) -> String {
    let mut out = String::new();
    for fragment in fragments {
        match fragment {
            Fragment::Text(text) => out.push_str(&glib::markup_escape_text(text)),
            Fragment::Strong(text) => {
                out.push_str("<b>");
                out.push_str(&glib::markup_escape_text(text));
                out.push_str("</b>");
            }
            Fragment::LineBreak => out.push('\n'),
        }
    }
    out
}

pub fn message_row(
    message: &Message,
    now: DateTime<Utc>,
    on_copy: Option<Box<dyn Fn()>>,
) -> gtk::Widget {
    let is_user = message.sender == Sender::User;

    let row = gtk::Box::new(gtk::Orientation::Horizontal, 8);
    row.set_halign(if is_user { gtk::Align::End } else { gtk::Align::Start });

    let avatar_text = if is_user { "You" } else { "AI Assistant" };
    let avatar = adw::Avatar::new(28, Some(avatar_text), true);
    avatar.set_valign(gtk::Align::Start);

    let bubble = gtk::Box::new(gtk::Orientation::Vertical, 4);
    bubble.add_css_class("card");
    bubble.add_css_class(if is_user { "user-bubble" } else { "bot-bubble" });
    bubble.set_margin_top(2);
    bubble.set_margin_bottom(2);

    let text = gtk::Label::new(None);
    text.set_markup(&to_pango_markup(&render(&message.text)));
    text.set_wrap(true);
    text.set_wrap_mode(gtk::pango::WrapMode::WordChar);
    text.set_max_width_chars(60);
    text.set_selectable(true);
    text.set_xalign(0.0);
    text.set_margin_top(8);
    text.set_margin_start(12);
    text.set_margin_end(12);
    bubble.append(&text);

    let footer = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    footer.set_margin_start(12);
    footer.set_margin_end(6);
    footer.set_margin_bottom(6);
    let time = gtk::Label::new(Some(&relative_time(message.timestamp, now)));
    time.add_css_class("dim-label");
    time.add_css_class("caption");
    time.set_hexpand(true);
    time.set_xalign(0.0);
    footer.append(&time);

    if let Some(on_copy) = on_copy {
        let copy_btn = gtk::Button::from_icon_name("edit-copy-symbolic");
        copy_btn.add_css_class("flat");
        copy_btn.set_tooltip_text(Some("Copy"));
        copy_btn.connect_clicked(move |_| on_copy());
        footer.append(&copy_btn);
    }
    bubble.append(&footer);

    if is_user {
        row.append(&bubble);
        row.append(&avatar);
    } else {
        row.append(&avatar);
        row.append(&bubble);
    }
    row.upcast()
}

pub fn typing_row() -> gtk::Widget {
    let row = gtk::Box::new(gtk::Orientation::Horizontal, 8);
    row.set_halign(gtk::Align::Start);
    row.append(&adw::Avatar::new(28, Some("AI Assistant"), true));
    let spinner = gtk::Spinner::new();
    spinner.start();
    row.append(&spinner);
    let label = gtk::Label::new(Some("Thinking…"));
    label.add_css_class("dim-label");
    row.append(&label);
    row.upcast()
}
