pub mod chat_view;
pub mod main_window;
pub mod message_row;
pub mod preferences;
pub mod sidebar;
