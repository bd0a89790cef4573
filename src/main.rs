mod ui;
mod utils;

use adw::prelude::*;
use adw::Application;

static GLIB_LOGGER: glib::GlibLogger = glib::GlibLogger::new(
    glib::GlibLoggerFormat::Plain,
    glib::GlibLoggerDomain::CrateTarget,
);

fn init_logging() {
    if log::set_logger(&GLIB_LOGGER).is_ok() {
        let level = if cfg!(debug_assertions) {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        log::set_max_level(level);
    }
}

fn main() -> glib::ExitCode {
    init_logging();
    let app = Application::builder()
        .application_id("org.apache.ozone.ReconAssistant")
        .build();
    app.connect_activate(|app| {
        crate::ui::main_window::show_main_window(app);
    });
    app.run()
}
