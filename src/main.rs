use std::path::PathBuf;
use std::sync::Arc;

use gcodemacro::{
    init_logging, init_translations, render_text, App, Config, JsonFileMacroSource, BUILD_DATE,
    VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional first argument: config file path
    let config_path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => Config::default_path()?,
    };
    let config = Config::load_or_default(&config_path)?;

    init_logging(&config.logging)?;
    tracing::info!("GCodeMacro {} (built {})", VERSION, BUILD_DATE);
    tracing::info!("Macros: {}", config.macros.file.display());

    if let Err(err) = init_translations(&config.ui.language, &config.ui.locale_path()) {
        tracing::warn!("Translations unavailable: {}", err);
    }

    let source = JsonFileMacroSource::new(config.macros.file.clone());
    if source.ensure_exists().await? {
        tracing::info!("Created empty macro file");
    }

    let app = App::new(Arc::new(source));
    let mut panel = app.macro_panel(&config.ui);
    panel.mount()?;
    app.fetch.settled().await;

    for line in render_text(&panel.view()) {
        println!("{}", line);
    }

    panel.unmount();
    Ok(())
}
