//! Message translation
//!
//! Panel text is looked up through gettext in the `gcodemacro` domain. Until
//! `init_translations` binds a catalog, `tr` returns the message id, which is
//! the English text.

use gettextrs::{bind_textdomain_codeset, bindtextdomain, setlocale, textdomain, LocaleCategory};
use std::path::Path;

/// Gettext domain holding panel messages
pub const TEXT_DOMAIN: &str = "gcodemacro";

/// Language setting value that follows the operating system
pub const SYSTEM_LANGUAGE: &str = "system";

/// Translate a message id
pub fn tr(msgid: &str) -> String {
    gettextrs::gettext(msgid)
}

/// Map a language setting to a gettext language name
///
/// `system` asks the OS, falling back to English. BCP 47 tags such as
/// `pt-BR` become `pt_BR`.
pub fn resolve_language(setting: &str) -> String {
    let tag = if setting.eq_ignore_ascii_case(SYSTEM_LANGUAGE) {
        sys_locale::get_locale().unwrap_or_else(|| "en".to_string())
    } else {
        setting.to_string()
    };
    tag.replace('-', "_")
}

/// Bind the message catalog in `locale_dir` and select `language`
///
/// Call once at startup, before other threads read the environment.
pub fn init_translations(language: &str, locale_dir: &Path) -> std::io::Result<()> {
    let language = resolve_language(language);

    // GNU gettext consults LANGUAGE ahead of LC_MESSAGES
    std::env::set_var("LANGUAGE", &language);
    if setlocale(LocaleCategory::LcAll, "").is_none() {
        tracing::warn!("System locale is not available; messages stay in English");
    }

    bindtextdomain(TEXT_DOMAIN, locale_dir)?;
    bind_textdomain_codeset(TEXT_DOMAIN, "UTF-8")?;
    textdomain(TEXT_DOMAIN)?;

    tracing::info!(
        "Translations: language={} catalog={}",
        language,
        locale_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untranslated_id_is_returned() {
        assert_eq!(tr("No macros available"), "No macros available");
    }

    #[test]
    fn test_resolve_explicit_language() {
        assert_eq!(resolve_language("de"), "de");
        assert_eq!(resolve_language("pt-BR"), "pt_BR");
    }

    #[test]
    fn test_resolve_system_language() {
        let language = resolve_language("System");
        assert!(!language.is_empty());
        assert!(!language.contains('-'));
    }
}
