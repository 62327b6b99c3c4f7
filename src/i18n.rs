// ==========================================
// Internationalization (i18n) module
// ==========================================
// Uses rust-i18n. Norwegian Bokmål (default) and English.
// Note: the rust_i18n::i18n! macro is initialized in lib.rs.
// ==========================================

/// Current locale.
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// Set the locale.
///
/// # Arguments
/// - locale: language code ("nb-NO" or "en")
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// Translate a message (no arguments).
///
/// # Example
/// ```no_run
/// use hms_manager::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// Translate a message with arguments.
///
/// # Example
/// ```no_run
/// use hms_manager::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/liste.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
