use store_logging::store_warn;
use url::Url;
use visitbook_store::StoreSettings;

/// Environment variable naming the table-store endpoint URL.
pub const STORE_URL_ENV: &str = "VISITBOOK_STORE_URL";
/// Environment variable naming the anonymous API key.
pub const STORE_KEY_ENV: &str = "VISITBOOK_STORE_ANON_KEY";

// Placeholder values from example configs count as absent.
const PLACEHOLDER_URL: &str = "your-store-url";
const PLACEHOLDER_KEY: &str = "your-store-anon-key";

/// Builds store settings from the environment. `None` means the persistence
/// collaborator is not configured; callers degrade instead of failing.
pub fn store_settings_from_env() -> Option<StoreSettings> {
    settings_from(
        std::env::var(STORE_URL_ENV).ok(),
        std::env::var(STORE_KEY_ENV).ok(),
    )
}

fn settings_from(url: Option<String>, key: Option<String>) -> Option<StoreSettings> {
    let url = url.filter(|value| !value.is_empty() && value != PLACEHOLDER_URL)?;
    let key = key.filter(|value| !value.is_empty() && value != PLACEHOLDER_KEY)?;
    if !is_valid_store_url(&url) {
        store_warn!("{STORE_URL_ENV} does not look like a hosted store endpoint; ignoring");
        return None;
    }
    Some(StoreSettings::new(url, key))
}

/// The endpoint must parse and sit on a Supabase-style host.
fn is_valid_store_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => url.host_str().is_some_and(|host| host.contains("supabase")),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_valid_store_url, settings_from};

    #[test]
    fn both_values_required() {
        assert!(settings_from(None, None).is_none());
        assert!(settings_from(Some("https://x.supabase.co".to_string()), None).is_none());
        assert!(settings_from(None, Some("key".to_string())).is_none());
    }

    #[test]
    fn placeholders_count_as_absent() {
        assert!(settings_from(
            Some("your-store-url".to_string()),
            Some("key".to_string())
        )
        .is_none());
        assert!(settings_from(
            Some("https://x.supabase.co".to_string()),
            Some("your-store-anon-key".to_string())
        )
        .is_none());
    }

    #[test]
    fn hosted_pattern_is_enforced() {
        assert!(is_valid_store_url("https://project.supabase.co"));
        assert!(is_valid_store_url("https://selfhosted.supabase.example.com"));
        assert!(!is_valid_store_url("https://example.com"));
        assert!(!is_valid_store_url("not a url"));
    }

    #[test]
    fn valid_pair_yields_settings() {
        let settings = settings_from(
            Some("https://project.supabase.co".to_string()),
            Some("anon-key".to_string()),
        )
        .expect("configured");
        assert_eq!(settings.base_url, "https://project.supabase.co");
        assert_eq!(settings.anon_key, "anon-key");
    }
}
