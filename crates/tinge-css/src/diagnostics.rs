use std::collections::HashSet;
use std::sync::OnceLock;

/// Whether verbose diagnostics are enabled for `category`.
///
/// Categories come from the comma-separated `TINGE_DIAGNOSTICS` variable
/// (`css`, `probe`, `infer`, or `all`) and are read once per process.
pub fn diagnostics_enabled(category: &str) -> bool {
    static SET: OnceLock<HashSet<String>> = OnceLock::new();
    let set = SET.get_or_init(|| {
        let raw = std::env::var("TINGE_DIAGNOSTICS").unwrap_or_default();
        raw.split(',')
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect::<HashSet<String>>()
    });
    set.contains("all") || set.contains(&category.to_ascii_lowercase())
}
