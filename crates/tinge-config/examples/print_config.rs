/// Print the effective configuration after file and environment overrides
///
/// Run with: cargo run -p tinge-config --example print_config

fn main() {
    let config = tinge_config::TingeConfig::load();

    println!("Probe:");
    println!("  timeout: {} ms", config.probe.timeout_ms);
    println!("  user agent: {}", config.probe.user_agent);
    println!("  max bytes: {}", config.probe.max_bytes);
    if !config.probe.allowed_origins.is_empty() {
        println!("  allowed origins: {}", config.probe.allowed_origins.join(", "));
    }
    println!();

    println!("Defaults:");
    println!("  asset url: {}", config.defaults.asset_url);
    let (bg, text) = config.defaults.colors_for(false);
    println!("  light: background {bg}, text {text}");
    let (bg, text) = config.defaults.colors_for(true);
    println!("  dark: background {bg}, text {text}");
    println!();

    println!("Media:");
    println!("  prefers dark: {}", config.media.prefers_dark);
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => println!("{toml_str}"),
        Err(e) => eprintln!("Failed to serialize config: {e}"),
    }
}
