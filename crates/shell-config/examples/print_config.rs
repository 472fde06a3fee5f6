/// Prints the resolved shell configuration
///
/// Run with: cargo run -p shell-config --example print_config

fn main() {
    let config = shell_config::ShellConfig::load();

    println!("=== siteshell configuration ===\n");

    println!("App:");
    println!("  Title: {}", config.app.title);
    println!("  URL: {}", config.app.url);
    println!("  Devtools: {}", config.app.devtools);
    println!();

    println!("Window:");
    println!("  Default size: {}x{}", config.window.width, config.window.height);
    println!("  Header height: {}", config.window.header_height);
    println!("  Native decorations: {}", config.window.native_decorations);
    println!();

    println!("Paths:");
    println!("  State file: {}", config.state_file().display());
    println!("  Profile dir: {}", config.profile_dir().display());
    match config.cookie_file() {
        Some(path) => println!("  Cookie file: {}", path.display()),
        None => println!("  Cookie file: (import disabled)"),
    }
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
