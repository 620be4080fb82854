use anyhow::Result;
use multitree_etl::{config, Config};

/// Show the current effective configuration.
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!(
        "File exists: {}\n",
        if exists { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    for line in config.display().lines() {
        println!("  {line}");
    }

    println!("\nPriority: CLI args > ENV vars (MULTITREE_*) > Config file > Defaults");

    Ok(())
}

/// Print a single config value.
pub fn get_config(key: &str) -> Result<()> {
    let config = Config::load()?;

    match key {
        "raw_dir" => println!("{}", config.raw_dir.display()),
        "etc_dir" => println!("{}", config.etc_dir.display()),
        "cldf_dir" => println!("{}", config.cldf_dir.display()),
        "glottolog" => match &config.glottolog {
            Some(path) => println!("{}", path.display()),
            None => println!("<not set>"),
        },
        "logging.level" => println!("{}", config.logging.level),
        _ => {
            anyhow::bail!(
                "Unknown config key: {key}\n\nValid keys: raw_dir, etc_dir, cldf_dir, glottolog, logging.level"
            );
        }
    }

    Ok(())
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    let config_path = config::config_file_path();
    println!("{}", config_path.display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure multitree.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
