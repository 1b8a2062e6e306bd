use anyhow::{Context, Result};
use proxygen_core::{Config, config::CONFIG_FILE_NAME};
use std::{env, path::Path};
use tracing::info;

pub fn init_command(cwd: Option<&Path>, force: bool) -> Result<()> {
    let project_root = match cwd {
        Some(cwd) => cwd.to_path_buf(),
        None => env::current_dir().context("Failed to get current directory")?,
    };

    let config_path = project_root.join(CONFIG_FILE_NAME);
    if config_path.exists() && !force {
        println!("❌ Config already exists at: {}", config_path.display());
        println!("   Use --force to overwrite");
        return Ok(());
    }

    let config = Config {
        source_dirs: vec!["src".into()],
        ..Config::default()
    };
    config
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    info!("Wrote default config to {}", config_path.display());

    println!("✅ Created config: {}", config_path.display());
    println!("\n📌 Next steps:");
    println!("   Add `proxygen-core` to [build-dependencies] and call `Builder::new().generate()` from build.rs");
    println!("   include!(concat!(env!(\"OUT_DIR\"), \"/{}.rs\")) where the proxies should live", config.file_name);
    Ok(())
}
