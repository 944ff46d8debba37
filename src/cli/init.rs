use crate::models::CONFIG_TEMPLATE;
use crate::state::FactoryPaths;
use crate::Result;
use colored::Colorize;

pub fn run(paths: &FactoryPaths, force: bool) -> Result<()> {
    let config_path = paths.config();
    if config_path.exists() && !force {
        println!(
            "{}",
            format!("⚠️  Config already exists at {}", config_path.display()).yellow()
        );
        println!("   Run with --force to overwrite");
        return Ok(());
    }

    paths.ensure_root()?;
    std::fs::write(&config_path, CONFIG_TEMPLATE)?;

    println!(
        "{}",
        format!("✓ Wrote {}", config_path.display()).green()
    );
    println!();
    println!("Next steps:");
    println!("   1. Fill in [jira], [github] and [repo] in the config");
    println!("   2. Export JIRA_API_TOKEN / GITHUB_TOKEN if not set in the file");
    println!("   3. factory start");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_template_once() {
        let temp = TempDir::new().unwrap();
        let paths = FactoryPaths::new(temp.path().join("home"));

        run(&paths, false).unwrap();
        assert_eq!(
            std::fs::read_to_string(paths.config()).unwrap(),
            CONFIG_TEMPLATE
        );

        std::fs::write(paths.config(), "# edited").unwrap();
        run(&paths, false).unwrap();
        assert_eq!(std::fs::read_to_string(paths.config()).unwrap(), "# edited");

        run(&paths, true).unwrap();
        assert_eq!(
            std::fs::read_to_string(paths.config()).unwrap(),
            CONFIG_TEMPLATE
        );
    }
}
