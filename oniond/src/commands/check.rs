//! `oniond check`: validate the configuration file without starting anything.

use std::path::Path;

/// Returns `Ok(())` and prints `OK` on success; prints the validation errors
/// and returns an error (mapped to exit code 1 by the caller) otherwise.
pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    match onion_core::Config::load(config_path).await {
        Ok(_) => {
            println!("OK");
            Ok(())
        }
        Err(err) => {
            eprintln!("{err}");
            Err(anyhow::anyhow!("configuration is invalid"))
        }
    }
}
