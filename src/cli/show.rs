//! Config command
//!
//! Shows where configuration comes from and what it resolves to, without
//! opening a browser.

use super::submit::SubmitArgs;
use crate::config::ConfigPaths;
use crate::error::MeterResult;

/// Handle the config command
pub fn handle_config_command(args: &SubmitArgs) -> MeterResult<()> {
    let paths = ConfigPaths::resolve(args.config.as_deref());
    let settings = args.settings()?;

    println!("belssb-meter Configuration");
    println!("==========================");
    println!(
        "Config file: {}{}",
        paths.config_file().display(),
        if paths.exists() { "" } else { " (not found)" }
    );
    println!();
    println!("Resolved settings:");
    println!("{}", settings);

    match settings.reading() {
        Ok(_) => println!("\nReadings: valid for {} tariff", settings.tariff),
        Err(e) => println!("\nReadings: {}", e),
    }

    Ok(())
}
