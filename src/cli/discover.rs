//! Discover command
//!
//! Prints the form structure of the reading page.

use clap::Args;

use crate::browser::BrowserOptions;
use crate::config::settings::{DEFAULT_NODE, DEFAULT_URL};
use crate::config::ConfigLayer;
use crate::discover::{discover_form, DiscoverFormat};
use crate::error::MeterResult;

#[derive(Args, Debug, Clone, Default)]
pub struct DiscoverArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: DiscoverFormat,

    /// Run browser in headed mode (visible window)
    #[arg(long)]
    pub headed: bool,
}

/// Browser options from env and file layers; no account is needed here
pub fn discover_options(layer: ConfigLayer, args: &DiscoverArgs, debug: bool) -> BrowserOptions {
    BrowserOptions {
        url: layer.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
        node: layer.node.unwrap_or_else(|| DEFAULT_NODE.to_string()),
        node_path: layer.node_path,
        headed: args.headed,
        debug,
        ..Default::default()
    }
}

/// Handle the discover command
pub fn handle_discover_command(
    layer: ConfigLayer,
    args: &DiscoverArgs,
    debug: bool,
) -> MeterResult<()> {
    let options = discover_options(layer, args, debug);
    let discovery = discover_form(&options)?;
    println!("{}", discovery.render(args.format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_options_defaults() {
        let options = discover_options(ConfigLayer::default(), &DiscoverArgs::default(), false);
        assert_eq!(options.url, DEFAULT_URL);
        assert_eq!(options.node, DEFAULT_NODE);
        assert!(!options.headed);
    }

    #[test]
    fn test_discover_options_from_layer() {
        let layer = ConfigLayer {
            url: Some("http://localhost:3000/pokaz".into()),
            node: Some("/usr/local/bin/node".into()),
            ..Default::default()
        };
        let args = DiscoverArgs {
            headed: true,
            ..Default::default()
        };
        let options = discover_options(layer, &args, true);
        assert_eq!(options.url, "http://localhost:3000/pokaz");
        assert_eq!(options.node, "/usr/local/bin/node");
        assert!(options.headed);
        assert!(options.debug);
    }
}
