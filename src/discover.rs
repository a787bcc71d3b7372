//! Form discovery
//!
//! Opens the reading page and lists every input, button, iframe and shadow
//! host it can reach, in the main document and in each Formy iframe. Used
//! to find the field names again when the widget changes.

use serde::{Deserialize, Serialize};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::info;

use crate::browser::{BrowserOptions, DiscoverScript};
use crate::error::{MeterError, MeterResult};

/// An input, select or textarea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct InputField {
    #[tabled(rename = "Tag")]
    pub tag: String,
    #[serde(rename = "type")]
    #[tabled(rename = "Type")]
    pub kind: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Id")]
    pub id: String,
    #[tabled(rename = "Placeholder")]
    pub placeholder: String,
    #[tabled(rename = "Label")]
    pub label: String,
    #[tabled(rename = "Required")]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct ButtonInfo {
    #[tabled(rename = "Tag")]
    pub tag: String,
    #[serde(rename = "type")]
    #[tabled(rename = "Type")]
    pub kind: String,
    #[tabled(rename = "Text")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct IframeInfo {
    #[tabled(rename = "Src")]
    pub src: String,
    #[tabled(rename = "Id")]
    pub id: String,
}

/// Everything collected from one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStructure {
    #[serde(default)]
    pub inputs: Vec<InputField>,
    #[serde(default)]
    pub buttons: Vec<ButtonInfo>,
    #[serde(default)]
    pub iframes: Vec<IframeInfo>,
    #[serde(default)]
    pub shadow_hosts: Vec<String>,
}

/// Structure found inside one Formy iframe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStructure {
    pub url: String,
    pub structure: FormStructure,
}

/// Result of a discovery run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    pub url: String,
    pub main: FormStructure,
    #[serde(default)]
    pub frames: Vec<FrameStructure>,
}

/// Raw report printed by the discovery script
#[derive(Debug, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
enum DiscoverReport {
    Collected(Discovery),
    Timeout { message: Option<String> },
    Error { message: Option<String> },
}

/// Output format for the discovery report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DiscoverFormat {
    #[default]
    Json,
    Table,
}

/// Load the page and collect its form structure
pub fn discover_form(options: &BrowserOptions) -> MeterResult<Discovery> {
    let runner = options.runner();
    runner.check_node()?;

    let script = DiscoverScript::new(options).render()?;
    info!(url = %options.url, "collecting form structure");

    match runner.run::<DiscoverReport>(&script)? {
        DiscoverReport::Collected(discovery) => Ok(discovery),
        DiscoverReport::Timeout { message } => {
            Err(MeterError::Timeout(message.unwrap_or_default()))
        }
        DiscoverReport::Error { message } => Err(MeterError::Browser(message.unwrap_or_default())),
    }
}

impl Discovery {
    /// Render the report in the requested format
    pub fn render(&self, format: DiscoverFormat) -> MeterResult<String> {
        match format {
            DiscoverFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            DiscoverFormat::Table => Ok(self.format_tables()),
        }
    }

    fn format_tables(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Page: {}\n\n", self.url));
        output.push_str(&format_structure(&self.main));

        for frame in &self.frames {
            output.push_str(&format!("\n--- Inside iframe: {} ---\n\n", frame.url));
            output.push_str(&format_structure(&frame.structure));
        }

        output
    }
}

/// Format one document's structure as tables
pub fn format_structure(structure: &FormStructure) -> String {
    let mut output = String::new();

    output.push_str(&format!("Inputs ({}):\n", structure.inputs.len()));
    if !structure.inputs.is_empty() {
        output.push_str(&Table::new(&structure.inputs).with(Style::psql()).to_string());
        output.push('\n');
    }

    output.push_str(&format!("\nButtons ({}):\n", structure.buttons.len()));
    if !structure.buttons.is_empty() {
        output.push_str(&Table::new(&structure.buttons).with(Style::psql()).to_string());
        output.push('\n');
    }

    output.push_str(&format!("\nIframes ({}):\n", structure.iframes.len()));
    if !structure.iframes.is_empty() {
        output.push_str(&Table::new(&structure.iframes).with(Style::psql()).to_string());
        output.push('\n');
    }

    output.push_str(&format!("\nShadow hosts ({}):\n", structure.shadow_hosts.len()));
    for host in &structure.shadow_hosts {
        output.push_str(&format!("  {}\n", host));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"{
        "stage": "collected",
        "url": "https://www.belssb.ru/individuals/pokaz/",
        "main": {
            "inputs": [
                {"tag": "INPUT", "type": "text", "name": "input-account", "id": "input-account",
                 "placeholder": "Лицевой счёт", "label": "", "required": true}
            ],
            "buttons": [{"tag": "BUTTON", "type": "submit", "text": "Отправить"}],
            "iframes": [],
            "shadowHosts": ["FORMY-WIDGET#form"]
        },
        "frames": [
            {"url": "https://formy.example/embed", "structure": {"inputs": [], "buttons": [], "iframes": [], "shadowHosts": []}}
        ]
    }"#;

    fn discovery() -> Discovery {
        match serde_json::from_str::<DiscoverReport>(REPORT).unwrap() {
            DiscoverReport::Collected(d) => d,
            other => panic!("unexpected report: {other:?}"),
        }
    }

    #[test]
    fn test_parse_collected() {
        let d = discovery();
        assert_eq!(d.main.inputs[0].name, "input-account");
        assert_eq!(d.main.inputs[0].kind, "text");
        assert_eq!(d.main.shadow_hosts, vec!["FORMY-WIDGET#form".to_string()]);
        assert_eq!(d.frames.len(), 1);
    }

    #[test]
    fn test_parse_failure_report() {
        let report: DiscoverReport =
            serde_json::from_str(r#"{"stage":"timeout","message":"Timeout 20000ms exceeded."}"#)
                .unwrap();
        assert!(matches!(report, DiscoverReport::Timeout { .. }));
    }

    #[test]
    fn test_render_table() {
        let output = discovery().render(DiscoverFormat::Table).unwrap();
        assert!(output.contains("Inputs (1):"));
        assert!(output.contains("input-account"));
        assert!(output.contains("Отправить"));
        assert!(output.contains("FORMY-WIDGET#form"));
        assert!(output.contains("--- Inside iframe: https://formy.example/embed ---"));
    }

    #[test]
    fn test_render_json_keeps_field_names() {
        let output = discovery().render(DiscoverFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["main"]["inputs"][0]["type"], "text");
        assert_eq!(value["main"]["shadowHosts"][0], "FORMY-WIDGET#form");
    }
}
