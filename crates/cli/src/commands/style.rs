use serde_json::Value;

use crate::{
    api::{ApiClient, StyleRequest},
    commands::{
        show::{print_details, CodeCommandError},
        Style,
    },
    config::CliConfig,
};

/// Interpret a command-line value as JSON, falling back to a plain string.
fn parse_value(value: &str) -> Value {
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(String::from(value)))
}

/// Style flow entrypoint.
pub(crate) async fn style(Style { id, path, value }: Style) -> Result<(), CodeCommandError> {
    let config = CliConfig::new()?;

    let details = ApiClient::new(&config)
        .style(
            &id,
            &StyleRequest {
                path: &path,
                value: parse_value(&value),
            },
        )
        .await?;

    print_details(&details);

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_value;

    #[test]
    fn values() {
        assert_eq!(parse_value("#ff0000"), json!("#ff0000"));
        assert_eq!(parse_value("320"), json!(320));
        assert_eq!(parse_value(r##"{"color":"#000"}"##), json!({ "color": "#000" }));
        assert_eq!(parse_value("\"42\""), json!("42"));
    }
}
