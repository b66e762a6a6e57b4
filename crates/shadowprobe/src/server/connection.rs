// WebDriver HTTP connection
//
// Dispatches registered commands to the remote end (chromedriver, or any
// implementation speaking the same wire protocol) and translates W3C
// response envelopes into crate errors.

use std::collections::HashMap;

use reqwest::StatusCode;
use serde_json::{Value, json};
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::commands::{self, CommandDescriptor, CommandRegistry, Verb};

/// HTTP connection to a WebDriver remote end.
///
/// The connection owns the command registry; vendor commands are added per
/// connection through [`Connection::register_command`] and never leak into
/// other connections.
#[derive(Debug)]
pub struct Connection {
    http: reqwest::Client,
    base: Url,
    commands: CommandRegistry,
}

impl Connection {
    /// Creates a connection with the standard command vocabulary.
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
            commands: CommandRegistry::standard(),
        }
    }

    /// Extends this connection's vocabulary with a vendor command.
    ///
    /// Fails with [`Error::CommandRedefined`] if the name is already bound.
    pub fn register_command(
        &mut self,
        name: &'static str,
        descriptor: CommandDescriptor,
    ) -> Result<()> {
        tracing::debug!(name, route = descriptor.route, "registering vendor command");
        self.commands.register(name, descriptor)
    }

    /// Dispatches a registered command and returns the `value` field of the
    /// success envelope.
    ///
    /// `path_params` fill the descriptor's route placeholders. POST commands
    /// always carry a JSON body; `None` sends `{}` (the remote end rejects
    /// empty bodies).
    pub async fn execute(
        &self,
        name: &str,
        path_params: &HashMap<&str, &str>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let descriptor = self.commands.get(name)?;
        let path = commands::substitute(descriptor.route, path_params)?;

        let endpoint = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Protocol(format!("bad route '{path}': {e}")))?;

        tracing::trace!(name, %endpoint, "dispatching command");

        let empty = json!({});
        let request = match descriptor.verb {
            Verb::Get => self.http.get(endpoint),
            Verb::Post => self.http.post(endpoint).json(body.unwrap_or(&empty)),
            Verb::Delete => self.http.delete(endpoint),
        };

        let response = request.send().await?;
        let status = response.status();
        let envelope: Value = response.json().await?;

        unwrap_envelope(status, envelope)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

/// Splits a W3C response envelope into its value or a mapped error.
///
/// Error envelopes look like
/// `{"value": {"error": "...", "message": "...", "stacktrace": "..."}}`.
/// Only `no such element` gets its own variant; probes need to tell it
/// apart from genuine protocol failures.
fn unwrap_envelope(status: StatusCode, envelope: Value) -> Result<Value> {
    let value = envelope.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }

    let code = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = value.get("message").and_then(Value::as_str).unwrap_or("");

    match code {
        "no such element" => Err(Error::ElementNotFound {
            selector: message.to_string(),
        }),
        _ => Err(Error::Protocol(format!("{code}: {message}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_yields_value() {
        let envelope = json!({ "value": { "sessionId": "s1" } });
        let value = unwrap_envelope(StatusCode::OK, envelope).unwrap();
        assert_eq!(value["sessionId"], "s1");
    }

    #[test]
    fn test_success_envelope_without_value_is_null() {
        let value = unwrap_envelope(StatusCode::OK, json!({})).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_no_such_element_maps_to_element_not_found() {
        let envelope = json!({
            "value": {
                "error": "no such element",
                "message": "Unable to locate element",
                "stacktrace": ""
            }
        });
        let result = unwrap_envelope(StatusCode::NOT_FOUND, envelope);
        assert!(matches!(result, Err(Error::ElementNotFound { .. })));
    }

    #[test]
    fn test_other_error_maps_to_protocol() {
        let envelope = json!({
            "value": {
                "error": "unknown command",
                "message": "chromium/send_command_and_get_result",
                "stacktrace": ""
            }
        });
        let result = unwrap_envelope(StatusCode::NOT_FOUND, envelope);
        match result {
            Err(Error::Protocol(message)) => {
                assert!(message.contains("unknown command"));
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_without_body_still_maps() {
        let result = unwrap_envelope(StatusCode::INTERNAL_SERVER_ERROR, json!({}));
        assert!(matches!(result, Err(Error::Protocol(_))));
    }
}
