// Pre-navigation script injection
//
// chromedriver exposes Chrome DevTools commands through a vendor route
// outside the standard W3C vocabulary. The injector registers that route
// as a first-class command and uses it to run an attachShadow override in
// every new document, before the document's own scripts.
//
// Ordering is the whole point: once a custom element's creation logic has
// run with `closed` honored, no later script can reopen the boundary. A
// same-document eval or post-load injection is too late by construction.

use std::collections::HashMap;

use serde_json::json;

use crate::error::{Error, Result};
use crate::protocol::commands::{CommandDescriptor, Verb};
use crate::protocol::session::Session;

/// Page-runtime override that disarms closed shadow roots.
///
/// Saves the original `Element.prototype.attachShadow`, then replaces it
/// with a wrapper that forces `{ mode: 'open' }` whatever the caller asked
/// for. The patch lives in the page, not the harness: it is re-evaluated
/// for every new document in the session and dies with the session's
/// browser, so other sessions never observe it.
pub const OVERRIDE_SCRIPT: &str = "Element.prototype._attachShadow = Element.prototype.attachShadow; \
Element.prototype.attachShadow = function (init) { return this._attachShadow({ mode: 'open' }); };";

/// Logical name of the vendor command.
pub const SEND_COMMAND: &str = "sendCommandAndGetResult";

const SEND_COMMAND_ROUTE: &str = "/session/:sessionId/chromium/send_command_and_get_result";
const ADD_SCRIPT_CMD: &str = "Page.addScriptToEvaluateOnNewDocument";

/// Installs [`OVERRIDE_SCRIPT`] into a session.
///
/// Must run strictly before the session's first navigation to affect the
/// next document; installing afterwards reaches the remote end but leaves
/// the current document's boundaries intact.
pub struct ScriptInjector;

impl ScriptInjector {
    /// Registers the vendor command on the session's connection and issues
    /// `Page.addScriptToEvaluateOnNewDocument` with the override source.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::CommandRedefined`] if the vendor command is
    /// already registered for this session, and with [`Error::Protocol`]
    /// if the remote end rejects the command or omits the script
    /// identifier from its response. A failed installation must propagate:
    /// a silently-missing override is indistinguishable from a correctly
    /// closed boundary.
    pub async fn install(session: &mut Session) -> Result<()> {
        if session.has_navigated() {
            tracing::warn!(
                session = %session.id(),
                "override installed after navigation; the current document keeps its boundaries"
            );
        }

        session.connection_mut().register_command(
            SEND_COMMAND,
            CommandDescriptor::new(Verb::Post, SEND_COMMAND_ROUTE),
        )?;

        let body = json!({
            "cmd": ADD_SCRIPT_CMD,
            "params": { "source": OVERRIDE_SCRIPT }
        });

        let path = HashMap::from([("sessionId", session.id())]);
        let value = session
            .connection()
            .execute(SEND_COMMAND, &path, Some(&body))
            .await?;

        let identifier = value
            .get("identifier")
            .ok_or_else(|| Error::Protocol("script registration returned no identifier".to_string()))?;

        tracing::debug!(session = %session.id(), %identifier, "attachShadow override registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_captures_original_entry_point() {
        assert!(OVERRIDE_SCRIPT.contains("Element.prototype._attachShadow = Element.prototype.attachShadow"));
    }

    #[test]
    fn test_override_forces_open_mode() {
        assert!(OVERRIDE_SCRIPT.contains("{ mode: 'open' }"));
        assert!(!OVERRIDE_SCRIPT.contains("init.mode"));
    }

    #[test]
    fn test_vendor_route_is_session_scoped() {
        assert!(SEND_COMMAND_ROUTE.starts_with("/session/:sessionId/"));
    }
}
