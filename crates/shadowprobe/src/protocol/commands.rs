// WebDriver command vocabulary
//
// Every request the harness sends is described by a CommandDescriptor: a
// logical name bound to an HTTP verb and a route template. The registry is
// seeded with the standard W3C commands at construction and can be extended
// with vendor commands through `CommandRegistry::register`, the supported
// way to reach driver-specific routes without forking the connection layer.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// HTTP verb of a WebDriver command route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Delete,
}

/// A logical command name bound to a route template.
///
/// Route templates use `:name` placeholders (`/session/:sessionId/url`)
/// which the connection substitutes before dispatch. Descriptors are
/// immutable once registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub verb: Verb,
    pub route: &'static str,
}

impl CommandDescriptor {
    pub const fn new(verb: Verb, route: &'static str) -> Self {
        Self { verb, route }
    }
}

/// Logical names of the standard command vocabulary.
pub mod names {
    pub const STATUS: &str = "status";
    pub const NEW_SESSION: &str = "newSession";
    pub const DELETE_SESSION: &str = "deleteSession";
    pub const NAVIGATE_TO: &str = "navigateTo";
    pub const FIND_ELEMENT: &str = "findElement";
    pub const FIND_ELEMENT_FROM_ELEMENT: &str = "findElementFromElement";
    pub const FIND_ELEMENT_FROM_SHADOW_ROOT: &str = "findElementFromShadowRoot";
    pub const ELEMENT_CLICK: &str = "elementClick";
    pub const GET_ELEMENT_TEXT: &str = "getElementText";
    pub const EXECUTE_SCRIPT: &str = "executeScript";
    pub const MAXIMIZE_WINDOW: &str = "maximizeWindow";
}

/// Maps logical command names to route descriptors.
///
/// Registration happens exactly once per name; a second registration of the
/// same name fails with [`Error::CommandRedefined`] rather than silently
/// replacing the handler.
#[derive(Debug)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDescriptor>,
}

impl CommandRegistry {
    /// Creates a registry seeded with the standard W3C vocabulary.
    pub fn standard() -> Self {
        let mut registry = Self {
            commands: HashMap::new(),
        };

        for (name, descriptor) in [
            (names::STATUS, CommandDescriptor::new(Verb::Get, "/status")),
            (
                names::NEW_SESSION,
                CommandDescriptor::new(Verb::Post, "/session"),
            ),
            (
                names::DELETE_SESSION,
                CommandDescriptor::new(Verb::Delete, "/session/:sessionId"),
            ),
            (
                names::NAVIGATE_TO,
                CommandDescriptor::new(Verb::Post, "/session/:sessionId/url"),
            ),
            (
                names::FIND_ELEMENT,
                CommandDescriptor::new(Verb::Post, "/session/:sessionId/element"),
            ),
            (
                names::FIND_ELEMENT_FROM_ELEMENT,
                CommandDescriptor::new(Verb::Post, "/session/:sessionId/element/:elementId/element"),
            ),
            (
                names::FIND_ELEMENT_FROM_SHADOW_ROOT,
                CommandDescriptor::new(Verb::Post, "/session/:sessionId/shadow/:shadowId/element"),
            ),
            (
                names::ELEMENT_CLICK,
                CommandDescriptor::new(Verb::Post, "/session/:sessionId/element/:elementId/click"),
            ),
            (
                names::GET_ELEMENT_TEXT,
                CommandDescriptor::new(Verb::Get, "/session/:sessionId/element/:elementId/text"),
            ),
            (
                names::EXECUTE_SCRIPT,
                CommandDescriptor::new(Verb::Post, "/session/:sessionId/execute/sync"),
            ),
            (
                names::MAXIMIZE_WINDOW,
                CommandDescriptor::new(Verb::Post, "/session/:sessionId/window/maximize"),
            ),
        ] {
            registry.commands.insert(name, descriptor);
        }

        registry
    }

    /// Adds a vendor command to the vocabulary.
    pub fn register(&mut self, name: &'static str, descriptor: CommandDescriptor) -> Result<()> {
        if self.commands.contains_key(name) {
            return Err(Error::CommandRedefined {
                name: name.to_string(),
            });
        }

        self.commands.insert(name, descriptor);
        Ok(())
    }

    /// Looks a command up by logical name.
    pub fn get(&self, name: &str) -> Result<&CommandDescriptor> {
        self.commands
            .get(name)
            .ok_or_else(|| Error::Protocol(format!("unknown command '{name}'")))
    }
}

/// Substitutes `:name` placeholders in a route template.
///
/// Every placeholder must have a value in `params`; a missing value is a
/// protocol error (the caller built an incomplete dispatch).
pub fn substitute(route: &str, params: &HashMap<&str, &str>) -> Result<String> {
    let mut segments = Vec::new();

    for segment in route.split('/') {
        match segment.strip_prefix(':') {
            Some(name) => {
                let value = params.get(name).ok_or_else(|| {
                    Error::Protocol(format!("missing route parameter ':{name}' for '{route}'"))
                })?;
                segments.push(*value);
            }
            None => segments.push(segment),
        }
    }

    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_session_route() {
        let params = HashMap::from([("sessionId", "abc123")]);
        let path = substitute("/session/:sessionId/url", &params).unwrap();
        assert_eq!(path, "/session/abc123/url");
    }

    #[test]
    fn test_substitute_two_placeholders() {
        let params = HashMap::from([("sessionId", "s1"), ("elementId", "e9")]);
        let path = substitute("/session/:sessionId/element/:elementId/click", &params).unwrap();
        assert_eq!(path, "/session/s1/element/e9/click");
    }

    #[test]
    fn test_substitute_missing_parameter_fails() {
        let params = HashMap::new();
        let result = substitute("/session/:sessionId", &params);
        assert!(matches!(result, Err(Error::Protocol(_))));
    }

    #[test]
    fn test_register_new_command() {
        let mut registry = CommandRegistry::standard();
        registry
            .register(
                "sendCommandAndGetResult",
                CommandDescriptor::new(
                    Verb::Post,
                    "/session/:sessionId/chromium/send_command_and_get_result",
                ),
            )
            .unwrap();

        let descriptor = registry.get("sendCommandAndGetResult").unwrap();
        assert_eq!(descriptor.verb, Verb::Post);
    }

    #[test]
    fn test_register_duplicate_fails_fast() {
        let mut registry = CommandRegistry::standard();
        let descriptor = CommandDescriptor::new(Verb::Post, "/session/:sessionId/vendor");

        registry.register("vendorCommand", descriptor).unwrap();
        let second = registry.register("vendorCommand", descriptor);

        assert!(matches!(
            second,
            Err(Error::CommandRedefined { name }) if name == "vendorCommand"
        ));
    }

    #[test]
    fn test_register_standard_name_fails() {
        let mut registry = CommandRegistry::standard();
        let result = registry.register(
            names::FIND_ELEMENT,
            CommandDescriptor::new(Verb::Post, "/session/:sessionId/element"),
        );
        assert!(matches!(result, Err(Error::CommandRedefined { .. })));
    }

    #[test]
    fn test_unknown_command_lookup_fails() {
        let registry = CommandRegistry::standard();
        assert!(matches!(
            registry.get("noSuchCommand"),
            Err(Error::Protocol(_))
        ));
    }
}
