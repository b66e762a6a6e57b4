// Element and shadow-root references
//
// The remote end hands back opaque references rather than nodes. W3C spells
// the two reference kinds with distinct object keys, and the kind decides
// which scoped-find route applies. Script results may carry either kind:
// modern chromedriver returns shadow roots from `executeScript` with the
// shadow key, Selenium-3-era stacks returned plain element references.

use serde_json::{Value, json};

use crate::error::{Error, Result};

/// W3C object key identifying an element reference.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// W3C object key identifying a shadow-root reference.
pub const SHADOW_ROOT_KEY: &str = "shadow-6066-11e4-a52e-4f735466cecf";

/// Which kind of remote reference a handle holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Node,
    ShadowRoot,
}

/// Reference to a node or shadow root held by the remote end.
///
/// Handles are only valid for the session and document they came from; a
/// navigation invalidates them on the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    kind: HandleKind,
    id: String,
}

impl ElementHandle {
    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Parses a handle out of a WebDriver value.
    ///
    /// Returns `Ok(None)` for JSON null, the remote end's way of saying
    /// "no such reference" from script returns (a withheld shadow root, a
    /// host with no shadow root at all).
    pub fn from_value(value: &Value) -> Result<Option<Self>> {
        if value.is_null() {
            return Ok(None);
        }

        let object = value
            .as_object()
            .ok_or_else(|| Error::Protocol(format!("expected an element reference, got {value}")))?;

        if let Some(id) = object.get(ELEMENT_KEY).and_then(Value::as_str) {
            return Ok(Some(Self {
                kind: HandleKind::Node,
                id: id.to_string(),
            }));
        }

        if let Some(id) = object.get(SHADOW_ROOT_KEY).and_then(Value::as_str) {
            return Ok(Some(Self {
                kind: HandleKind::ShadowRoot,
                id: id.to_string(),
            }));
        }

        Err(Error::Protocol(format!(
            "object carries neither element nor shadow-root key: {value}"
        )))
    }

    /// Serializes the handle for use as a script argument.
    pub fn to_value(&self) -> Value {
        match self.kind {
            HandleKind::Node => json!({ ELEMENT_KEY: self.id }),
            HandleKind::ShadowRoot => json!({ SHADOW_ROOT_KEY: self.id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_element_reference() {
        let value = json!({ ELEMENT_KEY: "node-7" });
        let handle = ElementHandle::from_value(&value).unwrap().unwrap();
        assert_eq!(handle.kind(), HandleKind::Node);
        assert_eq!(handle.id(), "node-7");
    }

    #[test]
    fn test_parse_shadow_root_reference() {
        let value = json!({ SHADOW_ROOT_KEY: "shadow-3" });
        let handle = ElementHandle::from_value(&value).unwrap().unwrap();
        assert_eq!(handle.kind(), HandleKind::ShadowRoot);
        assert_eq!(handle.id(), "shadow-3");
    }

    #[test]
    fn test_parse_null_is_none() {
        assert_eq!(ElementHandle::from_value(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_parse_other_object_fails() {
        let value = json!({ "status": "ok" });
        assert!(matches!(
            ElementHandle::from_value(&value),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn test_parse_scalar_fails() {
        assert!(matches!(
            ElementHandle::from_value(&json!(42)),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn test_round_trip_to_value() {
        let value = json!({ ELEMENT_KEY: "node-1" });
        let handle = ElementHandle::from_value(&value).unwrap().unwrap();
        assert_eq!(handle.to_value(), value);
    }
}
