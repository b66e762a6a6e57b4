// Copyright 2024 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Shadow-boundary probes
//
// The target page hosts three custom elements, each attaching its markup at
// a different exposure level. Each probe answers one reachability question
// and terminates in exactly one outcome; "not found" and "no root" are
// first-class results, not harness failures. Several probes exist to
// assert them.

use crate::error::{Error, Result};
use crate::protocol::element::ElementHandle;
use crate::protocol::session::Session;

/// Exposure level a custom element requested for its subtree.
///
/// Fixed per element at creation time by the page; the harness never
/// mutates it. The pre-navigation override only changes whether the
/// page's creation call is allowed to honor `closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowMode {
    /// No shadow root; children are direct light-DOM descendants.
    None,
    /// Root handle obtainable via script, children queryable through it.
    Open,
    /// Root handle withheld from script; children unreachable unless the
    /// creation call itself was intercepted.
    Closed,
}

impl ShadowMode {
    /// Attribute spelling the page uses.
    pub fn as_attr(&self) -> &'static str {
        match self {
            ShadowMode::None => "none",
            ShadowMode::Open => "open",
            ShadowMode::Closed => "closed",
        }
    }

    /// How the page describes the mode in its click text.
    pub fn description(&self) -> &'static str {
        match self {
            ShadowMode::None => "no shadow-dom",
            ShadowMode::Open => "open shadow-dom",
            ShadowMode::Closed => "closed shadow-dom",
        }
    }
}

/// Terminal outcome of one reachability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// The element was reached and clicked; carries the text it reported.
    Selected(String),
    /// A direct or scoped query matched nothing.
    NotFound,
    /// The subtree root was not obtainable via script.
    RootUnavailable,
}

/// Ids the target page guarantees.
pub mod page {
    pub const LIGHT_HOST: &str = "custom-button-one";
    pub const LIGHT_BUTTON: &str = "button-one";
    pub const OPEN_HOST: &str = "custom-button-two";
    pub const OPEN_BUTTON: &str = "button-two";
    pub const CLOSED_HOST: &str = "custom-button-three";
    pub const CLOSED_BUTTON: &str = "button-three";
}

/// Click text the page reports for `button_id` under `mode`.
///
/// The page builds this string from the mode it *requested*, so a closed
/// subtree demoted to open by the override still reports "closed
/// shadow-dom".
pub fn selected_text(button_id: &str, mode: ShadowMode) -> String {
    format!("id={button_id}, {}: selected!", mode.description())
}

const SHADOW_ROOT_SCRIPT: &str = "return arguments[0].shadowRoot";

/// Script-based root lookup on a host element.
///
/// `None` when the page withholds the root: a closed boundary, or a host
/// with no shadow root at all.
pub async fn shadow_root(
    session: &Session,
    host: &ElementHandle,
) -> Result<Option<ElementHandle>> {
    let value = session
        .execute_script(SHADOW_ROOT_SCRIPT, vec![host.to_value()])
        .await?;

    ElementHandle::from_value(&value)
}

/// Probes the light-DOM subtree: locate its button directly, click it,
/// read the reported text.
pub async fn probe_light_subtree(session: &Session) -> Result<ProbeResult> {
    session
        .wait_for_present(&css_id(page::LIGHT_HOST), None)
        .await?;

    let button = match session.find_element(&css_id(page::LIGHT_BUTTON)).await {
        Ok(button) => button,
        Err(Error::ElementNotFound { .. }) => return Ok(ProbeResult::NotFound),
        Err(other) => return Err(other),
    };

    click_and_report(session, &button).await
}

/// Probes the open subtree with a direct query, not through its root.
///
/// Standard queries never cross a shadow boundary regardless of openness,
/// so the expected outcome is [`ProbeResult::NotFound`].
pub async fn probe_open_subtree_direct(session: &Session) -> Result<ProbeResult> {
    session
        .wait_for_present(&css_id(page::OPEN_HOST), None)
        .await?;

    match session.find_element(&css_id(page::OPEN_BUTTON)).await {
        Ok(button) => click_and_report(session, &button).await,
        Err(Error::ElementNotFound { .. }) => Ok(ProbeResult::NotFound),
        Err(other) => Err(other),
    }
}

/// Probes the open subtree through its script-obtained root handle.
pub async fn probe_open_subtree_via_root(session: &Session) -> Result<ProbeResult> {
    probe_via_root(session, page::OPEN_HOST, page::OPEN_BUTTON).await
}

/// Probes the closed subtree through a script-based root lookup.
///
/// Without the override the root is withheld
/// ([`ProbeResult::RootUnavailable`]); with the override installed before
/// navigation the creation call was forced open and the button is
/// reachable.
pub async fn probe_closed_subtree_via_root(session: &Session) -> Result<ProbeResult> {
    probe_via_root(session, page::CLOSED_HOST, page::CLOSED_BUTTON).await
}

async fn probe_via_root(
    session: &Session,
    host_id: &str,
    button_id: &str,
) -> Result<ProbeResult> {
    let host = session.wait_for_present(&css_id(host_id), None).await?;

    let Some(root) = shadow_root(session, &host).await? else {
        return Ok(ProbeResult::RootUnavailable);
    };

    let button = match session
        .find_element_within(&root, &css_id(button_id))
        .await
    {
        Ok(button) => button,
        Err(Error::ElementNotFound { .. }) => return Ok(ProbeResult::NotFound),
        Err(other) => return Err(other),
    };

    click_and_report(session, &button).await
}

async fn click_and_report(session: &Session, button: &ElementHandle) -> Result<ProbeResult> {
    session.click(button).await?;
    let text = session.text(button).await?;
    Ok(ProbeResult::Selected(text))
}

fn css_id(id: &str) -> String {
    format!("#{id}")
}
