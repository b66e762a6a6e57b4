// Browser session lifecycle and element access
//
// One Session owns one browser session end to end: it starts (or connects
// to) the remote end, creates the W3C session, optionally installs the
// shadow override before navigation, navigates, and guarantees teardown.
//
// Mutating operations take &mut self, so a session cannot be driven from
// two call sites at once.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::{Value, json};
use url::Url;

use crate::error::{Error, Result};
use crate::inject::ScriptInjector;
use crate::protocol::commands::names;
use crate::protocol::element::{ElementHandle, HandleKind};
use crate::server::chromedriver::ChromeDriver;
use crate::server::connection::Connection;

/// Default bounded-wait timeout for element presence.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default interval between presence polls.
///
/// Polling much faster saturates the remote end for no gain; the driver
/// round-trip already costs tens of milliseconds.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Where the WebDriver remote end comes from.
#[derive(Debug, Clone)]
pub enum Endpoint {
    /// Launch a managed chromedriver process.
    Launch,
    /// Use an already-running WebDriver implementation.
    Remote(Url),
}

/// Options for [`Session::open`].
///
/// # Example
///
/// ```ignore
/// let options = SessionOptions::new(Url::parse("http://localhost:8080/")?)
///     .headless(false)
///     .wait_timeout(Duration::from_secs(30))
///     .shadow_override(true);
/// let session = Session::open(options).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SessionOptions {
    target: Url,
    endpoint: Endpoint,
    wait_timeout: Duration,
    poll_interval: Duration,
    headless: bool,
    args: Vec<String>,
    shadow_override: bool,
}

impl SessionOptions {
    /// Creates options for a managed chromedriver session against `target`.
    pub fn new(target: Url) -> Self {
        Self {
            target,
            endpoint: Endpoint::Launch,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            headless: true,
            args: Vec::new(),
            shadow_override: false,
        }
    }

    /// Selects the remote end (managed launch vs existing endpoint).
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Timeout for [`Session::wait_for_present`] when none is passed.
    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Interval between presence polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Run the browser headless (default: true).
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Additional Chrome arguments.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Install the attachShadow override before navigation.
    pub fn shadow_override(mut self, install: bool) -> Self {
        self.shadow_override = install;
        self
    }

    fn capabilities(&self) -> Value {
        let mut args = self.args.clone();
        if self.headless {
            args.push("--headless=new".to_string());
        }

        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }
}

/// An exclusively-owned browser session.
///
/// Created by [`Session::open`], destroyed by [`Session::close`]. Dropping
/// a session without closing it kills a managed driver process (the child
/// is spawned with kill-on-drop) but skips the session-delete round-trip;
/// tests should close explicitly on their success paths.
#[derive(Debug)]
pub struct Session {
    connection: Connection,
    id: String,
    driver: Option<ChromeDriver>,
    wait_timeout: Duration,
    poll_interval: Duration,
    navigated: bool,
}

impl Session {
    /// Opens a session: start (or connect to) the remote end, create the
    /// W3C session, install the shadow override if requested, navigate to
    /// the target, maximize the window.
    ///
    /// The override installation happens strictly before navigation; an
    /// installation failure aborts the open (and tears the session down)
    /// rather than navigating with an unverified override state.
    pub async fn open(options: SessionOptions) -> Result<Self> {
        let (base, driver) = match &options.endpoint {
            Endpoint::Launch => {
                let driver = ChromeDriver::launch().await?;
                (driver.url().clone(), Some(driver))
            }
            Endpoint::Remote(url) => (url.clone(), None),
        };

        let connection = Connection::new(base);

        let value = connection
            .execute(names::NEW_SESSION, &HashMap::new(), Some(&options.capabilities()))
            .await
            .map_err(|e| Error::SessionStart(format!("create session: {e}")))?;

        let id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::SessionStart("no sessionId in response".to_string()))?
            .to_string();

        tracing::info!(session = %id, "session created");

        let mut session = Self {
            connection,
            id,
            driver,
            wait_timeout: options.wait_timeout,
            poll_interval: options.poll_interval,
            navigated: false,
        };

        if options.shadow_override {
            if let Err(e) = ScriptInjector::install(&mut session).await {
                return Err(session.abort(e).await);
            }
        }

        if let Err(e) = session.goto(options.target.as_str()).await {
            let cause = Error::SessionStart(format!("navigation to {} failed: {e}", options.target));
            return Err(session.abort(cause).await);
        }

        // Cosmetic; a geometry failure must not fail the probes.
        if let Err(e) = session.maximize().await {
            tracing::warn!(error = %e, "window maximize failed");
        }

        Ok(session)
    }

    /// W3C session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether this session has navigated at least once.
    pub fn has_navigated(&self) -> bool {
        self.navigated
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.connection
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Connection {
        &mut self.connection
    }

    /// Navigates the session to `url`.
    pub async fn goto(&mut self, url: &str) -> Result<()> {
        tracing::debug!(session = %self.id, url, "navigating");

        self.connection
            .execute(names::NAVIGATE_TO, &self.path(), Some(&json!({ "url": url })))
            .await?;

        self.navigated = true;
        Ok(())
    }

    /// Maximizes the browser window.
    pub async fn maximize(&mut self) -> Result<()> {
        self.connection
            .execute(names::MAXIMIZE_WINDOW, &self.path(), None)
            .await?;
        Ok(())
    }

    /// Finds one element in the light DOM by CSS selector.
    pub async fn find_element(&self, selector: &str) -> Result<ElementHandle> {
        let value = self
            .connection
            .execute(
                names::FIND_ELEMENT,
                &self.path(),
                Some(&locator_body(selector)),
            )
            .await
            .map_err(|e| carry_selector(e, selector))?;

        require_handle(&value, selector)
    }

    /// Finds one element scoped to `scope`, an element or a shadow root.
    ///
    /// The handle kind picks the route: element-scoped finds and
    /// shadow-root-scoped finds are distinct endpoints on the remote end.
    pub async fn find_element_within(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> Result<ElementHandle> {
        let (command, param) = match scope.kind() {
            HandleKind::Node => (names::FIND_ELEMENT_FROM_ELEMENT, "elementId"),
            HandleKind::ShadowRoot => (names::FIND_ELEMENT_FROM_SHADOW_ROOT, "shadowId"),
        };

        let mut path = self.path();
        path.insert(param, scope.id());

        let value = self
            .connection
            .execute(command, &path, Some(&locator_body(selector)))
            .await
            .map_err(|e| carry_selector(e, selector))?;

        require_handle(&value, selector)
    }

    /// Polls until an element matching `selector` is present in the light
    /// DOM, or fails with [`Error::Timeout`] once the timeout elapses.
    ///
    /// A lookup that misses keeps polling; any other lookup error fails
    /// immediately. `timeout` defaults to the session's configured wait
    /// timeout.
    pub async fn wait_for_present(
        &self,
        selector: &str,
        timeout: Option<Duration>,
    ) -> Result<ElementHandle> {
        let timeout = timeout.unwrap_or(self.wait_timeout);
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            match self.find_element(selector).await {
                Ok(element) => return Ok(element),
                Err(Error::ElementNotFound { .. }) => {}
                Err(other) => return Err(other),
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(Error::Timeout {
                    what: format!("element '{selector}'"),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Clicks an element.
    pub async fn click(&self, element: &ElementHandle) -> Result<()> {
        let mut path = self.path();
        path.insert("elementId", element.id());

        self.connection
            .execute(names::ELEMENT_CLICK, &path, None)
            .await?;
        Ok(())
    }

    /// Reads an element's rendered text.
    pub async fn text(&self, element: &ElementHandle) -> Result<String> {
        let mut path = self.path();
        path.insert("elementId", element.id());

        let value = self
            .connection
            .execute(names::GET_ELEMENT_TEXT, &path, None)
            .await?;

        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Protocol(format!("element text is not a string: {value}")))
    }

    /// Executes a synchronous script in the page, with element-handle
    /// arguments serialized into `arguments[..]`.
    pub async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.connection
            .execute(
                names::EXECUTE_SCRIPT,
                &self.path(),
                Some(&json!({ "script": script, "args": args })),
            )
            .await
    }

    /// Deletes the remote session and stops a managed driver process.
    ///
    /// Invoked on every exit path: explicitly here on completion, through
    /// [`Session::open`]'s abort on start failures, and (for the process
    /// only) by kill-on-drop when a test panics mid-probe.
    pub async fn close(mut self) -> Result<()> {
        tracing::debug!(session = %self.id, "closing session");

        let deleted = self
            .connection
            .execute(names::DELETE_SESSION, &self.path(), None)
            .await
            .map(|_| ())
            .map_err(|e| Error::SessionTeardown(format!("delete session: {e}")));

        if let Some(driver) = self.driver.take() {
            driver.shutdown().await?;
        }

        deleted
    }

    async fn abort(self, cause: Error) -> Error {
        if let Err(teardown) = self.close().await {
            tracing::warn!(error = %teardown, "teardown after failed open also failed");
        }
        cause
    }

    fn path(&self) -> HashMap<&str, &str> {
        HashMap::from([("sessionId", self.id.as_str())])
    }
}

fn locator_body(selector: &str) -> Value {
    json!({ "using": "css selector", "value": selector })
}

/// Rewrites a not-found error to name the selector the caller used; the
/// remote end's message is a stacktrace-laden paragraph.
fn carry_selector(error: Error, selector: &str) -> Error {
    match error {
        Error::ElementNotFound { .. } => Error::ElementNotFound {
            selector: selector.to_string(),
        },
        other => other,
    }
}

fn require_handle(value: &Value, selector: &str) -> Result<ElementHandle> {
    ElementHandle::from_value(value)?.ok_or_else(|| {
        Error::Protocol(format!("find for '{selector}' returned no element reference"))
    })
}
