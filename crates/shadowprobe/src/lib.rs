//! shadowprobe: shadow-boundary reachability probes over WebDriver
//!
//! The harness answers, for a live page, whether a DOM subtree is reachable
//! through standard element queries, and whether a closed shadow root can
//! be defeated by overriding `Element.prototype.attachShadow` before any
//! page script runs.
//!
//! Two pieces cooperate:
//!
//! - A session manager ([`Session`]) that drives a chromedriver-backed
//!   browser through navigation and bounded-wait element lookup, and
//!   guarantees teardown on every exit path.
//! - A pre-navigation injector ([`ScriptInjector`]) that registers
//!   chromedriver's `send_command_and_get_result` vendor route as a
//!   first-class command and uses it to evaluate an override script in
//!   every new document, before the document's own scripts.
//!
//! # Example
//!
//! ```ignore
//! use shadowprobe::{ProbeResult, Session, SessionOptions, shadow};
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> shadowprobe::Result<()> {
//!     let target = Url::parse("http://localhost:8080/").unwrap();
//!
//!     // Without the override, the closed subtree withholds its root.
//!     let session = Session::open(SessionOptions::new(target.clone())).await?;
//!     assert_eq!(
//!         shadow::probe_closed_subtree_via_root(&session).await?,
//!         ProbeResult::RootUnavailable
//!     );
//!     session.close().await?;
//!
//!     // With it, the creation call is forced open before it runs.
//!     let session =
//!         Session::open(SessionOptions::new(target).shadow_override(true)).await?;
//!     assert!(matches!(
//!         shadow::probe_closed_subtree_via_root(&session).await?,
//!         ProbeResult::Selected(_)
//!     ));
//!     session.close().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod inject;
pub mod protocol;
pub mod server;
pub mod shadow;

pub use error::{Error, Result};
pub use inject::{OVERRIDE_SCRIPT, ScriptInjector};
pub use protocol::commands::{CommandDescriptor, CommandRegistry, Verb};
pub use protocol::element::{ElementHandle, HandleKind};
pub use protocol::session::{Endpoint, Session, SessionOptions};
pub use shadow::{ProbeResult, ShadowMode};
