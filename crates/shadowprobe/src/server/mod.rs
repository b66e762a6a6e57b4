//! Remote-end management (internal)
//!
//! This module handles chromedriver discovery, the driver process
//! lifecycle, and the HTTP connection commands travel over.
//!
//! **Note**: This module is exposed publicly only for integration testing
//! purposes. The types and APIs in this module are considered internal
//! implementation details and may change without notice.

#[doc(hidden)]
pub mod chromedriver;
#[doc(hidden)]
pub mod connection;
#[doc(hidden)]
pub mod driver;
