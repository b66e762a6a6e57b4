// Copyright 2024 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Protocol vocabulary and objects
//
// The wire-level pieces of the harness: the command vocabulary with its
// vendor extension point, element/shadow-root references, and the session
// object that drives them.

pub mod commands;
pub mod element;
pub mod session;

pub use commands::{CommandDescriptor, CommandRegistry, Verb};
pub use element::{ElementHandle, HandleKind};
pub use session::{Endpoint, Session, SessionOptions};
