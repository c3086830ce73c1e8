// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! elegantmc-mc: the Minecraft child-process supervisor. Owns the set of
//! managed server instances, chooses a Java runtime per jar, spawns and
//! streams each process, and enforces graceful shutdown.

pub mod error;
pub mod jar;
pub mod java;
pub mod supervisor;

pub use error::McError;
pub use jar::{classfile_major_to_java_major, required_java_major};
pub use java::{select as select_java, JavaCandidate};
pub use supervisor::{LogSink, StartArgs, Supervisor};
