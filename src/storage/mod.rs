// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Scratch storage for images awaiting inference
//!
//! Every upload or capture gets its own uniquely named file, removed when
//! the owning [`ScratchFile`] is dropped.

pub mod scratch;

pub use scratch::{ScratchDir, ScratchFile, StorageError};
