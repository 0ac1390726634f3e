// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! An unpublished crate containing testing utilities for use within this repo.

mod log;
mod metrics;

pub use log::{LogCapture, LogCaptureWriter};
pub use metrics::MetricTester;
