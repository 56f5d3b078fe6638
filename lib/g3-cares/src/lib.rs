/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod status;
pub use status::EngineStatus;

mod error;
pub use error::{AresChannelError, ConfigDirective, ConfigurationError, InitStage};

mod options;
pub use options::{AresFlags, AresOptionMask, AresOptions, AresOptionsBuilder, NativeOptions};

pub mod engine;
pub use engine::AresEngine;

mod channel;
pub use channel::{AresChannel, ChannelState};
