/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use crate::{AresOptionMask, EngineStatus, NativeOptions};

#[cfg(feature = "c-ares")]
mod native;
#[cfg(feature = "c-ares")]
pub use native::{CAresChannel, CAresEngine};

/// The narrow contract of the native resolution engine.
///
/// Every call on a `Channel` must be serialized by the caller, the engine
/// itself is not safe for concurrent use of one channel.
pub trait AresEngine: Send + Sync {
    type Channel: Send;

    /// Process level engine init, must be paired with `library_cleanup`.
    fn library_init(&self) -> Result<(), EngineStatus>;
    fn library_cleanup(&self);

    fn init_channel(
        &self,
        options: &NativeOptions,
        mask: AresOptionMask,
    ) -> Result<Self::Channel, EngineStatus>;

    /// Apply the csv server directive to a live channel.
    fn set_servers_csv(
        &self,
        channel: &mut Self::Channel,
        servers: &str,
    ) -> Result<(), EngineStatus>;
    /// Apply the space separated sort list directive to a live channel.
    fn set_sortlist(
        &self,
        channel: &mut Self::Channel,
        sortlist: &str,
    ) -> Result<(), EngineStatus>;

    fn destroy_channel(&self, channel: Self::Channel);
}
