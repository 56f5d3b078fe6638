/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use crate::engine::AresEngine;
use crate::{AresChannelError, AresOptions, ConfigDirective, InitStage};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    Ready,
    Destroyed,
}

/// Pairs one successful library init with exactly one cleanup.
struct LibraryGuard<E: AresEngine> {
    engine: Arc<E>,
}

impl<E: AresEngine> LibraryGuard<E> {
    fn init(engine: Arc<E>) -> Result<Self, AresChannelError> {
        engine
            .library_init()
            .map_err(|code| AresChannelError::EngineInit {
                stage: InitStage::Library,
                code,
            })?;
        Ok(LibraryGuard { engine })
    }
}

impl<E: AresEngine> Drop for LibraryGuard<E> {
    fn drop(&mut self) {
        self.engine.library_cleanup();
    }
}

/// A native resolution channel with serialized access.
///
/// The channel is created together with its own library init, and is torn
/// down exactly once, either by [`AresChannel::close`] or when dropped.
/// The library cleanup always happens on drop, after the channel destroy.
pub struct AresChannel<E: AresEngine> {
    // declared before `library` so it is dropped first
    slot: Mutex<Option<E::Channel>>,
    library: LibraryGuard<E>,
}

impl<E: AresEngine> AresChannel<E> {
    pub fn new(engine: Arc<E>, options: &AresOptions) -> Result<Self, AresChannelError> {
        let library = LibraryGuard::init(engine)?;
        let engine = &library.engine;

        let mut channel = engine
            .init_channel(options.native(), options.option_mask())
            .map_err(|code| {
                warn!("failed to init c-ares channel: {code}");
                AresChannelError::EngineInit {
                    stage: InitStage::Channel,
                    code,
                }
            })?;

        if let Err(e) = Self::configure(engine, &mut channel, options) {
            warn!("failed to configure c-ares channel: {e}");
            engine.destroy_channel(channel);
            return Err(e);
        }

        debug!(
            "c-ares channel created with option mask {:#x}",
            options.option_mask().bits()
        );
        Ok(AresChannel {
            slot: Mutex::new(Some(channel)),
            library,
        })
    }

    fn configure(
        engine: &E,
        channel: &mut E::Channel,
        options: &AresOptions,
    ) -> Result<(), AresChannelError> {
        if let Some(servers) = options.servers_directive() {
            engine
                .set_servers_csv(channel, &servers)
                .map_err(|code| AresChannelError::EngineConfig {
                    directive: ConfigDirective::Servers,
                    code,
                })?;
        }

        if let Some(sortlist) = options.sortlist_directive() {
            engine
                .set_sortlist(channel, &sortlist)
                .map_err(|code| AresChannelError::EngineConfig {
                    directive: ConfigDirective::SortList,
                    code,
                })?;
        }

        Ok(())
    }

    // a panic inside `with_channel` leaves the channel itself untouched
    fn lock_slot(&self) -> MutexGuard<'_, Option<E::Channel>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the live channel.
    ///
    /// Concurrent callers are blocked until the running one returns. Keep
    /// `f` short, e.g. submit one query and return.
    ///
    /// # Panics
    ///
    /// Panics if the channel has already been closed, which means the caller
    /// kept using it past its lifetime.
    pub fn with_channel<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut E::Channel) -> R,
    {
        let mut slot = self.lock_slot();
        let Some(channel) = slot.as_mut() else {
            panic!("c-ares channel is used after destroyed");
        };
        f(channel)
    }

    pub fn state(&self) -> ChannelState {
        let slot = self.lock_slot();
        if slot.is_some() {
            ChannelState::Ready
        } else {
            ChannelState::Destroyed
        }
    }

    /// Destroy the channel before drop.
    ///
    /// Waits for the running `with_channel` call, if any. Calling it more
    /// than once is a no-op.
    pub fn close(&self) {
        let mut slot = self.lock_slot();
        if let Some(channel) = slot.take() {
            self.library.engine.destroy_channel(channel);
            debug!("c-ares channel closed");
        }
    }
}

impl<E: AresEngine> Drop for AresChannel<E> {
    fn drop(&mut self) {
        let slot = self.slot.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(channel) = slot.take() {
            self.library.engine.destroy_channel(channel);
            debug!("c-ares channel destroyed");
        }
    }
}

impl<E: AresEngine> fmt::Debug for AresChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AresChannel").finish_non_exhaustive()
    }
}

#[cfg(feature = "c-ares")]
impl AresChannel<crate::engine::CAresEngine> {
    /// Create a channel on the linked c-ares library.
    pub fn with_options(options: &AresOptions) -> Result<Self, AresChannelError> {
        AresChannel::new(Arc::new(crate::engine::CAresEngine), options)
    }
}
