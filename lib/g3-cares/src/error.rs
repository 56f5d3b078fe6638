/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use crate::EngineStatus;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("invalid server {0}: {1}")]
    InvalidServer(String, &'static str),
    #[error("invalid sortlist rule {0}: {1}")]
    InvalidSortRule(String, &'static str),
    #[error("invalid search domain {0:?}")]
    InvalidDomain(String),
    #[error("invalid lookups string {0:?}, only 'b' and 'f' are allowed")]
    InvalidLookups(String),
    #[error("invalid path {0:?}")]
    InvalidPath(String),
    #[error("value of {0} is out of range")]
    OutOfRange(&'static str),
    #[error("option mask {0:#x} can not be set at init time")]
    UnsupportedMask(i32),
    #[error("option mask {0:#x} is set without a value")]
    MissingValue(i32),
    #[error("conflict options: {0}")]
    Conflict(&'static str),
    #[error("failed to allocate native options")]
    AllocationFailed,
}

impl ConfigurationError {
    pub fn get_type(&self) -> &str {
        match self {
            ConfigurationError::InvalidServer(_, _) => "InvalidServer",
            ConfigurationError::InvalidSortRule(_, _) => "InvalidSortRule",
            ConfigurationError::InvalidDomain(_) => "InvalidDomain",
            ConfigurationError::InvalidLookups(_) => "InvalidLookups",
            ConfigurationError::InvalidPath(_) => "InvalidPath",
            ConfigurationError::OutOfRange(_) => "OutOfRange",
            ConfigurationError::UnsupportedMask(_) => "UnsupportedMask",
            ConfigurationError::MissingValue(_) => "MissingValue",
            ConfigurationError::Conflict(_) => "Conflict",
            ConfigurationError::AllocationFailed => "AllocationFailed",
        }
    }
}

/// The engine call that failed while bringing up a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitStage {
    Library,
    Channel,
}

impl InitStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitStage::Library => "library init",
            InitStage::Channel => "channel init",
        }
    }
}

/// The post init directive that the engine rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigDirective {
    Servers,
    SortList,
}

impl ConfigDirective {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigDirective::Servers => "servers",
            ConfigDirective::SortList => "sortlist",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AresChannelError {
    #[error("{} failed: {code}", .stage.as_str())]
    EngineInit { stage: InitStage, code: EngineStatus },
    #[error("failed to set {}: {code}", .directive.as_str())]
    EngineConfig {
        directive: ConfigDirective,
        code: EngineStatus,
    },
}

impl AresChannelError {
    pub fn get_type(&self) -> &str {
        match self {
            AresChannelError::EngineInit { .. } => "EngineInitError",
            AresChannelError::EngineConfig { .. } => "EngineConfigError",
        }
    }

    pub fn code(&self) -> EngineStatus {
        match self {
            AresChannelError::EngineInit { code, .. } => *code,
            AresChannelError::EngineConfig { code, .. } => *code,
        }
    }
}
