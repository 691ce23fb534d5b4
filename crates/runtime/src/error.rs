// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use rota_core::SchemaError;
use rota_storage::StoreError;
use thiserror::Error;

/// Errors surfaced by the scheduler runtime and reconciler.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("job store error: {0}")]
    Store(#[from] StoreError),
}
