// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lifecycle guard
//!
//! Decides whether a mutation is legal given the retrieval state of a store.
//! Every forbidding rule maps to its own [`ExecutionError`] so the operator
//! learns which job blocks the command.

use crate::config::Capabilities;
use crate::error::ExecutionError;
use crate::store::{OpenRetrievalStatus, PacketStore};

/// Mutation kinds subject to the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    /// Remove the store
    Delete,
    /// Change the capacity
    Resize,
    /// Switch between circular and bounded
    ChangeType,
    /// Change the downlink virtual channel
    ChangeVirtualChannel,
    /// Time-limited content deletion
    DeleteContent,
    /// Start a new by-time-range retrieval
    StartByTimeRangeRetrieval,
    /// Move the open-retrieval start tag
    ChangeOpenRetrievalStartTag,
    /// Resume open retrieval
    ResumeOpenRetrieval,
}

/// Check whether `mutation` may be applied to `store`.
pub fn check(
    store: &PacketStore,
    mutation: Mutation,
    capabilities: &Capabilities,
) -> Result<(), ExecutionError> {
    let open_in_progress = store.open_retrieval_status() == OpenRetrievalStatus::InProgress;
    let by_time_range_active = store.by_time_range_retrieval_status();

    match mutation {
        Mutation::Delete => {
            if store.storage_status() {
                return Err(ExecutionError::StorageStatusEnabled);
            }
            structural(open_in_progress, by_time_range_active)
        }
        Mutation::Resize
        | Mutation::ChangeType
        | Mutation::ChangeVirtualChannel
        | Mutation::DeleteContent => structural(open_in_progress, by_time_range_active),
        Mutation::StartByTimeRangeRetrieval => {
            if open_in_progress && !capabilities.concurrent_retrieval_requests {
                return Err(ExecutionError::OpenRetrievalInProgress);
            }
            if by_time_range_active {
                return Err(ExecutionError::ByTimeRangeRetrievalAlreadyEnabled);
            }
            Ok(())
        }
        Mutation::ChangeOpenRetrievalStartTag => {
            if open_in_progress {
                return Err(ExecutionError::OpenRetrievalInProgress);
            }
            Ok(())
        }
        Mutation::ResumeOpenRetrieval => {
            if by_time_range_active && !capabilities.concurrent_retrieval_requests {
                return Err(ExecutionError::ByTimeRangeRetrievalInProgress);
            }
            Ok(())
        }
    }
}

/// Predicate form of [`check`].
pub fn can_mutate(store: &PacketStore, mutation: Mutation, capabilities: &Capabilities) -> bool {
    check(store, mutation, capabilities).is_ok()
}

fn structural(open_in_progress: bool, by_time_range_active: bool) -> Result<(), ExecutionError> {
    if by_time_range_active {
        return Err(ExecutionError::ByTimeRangeRetrievalInProgress);
    }
    if open_in_progress {
        return Err(ExecutionError::OpenRetrievalInProgress);
    }
    Ok(())
}
