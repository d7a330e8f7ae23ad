// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Live-block registry.
//!
//! Tracks every block currently out on loan, keyed by payload address.
//! The registry backs leak reporting and end-of-life reclamation; the
//! allocation hot path still reads sizes from block headers, so this
//! table is never consulted to service a release.

use std::collections::BTreeMap;

/// Payload address → payload size for every live block.
///
/// A `BTreeMap` keeps enumeration in ascending address order, which gives
/// leak reports a stable, reproducible layout.
#[derive(Debug, Default)]
pub(crate) struct BlockRegistry {
    live: BTreeMap<usize, usize>,
}

impl BlockRegistry {
    pub(crate) fn insert(&mut self, address: usize, size: usize) {
        let previous = self.live.insert(address, size);
        debug_assert!(
            previous.is_none(),
            "two live blocks cannot share payload address {address:#x}"
        );
    }

    /// Removes a block, returning its payload size if it was live.
    pub(crate) fn remove(&mut self, address: usize) -> Option<usize> {
        self.live.remove(&address)
    }

    /// Iterates live blocks in ascending address order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.live.iter().map(|(&address, &size)| (address, size))
    }

    /// Empties the registry, handing ownership of the entries to the caller.
    pub(crate) fn drain_all(&mut self) -> BTreeMap<usize, usize> {
        std::mem::take(&mut self.live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove() {
        let mut registry = BlockRegistry::default();
        registry.insert(0x1000, 64);
        registry.insert(0x2000, 32);
        assert_eq!(registry.iter().count(), 2);

        assert_eq!(registry.remove(0x1000), Some(64));
        assert_eq!(registry.remove(0x1000), None);
        assert_eq!(registry.iter().count(), 1);
    }

    #[test]
    fn test_iter_is_address_ordered() {
        let mut registry = BlockRegistry::default();
        registry.insert(0x3000, 1);
        registry.insert(0x1000, 2);
        registry.insert(0x2000, 3);

        let order: Vec<usize> = registry.iter().map(|(address, _)| address).collect();
        assert_eq!(order, vec![0x1000, 0x2000, 0x3000]);
    }

    #[test]
    fn test_drain_all_empties() {
        let mut registry = BlockRegistry::default();
        registry.insert(0x1000, 8);
        registry.insert(0x2000, 16);

        let drained = registry.drain_all();
        assert_eq!(drained.len(), 2);
        assert!(registry.iter().next().is_none());
    }
}
