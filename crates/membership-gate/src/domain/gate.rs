//! Membership gate
//!
//! Owns the live (filter, config) pair behind one read-write lock. Readers
//! take the shared lock, so they never observe half of an `add` or a
//! half-swapped rebuild. `rebuild` populates the replacement filter before
//! taking the exclusive lock; the lock is held only for the swap.
//!
//! Insertions recorded while a rebuild is being populated are journaled and
//! replayed into the replacement filter at swap time, so a key committed
//! after the store was enumerated is not lost from the new filter. Every
//! rebuild handle owns its own journal, so overlapping rebuilds never
//! steal or clear each other's entries.

use parking_lot::RwLock;
use std::time::Instant;
use tracing::{debug, info};

use super::bloom_filter::BloomFilter;
use super::config::{FilterConfig, GateConfig};
use super::key::NormalizedKey;
use super::parameters::compute_dimensions;
use crate::error::GateError;

struct GateState {
    filter: BloomFilter,
    config: FilterConfig,
    /// Keys recorded since each running rebuild started, by journal id
    journals: Vec<(u64, Vec<NormalizedKey>)>,
    next_journal_id: u64,
}

/// Shared probabilistic pre-filter in front of the authoritative store.
pub struct MembershipGate {
    state: RwLock<GateState>,
    sizing: GateConfig,
}

impl MembershipGate {
    /// Build a gate from a full key enumeration.
    ///
    /// `total_count` is the store's count and seeds `current_items`.
    pub fn build<I, S>(all_keys: I, total_count: usize, sizing: GateConfig) -> Result<Self, GateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        sizing.validate()?;
        let (filter, config) = populate(all_keys, total_count, sizing.target_fpp, &sizing, 1)?;

        info!(
            bits = config.bits,
            hash_count = config.hash_count,
            expected_capacity = config.expected_capacity,
            current_items = config.current_items,
            "Membership gate built"
        );

        Ok(Self {
            state: RwLock::new(GateState {
                filter,
                config,
                journals: Vec::new(),
                next_journal_id: 0,
            }),
            sizing,
        })
    }

    /// `false` means the key is definitely absent; `true` means maybe present.
    pub fn probably_contains(&self, key: &NormalizedKey) -> bool {
        self.state.read().filter.test(key)
    }

    /// Record one successful authoritative insertion.
    ///
    /// Sets the key's bits and increments `current_items` under the exclusive
    /// lock. Call exactly once per committed insert, never for a failed one.
    pub fn record_insertion(&self, key: &NormalizedKey) {
        let mut state = self.state.write();
        state.filter.add(key);
        state.config.current_items += 1;
        for (_, journal) in state.journals.iter_mut() {
            journal.push(key.clone());
        }
    }

    /// Rebuild from a fresh key enumeration and atomically swap it in.
    ///
    /// Capacity is `max(total_count * multiplier, minimum_capacity)`. On error
    /// the live filter is left untouched.
    pub fn rebuild<I, S>(
        &self,
        all_keys: I,
        total_count: usize,
        target_fpp: f64,
    ) -> Result<FilterConfig, GateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.start_rebuild().finish(all_keys, total_count, target_fpp)
    }

    /// Begin journaling insertions for a rebuild whose keys are about to be
    /// read from the store.
    ///
    /// Start the journal *before* enumerating the store. Dropping the
    /// returned handle without finishing discards the journal.
    pub fn start_rebuild(&self) -> RebuildJournal<'_> {
        let mut state = self.state.write();
        let id = state.next_journal_id;
        state.next_journal_id += 1;
        state.journals.push((id, Vec::new()));
        RebuildJournal { gate: self, id }
    }

    /// Snapshot of the live filter configuration.
    pub fn stats(&self) -> FilterConfig {
        self.state.read().config.clone()
    }

    /// Whether the item counter has reached the configured saturation point.
    pub fn needs_rebuild(&self) -> bool {
        self.state
            .read()
            .config
            .is_saturated(self.sizing.saturation_ratio)
    }

    /// Fraction of filter bits currently set.
    pub fn fill_ratio(&self) -> f64 {
        self.state.read().filter.fill_ratio()
    }

    pub fn sizing(&self) -> &GateConfig {
        &self.sizing
    }
}

/// Handle for an in-progress rebuild; see [`MembershipGate::start_rebuild`].
pub struct RebuildJournal<'a> {
    gate: &'a MembershipGate,
    id: u64,
}

impl RebuildJournal<'_> {
    /// Populate a replacement filter off to the side, then swap it in.
    pub fn finish<I, S>(
        self,
        all_keys: I,
        total_count: usize,
        target_fpp: f64,
    ) -> Result<FilterConfig, GateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let started = Instant::now();
        let (mut filter, mut config) =
            populate(all_keys, total_count, target_fpp, &self.gate.sizing, 0)?;

        let previous = {
            let mut state = self.gate.state.write();
            let journal = take_journal(&mut state, self.id).unwrap_or_default();
            for key in &journal {
                filter.add(key);
            }
            // Journaled keys may already be in the enumeration; the counter
            // is an upper bound until the next rebuild.
            config.current_items += journal.len() as u64;
            debug!(replayed = journal.len(), "Replayed insertions recorded during rebuild");
            // Assigned under the lock so concurrent rebuilds never share one
            config.generation = state.config.generation + 1;

            let previous = std::mem::replace(&mut state.config, config.clone());
            state.filter = filter;
            previous
        };

        info!(
            old_bits = previous.bits,
            new_bits = config.bits,
            hash_count = config.hash_count,
            current_items = config.current_items,
            generation = config.generation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Membership gate rebuilt"
        );

        Ok(config)
    }
}

impl Drop for RebuildJournal<'_> {
    fn drop(&mut self) {
        // No-op after `finish`, which already took this journal
        take_journal(&mut self.gate.state.write(), self.id);
    }
}

/// Remove and return the journal owned by `id`, leaving the others in place.
fn take_journal(state: &mut GateState, id: u64) -> Option<Vec<NormalizedKey>> {
    let index = state.journals.iter().position(|(owner, _)| *owner == id)?;
    Some(state.journals.swap_remove(index).1)
}

/// Size and fill a fresh filter.
fn populate<I, S>(
    all_keys: I,
    total_count: usize,
    target_fpp: f64,
    sizing: &GateConfig,
    generation: u64,
) -> Result<(BloomFilter, FilterConfig), GateError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let expected_capacity = sizing.expected_capacity(total_count);
    let dimensions = compute_dimensions(expected_capacity, target_fpp)?;

    let mut filter = BloomFilter::new(dimensions);
    for raw in all_keys {
        filter.add(&NormalizedKey::new(raw.as_ref()));
    }

    let config = FilterConfig::new(
        expected_capacity,
        target_fpp,
        dimensions,
        total_count as u64,
        generation,
    );
    Ok((filter, config))
}
