//! Fragment reassembly with bounded pending state.
//!
//! Fragments of one message may arrive in any order. The reassembler keeps
//! a sparse index -> fragment map per message until the final fragment has
//! been seen and every index below it is present, then hands the fragments
//! back in order.
//!
//! Messages are keyed by endpoint and guid. A message that never completes
//! stays pending until it is evicted:
//! - by age, through [`Reassembler::evict_expired`]
//! - by capacity, when a new message would exceed `max_pending`
//!
//! Not thread-safe; one reassembler belongs to one messenger.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use textwire_frame::FragmentHeader;
use tracing::{debug, warn};

use crate::error::{EndpointError, Result};

/// Default upper bound on simultaneously pending messages.
pub const DEFAULT_MAX_PENDING: usize = 1024;

/// Default age after which a pending message is considered lost.
pub const DEFAULT_PENDING_TIMEOUT: Duration = Duration::from_secs(60);

/// Limits on pending reassembly state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassemblyConfig {
    /// Maximum pending messages. Zero disables the limit.
    pub max_pending: usize,
    /// Age limit applied by `evict_expired`. `None` disables it.
    pub pending_timeout: Option<Duration>,
}

impl Default for ReassemblyConfig {
    fn default() -> Self {
        Self {
            max_pending: DEFAULT_MAX_PENDING,
            pending_timeout: Some(DEFAULT_PENDING_TIMEOUT),
        }
    }
}

/// Identifies one message in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey {
    pub endpoint: String,
    pub guid: String,
}

impl MessageKey {
    pub fn new(endpoint: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            guid: guid.into(),
        }
    }
}

/// Outcome of accepting one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// More fragments are needed.
    Pending {
        received: usize,
        expected: Option<u32>,
    },
    /// The fragment repeated one already held; nothing changed.
    Duplicate,
    /// All fragments arrived. They are returned in index order.
    Complete(Vec<String>),
}

#[derive(Debug)]
struct Entry {
    expected: Option<u32>,
    fragments: BTreeMap<u32, String>,
    first_seen: Instant,
}

impl Entry {
    fn new(now: Instant) -> Self {
        Self {
            expected: None,
            fragments: BTreeMap::new(),
            first_seen: now,
        }
    }

    fn is_complete(&self) -> bool {
        self.expected
            .is_some_and(|count| self.fragments.len() == count as usize)
    }
}

/// Pending messages and their received fragments.
#[derive(Debug)]
pub struct Reassembler {
    config: ReassemblyConfig,
    entries: HashMap<MessageKey, Entry>,
}

impl Reassembler {
    pub fn new(config: ReassemblyConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ReassemblyConfig {
        &self.config
    }

    /// Number of messages with at least one fragment held.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_pending(&self, key: &MessageKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Accept one fragment of the message `header.guid` on `endpoint`.
    ///
    /// A protocol violation drops the whole message and returns the error;
    /// later fragments of it start a fresh entry. Violations are a repeated
    /// index with different content or final flag, a second final index,
    /// an index beyond the final one, and a final index of `u32::MAX`.
    pub fn accept(
        &mut self,
        endpoint: &str,
        header: &FragmentHeader,
        fragment: &str,
    ) -> Result<Progress> {
        self.accept_at(endpoint, header, fragment, Instant::now())
    }

    /// [`accept`](Self::accept) with an explicit arrival time.
    pub fn accept_at(
        &mut self,
        endpoint: &str,
        header: &FragmentHeader,
        fragment: &str,
        now: Instant,
    ) -> Result<Progress> {
        let key = MessageKey::new(endpoint, header.guid.as_str());

        if !self.entries.contains_key(&key) {
            self.make_room();
            debug!(endpoint, guid = %header.guid, "new pending message");
        }
        let entry = self.entries.entry(key.clone()).or_insert_with(|| Entry::new(now));

        let final_count = match check_fragment(&key, entry, header, fragment) {
            Ok(count) => count,
            Err(err) => {
                self.entries.remove(&key);
                warn!(endpoint, guid = %key.guid, error = %err, "dropped pending message");
                return Err(err);
            }
        };

        if entry.fragments.contains_key(&header.index) {
            debug!(endpoint, guid = %key.guid, index = header.index, "duplicate fragment ignored");
            return Ok(Progress::Duplicate);
        }

        if final_count.is_some() {
            entry.expected = final_count;
        }
        entry.fragments.insert(header.index, fragment.to_string());

        if !entry.is_complete() {
            return Ok(Progress::Pending {
                received: entry.fragments.len(),
                expected: entry.expected,
            });
        }

        let Some(entry) = self.entries.remove(&key) else {
            return Ok(Progress::Duplicate);
        };
        collect(&key, entry).map(Progress::Complete)
    }

    /// Remove pending messages older than `pending_timeout`.
    ///
    /// Returns the evicted keys, sorted.
    pub fn evict_expired(&mut self) -> Vec<MessageKey> {
        self.evict_expired_at(Instant::now())
    }

    /// [`evict_expired`](Self::evict_expired) relative to `now`.
    pub fn evict_expired_at(&mut self, now: Instant) -> Vec<MessageKey> {
        let Some(timeout) = self.config.pending_timeout else {
            return Vec::new();
        };

        let mut expired: Vec<MessageKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.first_seen) >= timeout)
            .map(|(key, _)| key.clone())
            .collect();
        expired.sort();

        for key in &expired {
            if let Some(entry) = self.entries.remove(key) {
                warn!(
                    endpoint = %key.endpoint,
                    guid = %key.guid,
                    received = entry.fragments.len(),
                    "evicted expired message"
                );
            }
        }
        expired
    }

    /// Drop one pending message, if held.
    pub fn discard(&mut self, key: &MessageKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn make_room(&mut self) {
        let max = self.config.max_pending;
        if max == 0 {
            return;
        }
        while self.entries.len() >= max {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.first_seen)
                .map(|(key, _)| key.clone())
            else {
                return;
            };
            self.entries.remove(&oldest);
            warn!(
                endpoint = %oldest.endpoint,
                guid = %oldest.guid,
                max_pending = max,
                "evicted oldest message to make room"
            );
        }
    }
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new(ReassemblyConfig::default())
    }
}

/// Validate one fragment against the pending entry.
///
/// Returns the fragment count a final fragment establishes.
fn check_fragment(
    key: &MessageKey,
    entry: &Entry,
    header: &FragmentHeader,
    fragment: &str,
) -> Result<Option<u32>> {
    let final_count = if header.is_final {
        let count = header
            .index
            .checked_add(1)
            .ok_or_else(|| EndpointError::IndexOverflow {
                guid: key.guid.clone(),
                index: header.index,
            })?;
        Some(count)
    } else {
        None
    };

    if let Some(held) = entry.fragments.get(&header.index) {
        let held_final =
            entry.expected.and_then(|count| count.checked_sub(1)) == Some(header.index);
        if held != fragment || held_final != header.is_final {
            return Err(EndpointError::ConflictingFragment {
                endpoint: key.endpoint.clone(),
                guid: key.guid.clone(),
                index: header.index,
            });
        }
    }

    match (entry.expected, final_count) {
        (Some(count), Some(claimed)) if count != claimed => {
            Err(EndpointError::FinalIndexMismatch {
                guid: key.guid.clone(),
                first: count.saturating_sub(1),
                second: header.index,
            })
        }
        (Some(count), _) if header.index >= count => Err(EndpointError::IndexOutOfRange {
            guid: key.guid.clone(),
            index: header.index,
            count,
        }),
        (None, Some(claimed)) => match entry.fragments.keys().next_back() {
            Some(&highest) if highest >= claimed => Err(EndpointError::IndexOutOfRange {
                guid: key.guid.clone(),
                index: highest,
                count: claimed,
            }),
            _ => Ok(final_count),
        },
        _ => Ok(final_count),
    }
}

fn collect(key: &MessageKey, mut entry: Entry) -> Result<Vec<String>> {
    let count = entry.expected.unwrap_or(0);
    let mut ordered = Vec::with_capacity(count as usize);
    for index in 0..count {
        let fragment = entry
            .fragments
            .remove(&index)
            .ok_or_else(|| EndpointError::MissingFragment {
                guid: key.guid.clone(),
                index,
            })?;
        ordered.push(fragment);
    }
    Ok(ordered)
}
