//! chained-hashmap: a single-threaded hash map resolving collisions by
//! separate chaining, with capacity growth driven by a load factor.
//!
//! Internal Design:
//!
//! Summary
//! - `ChainedHashMap<K, V>` owns a table of bucket heads and an arena
//!   (`slotmap::SlotMap`) of entries. Each entry carries its key, value,
//!   stored hash, and the arena key of the next entry in its chain.
//! - The bucket of a key is `|hash| mod capacity`, where `hash` is the
//!   key's `Hash` output read as a signed 64-bit integer. The magnitude is
//!   taken in `u64`, so `i64::MIN` indexes `2^63 mod capacity`.
//! - New keys are pushed at the head of their chain. Updating an existing
//!   key overwrites its value in place and does not reorder the chain.
//!
//! Growth
//! - `threshold = floor(capacity × load_factor)`. When an insertion leaves
//!   `len >= threshold`, the table doubles (again, if one doubling is not
//!   enough to get back below the threshold) and every entry is relinked
//!   into the new table using its stored hash. Entries are never copied or
//!   reallocated and `K: Hash` is not called again.
//! - A load factor so small that no addressable table gets `len` below the
//!   threshold falls back to one doubling per insert. If the larger table
//!   cannot be allocated, the current one is kept and a warning is logged.
//! - The table never shrinks; `clear` keeps capacity and threshold.
//!
//! Construction
//! - `MapConfig` carries capacity (default 16) and load factor (default
//!   0.75). A zero or unallocatable capacity, or a load factor that is
//!   zero, negative, or NaN, is rejected with `ConfigError`.
//! - Keys are statically `Eq + Hash`, so there is no runtime "invalid key"
//!   case: `Option::None` is an ordinary key.
//!
//! Enumeration
//! - `key_set` and `entry_set` return owned snapshots; `iter` borrows the
//!   map. No reference into the chain links is ever handed out, so growth
//!   and removal cannot invalidate caller state.
//! - `contains_value` is a full scan; values are not indexed.
//!
//! Reentrancy and threads
//! - Chain walks call user `Eq`/`Hash` (and `PartialEq`/`Clone` for values
//!   and snapshots). A debug-only guard panics if that code re-enters the
//!   same map mid-operation. In release builds it compiles away.
//! - The map is `Send` and `!Sync`. Sharing across threads means wrapping it
//!   in a single `Mutex` taken for every operation, reads included.
//!
//! Logging
//! - Each resize emits a `tracing` debug event with the old and new
//!   capacity; the crate installs no subscriber.

pub mod chained_hash_map;
mod chained_hash_map_proptest;
pub mod config;
pub mod error;
mod reentrancy;

// Public surface
pub use chained_hash_map::{ChainedHashMap, Iter};
pub use config::MapConfig;
pub use error::{ConfigError, Result};
