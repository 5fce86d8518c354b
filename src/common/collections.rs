pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A map whose clones share structure, so an updated copy costs only the
/// entries that changed.
pub type PersistentHashMap<K, V> = im::HashMap<K, V>;
