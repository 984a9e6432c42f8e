use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

pub type FastHashMap<K, V> = HashMap<K, V>;
pub type FastHashSet<K> = HashSet<K>;

pub fn hash64<T: Hash + ?Sized>(t: &T) -> u64 {
    let mut state = DefaultHasher::new();
    t.hash(&mut state);
    state.finish()
}
