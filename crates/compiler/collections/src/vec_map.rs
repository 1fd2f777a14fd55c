use std::iter::FromIterator;

/// A map backed by a vector of entries, iterated in insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VecMap<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
}

impl<K, V> Default for VecMap<K, V> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<K, V> VecMap<K, V> {
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.keys.len(), self.values.len());
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&K, &V)> {
        self.keys.iter().zip(self.values.iter())
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> {
        self.keys.iter()
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> {
        self.values.iter()
    }

    pub fn unzip(self) -> (Vec<K>, Vec<V>) {
        (self.keys, self.values)
    }
}

impl<K: PartialEq, V> VecMap<K, V> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Inserts or overwrites the value for `key`; an overwritten entry keeps its position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.position(&key) {
            Some(index) => Some(std::mem::replace(&mut self.values[index], value)),
            None => {
                self.keys.push(key);
                self.values.push(value);

                None
            }
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.position(key).map(|index| &self.values[index])
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.position(key) {
            Some(index) => Some(&mut self.values[index]),
            None => None,
        }
    }

    pub fn get_or_insert_with(&mut self, key: K, default: impl FnOnce() -> V) -> &mut V {
        let index = match self.position(&key) {
            Some(index) => index,
            None => {
                self.keys.push(key);
                self.values.push(default());

                self.values.len() - 1
            }
        };

        &mut self.values[index]
    }

    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let index = self.position(key)?;

        Some((self.keys.remove(index), self.values.remove(index)))
    }
}

impl<K: PartialEq, V> Extend<(K, V)> for VecMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: PartialEq, V> FromIterator<(K, V)> for VecMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = VecMap::default();
        map.extend(iter);
        map
    }
}

impl<K, V> IntoIterator for VecMap<K, V> {
    type Item = (K, V);

    type IntoIter = std::iter::Zip<std::vec::IntoIter<K>, std::vec::IntoIter<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter().zip(self.values)
    }
}

#[cfg(test)]
mod test {
    use super::VecMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn overwrite_keeps_position() {
        let mut map = VecMap::default();
        map.insert("a", 1);
        map.insert("b", 2);

        assert_eq!(map.insert("a", 3), Some(1));
        assert_eq!(map.into_iter().collect::<Vec<_>>(), vec![("a", 3), ("b", 2)]);
    }

    #[test]
    fn get_or_insert_with_only_inserts_once() {
        let mut map: VecMap<&str, Vec<u8>> = VecMap::default();
        map.get_or_insert_with("xs", Vec::new).push(1);
        map.get_or_insert_with("xs", Vec::new).push(2);

        assert_eq!(map.get(&"xs"), Some(&vec![1, 2]));
        assert_eq!(map.len(), 1);
    }
}
