use std::sync::{Arc, OnceLock};

/// The cached instance of a constructor without fields. Every call hands out the same
/// allocation; only the first caller pays for creating it.
#[derive(Debug)]
pub struct Singleton<T> {
    cell: OnceLock<Arc<T>>,
}

impl<T> Default for Singleton<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Singleton<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    pub fn get_or_create(&self, create: impl FnOnce() -> T) -> Arc<T> {
        Arc::clone(self.cell.get_or_init(|| Arc::new(create())))
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static EMPTY: Singleton<Vec<u8>> = Singleton::new();

    #[test]
    fn same_instance_every_time() {
        assert!(EMPTY.get().is_none());

        let first = EMPTY.get_or_create(Vec::new);
        let second = EMPTY.get_or_create(|| vec![1]);

        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.is_empty());
    }
}
