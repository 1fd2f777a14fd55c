/// Distinct values in the order they were first seen.
///
/// Free type variables of a type and the type parameters of generated methods are listed in
/// this order, so generated signatures follow the declarations they come from. The sets are a
/// handful of elements long, which a linear scan handles best.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VecSet<T> {
    elements: Vec<T>,
}

impl<T> Default for VecSet<T> {
    fn default() -> Self {
        VecSet { elements: Vec::new() }
    }
}

impl<T> VecSet<T> {
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        self.elements.as_slice()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.elements
    }
}

impl<T: PartialEq> VecSet<T> {
    pub fn contains(&self, value: &T) -> bool {
        self.elements.iter().any(|element| element == value)
    }

    /// Whether `value` was seen for the first time. Later occurrences keep the first position.
    pub fn insert(&mut self, value: T) -> bool {
        let first_seen = !self.contains(&value);
        if first_seen {
            self.elements.push(value);
        }
        first_seen
    }
}

impl<T: PartialEq> Extend<T> for VecSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, values: I) {
        values.into_iter().for_each(|value| {
            self.insert(value);
        });
    }
}

impl<T: PartialEq> FromIterator<T> for VecSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(values: I) -> Self {
        let mut seen = VecSet::default();
        seen.extend(values);
        seen
    }
}

impl<T> IntoIterator for VecSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

#[cfg(test)]
mod test {
    use super::VecSet;
    use pretty_assertions::assert_eq;

    #[test]
    fn variables_of_a_signature_in_reading_order() {
        // Function<Pair<B, A>, Either<A, C>>
        let vars: VecSet<_> = ["B", "A", "A", "C"].into_iter().collect();

        assert!(vars.contains(&"C"));
        assert!(!vars.contains(&"R"));
        assert_eq!(vars.into_vec(), ["B", "A", "C"]);
    }

    #[test]
    fn repeated_helper_is_listed_once() {
        let mut helpers = VecSet::default();

        assert!(helpers.insert("F3"));
        assert!(helpers.insert("F4"));
        assert!(!helpers.insert("F3"));
        assert_eq!(helpers.as_slice(), ["F3", "F4"]);
    }
}
