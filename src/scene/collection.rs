use std::collections::HashMap;
use std::marker::PhantomData;

use crate::scene::ids::EntityId;

/// Name-indexed storage for one entity kind.
///
/// Names are unique within a collection; inserting a taken name gets a `.001`-style suffix so
/// every entity stays addressable by exactly one name.
#[derive(Debug)]
pub(crate) struct Collection<I, T> {
    ids_by_name: HashMap<String, u32>,
    names: Vec<String>,
    items: Vec<T>,
    _id: PhantomData<I>,
}

impl<I, T> Default for Collection<I, T> {
    fn default() -> Self {
        Self {
            ids_by_name: HashMap::new(),
            names: Vec::new(),
            items: Vec::new(),
            _id: PhantomData,
        }
    }
}

impl<I: EntityId, T> Collection<I, T> {
    pub(crate) fn unique_name(&self, wanted: &str) -> String {
        if !self.ids_by_name.contains_key(wanted) {
            return wanted.to_owned();
        }
        (1u32..)
            .map(|n| format!("{wanted}.{n:03}"))
            .find(|candidate| !self.ids_by_name.contains_key(candidate))
            .unwrap_or_else(|| wanted.to_owned())
    }

    /// Insert under `wanted` (or a suffixed variant). Returns the id and the name actually used.
    pub(crate) fn insert(&mut self, wanted: &str, item: T) -> (I, String) {
        let name = self.unique_name(wanted);
        let idx = self.items.len() as u32;
        self.ids_by_name.insert(name.clone(), idx);
        self.names.push(name.clone());
        self.items.push(item);
        (I::from_index(idx), name)
    }

    pub(crate) fn id(&self, name: &str) -> Option<I> {
        self.ids_by_name.get(name).map(|&i| I::from_index(i))
    }

    pub(crate) fn name(&self, id: I) -> &str {
        &self.names[id.index()]
    }

    pub(crate) fn get(&self, id: I) -> &T {
        &self.items[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.index()]
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, t)| (I::from_index(i as u32), t))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/collection.rs"]
mod tests;
