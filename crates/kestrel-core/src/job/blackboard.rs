// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A typed scratch map jobs use to hand values to later jobs in the same cycle.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Values keyed by their concrete type.
///
/// Lives inside a [`RenderContext`](super::RenderContext) and is therefore
/// cleared with it at the start of every cycle.
#[derive(Default)]
pub struct Blackboard {
    data: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl Blackboard {
    /// Creates an empty blackboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any value of the same type.
    pub fn insert<T: Any + Send>(&mut self, value: T) {
        self.data.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Returns a shared reference to the value of type `T`.
    pub fn get<T: Any + Send>(&self) -> Option<&T> {
        self.data.get(&TypeId::of::<T>())?.downcast_ref()
    }

    /// Returns a mutable reference to the value of type `T`.
    pub fn get_mut<T: Any + Send>(&mut self) -> Option<&mut T> {
        self.data.get_mut(&TypeId::of::<T>())?.downcast_mut()
    }

    /// Checks whether a value of type `T` is present.
    pub fn contains<T: Any + Send>(&self) -> bool {
        self.data.contains_key(&TypeId::of::<T>())
    }

    /// Removes and returns the value of type `T`.
    pub fn remove<T: Any + Send>(&mut self) -> Option<T> {
        self.data
            .remove(&TypeId::of::<T>())
            .and_then(|b| b.downcast().ok().map(|b| *b))
    }

    /// Drops every value.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blackboard")
            .field("entries", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker(u32);

    #[test]
    fn test_insert_get_remove() {
        let mut board = Blackboard::new();
        board.insert(Marker(1));
        board.insert(String::from("hello"));
        assert_eq!(board.get::<Marker>(), Some(&Marker(1)));

        board.get_mut::<Marker>().unwrap().0 = 2;
        assert_eq!(board.remove::<Marker>(), Some(Marker(2)));
        assert!(!board.contains::<Marker>());
        assert_eq!(board.get::<String>().map(String::as_str), Some("hello"));

        board.clear();
        assert!(!board.contains::<String>());
    }
}
