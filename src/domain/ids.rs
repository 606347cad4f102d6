use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// A phantom-typed string identifier, preventing accidental mixing of
/// e.g. a `RequestId` with an `AppId` at compile time.
#[derive(Clone, Eq, Serialize, Deserialize)]
pub struct Id<T> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Id { value: value.into(), _marker: PhantomData }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full_name = std::any::type_name::<T>();
        let clean_name = full_name.split("::").last().unwrap_or(full_name);
        write!(f, "{}({:?})", clean_name, self.value)
    }
}

impl<T> From<Id<T>> for String {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTag;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppTag;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskTag;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserTag;

/// Opaque identifier of the job a reservation belongs to, shared across all
/// reservations submitted for the same job (spec §3).
pub type RequestId = Id<RequestTag>;
/// Identifies the application (selects the local backend).
pub type AppId = Id<AppTag>;
/// Identifies a concrete launched task, assigned by the scheduler on
/// `getTask`.
pub type TaskId = Id<TaskTag>;
/// User/group identity, passed through to the backend unmodified.
pub type UserId = Id<UserTag>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_with_equal_value_compare_equal() {
        assert_eq!(RequestId::new("r1"), RequestId::new("r1"));
        assert_ne!(RequestId::new("r1"), RequestId::new("r2"));
    }

    #[test]
    fn display_shows_bare_value() {
        assert_eq!(RequestId::new("r1").to_string(), "r1");
    }
}
