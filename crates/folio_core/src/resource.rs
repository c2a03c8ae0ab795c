use serde::Serialize;

/// Coarse lifecycle tag of a [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    #[default]
    NotRequested,
    Pending,
    Success,
    Error,
}

/// A requested status transition together with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange<V, E> {
    Pending,
    Success(V),
    Error(E),
}

impl<V, E> StatusChange<V, E> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StatusChange::Pending)
    }
}

impl<V, E> From<Result<V, E>> for StatusChange<V, E> {
    fn from(result: Result<V, E>) -> Self {
        match result {
            Ok(value) => StatusChange::Success(value),
            Err(error) => StatusChange::Error(error),
        }
    }
}

/// Lifecycle of one remote value.
///
/// `Pending` and `Error` keep the last good value around so a view can keep
/// showing it while a refetch is in flight or after the refetch failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<V, E> {
    NotRequested,
    Pending(Option<V>),
    Success(V),
    Error(E, Option<V>),
}

impl<V, E> Default for Resource<V, E> {
    fn default() -> Self {
        Resource::NotRequested
    }
}

impl<V, E> Resource<V, E> {
    pub fn status(&self) -> ResourceStatus {
        match self {
            Resource::NotRequested => ResourceStatus::NotRequested,
            Resource::Pending(_) => ResourceStatus::Pending,
            Resource::Success(_) => ResourceStatus::Success,
            Resource::Error(..) => ResourceStatus::Error,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Resource::Pending(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Resource::Error(..))
    }

    /// Current value, or the value retained from the last success.
    pub fn value(&self) -> Option<&V> {
        match self {
            Resource::NotRequested => None,
            Resource::Pending(value) | Resource::Error(_, value) => value.as_ref(),
            Resource::Success(value) => Some(value),
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Resource::Error(error, _) => Some(error),
            _ => None,
        }
    }

    /// The error when errored, otherwise whatever value is available.
    pub fn resolve(&self) -> Result<Option<&V>, &E> {
        match self {
            Resource::Error(error, _) => Err(error),
            other => Ok(other.value()),
        }
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            Resource::NotRequested => None,
            Resource::Pending(value) | Resource::Error(_, value) => value,
            Resource::Success(value) => Some(value),
        }
    }

    /// Applies a transition, replacing the value on success.
    pub fn set_status(self, change: StatusChange<V, E>) -> Self {
        self.set_status_with(change, |_, incoming| incoming)
    }

    /// Applies a transition; on success `merge` reconciles the existing
    /// value (if any) with the incoming payload.
    pub fn set_status_with<F>(self, change: StatusChange<V, E>, merge: F) -> Self
    where
        F: FnOnce(Option<V>, V) -> V,
    {
        match change {
            StatusChange::Pending => Resource::Pending(self.into_value()),
            StatusChange::Success(incoming) => Resource::Success(merge(self.into_value(), incoming)),
            StatusChange::Error(error) => Resource::Error(error, self.into_value()),
        }
    }

    /// Rewrites the carried value without changing the status.
    pub fn map_value<F>(self, f: F) -> Self
    where
        F: FnOnce(Option<V>) -> Option<V>,
    {
        match self {
            Resource::NotRequested => match f(None) {
                Some(value) => Resource::Pending(Some(value)),
                None => Resource::NotRequested,
            },
            Resource::Pending(value) => Resource::Pending(f(value)),
            Resource::Success(value) => match f(Some(value)) {
                Some(value) => Resource::Success(value),
                None => Resource::NotRequested,
            },
            Resource::Error(error, value) => Resource::Error(error, f(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Res = Resource<Vec<u32>, String>;

    #[test]
    fn pending_keeps_previous_value_and_clears_error() {
        let res = Res::default()
            .set_status(StatusChange::Success(vec![1]))
            .set_status(StatusChange::Error("boom".into()))
            .set_status(StatusChange::Pending);

        assert_eq!(res, Resource::Pending(Some(vec![1])));
        assert_eq!(res.error(), None);
    }

    #[test]
    fn error_retains_last_good_value() {
        let res = Res::default()
            .set_status(StatusChange::Success(vec![7]))
            .set_status(StatusChange::Pending)
            .set_status(StatusChange::Error("offline".into()));

        assert_eq!(res.status(), ResourceStatus::Error);
        assert_eq!(res.value(), Some(&vec![7]));
        assert_eq!(res.error().map(String::as_str), Some("offline"));
        assert_eq!(res.resolve(), Err(&"offline".to_string()));
    }

    #[test]
    fn merge_accumulates_pages_in_order() {
        let append = |existing: Option<Vec<u32>>, page: Vec<u32>| {
            let mut all = existing.unwrap_or_default();
            all.extend(page);
            all
        };

        let res = Res::default()
            .set_status(StatusChange::Pending)
            .set_status_with(StatusChange::Success(vec![1, 2]), append)
            .set_status(StatusChange::Pending)
            .set_status_with(StatusChange::Success(vec![3]), append);

        assert_eq!(res, Resource::Success(vec![1, 2, 3]));
    }

    #[test]
    fn success_without_merge_replaces() {
        let res = Res::default()
            .set_status(StatusChange::Success(vec![1]))
            .set_status(StatusChange::Success(vec![2]));
        assert_eq!(res.into_value(), Some(vec![2]));
    }

    #[test]
    fn change_from_result() {
        let ok: StatusChange<u8, ()> = Ok(3).into();
        let err: StatusChange<u8, ()> = Err(()).into();
        assert_eq!(ok, StatusChange::Success(3));
        assert!(err.is_terminal());
        assert!(!StatusChange::<u8, ()>::Pending.is_terminal());
    }
}
