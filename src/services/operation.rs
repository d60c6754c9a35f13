use crate::api::error::RequestError;

/// Progress of one asynchronous operation.
///
/// Replaces the loose `loading` / `error` / `success` flags: a value can only
/// be in one phase at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationState<T> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(RequestError),
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        OperationState::Idle
    }
}

impl<T> OperationState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, OperationState::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationState::Succeeded(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            OperationState::Failed(err) => Some(err.message.as_str()),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            OperationState::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    /// Back to `Idle` unless a call is still in flight.
    pub fn settle(&mut self) {
        if !self.is_loading() {
            *self = OperationState::Idle;
        }
    }

    pub fn from_result(result: &Result<T, RequestError>) -> Self
    where
        T: Clone,
    {
        match result {
            Ok(value) => OperationState::Succeeded(value.clone()),
            Err(err) => OperationState::Failed(err.clone()),
        }
    }
}

/// Per-key dispatch counters. A response is applied only if no newer
/// dispatch for the same key happened while it was in flight.
#[derive(Debug)]
pub(crate) struct Generations<const N: usize>([u64; N]);

impl<const N: usize> Default for Generations<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> Generations<N> {
    pub(crate) fn bump(&mut self, key: usize) -> u64 {
        self.0[key] += 1;
        self.0[key]
    }

    pub(crate) fn is_current(&self, key: usize, generation: u64) -> bool {
        self.0[key] == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_derive_from_the_phase() {
        let mut op: OperationState<u8> = OperationState::Pending;
        assert!(op.is_loading() && op.error().is_none() && !op.is_success());

        op = OperationState::Failed(RequestError::network("offline"));
        assert!(!op.is_loading());
        assert_eq!(op.error(), Some("offline"));

        op.settle();
        assert_eq!(op, OperationState::Idle);

        let mut pending: OperationState<u8> = OperationState::Pending;
        pending.settle();
        assert!(pending.is_loading());
    }

    #[test]
    fn only_the_latest_generation_is_current() {
        let mut generations = Generations::<2>::default();
        let first = generations.bump(0);
        let second = generations.bump(0);
        assert!(!generations.is_current(0, first));
        assert!(generations.is_current(0, second));
        assert!(generations.is_current(1, 0));
    }
}
