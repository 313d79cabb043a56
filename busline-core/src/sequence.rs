//! Ordered, duplicate-free stop selection for one route-editing session.
//!
//! The order of a [`StopSequence`] is both the badge numbering shown on the
//! map and the waypoint order sent to the routing provider. A hash set of
//! ids is kept alongside the list so membership checks stay constant time.

use std::collections::HashSet;

use thiserror::Error;

use crate::{Stop, StopId};

/// Outcome of [`StopSequence::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The stop was appended at the end.
    Added,
    /// The stop was present and has been removed.
    Removed,
}

/// Errors returned by the reordering operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The index does not address a selected stop.
    #[error("index {index} is out of range for a sequence of {len} stops")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Sequence length at the time of the request.
        len: usize,
    },
}

/// The ordered list of stops selected for a route.
///
/// # Examples
///
/// ```
/// use busline_core::{LatLng, Stop, StopId, StopSequence, Toggle};
///
/// let a = Stop::new(1, "A", LatLng::new(21.03, 105.86));
/// let b = Stop::new(2, "B", LatLng::new(21.02, 105.85));
///
/// let mut sequence = StopSequence::new();
/// assert_eq!(sequence.toggle(a.clone()), Toggle::Added);
/// assert_eq!(sequence.toggle(b), Toggle::Added);
/// assert_eq!(sequence.move_down(0), Ok(true));
/// assert_eq!(sequence.ids(), vec![StopId(2), StopId(1)]);
/// assert_eq!(sequence.toggle(a), Toggle::Removed);
/// assert_eq!(sequence.ids(), vec![StopId(2)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopSequence {
    stops: Vec<Stop>,
    members: HashSet<StopId>,
}

impl StopSequence {
    /// Create an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a sequence from an existing assignment.
    ///
    /// Later duplicates of an id are dropped; the first occurrence keeps its
    /// position.
    pub fn from_stops<I>(stops: I) -> Self
    where
        I: IntoIterator<Item = Stop>,
    {
        let mut sequence = Self::new();
        for stop in stops {
            if sequence.members.insert(stop.id) {
                sequence.stops.push(stop);
            }
        }
        sequence
    }

    /// Number of selected stops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether no stop is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Whether the stop with `id` is selected.
    #[must_use]
    pub fn contains(&self, id: StopId) -> bool {
        self.members.contains(&id)
    }

    /// Selected stops in route order.
    #[must_use]
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Selected ids in route order, as persisted by the records service.
    #[must_use]
    pub fn ids(&self) -> Vec<StopId> {
        self.stops.iter().map(|stop| stop.id).collect()
    }

    /// Zero-based position of `id`, if selected.
    #[must_use]
    pub fn position(&self, id: StopId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        self.stops.iter().position(|stop| stop.id == id)
    }

    /// Remove `stop` if it is selected, otherwise append it.
    pub fn toggle(&mut self, stop: Stop) -> Toggle {
        if self.remove(stop.id) {
            Toggle::Removed
        } else {
            self.members.insert(stop.id);
            self.stops.push(stop);
            Toggle::Added
        }
    }

    /// Remove the stop with `id`. Returns `false` when it was not selected.
    pub fn remove(&mut self, id: StopId) -> bool {
        if !self.members.remove(&id) {
            return false;
        }
        self.stops.retain(|stop| stop.id != id);
        true
    }

    /// Swap the stop at `index` with its predecessor.
    ///
    /// Returns `Ok(false)` for the first stop, which cannot move up.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::IndexOutOfRange`] when `index` is not a
    /// valid position.
    pub fn move_up(&mut self, index: usize) -> Result<bool, SequenceError> {
        self.check_index(index)?;
        let Some(previous) = index.checked_sub(1) else {
            return Ok(false);
        };
        self.stops.swap(previous, index);
        Ok(true)
    }

    /// Swap the stop at `index` with its successor.
    ///
    /// Returns `Ok(false)` for the last stop, which cannot move down.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::IndexOutOfRange`] when `index` is not a
    /// valid position.
    pub fn move_down(&mut self, index: usize) -> Result<bool, SequenceError> {
        self.check_index(index)?;
        let next = index + 1;
        if next == self.stops.len() {
            return Ok(false);
        }
        self.stops.swap(index, next);
        Ok(true)
    }

    /// Drop every selected stop. Returns `false` if it was already empty.
    pub fn clear(&mut self) -> bool {
        if self.stops.is_empty() {
            return false;
        }
        self.stops.clear();
        self.members.clear();
        true
    }

    fn check_index(&self, index: usize) -> Result<(), SequenceError> {
        if index < self.stops.len() {
            Ok(())
        } else {
            Err(SequenceError::IndexOutOfRange {
                index,
                len: self.stops.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LatLng;
    use rstest::{fixture, rstest};

    fn stop(id: u64) -> Stop {
        Stop::new(id, format!("Stop {id}"), LatLng::new(21.0, 105.0))
    }

    #[fixture]
    fn abc() -> StopSequence {
        StopSequence::from_stops([stop(1), stop(2), stop(3)])
    }

    fn ids(sequence: &StopSequence) -> Vec<u64> {
        sequence.ids().into_iter().map(|id| id.0).collect()
    }

    #[rstest]
    fn toggle_appends_new_stops() {
        let mut sequence = StopSequence::new();
        assert_eq!(sequence.toggle(stop(7)), Toggle::Added);
        assert_eq!(sequence.toggle(stop(3)), Toggle::Added);
        assert_eq!(ids(&sequence), vec![7, 3]);
    }

    #[rstest]
    fn toggle_removes_and_shifts(mut abc: StopSequence) {
        assert_eq!(abc.toggle(stop(2)), Toggle::Removed);
        assert_eq!(ids(&abc), vec![1, 3]);
        assert!(!abc.contains(StopId(2)));
        assert_eq!(abc.position(StopId(3)), Some(1));
    }

    #[rstest]
    fn move_down_swaps_with_successor(mut abc: StopSequence) {
        assert_eq!(abc.move_down(0), Ok(true));
        assert_eq!(ids(&abc), vec![2, 1, 3]);
    }

    #[rstest]
    fn move_up_swaps_with_predecessor(mut abc: StopSequence) {
        assert_eq!(abc.move_up(2), Ok(true));
        assert_eq!(ids(&abc), vec![1, 3, 2]);
    }

    #[rstest]
    fn boundary_moves_are_no_ops(mut abc: StopSequence) {
        assert_eq!(abc.move_up(0), Ok(false));
        assert_eq!(abc.move_down(2), Ok(false));
        assert_eq!(ids(&abc), vec![1, 2, 3]);
    }

    #[rstest]
    #[case(3)]
    #[case(usize::MAX)]
    fn out_of_range_moves_are_rejected(mut abc: StopSequence, #[case] index: usize) {
        let expected = Err(SequenceError::IndexOutOfRange { index, len: 3 });
        assert_eq!(abc.move_up(index), expected);
        assert_eq!(abc.move_down(index), expected);
        assert_eq!(ids(&abc), vec![1, 2, 3]);
    }

    #[rstest]
    fn remove_missing_id_is_no_op(mut abc: StopSequence) {
        assert!(!abc.remove(StopId(42)));
        assert_eq!(abc.len(), 3);
    }

    #[rstest]
    fn clear_reports_whether_anything_changed(mut abc: StopSequence) {
        assert!(abc.clear());
        assert!(abc.is_empty());
        assert!(!abc.contains(StopId(1)));
        assert!(!abc.clear());
    }

    #[rstest]
    fn from_stops_keeps_first_duplicate() {
        let mut renamed = stop(1);
        renamed.name = "Duplicate".to_owned();
        let sequence = StopSequence::from_stops([stop(1), stop(2), renamed]);
        assert_eq!(ids(&sequence), vec![1, 2]);
        assert_eq!(sequence.stops()[0].name, "Stop 1");
    }
}
