//! The mutation-observing wrapper array
//!
//! Scripts see the visualised array through [`ObservedArray`], bound to the
//! `arrayData` capability. It behaves like a plain numeric array, but every index
//! read highlights the element and every index write pushes the whole sequence
//! to the display. `length` and other non-index accesses are not intercepted.
//!
//! Whether the script waits for these visualizations is decided by
//! [`InterceptPolicy`].

use super::Visualizer;

/// How index accesses on the wrapper wait for their visualization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterceptPolicy {
    /// The accessing script waits until the highlight/update and its pause complete;
    /// all animation is serialized with the script's own progress.
    #[default]
    Serialized,
    /// The state change is applied at once but the script does not wait for the
    /// pause, so visualizations may trail the reads and writes that caused them.
    Detached,
}

/// Wrapper over the run's working copy of the array
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedArray {
    values: Vec<f64>,
    policy: InterceptPolicy,
    reads: usize,
    writes: usize,
}

impl ObservedArray {
    pub fn new(values: Vec<f64>, policy: InterceptPolicy) -> Self {
        ObservedArray {
            values,
            policy,
            reads: 0,
            writes: 0,
        }
    }

    /// Read `index`, highlighting it first. Out-of-range reads are still
    /// highlighted and yield `None`.
    pub fn get(&mut self, index: usize, viz: &mut Visualizer) -> Option<f64> {
        self.reads += 1;
        match self.policy {
            InterceptPolicy::Serialized => {
                viz.highlight(index);
                viz.pause(viz.pause_interval());
            }
            InterceptPolicy::Detached => viz.highlight_detached(index),
        }
        self.values.get(index).copied()
    }

    /// Store `value` at `index`, then push the full sequence to the display.
    ///
    /// Writing at `len()` appends; writing further out would leave holes the
    /// numeric display cannot show and is rejected.
    pub fn set(&mut self, index: usize, value: f64, viz: &mut Visualizer) -> Result<(), String> {
        if index > self.values.len() {
            return Err(format!(
                "Index {} out of range for visualized array of length {}",
                index,
                self.values.len()
            ));
        }
        if index == self.values.len() {
            self.values.push(value);
        } else {
            self.values[index] = value;
        }
        self.writes += 1;

        match self.policy {
            InterceptPolicy::Serialized => viz.update(&self.values),
            InterceptPolicy::Detached => viz.update_detached(&self.values),
        }
        Ok(())
    }

    /// Length, not intercepted
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn policy(&self) -> InterceptPolicy {
        self.policy
    }

    /// Number of intercepted reads and writes so far
    pub fn access_counts(&self) -> (usize, usize) {
        (self.reads, self.writes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::FrameKind;
    use std::time::Duration;

    #[test]
    fn test_serialized_read_highlights_and_waits() {
        let mut viz = Visualizer::default();
        viz.replace_array(vec![3.0, 1.0]);
        let mut array = ObservedArray::new(vec![3.0, 1.0], InterceptPolicy::Serialized);

        assert_eq!(array.get(1, &mut viz), Some(1.0));
        assert_eq!(viz.state().highlighted, Some(1));
        // highlight pause plus the read-side pause
        assert_eq!(viz.now(), Duration::from_millis(1000));
    }

    #[test]
    fn test_serialized_write_updates_display() {
        let mut viz = Visualizer::default();
        let mut array = ObservedArray::new(vec![3.0, 1.0], InterceptPolicy::Serialized);

        array.set(0, 9.0, &mut viz).unwrap();

        assert_eq!(viz.state().array, vec![9.0, 1.0]);
        assert_eq!(viz.timeline().last().unwrap().kind, FrameKind::Update);
        assert_eq!(viz.now(), Duration::from_millis(500));
        assert_eq!(array.access_counts(), (0, 1));
    }

    #[test]
    fn test_detached_access_does_not_wait() {
        let mut viz = Visualizer::default();
        viz.replace_array(vec![3.0, 1.0]);
        let mut array = ObservedArray::new(vec![3.0, 1.0], InterceptPolicy::Detached);

        array.get(0, &mut viz);
        array.set(1, 4.0, &mut viz).unwrap();

        assert_eq!(viz.now(), Duration::ZERO);
        assert_eq!(viz.state().array, vec![3.0, 4.0]);
        assert_eq!(viz.state().log.len(), 1);
    }

    #[test]
    fn test_write_at_length_appends_but_gap_is_rejected() {
        let mut viz = Visualizer::default();
        let mut array = ObservedArray::new(vec![1.0], InterceptPolicy::Serialized);

        array.set(1, 2.0, &mut viz).unwrap();
        assert_eq!(array.values(), &[1.0, 2.0]);
        assert!(array.set(5, 0.0, &mut viz).is_err());
        assert_eq!(array.len(), 2);
    }

    #[test]
    fn test_out_of_range_read_is_highlighted() {
        let mut viz = Visualizer::default();
        let mut array = ObservedArray::new(vec![1.0], InterceptPolicy::Detached);

        assert_eq!(array.get(4, &mut viz), None);
        assert_eq!(viz.state().log, vec!["Highlighting element at index 4: undefined"]);
    }
}
