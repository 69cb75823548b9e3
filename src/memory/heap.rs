//! Heap of script arrays
//!
//! Arrays created by script code (literals such as `const list = [3, 1, 2]`) live
//! in an arena keyed by [`ArrayRef`]. Bindings hold the reference, so two names for
//! the same array observe each other's writes, matching reference semantics of the
//! scripts. The arena lives for a single run and is never collected.
//!
//! Methods return `Result<_, String>` for errors; the strings are converted to
//! `RuntimeError` at the interpreter boundary where a source location is known.

use super::value::{ArrayRef, Value};
use rustc_hash::FxHashMap;

/// Largest index a script write may extend an array to
pub const MAX_ARRAY_LENGTH: usize = 1 << 20;

/// The array arena
#[derive(Debug, Clone, Default)]
pub struct Heap {
    arrays: FxHashMap<ArrayRef, Vec<Value>>,
    next_ref: ArrayRef,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new array and return its handle
    pub fn allocate(&mut self, elements: Vec<Value>) -> ArrayRef {
        let array_ref = self.next_ref;
        self.next_ref += 1;
        self.arrays.insert(array_ref, elements);
        array_ref
    }

    pub fn get(&self, array_ref: ArrayRef) -> Option<&[Value]> {
        self.arrays.get(&array_ref).map(Vec::as_slice)
    }

    /// Length of an array, `None` for a dangling handle
    pub fn len(&self, array_ref: ArrayRef) -> Option<usize> {
        self.arrays.get(&array_ref).map(Vec::len)
    }

    /// Read an element; out-of-range reads yield `undefined`
    pub fn read(&self, array_ref: ArrayRef, index: usize) -> Result<Value, String> {
        let array = self
            .arrays
            .get(&array_ref)
            .ok_or_else(|| format!("Invalid array reference #{}", array_ref))?;
        Ok(array.get(index).cloned().unwrap_or_default())
    }

    /// Write an element, extending the array with `undefined` holes if needed
    pub fn write(&mut self, array_ref: ArrayRef, index: usize, value: Value) -> Result<(), String> {
        if index >= MAX_ARRAY_LENGTH {
            return Err(format!("Index {} exceeds the maximum array length", index));
        }
        let array = self
            .arrays
            .get_mut(&array_ref)
            .ok_or_else(|| format!("Invalid array reference #{}", array_ref))?;
        if index >= array.len() {
            array.resize(index + 1, Value::Undefined);
        }
        array[index] = value;
        Ok(())
    }

    /// Append an element, returning the new length
    pub fn push(&mut self, array_ref: ArrayRef, value: Value) -> Result<usize, String> {
        let array = self
            .arrays
            .get_mut(&array_ref)
            .ok_or_else(|| format!("Invalid array reference #{}", array_ref))?;
        array.push(value);
        Ok(array.len())
    }

    /// Remove and return the last element (`undefined` when empty)
    pub fn pop(&mut self, array_ref: ArrayRef) -> Result<Value, String> {
        let array = self
            .arrays
            .get_mut(&array_ref)
            .ok_or_else(|| format!("Invalid array reference #{}", array_ref))?;
        Ok(array.pop().unwrap_or_default())
    }

    /// Extract an array as numbers, as needed by the display model
    pub fn numbers(&self, array_ref: ArrayRef) -> Result<Vec<f64>, String> {
        let array = self
            .arrays
            .get(&array_ref)
            .ok_or_else(|| format!("Invalid array reference #{}", array_ref))?;
        array
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_number()
                    .ok_or_else(|| format!("element {} is {}, not a number", i, v.type_name()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_read_write() {
        let mut heap = Heap::new();
        let r = heap.allocate(vec![Value::Number(1.0), Value::Number(2.0)]);

        assert_eq!(heap.read(r, 1).unwrap(), Value::Number(2.0));
        assert_eq!(heap.read(r, 5).unwrap(), Value::Undefined);

        heap.write(r, 0, Value::Number(7.0)).unwrap();
        assert_eq!(heap.numbers(r).unwrap(), vec![7.0, 2.0]);
    }

    #[test]
    fn test_write_past_end_leaves_holes() {
        let mut heap = Heap::new();
        let r = heap.allocate(Vec::new());
        heap.write(r, 2, Value::Number(3.0)).unwrap();

        assert_eq!(heap.len(r), Some(3));
        assert_eq!(heap.read(r, 0).unwrap(), Value::Undefined);
        assert!(heap.numbers(r).unwrap_err().contains("element 0 is undefined"));
    }

    #[test]
    fn test_push_pop() {
        let mut heap = Heap::new();
        let r = heap.allocate(vec![Value::Number(1.0)]);
        assert_eq!(heap.push(r, Value::Number(2.0)).unwrap(), 2);
        assert_eq!(heap.pop(r).unwrap(), Value::Number(2.0));
        assert_eq!(heap.pop(r).unwrap(), Value::Number(1.0));
        assert_eq!(heap.pop(r).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_dangling_reference() {
        let heap = Heap::new();
        assert!(heap.read(42, 0).is_err());
        assert_eq!(heap.len(42), None);
    }
}
