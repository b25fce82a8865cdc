//! Columnar attribute storage.
//!
//! An [`AttributeContainer`] stores any number of named, typed columns that
//! all share the same row count. Rows are addressed by plain indices which
//! stay valid for the lifetime of the container: rows are only ever appended
//! in blocks ([`AttributeContainer::reserve_rows`]) and never renumbered.
//!
//! Columns are type-erased behind [`ColumnData`]; typed access goes through a
//! [`ColumnHandle`] or a name lookup and is checked with a downcast.
//!
//! ```
//! use darn::map::AttributeContainer;
//!
//! let mut container = AttributeContainer::new();
//! let weight = container.add_column::<f64>("weight").unwrap();
//! let first = container.reserve_rows(3);
//! assert_eq!(first, 0);
//!
//! container.column_mut(weight).unwrap().set(1, 2.5);
//! assert_eq!(container.get_column::<f64>("weight").unwrap()[1], 2.5);
//! assert!(container.get_column::<u32>("weight").is_err());
//! ```

use std::any::{type_name, Any};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::error::{MeshError, Result};

/// Bounds required for values stored in an attribute column.
pub trait AttributeValue: Clone + Debug + Send + Sync + 'static {}

impl<T: Clone + Debug + Send + Sync + 'static> AttributeValue for T {}

/// Type-erased operations every column supports.
pub trait ColumnData: Debug + Send + Sync {
    /// Column name.
    fn name(&self) -> &str;

    /// Number of rows.
    fn len(&self) -> usize;

    /// Whether the column has no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grow (or shrink) to `rows`, filling new rows with the column's fill value.
    fn resize(&mut self, rows: usize);

    /// Copy the value at `src` into `dst`.
    fn copy_row(&mut self, dst: usize, src: usize);

    /// Name of the stored value type.
    fn value_type_name(&self) -> &'static str;

    /// Upcast for typed access.
    fn as_any(&self) -> &dyn Any;

    /// Upcast for typed mutable access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A typed attribute column.
#[derive(Debug, Clone)]
pub struct Column<T> {
    name: String,
    data: Vec<T>,
    fill: T,
}

impl<T: AttributeValue> Column<T> {
    fn new(name: &str, fill: T, rows: usize) -> Self {
        Self {
            name: name.to_string(),
            data: vec![fill.clone(); rows],
            fill,
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the column has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value stored at `row`.
    #[inline]
    pub fn get(&self, row: usize) -> &T {
        &self.data[row]
    }

    /// Mutable value stored at `row`.
    #[inline]
    pub fn get_mut(&mut self, row: usize) -> &mut T {
        &mut self.data[row]
    }

    /// Overwrite the value at `row`.
    #[inline]
    pub fn set(&mut self, row: usize, value: T) {
        self.data[row] = value;
    }

    /// All values, indexed by row.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterate over all values in row order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl<T: AttributeValue> Index<usize> for Column<T> {
    type Output = T;

    fn index(&self, row: usize) -> &T {
        &self.data[row]
    }
}

impl<T: AttributeValue> IndexMut<usize> for Column<T> {
    fn index_mut(&mut self, row: usize) -> &mut T {
        &mut self.data[row]
    }
}

impl<T: AttributeValue> ColumnData for Column<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn resize(&mut self, rows: usize) {
        self.data.resize(rows, self.fill.clone());
    }

    fn copy_row(&mut self, dst: usize, src: usize) {
        let value = self.data[src].clone();
        self.data[dst] = value;
    }

    fn value_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Typed handle to a column of one [`AttributeContainer`].
///
/// Handles survive [`AttributeContainer::swap`]: they follow the columns, not
/// the container value they were created on.
pub struct ColumnHandle<T> {
    slot: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ColumnHandle<T> {
    fn new(slot: usize) -> Self {
        Self {
            slot,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for ColumnHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ColumnHandle<T> {}

impl<T> PartialEq for ColumnHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl<T> Eq for ColumnHandle<T> {}

impl<T> Debug for ColumnHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ColumnHandle<{}>({})", type_name::<T>(), self.slot)
    }
}

/// Growable columnar storage with stable row indices.
#[derive(Debug, Default)]
pub struct AttributeContainer {
    columns: Vec<Box<dyn ColumnData>>,
    nb_rows: usize,
}

impl AttributeContainer {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    #[inline]
    pub fn nb_rows(&self) -> usize {
        self.nb_rows
    }

    /// Number of columns.
    #[inline]
    pub fn nb_columns(&self) -> usize {
        self.columns.len()
    }

    /// Names of all columns, in creation order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name())
    }

    /// Whether a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.slot_of(name).is_some()
    }

    /// Allocate `n` contiguous rows and return the index of the first one.
    pub fn reserve_rows(&mut self, n: usize) -> usize {
        let first = self.nb_rows;
        self.nb_rows += n;
        for column in &mut self.columns {
            column.resize(self.nb_rows);
        }
        first
    }

    /// Add a column whose new rows are filled with `T::default()`.
    pub fn add_column<T: AttributeValue + Default>(&mut self, name: &str) -> Result<ColumnHandle<T>> {
        self.add_column_with_fill(name, T::default())
    }

    /// Add a column whose new rows are filled with `fill`.
    pub fn add_column_with_fill<T: AttributeValue>(
        &mut self,
        name: &str,
        fill: T,
    ) -> Result<ColumnHandle<T>> {
        if self.has_column(name) {
            return Err(MeshError::DuplicateAttribute(name.to_string()));
        }
        self.columns
            .push(Box::new(Column::new(name, fill, self.nb_rows)));
        Ok(ColumnHandle::new(self.columns.len() - 1))
    }

    /// Handle to an existing column, checking its value type.
    pub fn handle<T: AttributeValue>(&self, name: &str) -> Result<ColumnHandle<T>> {
        let slot = self
            .slot_of(name)
            .ok_or_else(|| MeshError::MissingAttribute(name.to_string()))?;
        let column = &self.columns[slot];
        if column.as_any().is::<Column<T>>() {
            Ok(ColumnHandle::new(slot))
        } else {
            Err(MeshError::AttributeTypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
                found: column.value_type_name(),
            })
        }
    }

    /// Typed column behind a handle.
    pub fn column<T: AttributeValue>(&self, handle: ColumnHandle<T>) -> Option<&Column<T>> {
        self.columns
            .get(handle.slot)
            .and_then(|c| c.as_any().downcast_ref::<Column<T>>())
    }

    /// Mutable typed column behind a handle.
    pub fn column_mut<T: AttributeValue>(
        &mut self,
        handle: ColumnHandle<T>,
    ) -> Option<&mut Column<T>> {
        self.columns
            .get_mut(handle.slot)
            .and_then(|c| c.as_any_mut().downcast_mut::<Column<T>>())
    }

    /// Typed column looked up by name.
    pub fn get_column<T: AttributeValue>(&self, name: &str) -> Result<&Column<T>> {
        let handle = self.handle::<T>(name)?;
        self.column(handle)
            .ok_or_else(|| MeshError::MissingAttribute(name.to_string()))
    }

    /// Mutable typed column looked up by name.
    pub fn get_column_mut<T: AttributeValue>(&mut self, name: &str) -> Result<&mut Column<T>> {
        let handle = self.handle::<T>(name)?;
        self.column_mut(handle)
            .ok_or_else(|| MeshError::MissingAttribute(name.to_string()))
    }

    /// Copy row `src` into row `dst` in every column.
    pub fn copy_row(&mut self, dst: usize, src: usize) {
        for column in &mut self.columns {
            column.copy_row(dst, src);
        }
    }

    /// Drop every column and all rows.
    pub fn remove_columns(&mut self) {
        self.columns.clear();
        self.nb_rows = 0;
    }

    /// Exchange the full contents of two containers.
    pub fn swap(&mut self, other: &mut AttributeContainer) {
        std::mem::swap(self, other);
    }

    fn slot_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_reserve_rows_grows_all_columns() {
        let mut c = AttributeContainer::new();
        let a = c.add_column::<u32>("a").unwrap();
        assert_eq!(c.reserve_rows(2), 0);
        let b = c
            .add_column_with_fill("b", Point3::new(1.0, 2.0, 3.0))
            .unwrap();
        assert_eq!(c.reserve_rows(3), 2);

        assert_eq!(c.nb_rows(), 5);
        assert_eq!(c.column(a).unwrap().len(), 5);
        assert_eq!(c.column(b).unwrap().len(), 5);
        assert_eq!(c.column(b).unwrap()[4], Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_duplicate_column() {
        let mut c = AttributeContainer::new();
        c.add_column::<f32>("w").unwrap();
        assert!(matches!(
            c.add_column::<f64>("w"),
            Err(MeshError::DuplicateAttribute(_))
        ));
    }

    #[test]
    fn test_typed_access_is_checked() {
        let mut c = AttributeContainer::new();
        c.add_column::<f64>("w").unwrap();
        c.reserve_rows(1);

        assert!(c.get_column::<f64>("w").is_ok());
        assert!(matches!(
            c.get_column::<i32>("w"),
            Err(MeshError::AttributeTypeMismatch { .. })
        ));
        assert!(matches!(
            c.get_column::<f64>("missing"),
            Err(MeshError::MissingAttribute(_))
        ));
    }

    #[test]
    fn test_copy_row() {
        let mut c = AttributeContainer::new();
        let a = c.add_column::<i64>("a").unwrap();
        let b = c.add_column::<String>("b").unwrap();
        c.reserve_rows(2);
        c.column_mut(a).unwrap().set(0, 7);
        c.column_mut(b).unwrap().set(0, "seven".to_string());

        c.copy_row(1, 0);
        assert_eq!(c.column(a).unwrap()[1], 7);
        assert_eq!(c.column(b).unwrap()[1], "seven");
    }

    #[test]
    fn test_swap_moves_columns() {
        let mut src = AttributeContainer::new();
        let h = src.add_column::<u8>("tag").unwrap();
        src.reserve_rows(4);
        src.column_mut(h).unwrap().set(3, 9);

        let mut dst = AttributeContainer::new();
        dst.swap(&mut src);

        assert_eq!(src.nb_columns(), 0);
        assert_eq!(src.nb_rows(), 0);
        assert_eq!(dst.nb_rows(), 4);
        assert_eq!(dst.column(h).unwrap()[3], 9);
    }

    #[test]
    fn test_remove_columns() {
        let mut c = AttributeContainer::new();
        c.add_column::<u8>("tag").unwrap();
        c.reserve_rows(10);
        c.remove_columns();
        assert_eq!(c.nb_rows(), 0);
        assert!(!c.has_column("tag"));
    }
}
