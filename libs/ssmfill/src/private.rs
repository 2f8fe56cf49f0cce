//! Support code for `#[derive(Populate)]`. Not a public API.
//!
//! The derive wraps each field in a [`Probe`] and calls a method that exists
//! on two traits. The impl on `Probe<T>` applies only when `T` has the
//! capability (`Scalar` or `Populate`); otherwise method resolution falls
//! through to the impl on `&Probe<T>`, which handles the type generically.
//! The choice is made at compile time, per field type. Only concrete field
//! types are probed; fields typed by a generic parameter are bounded instead.

use std::any::type_name;

use crate::error::PopulateError;
use crate::field::{FieldSlot, Scalar};
use crate::populate::{FieldVisitor, Populate};

pub struct Probe<'a, T>(pub &'a mut T);

pub trait ScalarProbe<'a> {
    fn __ssmfill_slot(self) -> FieldSlot<'a>;
}

impl<'a, T: Scalar> ScalarProbe<'a> for Probe<'a, T> {
    fn __ssmfill_slot(self) -> FieldSlot<'a> {
        let Probe(field) = self;
        field.slot()
    }
}

pub trait UnsupportedProbe<'a> {
    fn __ssmfill_slot(self) -> FieldSlot<'a>;
}

impl<'a, T> UnsupportedProbe<'a> for &Probe<'a, T> {
    fn __ssmfill_slot(self) -> FieldSlot<'a> {
        FieldSlot::Unsupported {
            type_name: type_name::<T>(),
        }
    }
}

pub trait RecordProbe {
    fn __ssmfill_descend(
        self,
        field: &'static str,
        visitor: &mut dyn FieldVisitor,
    ) -> Result<(), PopulateError>;
}

impl<T: Populate> RecordProbe for Probe<'_, T> {
    fn __ssmfill_descend(
        self,
        field: &'static str,
        visitor: &mut dyn FieldVisitor,
    ) -> Result<(), PopulateError> {
        visitor.record(field, self.0)
    }
}

pub trait PlainProbe {
    fn __ssmfill_descend(
        self,
        field: &'static str,
        visitor: &mut dyn FieldVisitor,
    ) -> Result<(), PopulateError>;
}

impl<T> PlainProbe for &Probe<'_, T> {
    fn __ssmfill_descend(
        self,
        _field: &'static str,
        _visitor: &mut dyn FieldVisitor,
    ) -> Result<(), PopulateError> {
        Ok(())
    }
}

/// Type expected from the leaf check of a keyed field.
pub struct Leaf;

/// Returned instead of [`Leaf`] when a keyed field's type is itself a record,
/// turning the derive into a type mismatch that names the problem.
pub struct NestedRecordCannotCarryKey;

pub trait RecordKeyCheck {
    fn __ssmfill_leaf_check(self) -> NestedRecordCannotCarryKey;
}

impl<T: Populate> RecordKeyCheck for Probe<'_, T> {
    fn __ssmfill_leaf_check(self) -> NestedRecordCannotCarryKey {
        NestedRecordCannotCarryKey
    }
}

pub trait LeafKeyCheck {
    fn __ssmfill_leaf_check(self) -> Leaf;
}

impl<T> LeafKeyCheck for &Probe<'_, T> {
    fn __ssmfill_leaf_check(self) -> Leaf {
        Leaf
    }
}
