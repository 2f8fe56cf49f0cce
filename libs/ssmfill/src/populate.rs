use crate::coerce;
use crate::error::PopulateError;
use crate::field::FieldSlot;
use crate::store::ParameterStore;

/// A record whose fields can be filled from a parameter store.
///
/// Usually derived with `#[derive(Populate)]`. A hand-written impl reports
/// each field to the visitor in declaration order:
///
/// ```
/// use ssmfill::{FieldVisitor, Populate, PopulateError, Scalar};
///
/// struct Database {
///     host: String,
///     port: i32,
/// }
///
/// impl Populate for Database {
///     fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<(), PopulateError> {
///         visitor.scalar("host", "db/host", self.host.slot())?;
///         visitor.scalar("port", "db/port", self.port.slot())?;
///         Ok(())
///     }
/// }
/// ```
pub trait Populate {
    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<(), PopulateError>;
}

/// Receives the fields of a [`Populate`] record.
pub trait FieldVisitor {
    /// A nested record field.
    fn record(
        &mut self,
        field: &'static str,
        record: &mut dyn Populate,
    ) -> Result<(), PopulateError>;

    /// A leaf field annotated with parameter key suffix `key`.
    fn scalar(
        &mut self,
        field: &'static str,
        key: &str,
        slot: FieldSlot<'_>,
    ) -> Result<(), PopulateError>;
}

/// Fills records from a [`ParameterStore`].
///
/// Holds the store so one client can serve many calls.
#[derive(Debug, Clone)]
pub struct Populator<S> {
    store: S,
}

impl<S: ParameterStore> Populator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Fill every annotated field of `record`, descending into nested records.
    ///
    /// Each field's key is `prefix` immediately followed by its annotation;
    /// no separator is inserted. Nested records use the same `prefix`.
    /// Fields are visited depth-first in declaration order and the first
    /// error is returned unchanged. Fields set before the error stay set.
    pub fn populate<T: Populate + ?Sized>(
        &self,
        record: &mut T,
        prefix: &str,
    ) -> Result<(), PopulateError> {
        let mut walk = Walk {
            store: &self.store,
            prefix,
            depth: 0,
        };
        record.visit_fields(&mut walk)
    }
}

/// Build the default SSM client from the ambient AWS environment and fill
/// `record` with it. See [`Populator::populate`].
///
/// Blocks the calling thread; do not call from inside an async runtime.
#[cfg(feature = "aws")]
pub fn populate_from_default_client<T: Populate + ?Sized>(
    record: &mut T,
    prefix: &str,
) -> Result<(), PopulateError> {
    let store = crate::aws::SsmStore::from_env()?;
    Populator::new(store).populate(record, prefix)
}

struct Walk<'a, S> {
    store: &'a S,
    prefix: &'a str,
    depth: usize,
}

impl<S: ParameterStore> FieldVisitor for Walk<'_, S> {
    fn record(
        &mut self,
        field: &'static str,
        record: &mut dyn Populate,
    ) -> Result<(), PopulateError> {
        tracing::debug!(field, depth = self.depth + 1, "descending into nested record");
        self.depth += 1;
        let result = record.visit_fields(self);
        self.depth -= 1;
        result
    }

    fn scalar(
        &mut self,
        field: &'static str,
        key: &str,
        slot: FieldSlot<'_>,
    ) -> Result<(), PopulateError> {
        if let FieldSlot::Unsupported { type_name } = slot {
            tracing::warn!(field, type_name, "annotated field has unsupported type");
            return Err(PopulateError::UnsupportedFieldType { field, type_name });
        }

        let full_key = format!("{}{key}", self.prefix);
        tracing::debug!(field, key = %full_key, "fetching parameter");
        let value = self.store.fetch(&full_key)?;

        let kind = slot.kind();
        coerce::assign(slot, &value).map_err(|malformed| PopulateError::MalformedValue {
            field,
            key: full_key,
            value,
            kind,
            reason: malformed.0,
        })
    }
}
