//! Fill configuration structs from a remote key-value parameter store.
//!
//! Fields are mapped to parameter key suffixes with `#[ssm("...")]`. Each
//! annotated field is fetched as text under `prefix + suffix`, converted to
//! the field's type and assigned in place. Nested records are walked with the
//! same prefix.
//!
//! ```
//! use ssmfill::{MemoryStore, Populate, Populator};
//!
//! #[derive(Populate, Default, Debug, PartialEq)]
//! struct Database {
//!     #[ssm("db/host")]
//!     host: String,
//!     #[ssm("db/port")]
//!     port: i32,
//! }
//!
//! #[derive(Populate, Default, Debug, PartialEq)]
//! struct Settings {
//!     database: Database,
//!     #[ssm("debug")]
//!     debug: bool,
//! }
//!
//! let store = MemoryStore::new()
//!     .with("/svc/prod/db/host", "db.internal")
//!     .with("/svc/prod/db/port", "5432")
//!     .with("/svc/prod/debug", "false");
//!
//! let mut settings = Settings::default();
//! Populator::new(store).populate(&mut settings, "/svc/prod/")?;
//! assert_eq!(settings.database.port, 5432);
//! # Ok::<(), ssmfill::PopulateError>(())
//! ```
//!
//! A record field cannot also carry a key; annotate the fields inside it.
//!
//! ```compile_fail
//! use ssmfill::Populate;
//!
//! #[derive(Populate, Default)]
//! struct Name {
//!     #[ssm("Name/First")]
//!     first: String,
//! }
//!
//! #[derive(Populate, Default)]
//! struct Person {
//!     #[ssm("Name")]
//!     name: Name,
//! }
//! ```
//!
//! Unannotated fields whose type is built from a generic parameter must say
//! how to treat it.
//!
//! ```compile_fail
//! use ssmfill::Populate;
//!
//! #[derive(Populate, Default)]
//! struct Many<T> {
//!     items: Vec<T>,
//! }
//! ```

pub mod coerce;
pub mod config;
pub mod error;
pub mod field;
pub mod populate;
pub mod store;

#[cfg(feature = "aws")]
pub mod aws;

#[doc(hidden)]
#[path = "private.rs"]
pub mod __private;

pub use config::StoreConfig;
pub use error::{PopulateError, StoreError};
pub use field::{FieldKind, FieldSlot, FloatSlot, IntSlot, Scalar};
pub use populate::{FieldVisitor, Populate, Populator};
pub use store::{MemoryStore, ParameterStore};

#[cfg(feature = "aws")]
pub use aws::SsmStore;
#[cfg(feature = "aws")]
pub use populate::populate_from_default_client;

/// Derive [`Populate`] for a struct with named fields.
///
/// ## Field attributes
///
/// * `#[ssm("Suffix")]` or `#[ssm(key = "Suffix")]` - fetch `prefix + "Suffix"`
///   and assign it. The field type must be a [`Scalar`]; annotated fields of
///   any other type fail with [`PopulateError::UnsupportedFieldType`] before
///   anything is fetched.
/// * no attribute - descend into the field if its type implements
///   [`Populate`], leave it untouched otherwise.
/// * `#[ssm(nested)]` - always descend; the type must implement [`Populate`].
/// * `#[ssm(skip)]` - never touch the field.
///
/// A field cannot carry a key and be a record at once, whether or not it is
/// marked `nested`; both are compile errors. Fields typed by a generic
/// parameter `T` are bounded instead of dispatched: keyed ones add
/// `T: Scalar`, unannotated ones add `T: Populate`. Unannotated fields whose
/// type merely contains a generic parameter, such as `Vec<T>`, must be marked
/// `nested` or `skip`.
pub use ssmfill_derive::Populate;
