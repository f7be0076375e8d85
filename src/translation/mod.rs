//! Per-object translation units and their resolution workflow.
//!
//! A translation unit carries one field's source→target text for one object
//! instance and one target locale, with a review status. The store is a
//! seam over whatever persistence the deployment uses; the resolver walks
//! the locale fallback chain read-only; the manager owns unit lifecycle
//! and progress reporting.

pub mod manager;
pub mod resolver;
pub mod store;
pub mod unit;

pub use manager::{
    BulkItem, NewTranslation, TranslatableFields, TranslationManager, TranslationPatch,
    TranslationProgress,
};
pub use resolver::{FieldStatus, TranslationResolver};
pub use store::{InMemoryTranslationStore, TranslationStore};
pub use unit::{ObjectRef, TranslationStatus, TranslationUnit, UnitKey};
