//! # Cross-Source Record Reconciliation
//!
//! The core of the crate. Records from all sources are unioned in a fixed
//! order, keyed by a normalized title, grouped, and split into unique and
//! repeated result sets.
//!
//! ## Stages
//!
//! - [`normalize`]: title → comparison key
//! - [`aggregate`]: per-source batches → one tagged sequence
//! - [`reconcile`]: grouping, provenance merge, representative selection
//! - [`filter_by_year`]: publication year cut-off on the unique stream
//!
//! [`ReconcilePipeline`] chains the stages and persists their output.
//!
//! ## Usage Example
//!
//! ```
//! use literature_reconciler::reconcile::{aggregate, reconcile, RawRecord, SourceBatch, SourceName};
//!
//! let records = aggregate(vec![
//!     SourceBatch::new(SourceName::Scopus, vec![RawRecord::titled("Docs Agility!")]),
//!     SourceBatch::new(SourceName::Ieee, vec![RawRecord::titled("docs agility")]),
//! ]);
//!
//! let (unique, repeated) = reconcile(records).into_split();
//! assert_eq!(unique.len(), 1);
//! assert_eq!(repeated[0].source, "Scopus, IEEE");
//! ```

pub mod aggregate;
pub mod normalize;
pub mod pipeline;
pub mod reconciler;
pub mod record;
pub mod year_filter;

pub use aggregate::{aggregate, SourceBatch};
pub use normalize::normalize;
pub use pipeline::{PipelineReport, ReconcilePipeline};
pub use reconciler::{reconcile, Reconciliation, PROVENANCE_SEPARATOR};
pub use record::{PublicationYear, RawRecord, Record, SourceName};
pub use year_filter::{filter_by_year, YearCoercionError, YearFilterOutcome, DEFAULT_MIN_YEAR};
