pub mod assemble;
pub mod bucket;
pub mod config;
pub mod department;
pub mod enrich;
pub mod pipeline;
pub mod writer;

pub use assemble::{sheet_name, NamedTable, ReportAssembler, ReportBundle};
pub use bucket::{Bucket, BucketFilter};
pub use config::{ConfigError, Exclusions, ReportConfig};
pub use department::{DepartmentAliases, DepartmentClassifier};
pub use enrich::{Enrichment, NormalizationIndex, OverrideRecord, SkipReason};
pub use pipeline::{build_report, ReportError, ReportPaths, WeeklyReport};
pub use writer::{render_bundle, WriteError, LEAD_TIME_COLUMN};
