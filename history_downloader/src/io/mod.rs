pub mod csv_export;
pub mod sink;

pub use csv_export::{CsvArtifact, ExportMode, build_artifacts};
pub use sink::{DataSink, DirectorySink, SinkError};
