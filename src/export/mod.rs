pub mod csv_sink;
pub mod exporter;
pub mod kind;
pub mod transform;

pub use csv_sink::{CsvSink, SinkError};
pub use exporter::{Exporter, RecordStream};
pub use kind::ExportKind;
