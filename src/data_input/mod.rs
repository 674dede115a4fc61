// src/data_input/mod.rs

pub mod field_parser;
pub mod ts_data;
pub mod ts_run;

pub use field_parser::{parse_field_file, parse_field_reader, ParsedField};
pub use ts_data::{TheorySpectra, TsData};
pub use ts_run::{CoherenceModel, IecCoherence, TsGrid, TsRun};

// src/data_input/mod.rs
