//! Loading script files from disk

mod processor;

pub use processor::{read_source, FileProcessor, FileProcessorError, SourceFile};

/// Compile-time maximum script size in bytes
pub fn get_max_file_size() -> u64 {
    FileProcessor::max_file_size()
}
