//! Token-level preprocessing: macros, conditionals and includes

pub mod error;
pub mod macros;
pub mod preprocessor;
pub mod resolver;

pub use error::{IncludeError, PreprocessError};
pub use macros::MacroTable;
pub use preprocessor::{PreprocessStats, Preprocessor};
pub use resolver::{FileSystemResolver, IncludeResolver, MemoryResolver, ResolvedSource};
