pub mod error;
pub mod level;
pub mod paths;
pub mod skeleton;
pub mod symbol;

pub use error::{ErrorCategory, Result, ResultExt, SkeletonError};
pub use level::ResolutionLevel;
pub use skeleton::{ExtractionFailure, Skeleton, SkeletonMetadata};
pub use symbol::{
    ClassInfo, FunctionInfo, Hierarchy, ModuleInfo, Node, PackageInfo, PackageSummary, Parameter,
    Signature, Symbol, SymbolInfo, SymbolKind,
};
