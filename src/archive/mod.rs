//! Archive assembly: streaming the output package.

mod writer;

pub use writer::{MAIN_LIBRARY, PackageAssembler};
