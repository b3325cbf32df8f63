pub mod compression;
pub mod models;

// 重新导出常用类型和函数，方便直接使用
pub use compression::{to_compressed, from_compressed, to_binary, from_binary, validate_compressed_data, CodecError};
pub use models::{Post, ReadTime, ReadTimeError, PLACEHOLDER_IMAGE};
