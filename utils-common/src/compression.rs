use std::io::{self, Read, Write};
use flate2::{Compression, write::GzEncoder, read::GzDecoder};
use thiserror::Error;

/// 魔数常量 - 用于标识快照文件格式
pub const MAGIC_BYTES: &[u8] = b"BLOGC";

/// 头部长度: 魔数 + 版本号(2) + 原始数据大小(4)
pub const HEADER_LEN: usize = MAGIC_BYTES.len() + 2 + 4;

/// 快照编解码错误
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("数据太短，无法解析: {0} 字节")]
    TooShort(usize),

    #[error("无效的文件格式：魔数不匹配")]
    BadMagic,

    #[error("不支持的版本: {0}.{1}")]
    UnsupportedVersion(u8, u8),

    #[error("解压后数据大小不匹配: 期望 {expected} 字节, 实际 {actual} 字节")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("数据过大，无法写入头部: {0} 字节")]
    TooLarge(usize),

    #[error("压缩数据读写失败")]
    Io(#[from] io::Error),

    #[error("序列化失败: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("反序列化失败: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// 将对象序列化为二进制格式
pub fn to_binary<T: serde::Serialize>(obj: &T) -> Result<Vec<u8>, CodecError> {
    Ok(bincode::serde::encode_to_vec(obj, bincode::config::standard())?)
}

/// 从二进制格式反序列化对象
pub fn from_binary<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
    let (value, _) = bincode::serde::decode_from_slice(data, bincode::config::standard())?;
    Ok(value)
}

/// 将对象序列化为压缩的二进制格式
pub fn to_compressed<T: serde::Serialize>(obj: &T, version: [u8; 2]) -> Result<Vec<u8>, CodecError> {
    let binary = to_binary(obj)?;
    let data_len = u32::try_from(binary.len()).map_err(|_| CodecError::TooLarge(binary.len()))?;

    let mut output = Vec::with_capacity(HEADER_LEN + binary.len() / 2);
    output.extend_from_slice(MAGIC_BYTES);
    output.extend_from_slice(&version);
    output.extend_from_slice(&data_len.to_le_bytes());

    let mut encoder = GzEncoder::new(output, Compression::best());
    encoder.write_all(&binary)?;
    Ok(encoder.finish()?)
}

/// 从压缩的二进制格式反序列化对象，使用默认最大版本1
pub fn from_compressed<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
    from_compressed_with_max_version(data, 1)
}

/// 从压缩的二进制格式反序列化对象，允许指定支持的最大主版本
pub fn from_compressed_with_max_version<T: serde::de::DeserializeOwned>(
    data: &[u8],
    max_version: u8,
) -> Result<T, CodecError> {
    validate_compressed_data_with_max_version(data, max_version)?;

    let size_offset = MAGIC_BYTES.len() + 2;
    let mut size_bytes = [0u8; 4];
    size_bytes.copy_from_slice(&data[size_offset..HEADER_LEN]);
    let original_size = u32::from_le_bytes(size_bytes) as usize;

    // 头部长度不可信，预分配以压缩数据大小为上限
    let compressed = &data[HEADER_LEN..];
    let mut decoder = GzDecoder::new(compressed);
    let mut decompressed = Vec::with_capacity(original_size.min(compressed.len().saturating_mul(8)));
    decoder.read_to_end(&mut decompressed)?;

    if decompressed.len() != original_size {
        return Err(CodecError::LengthMismatch {
            expected: original_size,
            actual: decompressed.len(),
        });
    }

    from_binary(&decompressed)
}

/// 验证压缩数据头部是否有效
pub fn validate_compressed_data(data: &[u8]) -> Result<[u8; 2], CodecError> {
    validate_compressed_data_with_max_version(data, 1)
}

/// 验证压缩数据头部是否有效，允许指定支持的最大主版本
pub fn validate_compressed_data_with_max_version(
    data: &[u8],
    max_version: u8,
) -> Result<[u8; 2], CodecError> {
    if data.len() < HEADER_LEN {
        return Err(CodecError::TooShort(data.len()));
    }

    if &data[..MAGIC_BYTES.len()] != MAGIC_BYTES {
        return Err(CodecError::BadMagic);
    }

    let version_offset = MAGIC_BYTES.len();
    let version = [data[version_offset], data[version_offset + 1]];
    if version[0] > max_version {
        return Err(CodecError::UnsupportedVersion(version[0], version[1]));
    }

    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sample {
        name: String,
        values: Vec<u32>,
    }

    fn sample() -> Sample {
        Sample {
            name: "catalog".to_string(),
            values: vec![8, 12, 10],
        }
    }

    #[test]
    fn header_carries_magic_and_version() {
        let data = to_compressed(&sample(), [1, 2]).unwrap();
        assert_eq!(&data[..5], MAGIC_BYTES);
        assert_eq!(validate_compressed_data(&data).unwrap(), [1, 2]);

        let decoded: Sample = from_compressed(&data).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn newer_major_version_is_rejected() {
        let data = to_compressed(&sample(), [2, 0]).unwrap();
        assert!(matches!(
            from_compressed::<Sample>(&data),
            Err(CodecError::UnsupportedVersion(2, 0))
        ));
        assert!(from_compressed_with_max_version::<Sample>(&data, 2).is_ok());
    }

    #[test]
    fn truncated_or_foreign_data_is_rejected() {
        assert!(matches!(validate_compressed_data(b"BLOG"), Err(CodecError::TooShort(4))));
        assert!(matches!(
            validate_compressed_data(b"NECMP\x03\x00\x00\x00\x00\x00"),
            Err(CodecError::BadMagic)
        ));
    }

    #[test]
    fn length_field_is_checked_after_inflate() {
        let mut data = to_compressed(&sample(), [1, 0]).unwrap();
        let size_offset = MAGIC_BYTES.len() + 2;
        data[size_offset] = data[size_offset].wrapping_add(1);

        assert!(matches!(
            from_compressed::<Sample>(&data),
            Err(CodecError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn forged_huge_length_returns_error() {
        let mut data = to_compressed(&vec![1u32, 2, 3], [1, 0]).unwrap();
        let size_offset = MAGIC_BYTES.len() + 2;
        data[size_offset..HEADER_LEN].copy_from_slice(&u32::MAX.to_le_bytes());

        assert!(matches!(
            from_compressed::<Vec<u32>>(&data),
            Err(CodecError::LengthMismatch { expected, .. }) if expected == u32::MAX as usize
        ));
    }
}
