//! 描述符的编解码
//!
//! 编码流程：npy 序列化 -> zstd 压缩 -> base64 -> 文本，解码时严格按相反顺序执行。
//! npy 头部保存了 dtype 和形状，因此 0 行的矩阵也能原样还原。

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ndarray_npy::{ReadNpyExt, WriteNpyExt};

use crate::error::{Result, VitalsError};
use crate::matrix::{DESCRIPTOR_SIZE, DescriptorMatrix};

/// 作用于字节数据的一个编解码步骤
trait Stage: Sync {
    fn encode(&self, data: Vec<u8>) -> Result<Vec<u8>>;
    fn decode(&self, data: Vec<u8>) -> Result<Vec<u8>>;
}

struct Zstd;

impl Stage for Zstd {
    fn encode(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        Ok(zstd::bulk::compress(&data, 0)?)
    }

    fn decode(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        zstd::stream::decode_all(data.as_slice()).map_err(VitalsError::corrupt)
    }
}

struct Base64;

impl Stage for Base64 {
    fn encode(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        Ok(STANDARD.encode(data).into_bytes())
    }

    fn decode(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        STANDARD.decode(data).map_err(VitalsError::corrupt)
    }
}

static STAGES: [&dyn Stage; 2] = [&Zstd, &Base64];

/// 将描述符编码为可以直接存入数据库文本列的字符串
pub fn encode(descriptors: &DescriptorMatrix) -> Result<String> {
    let mut data = vec![];
    descriptors
        .write_npy(&mut data)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    for stage in STAGES.iter() {
        data = stage.encode(data)?;
    }

    // base64 的输出总是 ASCII
    String::from_utf8(data).map_err(|e| std::io::Error::other(e.to_string()).into())
}

/// 解码 [`encode`] 的输出，任何步骤失败或列数不是 128 都视为描述符损坏
pub fn decode(encoded: &str) -> Result<DescriptorMatrix> {
    let mut data = encoded.as_bytes().to_vec();

    for stage in STAGES.iter().rev() {
        data = stage.decode(data)?;
    }

    let descriptors =
        DescriptorMatrix::read_npy(Cursor::new(data)).map_err(VitalsError::corrupt)?;
    if descriptors.ncols() != DESCRIPTOR_SIZE {
        return Err(VitalsError::corrupt(format!(
            "expected {} columns, got {}",
            DESCRIPTOR_SIZE,
            descriptors.ncols()
        )));
    }
    Ok(descriptors)
}
