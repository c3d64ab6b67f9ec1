use thiserror::Error;

pub type Result<T, E = VitalsError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum VitalsError {
    /// 上传或读取的数据无法解码为图片
    #[error("bad image provided: {0}")]
    BadImage(String),
    /// 数据库中保存的描述符无法解码，属于数据完整性问题
    #[error("corrupt descriptor: {0}")]
    CorruptDescriptor(String),
    /// 请求未携带有效的身份信息
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VitalsError {
    pub fn bad_image(err: impl ToString) -> Self {
        Self::BadImage(err.to_string())
    }

    pub fn corrupt(err: impl ToString) -> Self {
        Self::CorruptDescriptor(err.to_string())
    }
}
