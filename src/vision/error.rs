//! 错误类型模块
//!
//! 推理管线中所有核心操作统一返回该错误类型，调用方负责呈现错误和决定退出码。

use thiserror::Error;

/// 推理管线错误
#[derive(Debug, Error)]
pub enum VisionError {
    /// 源图像不可读或为空
    #[error("无效的图像: {0}")]
    InvalidImage(String),

    /// 会话参数非法，创建会话时检查一次
    #[error("无效的会话参数: {0}")]
    InvalidConfig(String),

    /// 模型没有可用的输入或输出张量，创建会话时检查一次
    #[error("模型拓扑错误: {0}")]
    ModelTopology(String),

    /// 推理后端执行失败，原始错误信息原样传出
    #[error("推理后端错误: {0}")]
    InferenceBackend(#[from] ort::Error),

    /// 输出张量的形状与配置的模型类型不符
    #[error("模型输出形状不符合预期: {0:?}")]
    UnexpectedOutputShape(Vec<i64>),
}
