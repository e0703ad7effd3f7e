//! 会话参数模块
//!
//! 会话创建时校验一次参数，创建后参数保持只读。

use crate::config::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_INPUT_HEIGHT, DEFAULT_INPUT_WIDTH,
    DEFAULT_INTRA_THREADS, DEFAULT_IOU_THRESHOLD, DEFAULT_KEYPOINT_COUNT,
};
use crate::vision::error::VisionError;

/// 模型任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// 目标检测
    Detect,
    /// 姿态估计
    Pose,
    /// 图像分类
    Classify,
}

/// 模型数值精度，在会话创建时选定一次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// float32模型
    Float32,
    /// float16模型
    Float16,
}

/// 会话初始化参数
///
/// 会话创建后不再允许修改，推理过程中所有阈值和尺寸均来自该结构。
///
/// # 示例
///
/// ```
/// use ochre::{InitParams, ModelKind};
///
/// let params = InitParams::new("path/to/model.onnx")
///     .with_kind(ModelKind::Detect)
///     .with_confidence_threshold(0.5)
///     .with_iou_threshold(0.45);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct InitParams {
    /// ONNX模型文件路径
    pub model_path: String,
    /// 任务类型
    pub kind: ModelKind,
    /// 数值精度
    pub precision: Precision,
    /// 模型输入宽度
    pub input_width: u32,
    /// 模型输入高度
    pub input_height: u32,
    /// 置信度阈值，低于此值的候选框直接丢弃
    pub confidence_threshold: f32,
    /// NMS IOU阈值，用于去除重复检测
    pub iou_threshold: f32,
    /// 姿态模型的关键点数量
    pub keypoint_count: usize,
    /// 是否使用CUDA加速
    pub use_cuda: bool,
    /// 推理后端内部线程数
    pub intra_threads: usize,
}

impl InitParams {
    /// 使用默认参数创建
    pub fn new(model_path: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            kind: ModelKind::Detect,
            precision: Precision::Float32,
            input_width: DEFAULT_INPUT_WIDTH,
            input_height: DEFAULT_INPUT_HEIGHT,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            keypoint_count: DEFAULT_KEYPOINT_COUNT,
            use_cuda: false,
            intra_threads: DEFAULT_INTRA_THREADS,
        }
    }

    /// 设置任务类型
    pub fn with_kind(mut self, kind: ModelKind) -> Self {
        self.kind = kind;
        self
    }

    /// 设置数值精度
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// 设置模型输入尺寸
    pub fn with_input_size(mut self, width: u32, height: u32) -> Self {
        self.input_width = width;
        self.input_height = height;
        self
    }

    /// 设置置信度阈值 (0.0 - 1.0)
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// 设置NMS IOU阈值 (0.0 - 1.0)
    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    /// 设置姿态模型的关键点数量
    pub fn with_keypoint_count(mut self, count: usize) -> Self {
        self.keypoint_count = count;
        self
    }

    /// 设置是否使用CUDA加速
    pub fn with_cuda(mut self, enable: bool) -> Self {
        self.use_cuda = enable;
        self
    }

    /// 设置推理后端内部线程数
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = threads;
        self
    }

    /// 校验参数合法性
    ///
    /// 阈值必须在[0,1]范围内，输入尺寸必须大于0。
    /// 会话创建时调用一次，之后不再检查。
    pub fn validate(&self) -> Result<(), VisionError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(VisionError::InvalidConfig(format!(
                "置信度阈值必须在[0,1]范围内: {}",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(VisionError::InvalidConfig(format!(
                "IOU阈值必须在[0,1]范围内: {}",
                self.iou_threshold
            )));
        }
        if self.input_width == 0 || self.input_height == 0 {
            return Err(VisionError::InvalidConfig(format!(
                "输入尺寸必须大于0: {}x{}",
                self.input_width, self.input_height
            )));
        }
        if self.kind == ModelKind::Pose && self.keypoint_count == 0 {
            return Err(VisionError::InvalidConfig(
                "姿态模型的关键点数量必须大于0".to_string(),
            ));
        }
        Ok(())
    }
}
