//! Vision模块 - 基于ONNX Runtime的YOLOv8推理管线
//!
//! 该模块提供了一整套推理功能，包括：
//! - 会话创建与参数校验
//! - letterbox图像预处理
//! - 输入张量打包（支持float32和float16）
//! - 模型推理
//! - 输出解码（检测、姿态、分类）
//! - 可视化绘制
//!
//! # 主要组件
//!
//! - YoloSession：核心会话结构，封装了完整的推理流程
//! - InitParams：会话参数，创建后不可变
//! - load_image：加载图像文件
//! - load_labels：加载类别名称列表
//! - draw_detections：在图像上绘制检测结果
//!
//! # 工作流程
//!
//! 1. 构造InitParams并配置任务类型、阈值等参数
//! 2. 使用YoloSession::create创建会话
//! 3. 使用load_image加载待检测图像
//! 4. 调用detect或classify方法执行推理
//! 5. 使用draw_detections绘制检测结果
//!
//! # 示例
//!
//! ```no_run
//! use ochre::{YoloSession, InitParams, load_image, draw_detections};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let params = InitParams::new("path/to/model.onnx")
//!     .with_confidence_threshold(0.5)
//!     .with_iou_threshold(0.45);
//!
//! let mut session = YoloSession::create(params)?;
//! let image = load_image("path/to/image.jpg")?;
//!
//! let detections = session.detect(&image)?;
//! let result_image = draw_detections(&image, &detections);
//! # Ok(())
//! # }
//! ```

pub mod bounds;
pub mod decode;
pub mod detect;
pub mod draw;
pub mod error;
pub mod image;
pub mod labels;
pub mod letterbox;
pub mod params;
pub mod session;
pub mod tensor;

// 重新导出常用类型和函数
pub use bounds::{BoundingBox, ClassScore, Detection};
pub use detect::YoloSession;
pub use draw::draw_detections;
pub use error::VisionError;
pub use self::image::load_image;
pub use labels::load_labels;
pub use letterbox::{Letterboxed, letterbox};
pub use params::{InitParams, ModelKind, Precision};
