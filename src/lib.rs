pub mod config;
pub mod vision;

// 重新导出vision模块中的常用类型和函数
pub use vision::{YoloSession, InitParams, ModelKind, Precision};
pub use vision::{Detection, BoundingBox, ClassScore, VisionError};
pub use vision::{load_image, load_labels, draw_detections};
