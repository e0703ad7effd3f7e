//! 高层会话模块
//!
//! 将预处理、推理和解码串成一条同步管线。一次调用内
//! 严格顺序执行，没有内部并行，也没有重试。

use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info};

use crate::config::{CLASSIFY_TOP_K, LETTERBOX_FILL};
use crate::vision::bounds::{ClassScore, Detection};
use crate::vision::decode::{decode_classes, decode_detections, decode_poses};
use crate::vision::error::VisionError;
use crate::vision::letterbox::{Letterboxed, letterbox};
use crate::vision::params::{InitParams, ModelKind, Precision};
use crate::vision::session::InferenceSession;
use crate::vision::tensor::{TensorElement, image_to_tensor};

/// YOLO推理会话
///
/// 封装了完整的推理流程，包括图像预处理、模型推理和结果解码。
/// 参数在创建时校验一次，之后保持只读。`detect`和`classify`
/// 都需要独占引用，同一会话同时只有一次推理在执行。
///
/// # 示例
///
/// ```no_run
/// use ochre::{YoloSession, InitParams, load_image};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let params = InitParams::new("path/to/model.onnx")
///     .with_confidence_threshold(0.5);
/// let mut session = YoloSession::create(params)?;
///
/// let image = load_image("path/to/image.jpg")?;
/// let detections = session.detect(&image)?;
/// # Ok(())
/// # }
/// ```
pub struct YoloSession {
    session: InferenceSession,
    params: InitParams,
}

impl YoloSession {
    /// 创建推理会话
    ///
    /// 先校验参数再创建后端会话，两步中的任何失败都在
    /// 这里报出，不会推迟到推理阶段。
    pub fn create(params: InitParams) -> Result<Self, VisionError> {
        params.validate()?;
        let session = InferenceSession::create(&params)?;
        Ok(Self { session, params })
    }

    /// 会话参数
    pub fn params(&self) -> &InitParams {
        &self.params
    }

    /// 对图像执行目标检测或姿态估计
    ///
    /// 完整流程：letterbox预处理、张量打包、前向推理、输出解码。
    ///
    /// # 参数
    /// * `img` - 待检测的图像
    ///
    /// # 返回值
    /// 返回按置信度降序排列的检测结果列表
    ///
    /// # 错误处理
    /// 图像为空、后端执行失败或输出形状不符时返回对应错误，
    /// 此时不返回任何部分结果
    pub fn detect(&mut self, img: &DynamicImage) -> Result<Vec<Detection>, VisionError> {
        let boxed = letterbox(
            img,
            self.params.input_width,
            self.params.input_height,
            LETTERBOX_FILL,
        )?;
        let (shape, data) = self.forward(&boxed)?;

        let detections = match self.params.kind {
            ModelKind::Detect => decode_detections(
                &shape,
                &data,
                boxed.resize_scale,
                self.params.confidence_threshold,
                self.params.iou_threshold,
            )?,
            ModelKind::Pose => decode_poses(
                &shape,
                &data,
                boxed.resize_scale,
                self.params.confidence_threshold,
                self.params.iou_threshold,
                self.params.keypoint_count,
            )?,
            ModelKind::Classify => {
                return Err(VisionError::InvalidConfig(
                    "分类模型请使用classify接口".to_string(),
                ));
            }
        };

        debug!("检测到 {} 个目标", detections.len());
        Ok(detections)
    }

    /// 对图像执行分类
    ///
    /// # 参数
    /// * `img` - 待分类的图像
    ///
    /// # 返回值
    /// 返回按分数降序排列的top-K分类结果
    pub fn classify(&mut self, img: &DynamicImage) -> Result<Vec<ClassScore>, VisionError> {
        if self.params.kind != ModelKind::Classify {
            return Err(VisionError::InvalidConfig(
                "检测模型请使用detect接口".to_string(),
            ));
        }

        let boxed = letterbox(
            img,
            self.params.input_width,
            self.params.input_height,
            LETTERBOX_FILL,
        )?;
        let (shape, data) = self.forward(&boxed)?;

        decode_classes(&shape, &data, CLASSIFY_TOP_K)
    }

    /// 预热会话
    ///
    /// 用一张全黑图像跑一遍完整推理，触发后端的内存分配，
    /// 让后续首次真实推理的耗时更稳定。
    pub fn warm_up(&mut self) -> Result<(), VisionError> {
        info!("预热会话");
        let dummy = DynamicImage::new_rgb8(self.params.input_width, self.params.input_height);
        let boxed = letterbox(
            &dummy,
            self.params.input_width,
            self.params.input_height,
            LETTERBOX_FILL,
        )?;
        self.forward(&boxed).map(|_| ())
    }

    /// 按会话精度执行一次前向推理
    fn forward(&mut self, boxed: &Letterboxed) -> Result<(Vec<i64>, Vec<f32>), VisionError> {
        let start = Instant::now();
        let output = match self.params.precision {
            Precision::Float32 => self.forward_typed::<f32>(boxed),
            Precision::Float16 => self.forward_typed::<half::f16>(boxed),
        };
        debug!("模型推理耗时: {:?}", start.elapsed());
        output
    }

    fn forward_typed<T: TensorElement>(
        &mut self,
        boxed: &Letterboxed,
    ) -> Result<(Vec<i64>, Vec<f32>), VisionError> {
        let tensor = image_to_tensor::<T>(&boxed.image);
        self.session.run(&tensor)
    }
}
