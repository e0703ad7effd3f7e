//! 推理会话模块
//!
//! 封装ONNX Runtime会话的创建和单次前向推理。该模块只负责
//! 按名称喂入输入张量、取出输出张量，不解释张量内容。

use ndarray::Array4;
use ort::execution_providers::CUDAExecutionProvider;
use ort::inputs;
use ort::session::{Session, builder::GraphOptimizationLevel};
use tracing::{debug, info};

use crate::vision::error::VisionError;
use crate::vision::params::InitParams;
use crate::vision::tensor::{TensorElement, to_input};

/// ONNX Runtime推理会话
///
/// 创建时查询并保存输入输出张量名称，之后每次推理
/// 都按这两个名称执行。输入输出张量名称缺失在创建时
/// 即报错，不会推迟到推理阶段。
pub struct InferenceSession {
    session: Session,
    input_name: String,
    output_name: String,
}

impl InferenceSession {
    /// 创建推理会话
    ///
    /// 加载ONNX模型并应用优化配置，图优化级别、内部线程数
    /// 和CUDA加速均在此刻固定。
    ///
    /// # 错误处理
    /// 模型加载失败返回`InferenceBackend`，
    /// 模型没有输入或输出张量返回`ModelTopology`
    pub fn create(params: &InitParams) -> Result<Self, VisionError> {
        info!("加载模型: {}", params.model_path);

        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(params.intra_threads)?;

        if params.use_cuda {
            builder =
                builder.with_execution_providers([CUDAExecutionProvider::default().build()])?;
        }

        let session = builder.commit_from_file(&params.model_path)?;

        debug!(
            "模型输入数量: {}, 输出数量: {}",
            session.inputs.len(),
            session.outputs.len()
        );

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| VisionError::ModelTopology("模型没有可用的输入张量".to_string()))?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| VisionError::ModelTopology("模型没有可用的输出张量".to_string()))?;

        debug!("输入张量: {}, 输出张量: {}", input_name, output_name);

        Ok(Self {
            session,
            input_name,
            output_name,
        })
    }

    /// 输入张量名称
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// 输出张量名称
    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// 执行一次前向推理
    ///
    /// 阻塞直到推理完成或后端报错。输出张量的形状和数据会
    /// 复制出来返回，数据统一转换为f32，后端的缓冲区不会被
    /// 解码阶段继续引用。
    ///
    /// # 参数
    /// * `input` - 形状为(1, 3, height, width)的输入张量
    ///
    /// # 返回值
    /// 返回输出张量的形状和f32数据
    ///
    /// # 错误处理
    /// 后端执行失败返回`InferenceBackend`，原始错误信息原样传出
    pub fn run<T: TensorElement>(
        &mut self,
        input: &Array4<T>,
    ) -> Result<(Vec<i64>, Vec<f32>), VisionError> {
        let input_tensor = to_input(input)?;
        let outputs = self
            .session
            .run(inputs![self.input_name.as_str() => input_tensor])?;

        let (shape, data) = outputs[self.output_name.as_str()].try_extract_tensor::<T>()?;
        let dims: Vec<i64> = shape.iter().copied().collect();
        let values: Vec<f32> = data.iter().map(|value| value.to_f32()).collect();

        Ok((dims, values))
    }
}
