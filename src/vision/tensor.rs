//! 张量打包模块
//!
//! 将letterbox后的图像打包为平面通道布局的输入张量，
//! 并转换为ONNX Runtime的输入格式。元素类型在会话创建时
//! 选定一次，float32和float16模型共用同一套代码。

use half::f16;
use image::RgbImage;
use ndarray::{Array, Array4};
use ort::tensor::PrimitiveTensorElementType;
use ort::value::{Tensor, TensorValueType, Value};

use crate::vision::error::VisionError;

/// 输入张量元素类型
///
/// 归一化像素值与f32之间的双向转换，由具体精度类型实现。
pub trait TensorElement:
    PrimitiveTensorElementType + Copy + std::fmt::Debug + Send + Sync + 'static
{
    /// 从归一化的f32值构造
    fn from_norm(value: f32) -> Self;
    /// 转换回f32
    fn to_f32(self) -> f32;
}

impl TensorElement for f32 {
    fn from_norm(value: f32) -> Self {
        value
    }

    fn to_f32(self) -> f32 {
        self
    }
}

impl TensorElement for f16 {
    fn from_norm(value: f32) -> Self {
        f16::from_f32(value)
    }

    fn to_f32(self) -> f32 {
        f16::to_f32(self)
    }
}

/// 将图像转换为模型输入张量
///
/// 将图像转换为模型所需的四维张量格式，包括：
/// 1. 归一化像素值到[0, 1]范围，除以255.0
/// 2. 通道顺序为RGB
/// 3. 维度顺序为NCHW平面布局
///
/// 除以255.0之外不做任何均值方差归一化，该约定是模型契约的
/// 一部分，与训练时不一致会导致检测结果系统性错误。
///
/// # 参数
/// * `img` - letterbox后的RGB图像
///
/// # 返回值
/// 返回形状为(1, 3, height, width)的四维张量，像素值范围[0, 1]
pub fn image_to_tensor<T: TensorElement>(img: &RgbImage) -> Array4<T> {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let mut tensor = Array::from_elem((1, 3, height, width), T::from_norm(0.0));

    // 遍历所有像素，将RGB值归一化后存入对应通道平面
    for (x, y, pixel) in img.enumerate_pixels() {
        let x = x as usize;
        let y = y as usize;
        let [r, g, b] = pixel.0;

        tensor[[0, 0, y, x]] = T::from_norm(r as f32 / 255.0);
        tensor[[0, 1, y, x]] = T::from_norm(g as f32 / 255.0);
        tensor[[0, 2, y, x]] = T::from_norm(b as f32 / 255.0);
    }

    tensor
}

/// 将ndarray数组转换为ONNX Runtime输入张量
///
/// # 参数
/// * `mats` - 四维数组，形状为(1, 3, height, width)
///
/// # 返回值
/// 返回对应的ONNX Runtime张量
pub fn to_input<T: TensorElement>(
    mats: &Array4<T>,
) -> Result<Value<TensorValueType<T>>, VisionError> {
    let shape: Vec<usize> = mats.shape().to_vec();
    let (data, _offset) = mats.clone().into_raw_vec_and_offset();
    let tensor = Tensor::from_array(([shape[0], shape[1], shape[2], shape[3]], data))?;
    Ok(tensor)
}
