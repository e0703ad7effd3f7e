//! letterbox预处理模块
//!
//! 将任意尺寸的图像等比缩放到目标尺寸并在右侧和下侧填充，
//! 缩放比例会保留到解码阶段用于逆变换。

use image::{DynamicImage, GenericImageView, Rgb, RgbImage, imageops};

use crate::vision::error::VisionError;

/// letterbox预处理结果
///
/// `resize_scale`是连接预处理和后处理的唯一状态，
/// 解码时所有坐标都要除以它才能映射回原始图像。
#[derive(Debug, Clone)]
pub struct Letterboxed {
    /// 缩放并填充后的RGB图像，尺寸恰好为目标尺寸
    pub image: RgbImage,
    /// 等比缩放比例，取宽高两个方向缩放比例的较小值
    pub resize_scale: f32,
}

/// 对图像做letterbox预处理
///
/// 等比缩放图像使其恰好放入目标尺寸，剩余部分用填充色补齐。
/// 填充只出现在右侧和下侧，左上角对齐，因此解码时的逆变换
/// 不需要减去任何偏移量。该约定必须与模型训练时保持一致。
///
/// # 参数
/// * `img` - 原始图像
/// * `target_width` - 目标宽度
/// * `target_height` - 目标高度
/// * `fill` - 填充色，每通道相同
///
/// # 返回值
/// 返回填充后的图像与缩放比例
///
/// # 错误处理
/// 如果源图像为空会返回`InvalidImage`
///
/// # 示例
///
/// ```
/// use image::DynamicImage;
/// use ochre::vision::letterbox::letterbox;
///
/// let img = DynamicImage::new_rgb8(1280, 720);
/// let boxed = letterbox(&img, 640, 640, [114, 114, 114]).unwrap();
/// assert_eq!(boxed.resize_scale, 0.5);
/// ```
pub fn letterbox(
    img: &DynamicImage,
    target_width: u32,
    target_height: u32,
    fill: [u8; 3],
) -> Result<Letterboxed, VisionError> {
    let (src_width, src_height) = (img.width(), img.height());
    if src_width == 0 || src_height == 0 {
        return Err(VisionError::InvalidImage(format!(
            "源图像为空: {}x{}",
            src_width, src_height
        )));
    }

    // 通道顺序在这里统一转为RGB，与张量打包约定一致
    let rgb = img.to_rgb8();

    let scale_x = target_width as f32 / src_width as f32;
    let scale_y = target_height as f32 / src_height as f32;
    let resize_scale = scale_x.min(scale_y);

    // 等比缩放后的未填充尺寸，不会超过目标尺寸
    let unpad_width = ((src_width as f32 * resize_scale).round() as u32).min(target_width);
    let unpad_height = ((src_height as f32 * resize_scale).round() as u32).min(target_height);

    // 缩小用Triangle，放大用CatmullRom
    let filter = if resize_scale < 1.0 {
        imageops::FilterType::Triangle
    } else {
        imageops::FilterType::CatmullRom
    };
    let resized = imageops::resize(&rgb, unpad_width, unpad_height, filter);

    // 左上角对齐，填充只出现在右侧和下侧
    let mut canvas = RgbImage::from_pixel(target_width, target_height, Rgb(fill));
    imageops::replace(&mut canvas, &resized, 0, 0);

    Ok(Letterboxed {
        image: canvas,
        resize_scale,
    })
}
