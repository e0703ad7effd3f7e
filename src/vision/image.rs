use std::path::Path;

use image::{DynamicImage, GenericImageView};

use crate::vision::error::VisionError;

/// 加载图像文件
///
/// 从指定路径加载图像文件并做基本有效性检查。
///
/// # 参数
/// * `path` - 图像文件路径
///
/// # 返回值
/// 返回加载的DynamicImage对象
///
/// # 错误处理
/// 文件不存在、解码失败或图像为空时返回`InvalidImage`
///
/// # 示例
///
/// ```no_run
/// use ochre::load_image;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let image = load_image("path/to/image.jpg")?;
/// # Ok(())
/// # }
/// ```
pub fn load_image(path: &str) -> Result<DynamicImage, VisionError> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(VisionError::InvalidImage(format!(
            "图像文件不存在: {:?}",
            path
        )));
    }

    let img = image::open(path)
        .map_err(|e| VisionError::InvalidImage(format!("无法加载图像: {}", e)))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(VisionError::InvalidImage("图像为空".to_string()));
    }

    Ok(img)
}
