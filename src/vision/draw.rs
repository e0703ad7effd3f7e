//! 可视化绘制模块
//!
//! 在原始图像上绘制检测框和关键点。颜色由类别ID散列得到，
//! 同一类别在任何运行中颜色都相同。

use image::{DynamicImage, GenericImageView};
use raqote::{DrawOptions, DrawTarget, LineJoin, PathBuilder, SolidSource, Source, StrokeStyle};

use crate::vision::bounds::Detection;

/// 根据类别ID生成确定性的颜色
///
/// 用乘法散列把类别ID打散到颜色空间，低位或上0x40保证
/// 颜色不会过暗。同一类别ID总是得到同一颜色。
pub fn class_color(class_id: usize) -> SolidSource {
    let hash = (class_id as u32).wrapping_mul(2654435761);
    SolidSource {
        r: (hash >> 16) as u8 | 0x40,
        g: (hash >> 8) as u8 | 0x40,
        b: hash as u8 | 0x40,
        a: 0xFF,
    }
}

/// 在图像上绘制检测结果
///
/// 按类别颜色绘制检测框，姿态结果的关键点绘制为小方块。
///
/// # 参数
/// * `image` - 原始图像
/// * `detections` - 检测结果列表
///
/// # 返回值
/// 返回绘制了检测框的图像
pub fn draw_detections(image: &DynamicImage, detections: &[Detection]) -> DynamicImage {
    let (img_width, img_height) = image.dimensions();
    let mut dt = DrawTarget::new(img_width as i32, img_height as i32);

    // 将原始图像绘制到DrawTarget上
    let rgba_image = image.to_rgba8();
    let image_data: Vec<u32> = rgba_image
        .chunks(4)
        .map(|pixel| {
            let b = pixel[2];
            let g = pixel[1];
            let r = pixel[0];
            let a = pixel[3];
            u32::from_le_bytes([b, g, r, a])
        })
        .collect();

    let img = raqote::Image {
        width: img_width as i32,
        height: img_height as i32,
        data: &image_data,
    };

    dt.draw_image_at(0.0, 0.0, &img, &DrawOptions::new());

    for detection in detections {
        let bbox = &detection.bbox;
        let color = class_color(detection.class_id);

        let mut pb = PathBuilder::new();
        pb.rect(bbox.x1, bbox.y1, bbox.width(), bbox.height());
        let path = pb.finish();

        dt.stroke(
            &path,
            &Source::Solid(color),
            &StrokeStyle {
                join: LineJoin::Round,
                width: 2.0,
                ..StrokeStyle::default()
            },
            &DrawOptions::default(),
        );

        // 姿态模型的关键点绘制为4x4小方块
        for keypoint in &detection.keypoints {
            let mut pb = PathBuilder::new();
            pb.rect(keypoint[0] - 2.0, keypoint[1] - 2.0, 4.0, 4.0);
            dt.fill(&pb.finish(), &Source::Solid(color), &DrawOptions::default());
        }

        // 可以添加文本标签显示类别和置信度
        // 这里暂时省略，如需要可后续添加
    }

    // 将DrawTarget转换回图像
    let pixels: Vec<u8> = dt
        .get_data()
        .iter()
        .flat_map(|&pixel| {
            let bytes = pixel.to_le_bytes();
            [bytes[2], bytes[1], bytes[0], bytes[3]]
        })
        .collect();

    DynamicImage::ImageRgba8(
        image::ImageBuffer::from_raw(img_width, img_height, pixels)
            .expect("渲染缓冲区尺寸与图像不符"),
    )
}
