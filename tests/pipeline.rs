use half::f16;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

use ochre::config::LETTERBOX_FILL;
use ochre::vision::decode::{apply_nms, decode_classes, decode_detections, decode_poses};
use ochre::vision::draw::class_color;
use ochre::vision::letterbox::letterbox;
use ochre::vision::tensor::{TensorElement, image_to_tensor};
use ochre::{BoundingBox, Detection, InitParams, VisionError, draw_detections, load_labels};

#[cfg(test)]
mod tests {
    use super::*;

    /// 源尺寸与目标尺寸一致时不缩放也不填充
    #[test]
    fn test_letterbox_identity() -> Result<(), Box<dyn std::error::Error>> {
        let img = DynamicImage::new_rgb8(640, 640);
        let boxed = letterbox(&img, 640, 640, LETTERBOX_FILL)?;

        assert_eq!(boxed.resize_scale, 1.0);
        assert_eq!(boxed.image.width(), 640);
        assert_eq!(boxed.image.height(), 640);
        // 右下角仍是图像内容而不是填充色
        assert_eq!(*boxed.image.get_pixel(639, 639), Rgb([0, 0, 0]));
        Ok(())
    }

    /// 1280x720到640x640：等比缩放0.5，下方填充280行
    #[test]
    fn test_letterbox_aspect_and_padding() -> Result<(), Box<dyn std::error::Error>> {
        let img = DynamicImage::new_rgb8(1280, 720);
        let boxed = letterbox(&img, 640, 640, LETTERBOX_FILL)?;

        assert_eq!(boxed.resize_scale, 0.5);
        assert_eq!(boxed.image.width(), 640);
        assert_eq!(boxed.image.height(), 640);

        // 未填充区域为640x360，内容全黑
        assert_eq!(*boxed.image.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*boxed.image.get_pixel(639, 359), Rgb([0, 0, 0]));
        // 从第360行开始是填充色，右侧没有填充
        assert_eq!(*boxed.image.get_pixel(0, 360), Rgb(LETTERBOX_FILL));
        assert_eq!(*boxed.image.get_pixel(639, 639), Rgb(LETTERBOX_FILL));
        Ok(())
    }

    /// 输出尺寸永远不超过目标尺寸，放大和缩小都成立
    #[test]
    fn test_letterbox_never_exceeds_target() -> Result<(), Box<dyn std::error::Error>> {
        for (w, h) in [(333, 777), (320, 320), (2000, 50), (1, 1)] {
            let img = DynamicImage::new_rgb8(w, h);
            let boxed = letterbox(&img, 640, 640, LETTERBOX_FILL)?;
            assert_eq!(boxed.image.width(), 640);
            assert_eq!(boxed.image.height(), 640);

            let expected = (640.0 / w as f32).min(640.0 / h as f32);
            assert!((boxed.resize_scale - expected).abs() < 1e-6);
        }
        Ok(())
    }

    /// 空图像返回InvalidImage
    #[test]
    fn test_letterbox_empty_image() {
        let img = DynamicImage::new_rgb8(0, 0);
        let result = letterbox(&img, 640, 640, LETTERBOX_FILL);
        assert!(matches!(result, Err(VisionError::InvalidImage(_))));
    }

    /// 像素0和255分别精确映射到0.0和1.0，且通道平面布局正确
    #[test]
    fn test_tensor_pack_range_and_layout() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([255, 128, 64]));

        let tensor = image_to_tensor::<f32>(&img);
        assert_eq!(tensor.shape(), &[1, 3, 1, 2]);

        assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
        assert_eq!(tensor[[0, 0, 0, 1]], 1.0);
        assert_eq!(tensor[[0, 1, 0, 1]], 128.0 / 255.0);
        assert_eq!(tensor[[0, 2, 0, 1]], 64.0 / 255.0);

        for value in tensor.iter() {
            assert!((0.0..=1.0).contains(value));
        }
    }

    /// float16打包同样保证0和255的精确映射
    #[test]
    fn test_tensor_pack_half_precision() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([255, 255, 255]));

        let tensor = image_to_tensor::<f16>(&img);
        assert_eq!(tensor[[0, 0, 0, 0]].to_f32(), 0.0);
        assert_eq!(tensor[[0, 0, 0, 1]].to_f32(), 1.0);
    }

    /// objectness低于阈值的行绝不出现在最终结果中
    #[test]
    fn test_decode_confidence_filter() -> Result<(), Box<dyn std::error::Error>> {
        let shape = [1i64, 2, 7];
        #[rustfmt::skip]
        let data = [
            10.0f32, 10.0, 5.0, 5.0, 0.3, 0.9, 0.1,
            320.0, 320.0, 100.0, 100.0, 0.9, 0.1, 0.8,
        ];

        let detections = decode_detections(&shape, &data, 1.0, 0.5, 0.5)?;

        assert_eq!(detections.len(), 1);
        let det = &detections[0];
        assert_eq!(det.class_id, 1);
        assert!((det.confidence - 0.72).abs() < 1e-5);
        assert!((det.bbox.x1 - 270.0).abs() < 1e-4);
        assert!((det.bbox.y1 - 270.0).abs() < 1e-4);
        assert!((det.bbox.width() - 100.0).abs() < 1e-4);
        assert!((det.bbox.height() - 100.0).abs() < 1e-4);
        Ok(())
    }

    /// 中心格式转角点并除以缩放比例后恢复原始图像坐标
    #[test]
    fn test_decode_rescale_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        // 原始图像中的框：中心(100,100)，尺寸50x60
        // letterbox缩放0.5后在填充空间中为中心(50,50)，尺寸25x30
        let shape = [1i64, 1, 6];
        let data = [50.0f32, 50.0, 25.0, 30.0, 0.9, 1.0];

        let detections = decode_detections(&shape, &data, 0.5, 0.5, 0.5)?;

        assert_eq!(detections.len(), 1);
        let bbox = &detections[0].bbox;
        assert!((bbox.x1 - 75.0).abs() < 1e-4);
        assert!((bbox.y1 - 70.0).abs() < 1e-4);
        assert!((bbox.width() - 50.0).abs() < 1e-4);
        assert!((bbox.height() - 60.0).abs() < 1e-4);
        Ok(())
    }

    /// IOU超过阈值的两个候选框只保留分数较高的一个
    #[test]
    fn test_nms_suppresses_overlap() {
        // 两个框的IOU恰为0.6，超过阈值0.5
        let detections = vec![
            Detection::new(BoundingBox::new(25.0, 0.0, 125.0, 100.0), 0, 0.85),
            Detection::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0), 0, 0.9),
        ];

        let kept = apply_nms(detections, 0.5);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].confidence, 0.9);
        assert_eq!(kept[0].bbox.x1, 0.0);
    }

    /// 不重叠的框全部保留，且按置信度降序排列
    #[test]
    fn test_nms_keeps_disjoint() {
        let detections = vec![
            Detection::new(BoundingBox::new(0.0, 0.0, 50.0, 50.0), 0, 0.6),
            Detection::new(BoundingBox::new(200.0, 200.0, 250.0, 250.0), 1, 0.8),
            Detection::new(BoundingBox::new(400.0, 0.0, 450.0, 50.0), 2, 0.7),
        ];

        let kept = apply_nms(detections, 0.5);

        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].confidence, 0.8);
        assert_eq!(kept[1].confidence, 0.7);
        assert_eq!(kept[2].confidence, 0.6);
    }

    /// 姿态解码返回边界框和缩放后的关键点
    #[test]
    fn test_decode_poses() -> Result<(), Box<dyn std::error::Error>> {
        let shape = [1i64, 2, 11];
        #[rustfmt::skip]
        let data = [
            50.0f32, 50.0, 20.0, 20.0, 0.2, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            100.0, 100.0, 40.0, 40.0, 0.9, 10.0, 20.0, 0.8, 30.0, 40.0, 0.7,
        ];

        let detections = decode_poses(&shape, &data, 0.5, 0.5, 0.5, 2)?;

        assert_eq!(detections.len(), 1);
        let det = &detections[0];
        assert_eq!(det.class_id, 0);
        assert!((det.confidence - 0.9).abs() < 1e-6);
        assert!((det.bbox.x1 - 160.0).abs() < 1e-4);
        assert_eq!(det.keypoints.len(), 2);
        assert!((det.keypoints[0][0] - 20.0).abs() < 1e-4);
        assert!((det.keypoints[0][1] - 40.0).abs() < 1e-4);
        assert!((det.keypoints[1][0] - 60.0).abs() < 1e-4);
        assert!((det.keypoints[1][1] - 80.0).abs() < 1e-4);
        Ok(())
    }

    /// 分类解码返回按分数降序的top-K结果
    #[test]
    fn test_decode_classes_top_k() -> Result<(), Box<dyn std::error::Error>> {
        let shape = [1i64, 6];
        let data = [0.1f32, 0.3, 0.05, 0.9, 0.2, 0.15];

        let scores = decode_classes(&shape, &data, 5)?;

        assert_eq!(scores.len(), 5);
        assert_eq!(scores[0].class_id, 3);
        assert!((scores[0].score - 0.9).abs() < 1e-6);
        assert_eq!(scores[1].class_id, 1);
        assert_eq!(scores[2].class_id, 4);
        assert_eq!(scores[3].class_id, 5);
        assert_eq!(scores[4].class_id, 0);
        Ok(())
    }

    /// 输出形状与模型类型不符时返回UnexpectedOutputShape
    #[test]
    fn test_decode_shape_errors() {
        // 检测输出的秩必须为3
        let result = decode_detections(&[1, 84], &[0.0; 84], 1.0, 0.5, 0.5);
        assert!(matches!(
            result,
            Err(VisionError::UnexpectedOutputShape(_))
        ));

        // dims为5时没有类别分数段，argmax无从谈起
        let result = decode_detections(&[1, 2, 5], &[0.0; 10], 1.0, 0.5, 0.5);
        assert!(matches!(
            result,
            Err(VisionError::UnexpectedOutputShape(_))
        ));

        // 分类输出的秩必须为2
        let result = decode_classes(&[1, 5, 5], &[0.0; 25], 5);
        assert!(matches!(
            result,
            Err(VisionError::UnexpectedOutputShape(_))
        ));

        // 姿态输出的dims必须等于5 + 3 * 关键点数量
        let result = decode_poses(&[1, 1, 10], &[0.0; 10], 1.0, 0.5, 0.5, 2);
        assert!(matches!(
            result,
            Err(VisionError::UnexpectedOutputShape(_))
        ));
    }

    /// 阈值超出[0,1]或输入尺寸为0的参数在校验时被拒绝
    #[test]
    fn test_params_validation() {
        assert!(InitParams::new("model.onnx").validate().is_ok());

        let params = InitParams::new("model.onnx").with_confidence_threshold(1.5);
        assert!(matches!(
            params.validate(),
            Err(VisionError::InvalidConfig(_))
        ));

        let params = InitParams::new("model.onnx").with_iou_threshold(-0.1);
        assert!(matches!(
            params.validate(),
            Err(VisionError::InvalidConfig(_))
        ));

        let params = InitParams::new("model.onnx").with_input_size(0, 640);
        assert!(matches!(
            params.validate(),
            Err(VisionError::InvalidConfig(_))
        ));
    }

    /// 标签文件解析names小节，遇到不含冒号的行结束
    #[test]
    fn test_load_labels() -> Result<(), Box<dyn std::error::Error>> {
        let path = std::env::temp_dir().join("ochre_labels_test.yaml");
        std::fs::write(
            &path,
            "path: ../datasets/coco\nnames:\n  0: person\n  1: bicycle\n  2: car\n",
        )?;

        let names = load_labels(&path)?;
        std::fs::remove_file(&path)?;

        assert_eq!(names, vec!["person", "bicycle", "car"]);
        Ok(())
    }

    /// 类别颜色只依赖类别ID，相同类别永远相同
    #[test]
    fn test_class_color_deterministic() {
        let a = class_color(3);
        let b = class_color(3);
        assert_eq!((a.r, a.g, a.b), (b.r, b.g, b.b));

        let c = class_color(4);
        assert_ne!((a.r, a.g, a.b), (c.r, c.g, c.b));
    }

    /// 绘制结果的尺寸与原图一致
    #[test]
    fn test_draw_detections_dimensions() {
        let img = DynamicImage::new_rgb8(64, 64);
        let detections = vec![Detection::new(
            BoundingBox::new(8.0, 8.0, 32.0, 32.0),
            0,
            0.9,
        )];

        let result = draw_detections(&img, &detections);
        assert_eq!(result.width(), 64);
        assert_eq!(result.height(), 64);
    }
}
