//! 输出解码模块
//!
//! 将推理后端返回的原始输出张量解码为最终结果，包括
//! 置信度过滤、类别argmax、坐标逆变换和非极大值抑制。
//! 解码失败时只返回错误，不返回部分结果。

use tracing::debug;

use crate::vision::bounds::{BoundingBox, ClassScore, Detection};
use crate::vision::error::VisionError;

/// 解码检测模型的输出
///
/// 输出张量形状为(1, rows, dims)，每行布局为
/// `[cx, cy, w, h, objectness, class_0 .. class_{C-1}]`。
/// 逐行处理：
/// 1. objectness低于置信度阈值的行直接丢弃，不做逐类别计算
/// 2. 对类别分数做argmax，置信度为最优类别分数乘objectness
/// 3. 中心格式转角点格式后除以缩放比例，映射回原始图像坐标
///
/// 所有存活候选框最后做一次跨类别的NMS。
///
/// # 参数
/// * `shape` - 输出张量形状
/// * `data` - 输出张量数据
/// * `resize_scale` - letterbox预处理时的缩放比例
/// * `confidence_threshold` - 置信度阈值
/// * `iou_threshold` - NMS IOU阈值
///
/// # 返回值
/// 返回按置信度降序排列的检测结果列表
///
/// # 错误处理
/// 形状与检测模型不符（秩不为3、批大小不为1、没有类别分数段）
/// 时返回`UnexpectedOutputShape`
pub fn decode_detections(
    shape: &[i64],
    data: &[f32],
    resize_scale: f32,
    confidence_threshold: f32,
    iou_threshold: f32,
) -> Result<Vec<Detection>, VisionError> {
    if shape.len() != 3 || shape[0] != 1 {
        return Err(VisionError::UnexpectedOutputShape(shape.to_vec()));
    }

    let rows = shape[1] as usize;
    let dims = shape[2] as usize;

    // dims不超过5时类别分数段为空，argmax没有意义
    if dims <= 5 || data.len() < rows * dims {
        return Err(VisionError::UnexpectedOutputShape(shape.to_vec()));
    }

    let mut candidates = Vec::new();

    for i in 0..rows {
        let row = &data[i * dims..(i + 1) * dims];
        let objectness = row[4];
        if objectness < confidence_threshold {
            continue;
        }

        // argmax并列时取第一个达到最大值的下标，保证确定性
        let mut class_id = 0usize;
        let mut best = row[5];
        for (index, score) in row[5..].iter().enumerate().skip(1) {
            if *score > best {
                best = *score;
                class_id = index;
            }
        }

        candidates.push(Detection::new(
            corner_box(row[0], row[1], row[2], row[3], resize_scale),
            class_id,
            best * objectness,
        ));
    }

    debug!("置信度过滤后剩余 {} 个候选框", candidates.len());

    Ok(apply_nms(candidates, iou_threshold))
}

/// 解码姿态模型的输出
///
/// 输出张量形状为(1, rows, dims)，每行布局为
/// `[cx, cy, w, h, objectness, (kx, ky, kscore) * keypoint_count]`，
/// 只有一个隐式类别。边界框和关键点坐标都除以缩放比例
/// 映射回原始图像，关键点的分数分量不保留。
///
/// # 错误处理
/// dims与5 + 3 * keypoint_count不符时返回`UnexpectedOutputShape`
pub fn decode_poses(
    shape: &[i64],
    data: &[f32],
    resize_scale: f32,
    confidence_threshold: f32,
    iou_threshold: f32,
    keypoint_count: usize,
) -> Result<Vec<Detection>, VisionError> {
    if shape.len() != 3 || shape[0] != 1 {
        return Err(VisionError::UnexpectedOutputShape(shape.to_vec()));
    }

    let rows = shape[1] as usize;
    let dims = shape[2] as usize;

    if dims != 5 + 3 * keypoint_count || data.len() < rows * dims {
        return Err(VisionError::UnexpectedOutputShape(shape.to_vec()));
    }

    let mut candidates = Vec::new();

    for i in 0..rows {
        let row = &data[i * dims..(i + 1) * dims];
        let objectness = row[4];
        if objectness < confidence_threshold {
            continue;
        }

        let mut keypoints = Vec::with_capacity(keypoint_count);
        for k in 0..keypoint_count {
            let kx = row[5 + 3 * k] / resize_scale;
            let ky = row[5 + 3 * k + 1] / resize_scale;
            keypoints.push([kx, ky]);
        }

        let mut detection = Detection::new(
            corner_box(row[0], row[1], row[2], row[3], resize_scale),
            0,
            objectness,
        );
        detection.keypoints = keypoints;
        candidates.push(detection);
    }

    debug!("置信度过滤后剩余 {} 个姿态候选", candidates.len());

    Ok(apply_nms(candidates, iou_threshold))
}

/// 解码分类模型的输出
///
/// 输出张量形状为(1, classes)，返回分数最高的top_k个
/// (类别ID, 分数)对，按分数降序排列。分类任务没有边界框，
/// 也不需要NMS。
///
/// # 错误处理
/// 形状的秩不为2或批大小不为1时返回`UnexpectedOutputShape`
pub fn decode_classes(
    shape: &[i64],
    data: &[f32],
    top_k: usize,
) -> Result<Vec<ClassScore>, VisionError> {
    if shape.len() != 2 || shape[0] != 1 {
        return Err(VisionError::UnexpectedOutputShape(shape.to_vec()));
    }

    let classes = shape[1] as usize;
    if classes == 0 || data.len() < classes {
        return Err(VisionError::UnexpectedOutputShape(shape.to_vec()));
    }

    let mut scores: Vec<ClassScore> = data[..classes]
        .iter()
        .enumerate()
        .map(|(class_id, &score)| ClassScore { class_id, score })
        .collect();

    // 分数相同时按类别ID升序，保证结果确定
    scores.sort_unstable_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.class_id.cmp(&b.class_id))
    });
    scores.truncate(top_k);

    Ok(scores)
}

/// 应用非极大值抑制
///
/// 跨类别的贪心NMS：按置信度降序排序，依次保留当前最高分的
/// 候选框，丢弃与已保留框IOU超过阈值的后续候选框。
///
/// # 参数
/// * `detections` - 候选检测结果列表
/// * `iou_threshold` - IOU阈值
///
/// # 返回值
/// 返回按置信度降序排列的保留结果
pub fn apply_nms(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_unstable_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut suppressed = vec![false; detections.len()];
    let mut result = Vec::new();

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }

        for j in (i + 1)..detections.len() {
            if suppressed[j] {
                continue;
            }
            if detections[i].bbox.iou(&detections[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }

        result.push(detections[i].clone());
    }

    result
}

/// 中心格式框转角点格式并映射回原始图像坐标
///
/// 除以缩放比例即可完成逆变换，因为letterbox的填充只出现在
/// 右侧和下侧，左上角没有偏移。
fn corner_box(cx: f32, cy: f32, w: f32, h: f32, resize_scale: f32) -> BoundingBox {
    BoundingBox::new(
        (cx - w / 2.0) / resize_scale,
        (cy - h / 2.0) / resize_scale,
        (cx + w / 2.0) / resize_scale,
        (cy + h / 2.0) / resize_scale,
    )
}
