/// 边界框结构
///
/// 表示一个矩形边界框，坐标为原始图像像素坐标。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
    /// 左上角x坐标
    pub x1: f32,
    /// 左上角y坐标
    pub y1: f32,
    /// 右下角x坐标
    pub x2: f32,
    /// 右下角y坐标
    pub y2: f32,
}

impl BoundingBox {
    /// 创建一个新的边界框
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// 计算边界框的宽度
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// 计算边界框的高度
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// 计算边界框的面积
    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// 计算与另一个边界框的IOU（交并比）
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x_left = self.x1.max(other.x1);
        let y_top = self.y1.max(other.y1);
        let x_right = self.x2.min(other.x2);
        let y_bottom = self.y2.min(other.y2);

        let inter = (x_right - x_left).max(0.0) * (y_bottom - y_top).max(0.0);
        if inter <= 0.0 {
            return 0.0;
        }

        let union = self.area() + other.area() - inter;
        if union > 0.0 { inter / union } else { 0.0 }
    }
}

/// 检测结果结构
///
/// 包含检测到的目标的完整信息，由解码器创建后不再修改。
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// 目标的边界框
    pub bbox: BoundingBox,
    /// 类别ID
    pub class_id: usize,
    /// 置信度，为objectness与最优类别分数的乘积
    pub confidence: f32,
    /// 关键点坐标，仅姿态模型输出，其余任务为空
    pub keypoints: Vec<[f32; 2]>,
}

impl Detection {
    /// 创建一个新的检测结果
    pub fn new(bbox: BoundingBox, class_id: usize, confidence: f32) -> Self {
        Self {
            bbox,
            class_id,
            confidence,
            keypoints: Vec::new(),
        }
    }
}

/// 分类结果条目
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScore {
    /// 类别ID
    pub class_id: usize,
    /// 类别分数
    pub score: f32,
}
