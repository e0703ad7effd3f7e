// 目标检测超参数配置
pub const DEFAULT_INPUT_WIDTH: u32 = 640;
pub const DEFAULT_INPUT_HEIGHT: u32 = 640;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.5;
pub const DEFAULT_KEYPOINT_COUNT: usize = 2;
pub const DEFAULT_INTRA_THREADS: usize = 4;

// letterbox填充色，必须与模型训练时的填充约定一致
pub const LETTERBOX_FILL: [u8; 3] = [114, 114, 114];

// 分类任务默认返回的候选数量
pub const CLASSIFY_TOP_K: usize = 5;
