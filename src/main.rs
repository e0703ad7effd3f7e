use clap::{Parser, ValueEnum};
use image::GenericImageView;

use ochre::{
    InitParams, ModelKind, Precision, YoloSession, draw_detections, load_image, load_labels,
};

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Task {
    /// 目标检测
    Detect,
    /// 姿态估计
    Pose,
    /// 图像分类
    Classify,
}

/// 基于ONNX Runtime的YOLOv8推理工具
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 任务类型
    #[arg(long, value_enum, default_value = "detect")]
    task: Task,

    /// ONNX模型文件路径
    #[arg(long, value_name = "FILE")]
    model: String,

    /// 输入图像路径
    #[arg(long, value_name = "IMAGE")]
    input: String,

    /// 类别名称文件路径 (coco.yaml格式)
    #[arg(long, value_name = "FILE")]
    labels: Option<String>,

    /// 输出图像路径（默认在输入文件名后追加 _output）
    #[arg(long, value_name = "IMAGE")]
    output: Option<String>,

    /// 置信度阈值 (0.0 - 1.0)
    #[arg(long, default_value = "0.6", value_name = "THRESHOLD")]
    confidence: f32,

    /// NMS IOU阈值 (0.0 - 1.0)
    #[arg(long, default_value = "0.5", value_name = "THRESHOLD")]
    iou: f32,

    /// 模型输入尺寸
    #[arg(long, default_value = "640", value_name = "SIZE")]
    size: u32,

    /// 姿态模型的关键点数量
    #[arg(long, default_value = "2", value_name = "COUNT")]
    keypoints: usize,

    /// 使用float16模型
    #[arg(long)]
    half: bool,

    /// 使用CUDA加速
    #[arg(long)]
    cuda: bool,

    /// 推理后端内部线程数
    #[arg(long, default_value = "4", value_name = "COUNT")]
    threads: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("错误: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    println!("Ochre 视觉推理工具");
    println!("==================");
    println!("模型文件路径: {}", args.model);
    println!("输入图像: {}", args.input);
    println!("置信度阈值: {}", args.confidence);
    println!("NMS阈值: {}", args.iou);
    println!();

    let labels = match &args.labels {
        Some(path) => load_labels(path)?,
        None => Vec::new(),
    };

    let params = InitParams::new(&args.model)
        .with_kind(match args.task {
            Task::Detect => ModelKind::Detect,
            Task::Pose => ModelKind::Pose,
            Task::Classify => ModelKind::Classify,
        })
        .with_precision(if args.half {
            Precision::Float16
        } else {
            Precision::Float32
        })
        .with_input_size(args.size, args.size)
        .with_confidence_threshold(args.confidence)
        .with_iou_threshold(args.iou)
        .with_keypoint_count(args.keypoints)
        .with_cuda(args.cuda)
        .with_intra_threads(args.threads);

    println!("正在加载模型...");
    let mut session = YoloSession::create(params)?;
    println!("模型加载完成");

    let image = load_image(&args.input)?;
    println!("原始图像尺寸: {}x{}", image.width(), image.height());

    match args.task {
        Task::Classify => {
            let scores = session.classify(&image)?;
            println!("Top-{} 分类结果:", scores.len());
            for entry in &scores {
                println!("  - {}: {:.4}", label_of(&labels, entry.class_id), entry.score);
            }
        }
        Task::Detect | Task::Pose => {
            println!("正在执行目标检测...");
            let detections = session.detect(&image)?;
            println!("检测到 {} 个目标", detections.len());

            for (i, det) in detections.iter().enumerate() {
                println!(
                    "目标 {}: {} - 置信度: {:.2} - 位置: ({:.1}, {:.1}, {:.1}x{:.1})",
                    i + 1,
                    label_of(&labels, det.class_id),
                    det.confidence,
                    det.bbox.x1,
                    det.bbox.y1,
                    det.bbox.width(),
                    det.bbox.height()
                );
            }

            println!("正在绘制检测结果...");
            let result_image = draw_detections(&image, &detections);
            let output_path = args
                .output
                .clone()
                .unwrap_or_else(|| default_output_path(&args.input));
            result_image.save(&output_path)?;
            println!("结果已保存到: {}", output_path);
        }
    }

    Ok(())
}

/// 类别ID转显示名称，没有标签文件时回退为数字形式
fn label_of(labels: &[String], class_id: usize) -> String {
    labels
        .get(class_id)
        .cloned()
        .unwrap_or_else(|| format!("class_{}", class_id))
}

/// 默认输出路径：在输入文件名后追加 _output
fn default_output_path(input: &str) -> String {
    let path = std::path::Path::new(input);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "result".to_string());
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "png".to_string());
    let name = format!("{}_output.{}", stem, ext);

    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            parent.join(name).to_string_lossy().to_string()
        }
        _ => name,
    }
}
