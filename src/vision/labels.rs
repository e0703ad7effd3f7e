//! 类别名称加载模块
//!
//! 类别名称列表只被可视化和命令行层消费，核心解码逻辑
//! 不依赖它，检测结果中只携带类别ID。

use std::fs;
use std::io;
use std::path::Path;

/// 从coco.yaml风格的标签文件读取类别名称
///
/// 解析文件中`names:`小节里的`下标: 名称`键值对，按出现顺序
/// 收集名称，下标与检测结果的类别ID对齐。遇到第一个不含
/// 冒号的行即认为小节结束。
///
/// # 参数
/// * `path` - 标签文件路径
///
/// # 返回值
/// 返回按类别ID排列的名称列表
pub fn load_labels(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;

    let mut names = Vec::new();
    let mut in_names = false;

    for line in content.lines() {
        if line.contains("names:") {
            in_names = true;
            continue;
        }
        if in_names {
            let Some((_, value)) = line.split_once(':') else {
                break;
            };
            names.push(value.trim().to_string());
        }
    }

    Ok(names)
}
