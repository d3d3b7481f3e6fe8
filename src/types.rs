// src/types.rs
use std::path::PathBuf;
use crate::acquisition::HistorySnapshot;

// 前端发给采集线程的命令
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    ExportRequested,
    Shutdown,
}

// 采集线程发给前端的消息
#[derive(Clone, Debug)]
pub enum SensorMessage {
    Log(String),
    Frame(HistorySnapshot), // 绘图数据 (完整拷贝)
    Alert(String),
    Exported { path: PathBuf, rows: usize },
    ExportFailed(String),
    Fatal(String),
}
