use serde::Serialize;

/// 各表行数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub videos: u64,
    pub snapshots: u64,
}

/// reset 删除的行数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResetReport {
    pub videos: u64,
    pub snapshots: u64,
}
