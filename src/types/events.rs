//! 分发器事件相关类型定义

use std::any::Any;

/// 可分发事件特征
///
/// 事件的具体类型即其变体标识，分发时只匹配完全相同的类型。
/// 处理器通过 `stop_propagation` 请求停止后续处理器的调用
pub trait DispatcherEvent: Any + Send {
    /// 是否已请求停止传播
    fn is_stopped(&self) -> bool;

    /// 请求停止传播
    fn stop_propagation(&mut self);
}

/// 停止标志，事件可内嵌此类型来实现 [`DispatcherEvent`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopFlag {
    stopped: bool,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_set(&self) -> bool {
        self.stopped
    }

    /// 清除标志，便于同一事件实例被再次分发
    pub fn reset(&mut self) {
        self.stopped = false;
    }
}
