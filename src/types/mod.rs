//! 核心类型定义
//!
//! 数据存储键与分发器事件的公共类型

pub mod events;
pub mod keys;

pub use events::*;
pub use keys::*;
