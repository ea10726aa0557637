//! 核心组件
//!
//! 键值数据存储与事件分发器，二者互不依赖

pub mod data_store;
pub mod dispatcher;

pub use data_store::*;
pub use dispatcher::*;
