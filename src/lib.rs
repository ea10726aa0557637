//! Byzantine Core - 进程内数据存储与事件分发
//!
//! 为宿主应用提供两个互相独立的基础设施：
//!
//! - **数据存储** ([`DataStore`]): 以带种类的键存取任意类型的值，
//!   同时按键的种类聚合当前的全部值
//! - **事件分发器** ([`Dispatcher`]): 按事件类型订阅处理器，同步地按注册顺序分发，
//!   任一处理器都可以停止后续传播
//!
//! 两者都是单线程、同步的内存结构，不做任何 I/O，也不提供内部锁。
//!
//! ```
//! use byzantine_core::{DataStore, KeyKind};
//!
//! let mut store = DataStore::new();
//! store.set("user", "u1".to_string());
//! store.set("user", "u2".to_string());
//!
//! let all = store.get_all::<String>(KeyKind::default_kind()).unwrap();
//! assert_eq!(all.len(), 1);
//! assert_eq!(all[0].as_str(), "u2");
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod types;

// 重新导出核心类型
pub use config::*;
pub use crate::core::*;
pub use error::*;
pub use logging::initialize;
pub use types::*;

/// 框架信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const FRAMEWORK_NAME: &str = "Byzantine Core";
