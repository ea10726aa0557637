//! 事件分发器
//!
//! 按事件的具体类型管理处理器列表，同步地按注册顺序调用处理器，
//! 任一处理器请求停止传播后立即结束本次分发

use crate::config::{DispatcherConfig, FailurePolicy};
use crate::types::DispatcherEvent;
use crate::{ByzantineError, Result};
use std::any::{type_name, Any, TypeId};
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// 事件处理器特征
pub trait EventHandler<E: DispatcherEvent>: Send + Sync {
    /// 处理事件，可通过 `event.stop_propagation()` 阻止后续处理器执行
    fn handle(&self, event: &mut E) -> anyhow::Result<()>;

    /// 事件处理器名称
    fn name(&self) -> &str;
}

/// 闭包处理器包装
struct FnHandler<F> {
    name: String,
    handler_fn: F,
}

impl<E, F> EventHandler<E> for FnHandler<F>
where
    E: DispatcherEvent,
    F: Fn(&mut E) -> anyhow::Result<()> + Send + Sync,
{
    fn handle(&self, event: &mut E) -> anyhow::Result<()> {
        (self.handler_fn)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 已注册处理器的句柄
///
/// 克隆得到的是同一个处理器，注销时按引用身份匹配
pub struct Handler<E: DispatcherEvent> {
    inner: Arc<dyn EventHandler<E>>,
}

impl<E: DispatcherEvent> Handler<E> {
    /// 由闭包创建处理器
    pub fn new<F>(handler_fn: F) -> Self
    where
        F: Fn(&mut E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::named("anonymous", handler_fn)
    }

    /// 由闭包创建带名称的处理器，名称用于日志和错误信息
    pub fn named<F>(name: impl Into<String>, handler_fn: F) -> Self
    where
        F: Fn(&mut E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::from_handler(FnHandler {
            name: name.into(),
            handler_fn,
        })
    }

    /// 由实现了 [`EventHandler`] 的类型创建处理器
    pub fn from_handler<H>(handler: H) -> Self
    where
        H: EventHandler<E> + 'static,
    {
        Self {
            inner: Arc::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// 是否为同一个处理器
    pub fn same_as(&self, other: &Handler<E>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<E: DispatcherEvent> Clone for Handler<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: DispatcherEvent> std::fmt::Debug for Handler<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("event", &type_name::<E>())
            .field("name", &self.name())
            .finish()
    }
}

/// 单次分发的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 所有处理器均已执行
    Completed { invoked: usize },
    /// 位于 `index` 的处理器请求停止传播
    StoppedAt { index: usize },
}

impl DispatchOutcome {
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::StoppedAt { .. })
    }

    /// 实际执行的处理器数量
    pub fn invoked(&self) -> usize {
        match *self {
            Self::Completed { invoked } => invoked,
            Self::StoppedAt { index } => index + 1,
        }
    }
}

/// 分发器统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherMetrics {
    pub events_dispatched: u64,
    pub handlers_invoked: u64,
    pub handler_failures: u64,
    pub stopped_dispatches: u64,
    /// 没有任何处理器的分发次数
    pub unhandled_events: u64,
    pub handlers_registered: usize,
}

#[derive(Debug, Default)]
struct MetricCounters {
    events_dispatched: Cell<u64>,
    handlers_invoked: Cell<u64>,
    handler_failures: Cell<u64>,
    stopped_dispatches: Cell<u64>,
    unhandled_events: Cell<u64>,
}

fn bump(counter: &Cell<u64>) {
    counter.set(counter.get() + 1);
}

/// 事件分发器
///
/// `dispatch` 只需共享引用，处理器可以在调用栈上嵌套地再次分发事件。
/// 不提供内部同步，跨线程使用时由调用方加锁
pub struct Dispatcher {
    /// 事件类型到处理器列表的映射，值的实际类型总是 `Vec<Handler<E>>`
    handlers: HashMap<TypeId, Box<dyn Any + Send>>,
    /// 已注册的处理器总数
    registered: usize,
    config: DispatcherConfig,
    counters: MetricCounters,
}

impl Dispatcher {
    /// 使用默认配置创建分发器
    pub fn new() -> Self {
        Self::with_config(&DispatcherConfig::default())
    }

    pub fn with_config(config: &DispatcherConfig) -> Self {
        Self {
            handlers: HashMap::new(),
            registered: 0,
            config: config.clone(),
            counters: MetricCounters::default(),
        }
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.config.failure_policy
    }

    /// 注册事件处理器，追加到该事件类型的处理器列表末尾
    pub fn handle<E: DispatcherEvent>(&mut self, handler: &Handler<E>) -> &mut Self {
        let list = self
            .handlers
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Vec::<Handler<E>>::new()));

        if let Some(list) = list.downcast_mut::<Vec<Handler<E>>>() {
            list.push(handler.clone());
            self.registered += 1;
            debug!(
                event = type_name::<E>(),
                handler = handler.name(),
                position = list.len() - 1,
                "Registered event handler"
            );
        }
        self
    }

    /// 注销事件处理器，只移除第一个相同的处理器
    pub fn unhandled<E: DispatcherEvent>(&mut self, handler: &Handler<E>) -> &mut Self {
        let removed = self.handlers_of_mut::<E>().and_then(|list| {
            let position = list.iter().position(|h| h.same_as(handler))?;
            list.remove(position);
            Some(position)
        });

        if let Some(position) = removed {
            self.registered -= 1;
            debug!(
                event = type_name::<E>(),
                handler = handler.name(),
                position,
                "Unregistered event handler"
            );
        }
        self
    }

    /// 移除某一事件类型的全部处理器，返回移除的数量
    pub fn clear<E: DispatcherEvent>(&mut self) -> usize {
        let removed = self.handler_count::<E>();
        self.handlers.remove(&TypeId::of::<E>());
        self.registered -= removed;
        removed
    }

    /// 某一事件类型的处理器数量
    pub fn handler_count<E: DispatcherEvent>(&self) -> usize {
        self.handlers_of::<E>().map_or(0, Vec::len)
    }

    pub fn has_handlers<E: DispatcherEvent>(&self) -> bool {
        self.handler_count::<E>() > 0
    }

    /// 分发事件
    ///
    /// 按注册顺序调用处理器，每次调用后检查停止标志。
    /// 处理器列表在分发开始时取快照，嵌套分发不会影响本次调用的处理器集合
    pub fn dispatch<E: DispatcherEvent>(&self, event: &mut E) -> Result<DispatchOutcome> {
        let event_name = type_name::<E>();
        bump(&self.counters.events_dispatched);

        let handlers = match self.handlers_of::<E>() {
            Some(list) if !list.is_empty() => list.clone(),
            _ => {
                bump(&self.counters.unhandled_events);
                trace!(event = event_name, "No handlers for event");
                return Ok(DispatchOutcome::Completed { invoked: 0 });
            }
        };

        for (index, handler) in handlers.iter().enumerate() {
            trace!(event = event_name, handler = handler.name(), index, "Invoking handler");
            bump(&self.counters.handlers_invoked);

            if let Err(source) = handler.inner.handle(event) {
                bump(&self.counters.handler_failures);
                match self.config.failure_policy {
                    FailurePolicy::FailFast => {
                        error!(
                            event = event_name,
                            handler = handler.name(),
                            index,
                            "Event handler failed: {:#}",
                            source
                        );
                        return Err(ByzantineError::Handler {
                            event: event_name,
                            handler: handler.name().to_string(),
                            index,
                            source,
                        });
                    }
                    FailurePolicy::Continue => {
                        warn!(
                            event = event_name,
                            handler = handler.name(),
                            index,
                            "Event handler failed, continuing: {:#}",
                            source
                        );
                    }
                }
            }

            if event.is_stopped() {
                bump(&self.counters.stopped_dispatches);
                debug!(event = event_name, handler = handler.name(), index, "Propagation stopped");
                return Ok(DispatchOutcome::StoppedAt { index });
            }
        }

        Ok(DispatchOutcome::Completed {
            invoked: handlers.len(),
        })
    }

    /// 获取统计信息
    pub fn metrics(&self) -> DispatcherMetrics {
        DispatcherMetrics {
            events_dispatched: self.counters.events_dispatched.get(),
            handlers_invoked: self.counters.handlers_invoked.get(),
            handler_failures: self.counters.handler_failures.get(),
            stopped_dispatches: self.counters.stopped_dispatches.get(),
            unhandled_events: self.counters.unhandled_events.get(),
            handlers_registered: self.registered,
        }
    }

    fn handlers_of<E: DispatcherEvent>(&self) -> Option<&Vec<Handler<E>>> {
        self.handlers
            .get(&TypeId::of::<E>())
            .and_then(|list| list.downcast_ref::<Vec<Handler<E>>>())
    }

    fn handlers_of_mut<E: DispatcherEvent>(&mut self) -> Option<&mut Vec<Handler<E>>> {
        self.handlers
            .get_mut(&TypeId::of::<E>())
            .and_then(|list| list.downcast_mut::<Vec<Handler<E>>>())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("variants", &self.handlers.len())
            .field("config", &self.config)
            .field("metrics", &self.metrics())
            .finish()
    }
}
