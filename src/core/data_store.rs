//! 键值数据存储
//!
//! 让互不相识的组件通过带种类的键存取任意类型的值。
//! 内部维护两份索引：键到值的主索引，以及种类到键集合的分组索引，
//! 分组保持插入顺序，更新时旧值先移出分组再把新值追加到末尾

use crate::types::{KeyKind, StoreKey};
use crate::{ByzantineError, Result};
use indexmap::IndexSet;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 类型擦除后的存储值
pub type StoredValue = Arc<dyn Any + Send + Sync>;

/// 键值数据存储
///
/// 不提供任何内部同步，跨线程使用时由调用方加锁
#[derive(Default)]
pub struct DataStore {
    /// 键到值的映射
    data: HashMap<StoreKey, StoredValue>,
    /// 种类到该种类键集合的映射，保持插入顺序
    groups: HashMap<KeyKind, IndexSet<StoreKey>>,
}

impl DataStore {
    /// 创建空的数据存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置值
    ///
    /// 键已存在时替换旧值，并把该键移到所属种类分组的末尾
    pub fn set<V>(&mut self, key: impl Into<StoreKey>, value: V) -> Arc<V>
    where
        V: Any + Send + Sync,
    {
        let key = key.into();
        let value = Arc::new(value);
        let group = self.groups.entry(key.kind()).or_default();

        let replaced = self.data.insert(key.clone(), value.clone()).is_some();
        if replaced {
            group.shift_remove(&key);
        }
        group.insert(key.clone());

        debug!(key = %key, replaced, "Stored value");
        value
    }

    /// 读取值
    ///
    /// 键不存在时返回 `Ok(None)`，类型不符时返回 [`ByzantineError::TypeMismatch`]
    pub fn get<V>(&self, key: impl Into<StoreKey>) -> Result<Option<Arc<V>>>
    where
        V: Any + Send + Sync,
    {
        let key = key.into();
        match self.data.get(&key) {
            Some(value) => Self::downcast(&key, value).map(Some),
            None => Ok(None),
        }
    }

    /// 读取某一种类的全部值，按分组顺序返回快照
    pub fn get_all<V>(&self, kind: KeyKind) -> Result<Vec<Arc<V>>>
    where
        V: Any + Send + Sync,
    {
        self.group_entries(kind)
            .map(|(key, value)| Self::downcast(key, value))
            .collect()
    }

    /// 读取某一种类的全部值，不做类型转换
    pub fn get_all_raw(&self, kind: KeyKind) -> Vec<StoredValue> {
        self.group_entries(kind)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// 是否存在指定的键
    pub fn has(&self, key: impl Into<StoreKey>) -> bool {
        self.data.contains_key(&key.into())
    }

    /// 删除键，同时将其移出种类分组，返回被删除的值
    pub fn remove(&mut self, key: impl Into<StoreKey>) -> Option<StoredValue> {
        let key = key.into();
        let removed = self.data.remove(&key)?;

        let kind = key.kind();
        if let Some(group) = self.groups.get_mut(&kind) {
            group.shift_remove(&key);
            if group.is_empty() {
                self.groups.remove(&kind);
            }
        }

        debug!(key = %key, "Removed value");
        Some(removed)
    }

    /// 条目总数
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 某一种类的条目数
    pub fn len_of_kind(&self, kind: KeyKind) -> usize {
        self.groups.get(&kind).map_or(0, IndexSet::len)
    }

    /// 某一种类的全部键，按分组顺序
    pub fn keys_of_kind(&self, kind: KeyKind) -> Vec<StoreKey> {
        self.groups
            .get(&kind)
            .map(|group| group.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// 当前至少有一个条目的种类
    pub fn kinds(&self) -> Vec<KeyKind> {
        self.groups.keys().copied().collect()
    }

    /// 清空存储
    pub fn clear(&mut self) {
        let count = self.data.len();
        self.data.clear();
        self.groups.clear();
        debug!(count, "Cleared data store");
    }

    fn group_entries(&self, kind: KeyKind) -> impl Iterator<Item = (&StoreKey, &StoredValue)> {
        self.groups
            .get(&kind)
            .into_iter()
            .flatten()
            .filter_map(move |key| self.data.get(key).map(|value| (key, value)))
    }

    fn downcast<V>(key: &StoreKey, value: &StoredValue) -> Result<Arc<V>>
    where
        V: Any + Send + Sync,
    {
        value
            .clone()
            .downcast::<V>()
            .map_err(|_| ByzantineError::type_mismatch::<V>(key))
    }
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("entries", &self.data.len())
            .field("kinds", &self.groups.len())
            .finish()
    }
}
