//! 数据存储键类型定义
//!
//! 每个键都带有一个"种类"(kind)，用于按类别聚合存储中的值

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 键种类标记
///
/// 宿主应用为每一类相关的键定义一个零大小的标记类型，例如缓存键、会话键
pub trait KindMarker: 'static {
    /// 种类的可读名称，仅用于日志与显示
    const NAME: &'static str;
}

/// 默认键种类，由字符串标签直接构造的键都属于此种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DefaultKeys;

impl KindMarker for DefaultKeys {
    const NAME: &'static str = "default";
}

/// 键种类
///
/// 以标记类型的 `TypeId` 作为规范标识，名称不参与比较
#[derive(Debug, Clone, Copy)]
pub struct KeyKind {
    type_id: TypeId,
    name: &'static str,
}

impl KeyKind {
    /// 由标记类型创建种类
    pub fn of<M: KindMarker>() -> Self {
        Self {
            type_id: TypeId::of::<M>(),
            name: M::NAME,
        }
    }

    /// 默认种类
    pub fn default_kind() -> Self {
        Self::of::<DefaultKeys>()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 是否属于指定的标记类型
    pub fn is<M: KindMarker>(&self) -> bool {
        self.type_id == TypeId::of::<M>()
    }
}

impl Default for KeyKind {
    fn default() -> Self {
        Self::default_kind()
    }
}

impl PartialEq for KeyKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for KeyKind {}

impl Hash for KeyKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 数据存储键
///
/// 两个键相等当且仅当种类与标签都相等
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    kind: KeyKind,
    label: String,
}

impl StoreKey {
    /// 创建指定种类的键
    pub fn of<M: KindMarker>(label: impl Into<String>) -> Self {
        Self::with_kind(KeyKind::of::<M>(), label)
    }

    pub fn with_kind(kind: KeyKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }

    /// 创建默认种类的键
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_kind(KeyKind::default_kind(), label)
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl From<&str> for StoreKey {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for StoreKey {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

impl From<&StoreKey> for StoreKey {
    fn from(key: &StoreKey) -> Self {
        key.clone()
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct CacheKeys;

    impl KindMarker for CacheKeys {
        const NAME: &'static str = "cache";
    }

    struct SessionKeys;

    impl KindMarker for SessionKeys {
        const NAME: &'static str = "session";
    }

    #[test]
    fn test_label_key_has_default_kind() {
        let key: StoreKey = "user".into();
        assert!(key.kind().is::<DefaultKeys>());
        assert_eq!(key, StoreKey::new("user"));
        assert_eq!(key.to_string(), "default:user");
    }

    #[test]
    fn test_same_label_different_kind_not_equal() {
        let cache = StoreKey::of::<CacheKeys>("user");
        let session = StoreKey::of::<SessionKeys>("user");
        let plain = StoreKey::new("user");

        assert_ne!(cache, session);
        assert_ne!(cache, plain);
        assert_eq!(cache, StoreKey::of::<CacheKeys>("user"));

        let set: HashSet<_> = [cache, session, plain].into_iter().collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_kind_identity_ignores_name() {
        assert_eq!(KeyKind::of::<CacheKeys>(), KeyKind::of::<CacheKeys>());
        assert_ne!(KeyKind::of::<CacheKeys>(), KeyKind::of::<SessionKeys>());
        assert_eq!(KeyKind::default(), KeyKind::of::<DefaultKeys>());
        assert_eq!(KeyKind::of::<SessionKeys>().name(), "session");
    }
}
