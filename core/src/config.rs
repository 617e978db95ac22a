//! Mapper configuration: dialect, class-map cache and surrogate keys.

use crate::dialect::Dialect;
use crate::error::Result;
use crate::mapper::{ClassMap, ClassMapBuilder, Entity};
use crate::value::Value;
use hashbrown::HashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use uuid::Uuid;

/// Produces values for [`KeyKind::GeneratedSurrogate`](crate::KeyKind) columns.
pub trait SurrogateGenerator: Send + Sync {
    fn generate(&self) -> Value;
}

/// Time-ordered UUIDs (version 7), so consecutive keys sort by creation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOrderedUuid;

impl SurrogateGenerator for TimeOrderedUuid {
    fn generate(&self) -> Value {
        Value::Uuid(Uuid::now_v7())
    }
}

/// Random UUIDs (version 4).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUuid;

impl SurrogateGenerator for RandomUuid {
    fn generate(&self) -> Value {
        Value::Uuid(Uuid::new_v4())
    }
}

type ClassMapCache = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

pub struct Configuration {
    dialect: Dialect,
    surrogate: Arc<dyn SurrogateGenerator>,
    command_timeout: Option<Duration>,
    class_maps: RwLock<ClassMapCache>,
}

impl Configuration {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            surrogate: Arc::new(TimeOrderedUuid),
            command_timeout: None,
            class_maps: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_surrogate_generator(mut self, generator: impl SurrogateGenerator + 'static) -> Self {
        self.surrogate = Arc::new(generator);
        self
    }

    /// Default timeout passed to every connection call.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout
    }

    pub fn surrogate_value(&self) -> Value {
        self.surrogate.generate()
    }

    /// Class map for `T`, built on first use and cached afterwards.
    pub fn class_map<T: Entity>(&self) -> Result<Arc<ClassMap<T>>> {
        let key = TypeId::of::<T>();
        let cached = self
            .class_maps
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned();
        if let Some(any) = cached
            && let Ok(map) = any.downcast::<ClassMap<T>>()
        {
            return Ok(map);
        }

        let map = Arc::new(T::class_map(ClassMapBuilder::new())?);
        self.class_maps
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, map.clone());
        Ok(map)
    }

    /// Drops every cached class map.
    pub fn clear_cache(&self) {
        let mut maps = self
            .class_maps
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        #[cfg(feature = "tracing")]
        tracing::debug!(cached = maps.len(), "crudite.class_map_cache.clear");
        maps.clear();
    }

    pub fn cached_class_maps(&self) -> usize {
        self.class_maps
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("dialect", &self.dialect)
            .field("command_timeout", &self.command_timeout)
            .field("cached_class_maps", &self.cached_class_maps())
            .finish_non_exhaustive()
    }
}
