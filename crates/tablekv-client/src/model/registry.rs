//! Registry of bound models.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tablekv_common::SYSTEM_PREFIX;
use tracing::debug;

use super::Model;
use crate::error::{ClientError, ClientResult};
use crate::record::Record;

#[derive(Default)]
struct RegistryInner {
    /// Bound models, keyed by record type.
    models: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    /// Table name to bound record type name.
    tables: HashMap<String, &'static str>,
}

/// Maps record types to the tables they are bound to.
///
/// Each record type binds to exactly one table and each table to at most
/// one record type. Bindings are meant to be made once at startup and are
/// only read afterwards.
#[derive(Default)]
pub struct ModelRegistry {
    inner: RwLock<RegistryInner>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `R` to `table` with the given primary key columns.
    ///
    /// The table name is lower-cased. It must be non-empty and must not
    /// start with the system key prefix.
    pub fn bind<R: Record>(&self, table: &str, primary_key: &[&str]) -> ClientResult<()> {
        if matches!(table.as_bytes().first(), None | Some(&SYSTEM_PREFIX)) {
            return Err(ClientError::InvalidTableName(table.to_string()));
        }
        let table = table.to_lowercase();
        let model_name = type_name::<R>();

        let mut inner = self.inner.write();
        if inner.models.contains_key(&TypeId::of::<R>()) {
            return Err(ClientError::ModelAlreadyDefined {
                table,
                model: model_name.to_string(),
            });
        }
        if let Some(existing) = inner.tables.get(&table) {
            return Err(ClientError::TableAlreadyBound {
                table,
                model: existing.to_string(),
            });
        }

        let model = Model::<R>::new(&table, primary_key)?;
        debug!(table = %table, model = model_name, ?model, "bound model");
        inner.models.insert(TypeId::of::<R>(), Arc::new(model));
        inner.tables.insert(table, model_name);
        Ok(())
    }

    /// Returns the model `R` is bound to.
    pub fn lookup<R: Record>(&self) -> ClientResult<Arc<Model<R>>> {
        let not_found = || ClientError::ModelNotFound(type_name::<R>().to_string());
        let model = self
            .inner
            .read()
            .models
            .get(&TypeId::of::<R>())
            .cloned()
            .ok_or_else(not_found)?;
        model.downcast::<Model<R>>().map_err(|_| not_found())
    }

    /// Returns true if `R` is bound.
    pub fn is_bound<R: Record>(&self) -> bool {
        self.inner.read().models.contains_key(&TypeId::of::<R>())
    }

    /// Returns the bound table names in ascending order.
    pub fn tables(&self) -> Vec<String> {
        let mut tables: Vec<_> = self.inner.read().tables.keys().cloned().collect();
        tables.sort();
        tables
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("tables", &self.tables())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Kv {
        k: String,
        v: String,
    }

    #[derive(Debug, Default)]
    struct Other {
        k: String,
    }

    crate::record!(Kv { k, v });
    crate::record!(Other { k });

    #[test]
    fn test_bind_and_lookup() {
        let registry = ModelRegistry::new();
        assert!(!registry.is_bound::<Kv>());
        registry.bind::<Kv>("KV", &["k"]).unwrap();
        assert!(registry.is_bound::<Kv>());

        let model = registry.lookup::<Kv>().unwrap();
        assert_eq!(model.name(), "kv");
        assert_eq!(model.other_columns(), ["v"]);
        assert_eq!(registry.tables(), ["kv"]);
    }

    #[test]
    fn test_bind_twice() {
        let registry = ModelRegistry::new();
        registry.bind::<Kv>("kv", &["k"]).unwrap();
        let err = registry.bind::<Kv>("kv2", &["k"]).unwrap_err();
        assert!(err.to_string().contains("already defined"));
        assert!(err.to_string().starts_with("kv2: model '"));
    }

    #[test]
    fn test_table_bound_once() {
        let registry = ModelRegistry::new();
        registry.bind::<Kv>("kv", &["k"]).unwrap();
        let err = registry.bind::<Other>("kv", &["k"]).unwrap_err();
        assert!(matches!(err, ClientError::TableAlreadyBound { .. }));
        assert!(!registry.is_bound::<Other>());
    }

    #[test]
    fn test_failed_bind_leaves_no_binding() {
        let registry = ModelRegistry::new();
        let err = registry.bind::<Kv>("kv", &["missing"]).unwrap_err();
        assert_eq!(err.to_string(), "kv: unable to find field missing");
        assert!(!registry.is_bound::<Kv>());
        registry.bind::<Kv>("kv", &["k"]).unwrap();
    }

    #[test]
    fn test_rejects_reserved_table_names() {
        let registry = ModelRegistry::new();
        for table in ["", "\0name-users"] {
            let err = registry.bind::<Kv>(table, &["k"]).unwrap_err();
            assert_eq!(err, ClientError::InvalidTableName(table.to_string()));
        }
        assert!(!registry.is_bound::<Kv>());
        assert!(registry.tables().is_empty());
    }

    #[test]
    fn test_lookup_unbound() {
        let registry = ModelRegistry::new();
        let err = registry.lookup::<Kv>().unwrap_err();
        assert!(err.to_string().starts_with("unable to find model for '"));
    }
}
