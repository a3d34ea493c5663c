//! Table catalog.
//!
//! Each table has a name key, holding the key of its descriptor, and a
//! descriptor key, holding the JSON-serialized [`TableDescriptor`]:
//!
//! ```text
//! \x00name-<uvarint namespace><lower-cased name>  ->  \x00desc-<uvarint id>
//! \x00desc-<uvarint id>                           ->  descriptor
//! \x00desc-idgen                                  ->  last allocated id + 1
//! ```
//!
//! Every change that touches both keys runs in a transaction, so a name
//! never points at a missing descriptor.

pub mod keys;
mod schema;

pub use schema::{ColumnSchema, TableDescriptor, TableSchema};

use tablekv_common::types::{Key, Value};
use tablekv_common::DESC_METADATA_PREFIX;
use tablekv_store::StoreError;
use tracing::info;

use crate::db::{Db, Runner, TableExt};
use crate::error::{ClientError, ClientResult};
use crate::model::table_prefix;

/// Loads the descriptor of `name`, returning it with its key.
fn load_descriptor<T: Runner + ?Sized>(
    runner: &T,
    namespace_id: u32,
    name: &str,
) -> ClientResult<(Key, TableDescriptor)> {
    let desc_key = match runner.get(keys::name_key(namespace_id, name))? {
        Some(Value::Bytes(b)) => Key::from(b),
        Some(Value::Integer(_)) => {
            return Err(ClientError::InvalidDescriptor(format!(
                "name entry of \"{name}\" is not a key"
            )))
        }
        None => return Err(ClientError::TableNotFound(name.to_string())),
    };

    let desc = match runner.get(desc_key.clone())? {
        Some(Value::Bytes(b)) => TableDescriptor::decode(&b)?,
        _ => {
            return Err(ClientError::InvalidDescriptor(format!(
                "missing descriptor {desc_key} for table \"{name}\""
            )))
        }
    };
    desc.validate()?;
    Ok((desc_key, desc))
}

/// Reads every stored descriptor, in every namespace.
fn descriptors<T: Runner + ?Sized>(runner: &T) -> ClientResult<Vec<TableDescriptor>> {
    let end = Key::from_bytes(DESC_METADATA_PREFIX).prefix_end();
    runner
        .scan(keys::desc_key(0), end, 0)?
        .iter()
        .filter_map(|row| row.value.as_ref().and_then(Value::as_bytes))
        .map(TableDescriptor::decode)
        .collect()
}

/// Maps a failed conditional put of a name key to `TableExists`.
fn name_taken(err: ClientError, name: &str) -> ClientError {
    match err {
        ClientError::Store(StoreError::ConditionFailed { .. }) => {
            ClientError::TableExists(name.to_string())
        }
        other => other,
    }
}

impl Db {
    /// Creates a table. Fails if the name is already in use.
    pub fn create_table(&self, schema: TableSchema) -> ClientResult<()> {
        let mut desc = TableDescriptor::from_schema(schema);
        desc.validate()?;

        let namespace_id = self.config().namespace_id;
        let name_key = keys::name_key(namespace_id, &desc.name);
        // Checked up front so an existing table does not consume an ID; the
        // conditional put below still guards against a concurrent create.
        if self.get(name_key.clone())?.is_some() {
            return Err(ClientError::TableExists(desc.name));
        }

        // A renamed table keeps its rows under its old name.
        if let Some(owner) = descriptors(self)?
            .into_iter()
            .find(|d| d.storage_name == desc.name && d.name != d.storage_name)
        {
            return Err(ClientError::InvalidDescriptor(format!(
                "rows of table \"{}\" are stored under \"{}\"",
                owner.name, desc.name
            )));
        }

        let next = self.inc(keys::desc_id_generator(), 1)?;
        desc.id = u32::try_from(next - 1).map_err(|_| {
            ClientError::InvalidDescriptor(format!("descriptor id {} out of range", next - 1))
        })?;
        let desc_key = keys::desc_key(desc.id);
        let encoded = desc.encode()?;

        self.txn(move |txn| {
            let mut batch = txn.new_batch();
            batch.cput(name_key, desc_key.as_bytes(), None)?;
            batch.put(desc_key, encoded)?;
            txn.run(&mut batch)
        })
        .map_err(|err| name_taken(err, &desc.name))?;

        info!(table = %desc.name, id = desc.id, "created table");
        Ok(())
    }

    /// Returns the schema of table `name`.
    pub fn describe_table(&self, name: &str) -> ClientResult<TableSchema> {
        let (_, desc) = load_descriptor(self, self.config().namespace_id, name)?;
        Ok(desc.to_schema())
    }

    /// Renames table `old_name` to `new_name`.
    ///
    /// Only the catalog entry changes: rows stay under the name the table
    /// was created with, and [`delete_table`](Db::delete_table) still
    /// removes them.
    pub fn rename_table(&self, old_name: &str, new_name: &str) -> ClientResult<()> {
        let namespace_id = self.config().namespace_id;

        let id = self.txn(|txn| {
            let (desc_key, mut desc) = load_descriptor(txn, namespace_id, old_name)?;
            desc.name = new_name.to_lowercase();
            desc.validate()?;

            let new_name_key = keys::name_key(namespace_id, &desc.name);
            if txn.get(new_name_key.clone())?.is_some() {
                return Err(ClientError::TableExists(desc.name));
            }

            let mut batch = txn.new_batch();
            batch.put(desc_key.clone(), desc.encode()?)?;
            batch.cput(new_name_key, desc_key.as_bytes(), None)?;
            batch.del(keys::name_key(namespace_id, old_name))?;
            txn.run(&mut batch)?;
            Ok(desc.id)
        })?;

        info!(from = old_name, to = new_name, id, "renamed table");
        Ok(())
    }

    /// Deletes table `name` with every row stored under it.
    pub fn delete_table(&self, name: &str) -> ClientResult<()> {
        let namespace_id = self.config().namespace_id;
        let chunk_size = self.config().max_batch_calls;

        let rows = self.txn(|txn| {
            let (desc_key, desc) = load_descriptor(txn, namespace_id, name)?;

            let prefix = table_prefix(&desc.storage_name);
            let mut doomed: Vec<Key> = txn
                .scan(prefix.clone(), prefix.prefix_end(), 0)?
                .into_iter()
                .map(|kv| kv.key)
                .collect();
            let rows = doomed.len();
            doomed.push(desc_key);
            doomed.push(keys::name_key(namespace_id, name));

            for chunk in doomed.chunks(chunk_size.unwrap_or(doomed.len())) {
                let mut batch = txn.new_batch();
                for key in chunk {
                    batch.del(key.clone())?;
                }
                txn.run(&mut batch)?;
            }
            Ok(rows)
        })?;

        info!(table = name, rows, "deleted table");
        Ok(())
    }

    /// Lists the tables of the configured namespace in ascending order.
    pub fn list_tables(&self) -> ClientResult<Vec<String>> {
        let prefix = keys::name_prefix(self.config().namespace_id);
        let rows = self.scan(prefix.clone(), prefix.prefix_end(), 0)?;
        Ok(rows
            .iter()
            .map(|row| String::from_utf8_lossy(&row.key[prefix.len()..]).into_owned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use tablekv_common::types::Kind;
    use tablekv_store::MemStore;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Item {
        id: i64,
        label: String,
    }

    crate::record!(Item { id, label });

    fn users() -> TableSchema {
        TableSchema::new("Users")
            .column("id", Kind::Uint)
            .column("name", Kind::Text)
            .with_primary_key(&["id"])
    }

    #[test]
    fn test_create_and_describe() {
        let db = Db::new(MemStore::new());
        db.create_table(users()).unwrap();

        let schema = db.describe_table("USERS").unwrap();
        assert_eq!(schema.name, "users");
        assert_eq!(schema.columns, users().columns);
        assert_eq!(schema.primary_key, vec!["id".to_string()]);
    }

    #[test]
    fn test_create_duplicate_keeps_ids() {
        let db = Db::new(MemStore::new());
        db.create_table(users()).unwrap();
        assert_eq!(
            db.create_table(users()),
            Err(ClientError::TableExists("users".into()))
        );
        assert_eq!(db.get(keys::desc_id_generator()).unwrap(), Some(Value::Integer(1)));

        db.create_table(TableSchema::for_record::<Item>("items", &["id"]))
            .unwrap();
        assert!(db.get(keys::desc_key(1)).unwrap().is_some());
    }

    #[test]
    fn test_create_rejects_invalid_schema() {
        let db = Db::new(MemStore::new());
        let err = db
            .create_table(TableSchema::new("t").column("a", Kind::Int))
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidDescriptor(_)));
        assert!(db.list_tables().unwrap().is_empty());
    }

    #[test]
    fn test_describe_missing() {
        let db = Db::new(MemStore::new());
        assert_eq!(
            db.describe_table("nope"),
            Err(ClientError::TableNotFound("nope".into()))
        );
    }

    #[test]
    fn test_dangling_name_is_invalid() {
        let db = Db::new(MemStore::new());
        db.put(keys::name_key(0, "ghost"), keys::desc_key(9).as_bytes())
            .unwrap();
        assert!(matches!(
            db.describe_table("ghost"),
            Err(ClientError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_list_is_per_namespace() {
        let store = MemStore::new();
        let db = Db::new(store.clone());
        db.create_table(users()).unwrap();
        db.create_table(TableSchema::for_record::<Item>("items", &["id"]))
            .unwrap();

        let other = Db::with_config(store, ClientConfig::new().namespace_id(1)).unwrap();
        other.create_table(users()).unwrap();

        assert_eq!(db.list_tables().unwrap(), vec!["items", "users"]);
        assert_eq!(other.list_tables().unwrap(), vec!["users"]);
    }

    #[test]
    fn test_rename() {
        let db = Db::new(MemStore::new());
        db.create_table(users()).unwrap();
        db.rename_table("users", "Members").unwrap();

        assert_eq!(db.list_tables().unwrap(), vec!["members"]);
        assert_eq!(db.describe_table("members").unwrap().name, "members");
        assert_eq!(
            db.describe_table("users"),
            Err(ClientError::TableNotFound("users".into()))
        );
    }

    #[test]
    fn test_delete_after_rename_removes_rows() {
        let db = Db::new(MemStore::new());
        db.bind_model::<Item>("items", &["id"]).unwrap();
        db.create_table(TableSchema::for_record::<Item>("items", &["id"]))
            .unwrap();
        db.put_struct(
            &Item {
                id: 1,
                label: "a".into(),
            },
            &[],
        )
        .unwrap();

        db.rename_table("items", "goods").unwrap();
        let err = db
            .create_table(TableSchema::for_record::<Item>("items", &["id"]))
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidDescriptor(_)));

        db.delete_table("goods").unwrap();
        let prefix = table_prefix("items");
        assert!(db.scan(prefix.clone(), prefix.prefix_end(), 0).unwrap().is_empty());
        assert!(db.list_tables().unwrap().is_empty());

        db.create_table(TableSchema::for_record::<Item>("items", &["id"]))
            .unwrap();
    }

    #[test]
    fn test_rename_conflicts() {
        let db = Db::new(MemStore::new());
        db.create_table(users()).unwrap();
        db.create_table(TableSchema::for_record::<Item>("items", &["id"]))
            .unwrap();

        assert_eq!(
            db.rename_table("users", "items"),
            Err(ClientError::TableExists("items".into()))
        );
        assert_eq!(
            db.rename_table("missing", "other"),
            Err(ClientError::TableNotFound("missing".into()))
        );
        assert_eq!(db.list_tables().unwrap(), vec!["items", "users"]);
    }

    #[test]
    fn test_delete_removes_rows() {
        let db = Db::with_config(MemStore::new(), ClientConfig::new().max_batch_calls(2)).unwrap();
        db.bind_model::<Item>("items", &["id"]).unwrap();
        db.create_table(TableSchema::for_record::<Item>("items", &["id"]))
            .unwrap();
        db.create_table(users()).unwrap();
        for id in 0..3 {
            let item = Item {
                id,
                label: format!("item-{id}"),
            };
            db.put_struct(&item, &[]).unwrap();
        }
        db.put("zzz", "unrelated").unwrap();

        db.delete_table("items").unwrap();

        assert_eq!(db.list_tables().unwrap(), vec!["users"]);
        let prefix = table_prefix("items");
        assert!(db.scan(prefix.clone(), prefix.prefix_end(), 0).unwrap().is_empty());
        assert_eq!(db.get("zzz").unwrap(), Some(Value::from("unrelated")));
        assert_eq!(
            db.delete_table("items"),
            Err(ClientError::TableNotFound("items".into()))
        );
    }
}
