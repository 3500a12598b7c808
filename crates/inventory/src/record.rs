use std::collections::HashMap;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use storeadmin_core::{ProductId, WarehouseId};

/// Quantity on hand for one product in one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseStock {
    pub warehouse_id: WarehouseId,
    pub stock_quantity: i64,
}

/// One product's entry in the realtime inventory mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub product_name: String,
    pub category_name: String,
    /// Missing or `null` on the wire means "no warehouses".
    #[serde(default, deserialize_with = "null_as_empty")]
    pub warehouses: Vec<WarehouseStock>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<WarehouseStock>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<WarehouseStock>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Realtime inventory: product id → record, in the order the server sent it.
///
/// A re-inserted key keeps its original position and takes the newer record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    entries: Vec<(ProductId, InventoryRecord)>,
    index: HashMap<ProductId, usize>,
}

impl InventorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, product_id: ProductId, record: InventoryRecord) {
        match self.index.get(&product_id) {
            Some(&pos) => self.entries[pos].1 = record,
            None => {
                self.index.insert(product_id.clone(), self.entries.len());
                self.entries.push((product_id, record));
            }
        }
    }

    pub fn get(&self, product_id: &ProductId) -> Option<&InventoryRecord> {
        self.index.get(product_id).map(|&pos| &self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &InventoryRecord)> {
        self.entries.iter().map(|(id, record)| (id, record))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of (product, warehouse) pairs.
    pub fn warehouse_entry_count(&self) -> usize {
        self.entries.iter().map(|(_, r)| r.warehouses.len()).sum()
    }
}

impl FromIterator<(ProductId, InventoryRecord)> for InventorySnapshot {
    fn from_iter<I: IntoIterator<Item = (ProductId, InventoryRecord)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (id, record) in iter {
            snapshot.insert(id, record);
        }
        snapshot
    }
}

impl Serialize for InventorySnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, record) in &self.entries {
            map.serialize_entry(id, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for InventorySnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SnapshotVisitor;

        impl<'de> Visitor<'de> for SnapshotVisitor {
            type Value = InventorySnapshot;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str("a map of product id to inventory record")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut snapshot = InventorySnapshot::new();
                while let Some((id, record)) = access.next_entry::<ProductId, InventoryRecord>()? {
                    snapshot.insert(id, record);
                }
                Ok(snapshot)
            }
        }

        deserializer.deserialize_map(SnapshotVisitor)
    }
}
