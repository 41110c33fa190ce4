//! In-memory storage implementation for testing and development

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::amounts::is_cash_or_bank_ledger;
use crate::traits::MastersStorage;
use crate::types::*;

type LedgerKey = (String, String);
type ConfigKey = (String, SeriesType, String, NaiveDate);

/// In-memory storage implementation for testing and development.
///
/// Enforces the same constraints a relational backend would carry as unique
/// indexes: one code per `(tenant, code)`, one opening-balance row per
/// ledger, and a serialized counter increment per numbering configuration.
/// Clones share the underlying maps, so concurrent engines over clones
/// contend exactly like concurrent requests against one database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    ledgers: Arc<RwLock<HashMap<LedgerKey, Ledger>>>,
    configs: Arc<RwLock<HashMap<ConfigKey, NumberingConfig>>>,
    amount_transactions: Arc<RwLock<Vec<AmountTransaction>>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.ledgers.write().unwrap().clear();
        self.configs.write().unwrap().clear();
        self.amount_transactions.write().unwrap().clear();
    }
}

#[async_trait]
impl MastersStorage for MemoryStorage {
    async fn insert_ledger(&mut self, ledger: &Ledger) -> MastersResult<()> {
        let mut ledgers = self.ledgers.write().unwrap();

        let key = (ledger.tenant_id.clone(), ledger.id.clone());
        if ledgers.contains_key(&key) {
            return Err(MastersError::Validation(format!(
                "Ledger with ID '{}' already exists",
                ledger.id
            )));
        }

        if let Some(code) = &ledger.code {
            let clash = ledgers
                .values()
                .any(|l| l.tenant_id == ledger.tenant_id && l.code.as_ref() == Some(code));
            if clash {
                return Err(MastersError::DuplicateCode(code.clone()));
            }
        }

        ledgers.insert(key, ledger.clone());
        Ok(())
    }

    async fn get_ledger(&self, tenant_id: &str, ledger_id: &str) -> MastersResult<Option<Ledger>> {
        Ok(self
            .ledgers
            .read()
            .unwrap()
            .get(&(tenant_id.to_string(), ledger_id.to_string()))
            .cloned())
    }

    async fn list_ledgers(&self, tenant_id: &str) -> MastersResult<Vec<Ledger>> {
        let ledgers = self.ledgers.read().unwrap();
        let mut result: Vec<Ledger> = ledgers
            .values()
            .filter(|ledger| ledger.tenant_id == tenant_id)
            .cloned()
            .collect();
        // HashMap iteration order is arbitrary; keep listings stable.
        result.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(result)
    }

    async fn list_ledgers_page(
        &self,
        tenant_id: &str,
        offset: usize,
        limit: usize,
    ) -> MastersResult<Vec<Ledger>> {
        let all = self.list_ledgers(tenant_id).await?;
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }

    async fn delete_ledger(&mut self, tenant_id: &str, ledger_id: &str) -> MastersResult<()> {
        let removed = self
            .ledgers
            .write()
            .unwrap()
            .remove(&(tenant_id.to_string(), ledger_id.to_string()));
        if removed.is_none() {
            return Err(MastersError::LedgerNotFound(ledger_id.to_string()));
        }

        // Derived rows are lifetime-bound to their ledger.
        self.amount_transactions
            .write()
            .unwrap()
            .retain(|row| !(row.tenant_id == tenant_id && row.ledger_id == ledger_id));
        Ok(())
    }

    async fn ledger_codes_with_prefix(
        &self,
        tenant_id: &str,
        base: &str,
    ) -> MastersResult<Vec<String>> {
        let ledgers = self.ledgers.read().unwrap();
        Ok(ledgers
            .values()
            .filter(|ledger| ledger.tenant_id == tenant_id)
            .filter_map(|ledger| ledger.code.clone())
            .filter(|code| code.starts_with(base))
            .collect())
    }

    async fn insert_numbering_config(&mut self, config: &NumberingConfig) -> MastersResult<()> {
        let mut configs = self.configs.write().unwrap();
        let key = (
            config.tenant_id.clone(),
            config.series_type,
            config.series_name.clone(),
            config.effective_from,
        );
        if configs.contains_key(&key) {
            return Err(MastersError::Validation(format!(
                "Numbering series '{}' is already configured for {} from {}",
                config.series_name, config.series_type, config.effective_from
            )));
        }
        configs.insert(key, config.clone());
        Ok(())
    }

    async fn list_numbering_configs(&self, tenant_id: &str) -> MastersResult<Vec<NumberingConfig>> {
        let configs = self.configs.read().unwrap();
        let mut result: Vec<NumberingConfig> = configs
            .values()
            .filter(|config| config.tenant_id == tenant_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            (a.series_type.as_str(), &a.series_name, a.effective_from).cmp(&(
                b.series_type.as_str(),
                &b.series_name,
                b.effective_from,
            ))
        });
        Ok(result)
    }

    async fn allocate_sequence(
        &mut self,
        tenant_id: &str,
        series_type: SeriesType,
        series_name: &str,
        on_date: NaiveDate,
    ) -> MastersResult<Option<AllocatedNumber>> {
        // The write lock serializes the read-increment-write, standing in for
        // a row-level lock.
        let mut configs = self.configs.write().unwrap();

        let key = configs
            .iter()
            .filter(|(_, config)| {
                config.tenant_id == tenant_id
                    && config.series_type == series_type
                    && config.series_name == series_name
                    && config.covers(on_date)
            })
            .max_by_key(|(_, config)| config.effective_from)
            .map(|(key, _)| key.clone());

        let Some(key) = key else {
            return Ok(None);
        };

        let config = configs.get_mut(&key).expect("key taken from this map");
        let value = config.current_number;
        config.current_number = value + 1;

        Ok(Some(AllocatedNumber {
            value,
            prefix: config.prefix.clone(),
            suffix: config.suffix.clone(),
            required_digits: config.required_digits,
        }))
    }

    async fn insert_amount_transaction(&mut self, txn: &AmountTransaction) -> MastersResult<()> {
        // Hold the ledgers lock across the insert so a concurrent
        // delete_ledger cannot slip between the existence check and the
        // write and leave an orphaned row behind the cascade.
        let ledgers = self.ledgers.read().unwrap();
        let ledger = ledgers
            .get(&(txn.tenant_id.clone(), txn.ledger_id.clone()))
            .ok_or_else(|| MastersError::LedgerNotFound(txn.ledger_id.clone()))?;

        if !is_cash_or_bank_ledger(ledger) {
            return Err(MastersError::InvariantViolation(format!(
                "Ledger '{}' is not a cash or bank ledger",
                ledger.name
            )));
        }

        let mut rows = self.amount_transactions.write().unwrap();
        if txn.transaction_type == TransactionType::OpeningBalance {
            let duplicate = rows.iter().any(|row| {
                row.tenant_id == txn.tenant_id
                    && row.ledger_id == txn.ledger_id
                    && row.transaction_type == TransactionType::OpeningBalance
            });
            if duplicate {
                return Err(MastersError::DuplicateOpeningBalance(txn.ledger_id.clone()));
            }
        }

        rows.push(txn.clone());
        Ok(())
    }

    async fn list_amount_transactions(
        &self,
        tenant_id: &str,
        ledger_id: &str,
    ) -> MastersResult<Vec<AmountTransaction>> {
        Ok(self
            .amount_transactions
            .read()
            .unwrap()
            .iter()
            .filter(|row| row.tenant_id == tenant_id && row.ledger_id == ledger_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn bank_ledger(tenant_id: &str, id: &str, code: &str) -> Ledger {
        Ledger {
            id: id.to_string(),
            tenant_id: tenant_id.to_string(),
            name: format!("Bank {id}"),
            category: "Assets".to_string(),
            group: "Cash and Bank Balances".to_string(),
            sub_group_1: "Bank".to_string(),
            sub_group_2: String::new(),
            sub_group_3: String::new(),
            ledger_type: String::new(),
            code: Some(code.to_string()),
            additional_data: HashMap::new(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected_per_tenant() {
        let mut storage = MemoryStorage::new();
        storage
            .insert_ledger(&bank_ledger("t1", "l1", "01020402"))
            .await
            .unwrap();

        let err = storage
            .insert_ledger(&bank_ledger("t1", "l2", "01020402"))
            .await
            .unwrap_err();
        assert!(matches!(err, MastersError::DuplicateCode(_)));

        // Same code in another tenant is fine.
        storage
            .insert_ledger(&bank_ledger("t2", "l1", "01020402"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn duplicate_opening_balance_is_rejected() {
        let mut storage = MemoryStorage::new();
        let ledger = bank_ledger("t1", "l1", "01020402");
        storage.insert_ledger(&ledger).await.unwrap();

        let row = AmountTransaction::opening_balance(&ledger);
        storage.insert_amount_transaction(&row).await.unwrap();

        let again = AmountTransaction::opening_balance(&ledger);
        let err = storage.insert_amount_transaction(&again).await.unwrap_err();
        assert!(matches!(err, MastersError::DuplicateOpeningBalance(_)));

        // Ordinary postings are not limited to one per ledger.
        let mut posting = AmountTransaction::opening_balance(&ledger);
        posting.id = uuid::Uuid::new_v4();
        posting.transaction_type = TransactionType::Transaction;
        storage.insert_amount_transaction(&posting).await.unwrap();
        let mut another = posting.clone();
        another.id = uuid::Uuid::new_v4();
        storage.insert_amount_transaction(&another).await.unwrap();
    }

    #[tokio::test]
    async fn amount_row_requires_existing_ledger() {
        let mut storage = MemoryStorage::new();
        let ledger = bank_ledger("t1", "ghost", "01020402");
        let row = AmountTransaction::opening_balance(&ledger);
        let err = storage.insert_amount_transaction(&row).await.unwrap_err();
        assert!(matches!(err, MastersError::LedgerNotFound(_)));
    }

    #[tokio::test]
    async fn delete_ledger_cascades_to_amount_rows() {
        let mut storage = MemoryStorage::new();
        let ledger = bank_ledger("t1", "l1", "01020402");
        storage.insert_ledger(&ledger).await.unwrap();
        storage
            .insert_amount_transaction(&AmountTransaction::opening_balance(&ledger))
            .await
            .unwrap();

        storage.delete_ledger("t1", "l1").await.unwrap();
        assert!(storage.get_ledger("t1", "l1").await.unwrap().is_none());
        assert!(storage
            .list_amount_transactions("t1", "l1")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cascade_delete_races_cleanly_with_row_inserts() {
        let mut storage = MemoryStorage::new();
        let ledger = bank_ledger("t1", "l1", "01020402");
        storage.insert_ledger(&ledger).await.unwrap();

        // One writer hammers posting rows while the ledger is deleted from
        // under it; inserts after the delete fail with LedgerNotFound and
        // any row landed before it is swept by the cascade.
        let mut writer = storage.clone();
        let row_ledger = ledger.clone();
        let writer_task = tokio::spawn(async move {
            for _ in 0..200 {
                let mut row = AmountTransaction::opening_balance(&row_ledger);
                row.id = uuid::Uuid::new_v4();
                row.transaction_type = TransactionType::Transaction;
                let _ = writer.insert_amount_transaction(&row).await;
            }
        });
        let mut deleter = storage.clone();
        let deleter_task = tokio::spawn(async move {
            tokio::task::yield_now().await;
            deleter.delete_ledger("t1", "l1").await.unwrap();
        });

        writer_task.await.unwrap();
        deleter_task.await.unwrap();

        assert!(storage.get_ledger("t1", "l1").await.unwrap().is_none());
        assert!(storage
            .list_amount_transactions("t1", "l1")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn list_ledgers_page_slices_in_id_order() {
        let mut storage = MemoryStorage::new();
        for i in 0..5 {
            storage
                .insert_ledger(&bank_ledger("t1", &format!("l{i}"), &format!("0102040{i}")))
                .await
                .unwrap();
        }

        let page = storage.list_ledgers_page("t1", 2, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "l2");
        assert_eq!(page[1].id, "l3");

        let tail = storage.list_ledgers_page("t1", 4, 2).await.unwrap();
        assert_eq!(tail.len(), 1);
        assert!(storage.list_ledgers_page("t1", 5, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn codes_with_prefix_filters_by_tenant_and_base() {
        let mut storage = MemoryStorage::new();
        storage
            .insert_ledger(&bank_ledger("t1", "l1", "01020402"))
            .await
            .unwrap();
        storage
            .insert_ledger(&bank_ledger("t1", "l2", "01020402.001"))
            .await
            .unwrap();
        storage
            .insert_ledger(&bank_ledger("t2", "l1", "01020402.002"))
            .await
            .unwrap();

        let mut codes = storage
            .ledger_codes_with_prefix("t1", "01020402")
            .await
            .unwrap();
        codes.sort();
        assert_eq!(codes, vec!["01020402", "01020402.001"]);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mut storage = MemoryStorage::new();
        let clone = storage.clone();
        storage
            .insert_ledger(&bank_ledger("t1", "l1", "01020402"))
            .await
            .unwrap();
        assert_eq!(clone.list_ledgers("t1").await.unwrap().len(), 1);
    }
}
