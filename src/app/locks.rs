use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One writer per symbol at a time.
#[derive(Debug, Default)]
pub struct SymbolLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SymbolLocks {
    pub async fn lock(&self, symbol: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            locks
                .entry(symbol.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Locks several symbols in a fixed order so two callers can't deadlock.
    pub async fn lock_all(&self, symbols: &[&str]) -> Vec<OwnedMutexGuard<()>> {
        let mut symbols = symbols.to_vec();
        symbols.sort_unstable();
        symbols.dedup();

        let mut guards = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            guards.push(self.lock(symbol).await);
        }
        guards
    }
}
