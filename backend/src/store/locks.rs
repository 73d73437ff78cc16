use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// 키(파일 이름)별 비동기 뮤텍스 테이블.
///
/// 같은 키에 대한 작업은 순서대로 실행되고, 다른 키끼리는 서로 막지 않습니다.
/// 아무도 잡고 있지 않은 항목은 다음 `lock` 호출 때 정리됩니다.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    table: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut table = self.table.lock();
            // 테이블만 참조하는 항목은 대기자도 보유자도 없다.
            table.retain(|_, lock| Arc::strong_count(lock) > 1);
            table.entry(key.to_string()).or_default().clone()
        };
        entry.lock_owned().await
    }

    /// 현재 테이블에 남아 있는 키 개수
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
