//! UseCase: ルーム状態取得（デバッグ用途）

use std::sync::Arc;

use crate::domain::{RepositoryError, Room, RoomRepository};

/// ルーム状態取得のユースケース
pub struct GetRoomStateUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomStateUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 現在のルーム状態のスナップショットを取得
    pub async fn execute(&self) -> Result<Room, RepositoryError> {
        self.repository.get_room().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{RoomId, Timestamp},
        infrastructure::repository::InMemoryRoomRepository,
    };
    use futari_shared::time::get_unix_timestamp_millis;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn test_get_room_state_returns_snapshot() {
        // テスト項目: 現在のルーム状態のスナップショットが取得できる
        // given (前提条件):
        let room = Arc::new(Mutex::new(Room::new(
            RoomId::generate(),
            Timestamp::new(get_unix_timestamp_millis()),
        )));
        let repository = Arc::new(InMemoryRoomRepository::new(room));
        let usecase = GetRoomStateUseCase::new(repository);

        // when (操作):
        let result = usecase.execute().await;

        // then (期待する結果):
        let snapshot = result.unwrap();
        assert!(snapshot.occupants.is_empty());
        assert!(snapshot.messages.is_empty());
    }
}
