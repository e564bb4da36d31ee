use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    event::{
        event::{CreateEvent, DeleteEvent, EventListFilter, UpdateEvent},
        Event,
    },
    id::{EventId, UserId},
};

#[async_trait]
pub trait EventRepository: Send + Sync {
    // イベントを作成する。無料イベントは主催者ごとの作成上限を超えられない。
    async fn create(&self, event: CreateEvent) -> AppResult<EventId>;
    // 開催前のイベントを開始日時の昇順で取得する
    async fn find_upcoming(&self, filter: EventListFilter) -> AppResult<Vec<Event>>;
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Event>>;
    async fn find_by_id(&self, event_id: EventId) -> AppResult<Option<Event>>;
    // 主催者のイベント一覧を新しい順で取得する
    async fn find_by_organizer(&self, organizer_id: UserId) -> AppResult<Vec<Event>>;
    // 主催者本人のみ部分更新できる
    async fn update(&self, event: UpdateEvent) -> AppResult<()>;
    // 主催者本人のみ削除できる。イベントの登録もあわせて削除する
    async fn delete(&self, event: DeleteEvent) -> AppResult<()>;
}
