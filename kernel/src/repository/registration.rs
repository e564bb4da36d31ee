use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    id::{EventId, RegistrationId, UserId},
    registration::{
        event::{CancelRegistration, CreateRegistration},
        CheckInOutcome, Registration, RegistrationState,
    },
};

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    // チケットを発行する。定員超過・二重登録は受け付けない
    async fn create(&self, event: CreateRegistration) -> AppResult<RegistrationId>;
    // 登録をキャンセルする（status を cancelled にするのみ）
    async fn cancel(&self, event: CancelRegistration) -> AppResult<()>;
    // チケットコードからチェックインを行う。
    // 同一チケットの同時スキャンでも成功するのは一回だけ
    async fn check_in(&self, qr_code: &str) -> AppResult<CheckInOutcome>;
    // ユーザーが保持するチケット一覧を取得する
    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Registration>>;
    // ダッシュボード集計用にイベントの登録状態を取得する
    async fn find_states_by_event_id(&self, event_id: EventId)
        -> AppResult<Vec<RegistrationState>>;
}
