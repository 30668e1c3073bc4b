//! Control request router
//!
//! Transport-agnostic dispatch of named control requests to player and
//! content source manager operations. Params and results are JSON values so
//! any surface (HTTP, WebSocket, IPC) can forward requests verbatim.
//!
//! The route table is built once and never changes.

use crate::autopool::{ContentSourceManager, RefillProgress};
use crate::error::{Error, Result};
use crate::player::Player;
use futures::future::{BoxFuture, FutureExt};
use playout_common::time::millis_to_duration;
use playout_common::{AutoPoolOptions, ContentBlock, MediaObject, PullOrder, SourceId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Components reachable from control handlers
#[derive(Clone)]
pub struct ControlContext {
    pub player: Player,
    pub manager: ContentSourceManager,
}

type Handler = fn(ControlContext, Value) -> BoxFuture<'static, Result<Value>>;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct MediaRequest {
    media: MediaObject,
}

#[derive(Debug, Deserialize)]
struct IndexedMediaRequest {
    index: usize,
    media: MediaObject,
}

#[derive(Debug, Deserialize)]
struct IndexRequest {
    index: usize,
}

#[derive(Debug, Deserialize)]
struct ReorderRequest {
    from: usize,
    to: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayNowRequest {
    media: MediaObject,
    #[serde(default)]
    unload_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnloadDelayRequest {
    #[serde(default)]
    unload_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SourceRequest {
    id: SourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetInPoolRequest {
    id: SourceId,
    in_pool: bool,
}

#[derive(Debug, Deserialize)]
struct SetEnabledRequest {
    enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetTargetRequest {
    target_queue_size: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetPullOrderRequest {
    pull_order: PullOrder,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AutoPoolResponse {
    options: AutoPoolOptions,
    refill: RefillProgress,
}

// ============================================================================
// Router
// ============================================================================

/// Lookup table from request name to handler
pub struct ControlRouter {
    context: ControlContext,
    routes: HashMap<&'static str, Handler>,
}

impl ControlRouter {
    pub fn new(player: Player, manager: ContentSourceManager) -> Self {
        let mut routes: HashMap<&'static str, Handler> = HashMap::new();
        routes.insert("player.state", player_state);
        routes.insert("player.enqueue", player_enqueue);
        routes.insert("player.insert", player_insert);
        routes.insert("player.remove", player_remove);
        routes.insert("player.update", player_update);
        routes.insert("player.reorder", player_reorder);
        routes.insert("player.skip", player_skip);
        routes.insert("player.restart", player_restart);
        routes.insert("player.play_now", player_play_now);
        routes.insert("player.go_to_default", player_go_to_default);
        routes.insert("sources.list", sources_list);
        routes.insert("sources.remove", sources_remove);
        routes.insert("sources.set_in_pool", sources_set_in_pool);
        routes.insert("sources.refresh", sources_refresh);
        routes.insert("autopool.get", autopool_get);
        routes.insert("autopool.set", autopool_set);
        routes.insert("autopool.set_enabled", autopool_set_enabled);
        routes.insert("autopool.set_target", autopool_set_target);
        routes.insert("autopool.set_pull_order", autopool_set_pull_order);

        Self {
            context: ControlContext { player, manager },
            routes,
        }
    }

    /// Route names, sorted
    pub fn routes(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.routes.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Run the handler registered for `route`
    pub async fn dispatch(&self, route: &str, params: Value) -> Result<Value> {
        let Some(handler) = self.routes.get(route) else {
            warn!("Unknown control route: {}", route);
            return Err(Error::BadRequest(format!("Unknown route: {}", route)));
        };
        debug!("Control request {}", route);
        handler(self.context.clone(), params).await
    }
}

/// Decode handler params; `null` counts as an empty object
fn params<T: DeserializeOwned>(value: Value) -> Result<T> {
    let value = if value.is_null() { json!({}) } else { value };
    serde_json::from_value(value).map_err(|e| Error::BadRequest(format!("Invalid params: {}", e)))
}

fn unload_delay(ms: Option<u64>) -> Option<Duration> {
    ms.map(millis_to_duration)
}

// ============================================================================
// Player handlers
// ============================================================================

fn player_state(ctx: ControlContext, _params: Value) -> BoxFuture<'static, Result<Value>> {
    async move { Ok(serde_json::to_value(ctx.player.get_state().await)?) }.boxed()
}

fn player_enqueue(ctx: ControlContext, value: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        let req: MediaRequest = params(value)?;
        let block = ContentBlock::new(req.media);
        let id = block.id();
        ctx.player.enqueue_block(block).await;
        Ok(json!({ "blockId": id }))
    }
    .boxed()
}

fn player_insert(ctx: ControlContext, value: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        let req: IndexedMediaRequest = params(value)?;
        let block = ContentBlock::new(req.media);
        let id = block.id();
        ctx.player.insert_block_at(req.index, block, false).await?;
        Ok(json!({ "blockId": id }))
    }
    .boxed()
}

fn player_remove(ctx: ControlContext, value: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        let req: IndexRequest = params(value)?;
        let removed = ctx.player.remove_block_at(req.index, false).await?;
        Ok(serde_json::to_value(removed)?)
    }
    .boxed()
}

fn player_update(ctx: ControlContext, value: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        let req: IndexedMediaRequest = params(value)?;
        let block = ContentBlock::new(req.media);
        let id = block.id();
        ctx.player.update_block_at(req.index, block).await?;
        Ok(json!({ "blockId": id }))
    }
    .boxed()
}

fn player_reorder(ctx: ControlContext, value: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        let req: ReorderRequest = params(value)?;
        ctx.player.reorder_block(req.from, req.to).await?;
        Ok(Value::Null)
    }
    .boxed()
}

fn player_skip(ctx: ControlContext, _params: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        ctx.player.progress_queue().await?;
        Ok(serde_json::to_value(ctx.player.current_block().await)?)
    }
    .boxed()
}

fn player_restart(ctx: ControlContext, _params: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        ctx.player.restart_current_block().await?;
        Ok(Value::Null)
    }
    .boxed()
}

fn player_play_now(ctx: ControlContext, value: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        let req: PlayNowRequest = params(value)?;
        let block = ContentBlock::new(req.media);
        let id = block.id();
        ctx.player
            .set_current_block_now(block, unload_delay(req.unload_delay_ms))
            .await?;
        Ok(json!({ "blockId": id }))
    }
    .boxed()
}

fn player_go_to_default(ctx: ControlContext, value: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        let req: UnloadDelayRequest = params(value)?;
        ctx.player
            .go_to_default_block(unload_delay(req.unload_delay_ms))
            .await?;
        Ok(Value::Null)
    }
    .boxed()
}

// ============================================================================
// Source handlers
// ============================================================================

fn sources_list(ctx: ControlContext, _params: Value) -> BoxFuture<'static, Result<Value>> {
    async move { Ok(serde_json::to_value(ctx.manager.list_sources())?) }.boxed()
}

fn sources_remove(ctx: ControlContext, value: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        let req: SourceRequest = params(value)?;
        ctx.manager.remove_source(req.id)?;
        Ok(Value::Null)
    }
    .boxed()
}

fn sources_set_in_pool(ctx: ControlContext, value: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        let req: SetInPoolRequest = params(value)?;
        ctx.manager.set_source_in_pool(req.id, req.in_pool)?;
        Ok(serde_json::to_value(ctx.manager.pool_members())?)
    }
    .boxed()
}

fn sources_refresh(ctx: ControlContext, value: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        let req: SourceRequest = params(value)?;
        ctx.manager.refresh_source(req.id).await?;
        Ok(Value::Null)
    }
    .boxed()
}

// ============================================================================
// Auto-pool handlers
// ============================================================================

fn autopool_response(manager: &ContentSourceManager) -> Result<Value> {
    Ok(serde_json::to_value(AutoPoolResponse {
        options: manager.options(),
        refill: manager.refill_progress(),
    })?)
}

fn autopool_get(ctx: ControlContext, _params: Value) -> BoxFuture<'static, Result<Value>> {
    async move { autopool_response(&ctx.manager) }.boxed()
}

fn autopool_set(ctx: ControlContext, value: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        let options: AutoPoolOptions = params(value)?;
        ctx.manager.set_auto_pool_options(options).await;
        autopool_response(&ctx.manager)
    }
    .boxed()
}

fn autopool_set_enabled(ctx: ControlContext, value: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        let req: SetEnabledRequest = params(value)?;
        ctx.manager.set_auto_pool_enabled(req.enabled).await;
        autopool_response(&ctx.manager)
    }
    .boxed()
}

fn autopool_set_target(ctx: ControlContext, value: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        let req: SetTargetRequest = params(value)?;
        ctx.manager.set_target_queue_size(req.target_queue_size);
        autopool_response(&ctx.manager)
    }
    .boxed()
}

fn autopool_set_pull_order(ctx: ControlContext, value: Value) -> BoxFuture<'static, Result<Value>> {
    async move {
        let req: SetPullOrderRequest = params(value)?;
        ctx.manager.set_pull_order(req.pull_order);
        autopool_response(&ctx.manager)
    }
    .boxed()
}
