//! GraphQL façade
//!
//! Mirrors the REST surface over one schema: `allEvents`, `user(userId)` and
//! `spot(spotId)` read directly from the event store (same append-order
//! guarantee as the REST event listing, with `events` fields resolved lazily
//! from the store's filtered views), while the analytics fields delegate to
//! the same aggregation engine the REST endpoints use.

use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Result, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::response::{Html, IntoResponse};
use axum::Extension;
use chrono::{DateTime, Utc};

use crate::analytics::{Dashboard, SpotUsage, UsageStats, UserActivity, DEFAULT_TOP_LIMIT};
use crate::api::AppState;
use crate::types::{ParkingEvent, Window};

/// The service's GraphQL schema type
pub type ServiceSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Build the schema with the shared application state attached
pub fn build_schema(state: Arc<AppState>) -> ServiceSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(state)
        .finish()
}

fn limit_or_default(limit: Option<i32>) -> usize {
    match limit {
        Some(l) if l > 0 => (l as usize).min(100),
        _ => DEFAULT_TOP_LIMIT,
    }
}

/// A user handle; its events resolve lazily from the store
pub struct User {
    user_id: String,
}

#[Object]
impl User {
    async fn user_id(&self) -> &str {
        &self.user_id
    }

    /// This user's events, append order preserved
    async fn events(&self, ctx: &Context<'_>) -> Result<Vec<ParkingEvent>> {
        let state = ctx.data::<Arc<AppState>>()?;
        Ok(state.store.list_by_user(&self.user_id))
    }
}

/// A spot handle; its events resolve lazily from the store
pub struct Spot {
    spot_id: i64,
}

#[Object]
impl Spot {
    async fn spot_id(&self) -> i64 {
        self.spot_id
    }

    /// This spot's events, append order preserved
    async fn events(&self, ctx: &Context<'_>) -> Result<Vec<ParkingEvent>> {
        let state = ctx.data::<Arc<AppState>>()?;
        Ok(state.store.list_by_spot(self.spot_id))
    }
}

/// Root query type
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The full ordered event log
    async fn all_events(&self, ctx: &Context<'_>) -> Result<Vec<ParkingEvent>> {
        let state = ctx.data::<Arc<AppState>>()?;
        Ok(state.store.list_all())
    }

    /// A user handle, or null when no event mentions the user
    async fn user(&self, ctx: &Context<'_>, user_id: String) -> Result<Option<User>> {
        let state = ctx.data::<Arc<AppState>>()?;
        Ok(state.store.has_user(&user_id).then_some(User { user_id }))
    }

    /// A spot handle, or null when no event mentions the spot
    async fn spot(&self, ctx: &Context<'_>, spot_id: i64) -> Result<Option<Spot>> {
        let state = ctx.data::<Arc<AppState>>()?;
        Ok(state.store.has_spot(spot_id).then_some(Spot { spot_id }))
    }

    /// Top spots by session count
    async fn popular_spots(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<SpotUsage>> {
        let state = ctx.data::<Arc<AppState>>()?;
        Ok(state
            .analytics
            .popular_spots(limit_or_default(limit), &Window { from, to }))
    }

    /// Top users by session count
    async fn frequent_users(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<UserActivity>> {
        let state = ctx.data::<Arc<AppState>>()?;
        Ok(state
            .analytics
            .frequent_users(limit_or_default(limit), &Window { from, to }))
    }

    /// Overall usage statistics
    async fn usage_stats(
        &self,
        ctx: &Context<'_>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<UsageStats> {
        let state = ctx.data::<Arc<AppState>>()?;
        Ok(state.analytics.usage_stats(&Window { from, to }))
    }

    /// All analytics from one consistent snapshot
    async fn dashboard(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Dashboard> {
        let state = ctx.data::<Arc<AppState>>()?;
        Ok(state
            .analytics
            .dashboard(limit_or_default(limit), &Window { from, to }))
    }
}

/// POST /graphql - execute a GraphQL request
pub async fn graphql_handler(
    Extension(schema): Extension<ServiceSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

/// GET /graphql - GraphiQL playground
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
