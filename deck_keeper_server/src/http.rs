use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use deck_keeper_core::{parse_draw_count, DeckError, DeckId, DeckView, Pile};

use crate::service::DeckService;

const DEFAULT_PACKS: u32 = 1;

/// 把 `DeckError` 映射为 HTTP 状态码，响应体是纯文本错误信息
pub struct ApiError(pub DeckError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            DeckError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            DeckError::NotFound => StatusCode::NOT_FOUND,
            DeckError::EmptyDeck => StatusCode::CONFLICT,
            DeckError::TooManyPacks(_)
            | DeckError::DuplicateKey
            | DeckError::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DeckError> for ApiError {
    fn from(err: DeckError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.0.to_string()).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// 构建路由表
pub fn router(service: DeckService) -> Router {
    Router::new()
        .route("/deck/new", get(new_default_deck).post(new_default_deck))
        .route("/deck/new/", get(new_default_deck).post(new_default_deck))
        .route("/deck/new/{packs}", get(new_deck_with_packs).post(new_deck_with_packs))
        .route("/deck/new/{packs}/{jokers}", get(new_deck).post(new_deck))
        .route("/deck/{id}/draw/{count}", get(draw_cards))
        .route("/deck/{id}/shuffle", get(shuffle_deck))
        .route("/deck/{id}/add", post(add_cards))
        .route("/deck/{id}/show/{pile}/{count}", get(show_pile))
        .with_state(service)
}

/// 无法解析的包数按 1 处理
fn parse_packs(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or(DEFAULT_PACKS)
}

/// 不是合法 UUID 的 id 不可能存在
fn parse_deck_id(raw: &str) -> Result<DeckId, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError(DeckError::NotFound))
}

async fn new_default_deck(State(service): State<DeckService>) -> ApiResult<DeckView> {
    Ok(Json(service.create(DEFAULT_PACKS, false).await?))
}

async fn new_deck_with_packs(
    State(service): State<DeckService>,
    Path(packs): Path<String>,
) -> ApiResult<DeckView> {
    Ok(Json(service.create(parse_packs(&packs), false).await?))
}

async fn new_deck(
    State(service): State<DeckService>,
    Path((packs, jokers)): Path<(String, String)>,
) -> ApiResult<DeckView> {
    Ok(Json(service.create(parse_packs(&packs), jokers == "true").await?))
}

async fn draw_cards(
    State(service): State<DeckService>,
    Path((id, count)): Path<(String, String)>,
) -> ApiResult<DeckView> {
    let count = parse_draw_count(&count)?;
    let id = parse_deck_id(&id)?;
    let outcome = service.draw(id, count).await?;
    debug!("抽牌请求完成: {} 张", outcome.stamped.len());
    Ok(Json(outcome.view))
}

async fn shuffle_deck(
    State(service): State<DeckService>,
    Path(id): Path<String>,
) -> ApiResult<DeckView> {
    let id = parse_deck_id(&id)?;
    Ok(Json(service.shuffle(id).await?))
}

#[derive(Debug, Deserialize)]
struct AddCardsQuery {
    #[serde(default)]
    cards: String,
}

async fn add_cards(
    State(service): State<DeckService>,
    Path(id): Path<String>,
    Query(query): Query<AddCardsQuery>,
) -> ApiResult<DeckView> {
    let id = parse_deck_id(&id)?;
    Ok(Json(service.add_cards(id, query.cards).await?))
}

async fn show_pile(
    State(service): State<DeckService>,
    Path((id, pile, count)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    let id = parse_deck_id(&id)?;
    let pile = Pile::parse(&pile)?;
    let response = match pile {
        Pile::Drawn => Json(service.show_drawn(id, count).await?).into_response(),
        Pile::Upcoming => Json(service.show_upcoming(id, count).await?).into_response(),
    };
    Ok(response)
}
