use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(view_events))
}

/// Stream of admin view paths whose cached rendering went stale.
#[utoipa::path(
    get,
    path = "/api/admin/events",
    responses(
        (status = 200, description = "`revalidate` events carrying a view path", body = String, content_type = "text/event-stream")
    ),
    tag = "Events"
)]
pub async fn view_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.views.subscribe();

    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(path) => {
                    let event = Event::default().event("revalidate").data(path.as_str());
                    return Some((Ok(event), rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "view event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
