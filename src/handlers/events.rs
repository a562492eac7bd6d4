use actix_web::{HttpRequest, HttpResponse, http::header, web};
use futures_util::stream;
use std::convert::Infallible;

use crate::AppState;
use crate::middleware::RequestIdExt;
use crate::services::user_context::RequestContext;

/// Server-sent stream of committed changes visible to the caller.
pub async fn stream_events(
    req: HttpRequest,
    ctx: RequestContext,
    state: web::Data<AppState>,
) -> HttpResponse {
    log::info!(
        "Opening change stream for {} (correlation_id={})",
        ctx.user_id,
        req.correlation_id().unwrap_or_default()
    );
    let subscription = state.feed.subscribe(ctx);

    let events = stream::unfold(subscription, |mut subscription| async move {
        let frame = subscription.next_frame().await?;
        Some((
            Ok::<_, Infallible>(web::Bytes::from(frame)),
            subscription,
        ))
    });

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(events)
}
