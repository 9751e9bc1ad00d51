use axum::Router;

use crate::state::SharedState;

pub mod courts;
pub mod docs;
pub mod export;
pub mod health;
pub mod history;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(courts::router())
        .merge(history::router())
        .merge(export::router())
        .merge(docs::router())
        .with_state(state)
}
