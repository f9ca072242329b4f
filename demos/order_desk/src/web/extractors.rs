// demos/order_desk/src/web/extractors.rs

use actix_web::{FromRequest, HttpRequest};
use gigflow::Actor;
use std::str::FromStr;
use tracing::warn;

use crate::errors::AppError;

pub const ACTOR_HEADER: &str = "X-Actor";

/// The role acting on a request, taken from the `X-Actor` header.
/// Stands in for real authentication.
#[derive(Debug, Clone, Copy)]
pub struct ActingUser {
  pub actor: Actor,
}

impl FromRequest for ActingUser {
  type Error = AppError;
  type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let parsed = req
      .headers()
      .get(ACTOR_HEADER)
      .and_then(|value| value.to_str().ok())
      .map(Actor::from_str);

    let result = match parsed {
      Some(Ok(actor)) => Ok(ActingUser { actor }),
      Some(Err(e)) => {
        warn!(error = %e, "ActingUser extractor: unrecognised actor header.");
        Err(AppError::Auth(e.to_string()))
      }
      None => {
        warn!("ActingUser extractor: missing {} header.", ACTOR_HEADER);
        Err(AppError::Auth(format!(
          "Missing {} header (freelancer, client or admin).",
          ACTOR_HEADER
        )))
      }
    };
    futures_util::future::ready(result)
  }
}
