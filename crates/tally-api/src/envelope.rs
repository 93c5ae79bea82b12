//! Response envelopes: `{"data": …}` for payloads, `{"message": …}` for
//! acknowledgements.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Data<T> {
  pub data: T,
}

pub fn data<T: Serialize>(data: T) -> Json<Data<T>> { Json(Data { data }) }

#[derive(Debug, Serialize)]
pub struct Message {
  pub message: &'static str,
}

pub fn message(message: &'static str) -> Json<Message> { Json(Message { message }) }
