//! In-process stand-in for the GraphQL endpoint.

use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::graphql::{ClientError, GraphqlRequest, GraphqlTransport};

type Reply = Result<Value, ClientError>;
type Router = Box<dyn Fn(&GraphqlRequest) -> Reply + Send + Sync>;

enum Mode {
  Fixed(Reply),
  Sequence(Mutex<VecDeque<Reply>>),
  Gated(Mutex<VecDeque<oneshot::Receiver<Reply>>>),
  Routed(Router),
}

struct Inner {
  mode: Mode,
  calls: AtomicUsize,
  requests: Mutex<Vec<GraphqlRequest>>,
}

/// Counts every request and answers from a canned script.
#[derive(Clone)]
pub struct MockTransport {
  inner: Arc<Inner>,
}

impl MockTransport {
  fn with_mode(mode: Mode) -> Self {
    Self {
      inner: Arc::new(Inner {
        mode,
        calls: AtomicUsize::new(0),
        requests: Mutex::new(Vec::new()),
      }),
    }
  }

  /// Every request succeeds with `data`.
  pub fn returning(data: Value) -> Self {
    Self::with_mode(Mode::Fixed(Ok(data)))
  }

  /// Every request fails with `err`.
  pub fn failing(err: ClientError) -> Self {
    Self::with_mode(Mode::Fixed(Err(err)))
  }

  /// Replies in order; further requests fail.
  pub fn sequence(replies: Vec<Reply>) -> Self {
    Self::with_mode(Mode::Sequence(Mutex::new(replies.into())))
  }

  /// Each request waits on the next gate pushed with [`push_gate`](Self::push_gate).
  pub fn gated() -> Self {
    Self::with_mode(Mode::Gated(Mutex::new(VecDeque::new())))
  }

  /// Reply computed from the request.
  pub fn routed<F>(router: F) -> Self
  where
    F: Fn(&GraphqlRequest) -> Reply + Send + Sync + 'static,
  {
    Self::with_mode(Mode::Routed(Box::new(router)))
  }

  pub fn push_gate(&self) -> oneshot::Sender<Reply> {
    let (tx, rx) = oneshot::channel();
    if let Mode::Gated(gates) = &self.inner.mode {
      gates.lock().unwrap().push_back(rx);
    }
    tx
  }

  pub fn calls(&self) -> usize {
    self.inner.calls.load(Ordering::SeqCst)
  }

  pub fn requests(&self) -> Vec<GraphqlRequest> {
    self.inner.requests.lock().unwrap().clone()
  }
}

impl GraphqlTransport for MockTransport {
  fn execute(&self, request: GraphqlRequest) -> BoxFuture<'static, Reply> {
    self.inner.calls.fetch_add(1, Ordering::SeqCst);
    self.inner.requests.lock().unwrap().push(request.clone());

    match &self.inner.mode {
      Mode::Fixed(reply) => {
        let reply = reply.clone();
        Box::pin(async move { reply })
      }
      Mode::Sequence(replies) => {
        let reply = replies
          .lock()
          .unwrap()
          .pop_front()
          .unwrap_or_else(|| Err(ClientError::Network("no scripted reply left".into())));
        Box::pin(async move { reply })
      }
      Mode::Gated(gates) => {
        let gate = gates.lock().unwrap().pop_front();
        Box::pin(async move {
          match gate {
            Some(rx) => rx
              .await
              .unwrap_or_else(|_| Err(ClientError::Network("gate dropped".into()))),
            None => Err(ClientError::Network("no gate pushed".into())),
          }
        })
      }
      Mode::Routed(router) => {
        let reply = router(&request);
        Box::pin(async move { reply })
      }
    }
  }
}
