//! Single request/response service call primitive.
//!
//! The original event-loop model made a localize caller sleep a fixed
//! 100 ms so that transform listeners could observe the re-published
//! transform before the call returned.  Here the guarantee is explicit:
//! the server hands the handler a [`Responder`], and the client's
//! [`ServiceClient::call`] future only resolves once the handler has
//! finished its side effects and sent the response.  No wall-clock
//! timing is involved.

use digbot_types::DigError;
use tokio::sync::{mpsc, oneshot};

/// Default depth of the pending-request queue.
const DEFAULT_QUEUE_DEPTH: usize = 16;

/// Create a connected client/server pair for a `Req -> Resp` service.
pub fn service_pair<Req, Resp>() -> (ServiceClient<Req, Resp>, ServiceServer<Req, Resp>) {
    let (tx, rx) = mpsc::channel(DEFAULT_QUEUE_DEPTH);
    (ServiceClient { tx }, ServiceServer { rx })
}

/// Caller half of a service.  Clone it to share between tasks.
#[derive(Clone)]
pub struct ServiceClient<Req, Resp> {
    tx: mpsc::Sender<(Req, oneshot::Sender<Resp>)>,
}

impl<Req, Resp> ServiceClient<Req, Resp> {
    /// Send `request` and wait for the handler's response.
    ///
    /// # Errors
    ///
    /// Returns [`DigError::Service`] when the server has shut down, either
    /// before the request was delivered or before it was answered.
    pub async fn call(&self, request: Req) -> Result<Resp, DigError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send((request, reply_tx))
            .await
            .map_err(|_| DigError::Service("service server is gone".to_string()))?;
        reply_rx
            .await
            .map_err(|_| DigError::Service("service handler dropped the request".to_string()))
    }
}

/// Handler half of a service.
pub struct ServiceServer<Req, Resp> {
    rx: mpsc::Receiver<(Req, oneshot::Sender<Resp>)>,
}

impl<Req, Resp> ServiceServer<Req, Resp> {
    /// Wait for the next request.
    ///
    /// Returns `None` when every client has been dropped and no further
    /// requests can arrive.
    pub async fn next(&mut self) -> Option<(Req, Responder<Resp>)> {
        self.rx
            .recv()
            .await
            .map(|(req, tx)| (req, Responder { tx }))
    }
}

/// One-shot reply handle for a single request.
pub struct Responder<Resp> {
    tx: oneshot::Sender<Resp>,
}

impl<Resp> Responder<Resp> {
    /// Send the response, completing the caller's [`ServiceClient::call`].
    ///
    /// A caller that gave up waiting is not an error for the handler; the
    /// response is simply dropped.
    pub fn respond(self, response: Resp) {
        let _ = self.tx.send(response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn call_resolves_with_handler_response() {
        let (client, mut server) = service_pair::<u32, u32>();

        let handler = tokio::spawn(async move {
            while let Some((req, responder)) = server.next().await {
                responder.respond(req * 2);
            }
        });

        assert_eq!(client.call(21).await.unwrap(), 42);
        drop(client);
        handler.await.unwrap();
    }

    /// The caller must not resolve until the handler's side effects are done.
    #[tokio::test]
    async fn call_waits_for_side_effects_before_resolving() {
        let (client, mut server) = service_pair::<(), ()>();
        let (side_effect_tx, mut side_effect_rx) = mpsc::unbounded_channel::<&str>();

        tokio::spawn(async move {
            if let Some(((), responder)) = server.next().await {
                side_effect_tx.send("published").unwrap();
                responder.respond(());
            }
        });

        client.call(()).await.unwrap();
        // The side effect must already be observable once call() returns.
        assert_eq!(side_effect_rx.try_recv().unwrap(), "published");
    }

    #[tokio::test]
    async fn call_against_dropped_server_errors() {
        let (client, server) = service_pair::<u32, u32>();
        drop(server);
        let result = client.call(1).await;
        assert!(matches!(result, Err(DigError::Service(_))));
    }

    #[tokio::test]
    async fn dropped_responder_errors_the_caller() {
        let (client, mut server) = service_pair::<u32, u32>();

        tokio::spawn(async move {
            let (_req, responder) = server.next().await.unwrap();
            drop(responder);
        });

        let result = client.call(7).await;
        assert!(matches!(result, Err(DigError::Service(_))));
    }
}
