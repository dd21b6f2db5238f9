// Backend over the browser fetch API (gloo-net).

use gloo_net::http::{Request, Response};

use crate::api::{Backend, HttpReply};
use crate::error::UiError;

pub struct HttpBackend;

fn network_error(err: gloo_net::Error) -> UiError {
    UiError::Transport(match err {
        gloo_net::Error::JsError(js) => js.message,
        other => other.to_string(),
    })
}

async fn read_reply(response: Response) -> Result<HttpReply, UiError> {
    let status = response.status();
    let body = response.text().await.map_err(network_error)?;
    Ok(HttpReply::new(status, body))
}

impl Backend for HttpBackend {
    async fn post_json(&self, url: &str, body: String) -> Result<HttpReply, UiError> {
        let response = Request::post(url)
            .header("Content-Type", "application/json")
            .body(body)
            .map_err(network_error)?
            .send()
            .await
            .map_err(network_error)?;
        read_reply(response).await
    }

    async fn get(&self, url: &str) -> Result<HttpReply, UiError> {
        let response = Request::get(url).send().await.map_err(network_error)?;
        read_reply(response).await
    }
}
