// Storage of the ballots in a remote key-value store.
//
// The store speaks the Redis-over-REST protocol of Upstash (which Vercel KV
// is built on): a command is POSTed as a JSON array, for example
// `["GET", "mammoth-votes"]`, and the answer is `{"result": ...}` or
// `{"error": "..."}`.

use serde::Deserialize;

use crate::poll::{
    config_reader::KvSettings,
    io_common::{decode_snapshot, encode_snapshot_compact},
    *,
};

#[derive(Debug, Deserialize)]
struct KvReply {
    #[serde(default)]
    result: Option<JSValue>,
    #[serde(default)]
    error: Option<String>,
}

pub struct KvBackend {
    agent: ureq::Agent,
    url: String,
    token: String,
    key: String,
}

impl KvBackend {
    /// Builds the client. Nothing is sent to the store at this point.
    pub fn new(settings: &KvSettings) -> StoreResult<KvBackend> {
        let url = settings.url.trim();
        ensure!(
            url.starts_with("https://") || url.starts_with("http://"),
            KvConfigSnafu {
                reason: format!("the endpoint {:?} is not an http(s) URL", url)
            }
        );
        ensure!(
            !settings.token.trim().is_empty(),
            KvConfigSnafu {
                reason: "the access token is empty"
            }
        );
        ensure!(
            !settings.key.is_empty(),
            KvConfigSnafu {
                reason: "the key is empty"
            }
        );
        ensure!(
            !settings.timeout.is_zero(),
            KvConfigSnafu {
                reason: "the timeout must be positive"
            }
        );
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(settings.timeout)
            .timeout_read(settings.timeout)
            .timeout_write(settings.timeout)
            .user_agent(concat!("polltally/", env!("CARGO_PKG_VERSION")))
            .build();
        Ok(KvBackend {
            agent,
            url: url.trim_end_matches('/').to_string(),
            token: settings.token.trim().to_string(),
            key: settings.key.clone(),
        })
    }

    fn command(&self, cmd: JSValue) -> StoreResult<JSValue> {
        debug!("command: {} {}", self.url, cmd[0]);
        let response = self
            .agent
            .post(&self.url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/json")
            .send_json(cmd);
        match response {
            Ok(r) => {
                let reply: KvReply = r.into_json().context(KvReplyReadSnafu {})?;
                reply_result(reply)
            }
            Err(ureq::Error::Status(code, r)) => {
                let body = r.into_string().unwrap_or_default();
                KvStatusSnafu {
                    code,
                    message: status_message(&body),
                }
                .fail()
            }
            Err(ureq::Error::Transport(t)) => KvTransportSnafu {
                message: t.to_string(),
            }
            .fail(),
        }
    }
}

impl BallotBackend for KvBackend {
    fn name(&self) -> &'static str {
        "key-value"
    }

    fn load(&self) -> StoreResult<Vec<Ballot>> {
        let result = self.command(json!(["GET", self.key]))?;
        decode_get_result(result)
    }

    fn save(&self, ballots: &[Ballot]) -> StoreResult<()> {
        let value = encode_snapshot_compact(ballots)?;
        let result = self.command(json!(["SET", self.key, value]))?;
        check_set_result(&result)
    }
}

fn reply_result(reply: KvReply) -> StoreResult<JSValue> {
    if let Some(message) = reply.error {
        return KvRejectedSnafu { message }.fail();
    }
    Ok(reply.result.unwrap_or(JSValue::Null))
}

/// The error message in the body of a failed request, or the body itself.
fn status_message(body: &str) -> String {
    match serde_json::from_str::<KvReply>(body) {
        Ok(KvReply {
            error: Some(message),
            ..
        }) => message,
        _ => body.trim().to_string(),
    }
}

/// A missing key is an empty poll. The value is normally the serialized
/// array, but an array stored as is is accepted too.
fn decode_get_result(result: JSValue) -> StoreResult<Vec<Ballot>> {
    match result {
        JSValue::Null => Ok(Vec::new()),
        JSValue::String(s) => decode_snapshot(&s),
        v @ JSValue::Array(_) => serde_json::from_value(v).context(DecodingSnapshotSnafu {}),
        v => KvUnexpectedSnafu {
            message: format!("the stored value is not a list of votes: {}", v),
        }
        .fail(),
    }
}

fn check_set_result(result: &JSValue) -> StoreResult<()> {
    match result {
        JSValue::String(s) if s == "OK" => Ok(()),
        v => KvUnexpectedSnafu {
            message: format!("SET answered {}", v),
        }
        .fail(),
    }
}
