#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::time::{Duration, Instant};

use pokedex_fetch::*;

pub const BASE: &str = "https://api.test/v2";

pub type Reply = Result<HttpResponse, TransportError>;

/// In-process transport serving canned replies per URL.
///
/// Scripted replies are consumed in order; once a URL's script runs out its
/// `always` reply (or a 404) is served.
#[derive(Default)]
pub struct StubTransport {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    always: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    latency: Duration,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn script(&self, url: &str, replies: impl IntoIterator<Item = Reply>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .extend(replies);
    }

    pub fn always(&self, url: &str, reply: Reply) {
        self.always.lock().unwrap().insert(url.to_string(), reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }

    pub fn call_times(&self, url: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| u == url)
            .map(|(_, t)| *t)
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, url: &str) -> Reply {
        if let Some(reply) = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|q| q.pop_front())
        {
            return reply;
        }
        self.always
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Ok(HttpResponse::status(404)))
    }
}

impl Transport for StubTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.next_reply(url)
    }
}

pub fn rate_limited(retry_after: Option<&str>) -> Reply {
    Ok(HttpResponse {
        status: 429,
        retry_after: retry_after.map(str::to_string),
        body: Vec::new(),
    })
}

pub fn ok(body: impl Into<Vec<u8>>) -> Reply {
    Ok(HttpResponse::ok(body))
}

pub fn status(code: u16) -> Reply {
    Ok(HttpResponse::status(code))
}

pub fn fast_policy(max_retries: u32) -> BackoffPolicy {
    BackoffPolicy {
        max_retries,
        base: Duration::from_millis(10),
        rate_limit_jitter: Duration::ZERO,
        network_jitter: Duration::ZERO,
    }
}

pub fn client(transport: StubTransport, concurrency: usize) -> PokeApiClient<StubTransport> {
    PokeApiClient::new(Fetcher::new(transport, concurrency, fast_policy(3)), BASE)
}

pub fn resolver(transport: StubTransport, concurrency: usize) -> AssetResolver<StubTransport> {
    AssetResolver::new(client(transport, concurrency)).with_pause(CandidatePause::none())
}

pub fn detail_url(id: u32) -> String {
    format!("{}/pokemon/{}/", BASE, id)
}

pub fn art_url(id: u32) -> String {
    format!("https://img.test/art/{}.png", id)
}

pub fn sprite_url(id: u32) -> String {
    format!("https://img.test/front/{}.png", id)
}

/// Detail JSON with the given official-artwork and default sprite URLs.
pub fn detail_json(id: u32, name: &str, artwork: Option<&str>, sprite: Option<&str>) -> Vec<u8> {
    serde_json::json!({
        "id": id,
        "name": name,
        "types": [{"slot": 1, "type": {"name": "grass", "url": ""}}],
        "sprites": {
            "front_default": sprite,
            "other": {
                "official-artwork": {"front_default": artwork},
                "dream_world": {"front_default": null},
                "home": {"front_default": null}
            }
        }
    })
    .to_string()
    .into_bytes()
}

/// Register an entity whose artwork downloads as a valid PNG.
pub fn serve_entity(stub: &StubTransport, id: u32, name: &str) -> Vec<u8> {
    let png = png_bytes(64 + id, 48);
    stub.always(&detail_url(id), ok(detail_json(id, name, Some(&art_url(id)), None)));
    stub.always(&art_url(id), ok(png.clone()));
    png
}

pub fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 200, 30, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}
